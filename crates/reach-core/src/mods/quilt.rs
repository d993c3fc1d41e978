use serde::{Deserialize, Serialize};

/// Contents of `quilt.mod.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuiltMod {
    #[serde(alias = "quiltLoader")]
    pub quilt_loader: QuiltLoader,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuiltLoader {
    pub id: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub metadata: Option<QuiltMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuiltMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl QuiltMod {
    pub fn id(&self) -> &str {
        &self.quilt_loader.id
    }

    pub fn name(&self) -> Option<&str> {
        self.quilt_loader
            .metadata
            .as_ref()
            .and_then(|m| m.name.as_deref())
    }
}
