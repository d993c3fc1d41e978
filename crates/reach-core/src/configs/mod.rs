use std::path::Path;

use reach_modding::CRMM_API;
use serde::{Deserialize, Serialize};

use crate::{acquire::DuplicatePolicy, fs::read_toml_config};

/// Settings of [`crate::acquire::ModAcquirer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquireSettings {
    /// Allowed difference in bytes between the declared and the received size.
    /// `None` treats the declared size as a hint.
    pub size_tolerance: Option<u64>,
    pub duplicate_policy: DuplicatePolicy,
    pub catalog_url: String,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            size_tolerance: None,
            duplicate_policy: DuplicatePolicy::default(),
            catalog_url: CRMM_API.to_owned(),
        }
    }
}

impl AcquireSettings {
    /// Read settings from `path` or use the defaults if there is no such file.
    pub async fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if !tokio::fs::try_exists(path).await? {
            tracing::debug!("{} does not exist. Using default settings", path.display());
            return Ok(Self::default());
        }

        read_toml_config(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::write_toml_config;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AcquireSettings::load_or_default(dir.path().join("Settings.toml"))
            .await
            .unwrap();

        assert_eq!(settings, AcquireSettings::default());
    }

    #[tokio::test]
    async fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Settings.toml");
        tokio::fs::write(&path, "duplicate_policy = \"keep\"\n").await.unwrap();

        let settings = AcquireSettings::load_or_default(&path).await.unwrap();
        assert_eq!(settings.duplicate_policy, DuplicatePolicy::Keep);
        assert_eq!(settings.catalog_url, CRMM_API);
        assert_eq!(settings.size_tolerance, None);
    }

    #[tokio::test]
    async fn write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/Settings.toml");

        let settings = AcquireSettings {
            size_tolerance: Some(16),
            ..Default::default()
        };
        write_toml_config(&settings, &path).await.unwrap();

        assert_eq!(AcquireSettings::load_or_default(&path).await.unwrap(), settings);
    }
}
