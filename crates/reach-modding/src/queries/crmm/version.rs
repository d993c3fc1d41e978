//! Version

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{format_list, QueryData};

/// Every CRMM response wraps its payload into `data`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Response<T> {
    pub data: T,
}

impl<T> Response<T> {
    pub fn into_inner(self) -> T {
        self.data
    }
}

pub type ProjectVersions = Response<Vec<ProjectVersion>>;
pub type SingleVersion = Response<ProjectVersion>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersion {
    pub id: String,
    pub title: String,
    pub version_number: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub release_channel: Option<String>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub primary_file: Option<ProjectFile>,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
}

impl ProjectVersion {
    /// The main downloadable artifact of this version.
    ///
    /// Prefers the explicit `primaryFile`, then a file flagged as primary, then the first file.
    pub fn primary_file(&self) -> Option<&ProjectFile> {
        self.primary_file
            .as_ref()
            .or_else(|| self.files.iter().find(|f| f.is_primary))
            .or_else(|| self.files.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub name: String,
    pub url: String,
    /// Declared size in bytes. Advisory only.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub sha1_hash: Option<String>,
}

impl ProjectFile {
    pub fn new(name: impl Into<String>, url: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            size,
            is_primary: true,
            sha1_hash: None,
        }
    }
}

#[derive(Debug, TypedBuilder)]
pub struct ProjectVersionsData {
    #[builder(setter(into))]
    slug: String,
    #[builder(default, setter(strip_option))]
    game_versions: Option<Vec<String>>,
    #[builder(default, setter(strip_option))]
    loaders: Option<Vec<String>>,
}

impl QueryData<ProjectVersions> for ProjectVersionsData {
    fn builder(&self, base_url: &str) -> crate::Builder {
        crate::Builder::new(format!("{base_url}/project/{}/version", self.slug))
            .add_optional_parameter(
                "gameVersions",
                self.game_versions.as_ref().map(|s| format_list(s.iter())),
            )
            .add_optional_parameter(
                "loaders",
                self.loaders.as_ref().map(|s| format_list(s.iter())),
            )
    }
}

pub struct SingleVersionData {
    slug: String,
    version: String,
}

impl SingleVersionData {
    pub fn new(slug: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            version: version.into(),
        }
    }
}

impl QueryData<SingleVersion> for SingleVersionData {
    fn builder(&self, base_url: &str) -> crate::Builder {
        crate::Builder::new(format!(
            "{base_url}/project/{}/version/{}",
            self.slug, self.version
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_json;

    const VERSIONS: &str = r#"{
        "success": true,
        "data": [
            {
                "id": "v2",
                "title": "Example 1.1",
                "versionNumber": "1.1.0",
                "gameVersions": ["0.3.1"],
                "loaders": ["quilt"],
                "primaryFile": {
                    "name": "example-1.1.0.jar",
                    "url": "https://cdn.crmm.tech/example-1.1.0.jar",
                    "size": 2048,
                    "isPrimary": true
                },
                "files": []
            },
            {
                "id": "v1",
                "title": "Example 1.0",
                "versionNumber": "1.0.0",
                "files": [
                    { "name": "sources.zip", "url": "https://cdn.crmm.tech/sources.zip", "size": 10 },
                    { "name": "example-1.0.0.jar", "url": "https://cdn.crmm.tech/example-1.0.0.jar", "size": 1024, "isPrimary": true }
                ]
            }
        ]
    }"#;

    #[test]
    fn deserialize_versions() {
        let versions = parse_json::<ProjectVersions>(VERSIONS).unwrap().into_inner();

        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version_number, "1.1.0");
        assert_eq!(versions[0].loaders, vec!["quilt".to_owned()]);
        assert_eq!(versions[0].primary_file().unwrap().size, 2048);
    }

    #[test]
    fn primary_file_falls_back_to_flagged_file() {
        let versions = parse_json::<ProjectVersions>(VERSIONS).unwrap().into_inner();

        let file = versions[1].primary_file().unwrap();
        assert_eq!(file.name, "example-1.0.0.jar");
    }

    #[test]
    fn primary_file_missing() {
        let version: ProjectVersion =
            parse_json(r#"{"id": "x", "title": "x", "versionNumber": "0.1"}"#).unwrap();
        assert!(version.primary_file().is_none());
    }
}
