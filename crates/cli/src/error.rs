#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("project `{0}` has no versions")]
    NoVersions(String),

    #[error("project `{project}` has no version `{version}`")]
    VersionNotFound { project: String, version: String },

    #[error("cannot guess a file name from `{0}`, pass --name")]
    NoFileName(String),

    #[error("instance already exists at {0}")]
    InstanceExists(String),
}
