use std::path::PathBuf;

use crate::{downloads::DownloadError, instance::InstanceType, mods::MetadataError};

#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// The instance cannot have mods. Not a failure, the pipeline finishes with no result.
    #[error("instances of type `{0}` do not support mods")]
    UnsupportedLoader(InstanceType),

    #[error("version `{0}` has no downloadable file")]
    NoPrimaryFile(String),

    #[error("`{0}` is not a valid file name")]
    InvalidFileName(String),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("downloaded file is not a valid archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("archive does not contain `{0}`")]
    MissingMetadata(&'static str),

    #[error("invalid `{file}`: {source}")]
    InvalidMetadata {
        file: &'static str,
        #[source]
        source: MetadataError,
    },

    #[error("Mod with id '{0}' already added!")]
    DuplicateMod(String),

    /// The destination belongs to another file, usually another installed mod.
    #[error("{} already exists", .0.display())]
    FileExists(PathBuf),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("acquisition was cancelled")]
    Cancelled,

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

impl AcquisitionError {
    /// Errors the user can act upon. Everything else is unexpected and only worth logging.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, AcquisitionError::DuplicateMod(_))
    }
}
