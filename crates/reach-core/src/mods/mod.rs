use serde::{Deserialize, Serialize};

use crate::instance::ModLoader;

pub mod puzzle;
pub mod quilt;

pub use puzzle::PuzzleMod;
pub use quilt::QuiltMod;

pub type MetadataError = serde_path_to_error::Error<serde_json::Error>;

/// Parsed mod metadata of one of the supported loaders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mod {
    Quilt(QuiltMod),
    Puzzle(PuzzleMod),
}

impl Mod {
    /// Deserialize the metadata entry of an archive made for `loader`.
    ///
    /// The result is always inactive, whatever the archive says.
    pub fn from_metadata(loader: ModLoader, data: &[u8]) -> Result<Self, MetadataError> {
        let mut deserializer = serde_json::Deserializer::from_slice(data);

        let mut value = match loader {
            ModLoader::Quilt => serde_path_to_error::deserialize(&mut deserializer).map(Mod::Quilt)?,
            ModLoader::Puzzle => serde_path_to_error::deserialize(&mut deserializer).map(Mod::Puzzle)?,
        };
        value.set_active(false);

        Ok(value)
    }

    pub fn loader(&self) -> ModLoader {
        match self {
            Mod::Quilt(_) => ModLoader::Quilt,
            Mod::Puzzle(_) => ModLoader::Puzzle,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Mod::Quilt(m) => m.id(),
            Mod::Puzzle(m) => &m.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Mod::Quilt(m) => m.name(),
            Mod::Puzzle(m) => m.name.as_deref(),
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Mod::Quilt(m) => m.quilt_loader.version.as_deref(),
            Mod::Puzzle(m) => m.version.as_deref(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Mod::Quilt(m) => m.active,
            Mod::Puzzle(m) => m.active,
        }
    }

    pub fn set_active(&mut self, active: bool) {
        match self {
            Mod::Quilt(m) => m.active = active,
            Mod::Puzzle(m) => m.active = active,
        }
    }
}
