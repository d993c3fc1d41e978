use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::{
    acquire::{AcquisitionError, DuplicatePolicy, StagedMod},
    fs::{read_toml_config, write_toml_config},
    mods::{Mod, PuzzleMod, QuiltMod},
    INSTANCE_CONFIG, PUZZLE_METADATA_FILE, PUZZLE_MODS_DIR, QUILT_METADATA_FILE, QUILT_MODS_DIR,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    #[default]
    Vanilla,
    Fabric,
    Quilt,
    Puzzle,
}

impl InstanceType {
    /// Loader that installs mods for this instance type, if any.
    pub fn mod_loader(self) -> Option<ModLoader> {
        match self {
            InstanceType::Vanilla | InstanceType::Fabric => None,
            InstanceType::Quilt => Some(ModLoader::Quilt),
            InstanceType::Puzzle => Some(ModLoader::Puzzle),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstanceType::Vanilla => "vanilla",
            InstanceType::Fabric => "fabric",
            InstanceType::Quilt => "quilt",
            InstanceType::Puzzle => "puzzle",
        }
    }
}

impl Display for InstanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown instance type `{0}`")]
pub struct UnknownInstanceType(String);

impl FromStr for InstanceType {
    type Err = UnknownInstanceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vanilla" => Ok(InstanceType::Vanilla),
            "fabric" => Ok(InstanceType::Fabric),
            "quilt" => Ok(InstanceType::Quilt),
            "puzzle" => Ok(InstanceType::Puzzle),
            _ => Err(UnknownInstanceType(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModLoader {
    Quilt,
    Puzzle,
}

impl ModLoader {
    /// Name of the metadata entry inside a mod archive.
    pub fn metadata_file(self) -> &'static str {
        match self {
            ModLoader::Quilt => QUILT_METADATA_FILE,
            ModLoader::Puzzle => PUZZLE_METADATA_FILE,
        }
    }

    /// Mods directory with respect to the instance's directory.
    pub fn mods_dir(self) -> &'static str {
        match self {
            ModLoader::Quilt => QUILT_MODS_DIR,
            ModLoader::Puzzle => PUZZLE_MODS_DIR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    name: String,
    #[serde(rename = "type")]
    instance_type: InstanceType,

    #[serde(skip)]
    path: PathBuf,

    #[serde(default)]
    quilt_mods: Vec<QuiltMod>,
    #[serde(default)]
    puzzle_mods: Vec<PuzzleMod>,
}

impl Instance {
    pub fn new(name: impl Into<String>, instance_type: InstanceType, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            instance_type,
            path: path.into(),
            quilt_mods: Vec::new(),
            puzzle_mods: Vec::new(),
        }
    }

    /// Read the instance stored in `path`.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut instance: Instance = read_toml_config(path.join(INSTANCE_CONFIG)).await?;
        instance.path = path.to_path_buf();
        Ok(instance)
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        write_toml_config(self, self.config_path()).await
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join(INSTANCE_CONFIG)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance_type(&self) -> InstanceType {
        self.instance_type
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mods_dir(&self, loader: ModLoader) -> PathBuf {
        self.path.join(loader.mods_dir())
    }

    pub fn quilt_mods(&self) -> &[QuiltMod] {
        &self.quilt_mods
    }

    pub fn puzzle_mods(&self) -> &[PuzzleMod] {
        &self.puzzle_mods
    }

    /// All installed mods. Quilt mods come first.
    pub fn mods(&self) -> impl Iterator<Item = Mod> + '_ {
        self.quilt_mods
            .iter()
            .cloned()
            .map(Mod::Quilt)
            .chain(self.puzzle_mods.iter().cloned().map(Mod::Puzzle))
    }

    pub fn has_mod(&self, loader: ModLoader, id: &str) -> bool {
        match loader {
            ModLoader::Quilt => self.quilt_mods.iter().any(|m| m.id() == id),
            ModLoader::Puzzle => self.puzzle_mods.iter().any(|m| m.id == id),
        }
    }

    /// Append `value` to the collection of its loader.
    ///
    /// Fails without mutating anything if a mod with the same id is already there.
    pub fn add_mod(&mut self, value: Mod) -> Result<(), AcquisitionError> {
        if self.has_mod(value.loader(), value.id()) {
            return Err(AcquisitionError::DuplicateMod(value.id().to_owned()));
        }

        info!(id = value.id(), instance = %self.name, "Mod added");

        match value {
            Mod::Quilt(m) => self.quilt_mods.push(m),
            Mod::Puzzle(m) => self.puzzle_mods.push(m),
        }

        Ok(())
    }
}

/// Instance shared between concurrent acquisitions.
#[derive(Debug, Clone)]
pub struct SharedInstance(Arc<Mutex<Instance>>);

impl SharedInstance {
    pub fn new(instance: Instance) -> Self {
        Self(Arc::new(Mutex::new(instance)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, Instance> {
        self.0.lock().await
    }

    pub async fn snapshot(&self) -> Instance {
        self.0.lock().await.clone()
    }

    /// Move a staged download into place and append its mod, all under one lock.
    pub(crate) async fn install_staged(
        &self,
        staged: StagedMod,
        policy: DuplicatePolicy,
    ) -> Result<Mod, AcquisitionError> {
        let mut instance = self.0.lock().await;

        let value = staged.value();
        if instance.has_mod(value.loader(), value.id()) {
            let id = value.id().to_owned();
            staged.abort_duplicate(policy).await?;
            return Err(AcquisitionError::DuplicateMod(id));
        }

        let value = staged.promote().await?;
        instance.add_mod(value.clone())?;

        Ok(value)
    }
}

impl From<Instance> for SharedInstance {
    fn from(value: Instance) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mods::quilt::QuiltLoader;

    fn quilt_mod(id: &str) -> Mod {
        Mod::Quilt(QuiltMod {
            quilt_loader: QuiltLoader {
                id: id.to_owned(),
                group: None,
                version: Some("1.0.0".to_owned()),
                metadata: None,
            },
            active: true,
        })
    }

    fn puzzle_mod(id: &str) -> Mod {
        Mod::Puzzle(PuzzleMod {
            id: id.to_owned(),
            version: None,
            name: Some("Puzzle".to_owned()),
            description: None,
            authors: vec!["someone".to_owned()],
            active: false,
        })
    }

    #[test]
    fn mod_loader_test() {
        assert_eq!(InstanceType::Vanilla.mod_loader(), None);
        assert_eq!(InstanceType::Fabric.mod_loader(), None);
        assert_eq!(InstanceType::Quilt.mod_loader(), Some(ModLoader::Quilt));
        assert_eq!(InstanceType::Puzzle.mod_loader(), Some(ModLoader::Puzzle));

        assert_eq!(ModLoader::Quilt.metadata_file(), "quilt.mod.json");
        assert_eq!(ModLoader::Puzzle.metadata_file(), "puzzle.mod.json");
    }

    #[test]
    fn instance_type_from_str() {
        assert_eq!("Quilt".parse::<InstanceType>().unwrap(), InstanceType::Quilt);
        assert!("forge".parse::<InstanceType>().is_err());
    }

    #[test]
    fn duplicate_is_rejected_per_loader() {
        let mut instance = Instance::new("test", InstanceType::Quilt, "./instances/test");

        instance.add_mod(quilt_mod("examplemod")).unwrap();
        // Same id under a different loader is a different collection.
        instance.add_mod(puzzle_mod("examplemod")).unwrap();

        let before = instance.clone();
        let err = instance.add_mod(quilt_mod("examplemod")).unwrap_err();

        assert!(matches!(err, AcquisitionError::DuplicateMod(id) if id == "examplemod"));
        assert_eq!(instance, before);
        assert_eq!(instance.mods().count(), 2);
    }

    #[test]
    fn mods_dir_test() {
        let instance = Instance::new("test", InstanceType::Puzzle, "/tmp/instances/test");
        assert_eq!(
            instance.mods_dir(ModLoader::Puzzle),
            PathBuf::from("/tmp/instances/test/puzzle_mods")
        );
    }

    #[tokio::test]
    async fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();

        let mut instance = Instance::new("saved", InstanceType::Quilt, dir.path());
        instance.add_mod(quilt_mod("a")).unwrap();
        instance.add_mod(puzzle_mod("b")).unwrap();
        instance.save().await.unwrap();

        let loaded = Instance::load(dir.path()).await.unwrap();
        assert_eq!(loaded, instance);
        assert!(loaded.quilt_mods()[0].active);
    }
}
