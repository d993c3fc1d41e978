use std::{
    ffi::OsStr,
    io::Read,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use reach_modding::crmm::version::ProjectVersion;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    configs::AcquireSettings,
    downloads::{
        download_file,
        progress::{MappedSender, ProgressSender},
        DownloadError,
    },
    instance::{Instance, ModLoader, SharedInstance},
    mods::Mod,
};

mod error;
pub mod task;

pub use error::AcquisitionError;
pub use task::AcquisitionHandle;

/// Events emitted while a mod is acquired.
///
/// `Downloaded` is always sent before the archive is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireProgress {
    Started { file: String, expected: Option<u64> },
    Transferred { downloaded: u64, expected: Option<u64> },
    Downloaded { total: u64 },
    Finished { id: String },
    Failed { reason: String },
}

/// What to do with the downloaded archive when its mod is already installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Delete the download.
    #[default]
    Remove,
    /// Leave the download in the mods directory.
    Keep,
}

/// Downloads mod versions into instances.
#[derive(Debug, Clone)]
pub struct ModAcquirer {
    client: Client,
    settings: AcquireSettings,
}

impl ModAcquirer {
    pub fn new(client: Client, settings: AcquireSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &AcquireSettings {
        &self.settings
    }

    /// Download `version` into `instance` and return the activated mod.
    ///
    /// Returns `Ok(None)` without touching the disk or the network if the
    /// instance's type does not support mods. The caller appends the mod to the instance.
    #[tracing::instrument(skip_all, fields(version = %version.version_number, instance = instance.name()))]
    pub async fn acquire(
        &self,
        version: &ProjectVersion,
        instance: &Instance,
        sender: &dyn ProgressSender<AcquireProgress>,
    ) -> Result<Option<Mod>, AcquisitionError> {
        let result = match self.stage(version, instance, sender).await {
            Ok(Some(staged)) => staged.promote().await.map(Some),
            other => other.map(|_| None),
        };

        report(&result, sender).await;
        result
    }

    /// Like [`ModAcquirer::acquire`] but also appends the mod to `instance`.
    ///
    /// Installed mods are checked once more while the instance is locked, so
    /// concurrent acquisitions of the same mod commit it only once.
    pub async fn acquire_into(
        &self,
        version: &ProjectVersion,
        instance: &SharedInstance,
        sender: &dyn ProgressSender<AcquireProgress>,
    ) -> Result<Option<Mod>, AcquisitionError> {
        self.acquire_until(version, instance, sender, &CancellationToken::new())
            .await
    }

    /// [`ModAcquirer::acquire_into`] that gives up with `Cancelled` if `token` fires
    /// before the commit. A commit that has started always runs to the end.
    #[tracing::instrument(skip_all, fields(version = %version.version_number))]
    pub(crate) async fn acquire_until(
        &self,
        version: &ProjectVersion,
        instance: &SharedInstance,
        sender: &dyn ProgressSender<AcquireProgress>,
        token: &CancellationToken,
    ) -> Result<Option<Mod>, AcquisitionError> {
        let snapshot = instance.snapshot().await;

        let staged = tokio::select! {
            biased;
            () = token.cancelled() => Err(AcquisitionError::Cancelled),
            staged = self.stage(version, &snapshot, sender) => staged,
        };

        let result = match staged {
            Ok(Some(staged)) => instance
                .install_staged(staged, self.settings.duplicate_policy)
                .await
                .map(Some),
            other => other.map(|_| None),
        };

        report(&result, sender).await;
        result
    }

    /// Run every step except moving the download onto its final path.
    async fn stage(
        &self,
        version: &ProjectVersion,
        instance: &Instance,
        sender: &dyn ProgressSender<AcquireProgress>,
    ) -> Result<Option<StagedMod>, AcquisitionError> {
        let loader = match resolve_loader(instance) {
            Ok(loader) => loader,
            Err(AcquisitionError::UnsupportedLoader(instance_type)) => {
                debug!("Instance type {instance_type} does not support mods. Skipping");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let file = version
            .primary_file()
            .ok_or_else(|| AcquisitionError::NoPrimaryFile(version.id.clone()))?;

        if Path::new(&file.name).file_name() != Some(OsStr::new(&file.name)) {
            return Err(AcquisitionError::InvalidFileName(file.name.clone()));
        }

        let dir = instance.mods_dir(loader);
        let destination = dir.join(&file.name);
        let staging = StagingFile::new(&dir, &file.name);

        let declared = (file.size > 0).then_some(file.size);

        sender
            .update(AcquireProgress::Started {
                file: file.name.clone(),
                expected: declared,
            })
            .await;

        let transfer = MappedSender::new(sender, |p: crate::downloads::TransferProgress| {
            AcquireProgress::Transferred {
                downloaded: p.downloaded,
                expected: p.expected,
            }
        });

        let total = download_file(&self.client, &file.url, staging.path(), declared, &transfer).await?;

        if let Some(declared) = declared {
            if total != declared {
                match self.settings.size_tolerance {
                    Some(tolerance) if total.abs_diff(declared) > tolerance => {
                        return Err(DownloadError::SizeMismatch {
                            url: file.url.clone(),
                            declared,
                            actual: total,
                        }
                        .into());
                    }
                    _ => warn!("{} has {total} bytes, declared size is {declared}", file.name),
                }
            }
        }

        sender.update(AcquireProgress::Downloaded { total }).await;

        let mut value = read_metadata(staging.path(), loader)?;

        if instance.has_mod(loader, value.id()) {
            let id = value.id().to_owned();
            StagedMod {
                value,
                staging,
                destination,
            }
            .abort_duplicate(self.settings.duplicate_policy)
            .await?;
            return Err(AcquisitionError::DuplicateMod(id));
        }

        value.set_active(true);

        Ok(Some(StagedMod {
            value,
            staging,
            destination,
        }))
    }
}

fn resolve_loader(instance: &Instance) -> Result<ModLoader, AcquisitionError> {
    instance
        .instance_type()
        .mod_loader()
        .ok_or(AcquisitionError::UnsupportedLoader(instance.instance_type()))
}

async fn report(
    result: &Result<Option<Mod>, AcquisitionError>,
    sender: &dyn ProgressSender<AcquireProgress>,
) {
    match result {
        Ok(Some(value)) => {
            info!(id = value.id(), "Mod acquired");
            sender
                .update(AcquireProgress::Finished {
                    id: value.id().to_owned(),
                })
                .await;
        }
        Ok(None) | Err(AcquisitionError::Cancelled) => {}
        Err(err) => {
            if err.is_user_facing() {
                info!("{err}");
            } else {
                warn!("Mod acquisition failed: {err}");
            }
            sender
                .update(AcquireProgress::Failed {
                    reason: err.to_string(),
                })
                .await;
        }
    }
}

/// Open the archive at `path` and parse the metadata entry of `loader`.
fn read_metadata(path: &Path, loader: ModLoader) -> Result<Mod, AcquisitionError> {
    let file = std::fs::File::open(path).map_err(|source| AcquisitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut archive = zip::ZipArchive::new(file)?;

    let name = loader.metadata_file();
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(AcquisitionError::MissingMetadata(name))
        }
        Err(err) => return Err(err.into()),
    };

    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(zip::result::ZipError::Io)?;

    Mod::from_metadata(loader, &data)
        .map_err(|source| AcquisitionError::InvalidMetadata { file: name, source })
}

/// Download that passed every check but is not in place yet.
pub(crate) struct StagedMod {
    value: Mod,
    staging: StagingFile,
    destination: PathBuf,
}

impl StagedMod {
    pub(crate) fn value(&self) -> &Mod {
        &self.value
    }

    /// Rename the staging file onto its destination. An existing destination is never replaced.
    pub(crate) async fn promote(mut self) -> Result<Mod, AcquisitionError> {
        let io_error = |source: std::io::Error| AcquisitionError::Io {
            path: self.destination.clone(),
            source,
        };

        if tokio::fs::try_exists(&self.destination).await.map_err(io_error)? {
            warn!("Refusing to overwrite {}", self.destination.display());
            return Err(AcquisitionError::FileExists(self.destination.clone()));
        }

        tokio::fs::rename(self.staging.path(), &self.destination)
            .await
            .map_err(io_error)?;
        self.staging.disarm();

        debug!("Mod file moved to {}", self.destination.display());

        Ok(self.value)
    }

    pub(crate) async fn abort_duplicate(self, policy: DuplicatePolicy) -> Result<(), AcquisitionError> {
        match policy {
            DuplicatePolicy::Remove => Ok(()),
            DuplicatePolicy::Keep => match self.promote().await {
                Ok(_) | Err(AcquisitionError::FileExists(_)) => Ok(()),
                Err(err) => Err(err),
            },
        }
    }
}

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary download target. Removed on drop unless disarmed.
struct StagingFile {
    path: PathBuf,
    armed: bool,
}

impl StagingFile {
    fn new(dir: &Path, name: &str) -> Self {
        let n = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self {
            path: dir.join(format!(".{name}.{}-{n}.part", std::process::id())),
            armed: true,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed {}", self.path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("Unable to remove {}: {err}", self.path.display()),
        }
    }
}
