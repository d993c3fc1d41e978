use reach_modding::crmm::version::ProjectVersion;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{downloads::progress::ProgressSender, instance::SharedInstance, mods::Mod};

use super::{AcquireProgress, AcquisitionError, ModAcquirer};

/// Background acquisition started by [`ModAcquirer::spawn`].
pub struct AcquisitionHandle {
    token: CancellationToken,
    handle: JoinHandle<Result<Option<Mod>, AcquisitionError>>,
}

impl AcquisitionHandle {
    /// Stop the acquisition and its progress updates.
    ///
    /// Once the download passed every check the mod is committed regardless.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub async fn join(self) -> Result<Option<Mod>, AcquisitionError> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

impl ModAcquirer {
    /// Run [`ModAcquirer::acquire_into`] on the tokio runtime.
    pub fn spawn<S>(&self, version: ProjectVersion, instance: SharedInstance, sender: S) -> AcquisitionHandle
    where
        S: ProgressSender<AcquireProgress> + 'static,
    {
        self.spawn_with_token(version, instance, sender, CancellationToken::new())
    }

    pub fn spawn_with_token<S>(
        &self,
        version: ProjectVersion,
        instance: SharedInstance,
        sender: S,
        token: CancellationToken,
    ) -> AcquisitionHandle
    where
        S: ProgressSender<AcquireProgress> + 'static,
    {
        let acquirer = self.clone();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let guarded = CancellableSender {
                inner: &sender,
                token: &task_token,
            };

            let result = acquirer
                .acquire_until(&version, &instance, &guarded, &task_token)
                .await;
            if matches!(result, Err(AcquisitionError::Cancelled)) {
                debug!("Acquisition of {} cancelled", version.version_number);
            }
            result
        });

        AcquisitionHandle { token, handle }
    }
}

/// Drops updates once the token is cancelled.
struct CancellableSender<'a, P> {
    inner: &'a dyn ProgressSender<P>,
    token: &'a CancellationToken,
}

#[async_trait::async_trait]
impl<'a, P: Send> ProgressSender<P> for CancellableSender<'a, P> {
    async fn update(&self, data: P) {
        if self.token.is_cancelled() {
            return;
        }
        self.inner.update(data).await;
    }
}
