use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Aborts the ctrl-c listener when dropped.
pub struct CtrlCGuard(JoinHandle<()>);

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Cancel `token` when the user presses ctrl-c.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> CtrlCGuard {
    CtrlCGuard(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Cancelling");
            token.cancel();
        }
    }))
}
