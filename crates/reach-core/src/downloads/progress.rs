#[async_trait::async_trait]
pub trait ProgressSender<P: Send>: Sync + Send {
    /// It can technically return error but we will ignore them.
    async fn update(&self, data: P);
}

#[async_trait::async_trait]
impl<P: Send> ProgressSender<P> for tokio::sync::mpsc::Sender<P> {
    async fn update(&self, data: P) {
        let _ = self.send(data).await;
    }
}

#[async_trait::async_trait]
impl<P: Send> ProgressSender<P> for tokio::sync::mpsc::UnboundedSender<P> {
    async fn update(&self, data: P) {
        let _ = self.send(data);
    }
}

/// Sender that drops every update.
pub struct IgnoreProgress;

#[async_trait::async_trait]
impl<P: Send + 'static> ProgressSender<P> for IgnoreProgress {
    async fn update(&self, _data: P) {}
}

/// Converts updates of type `I` into `T` before passing them to the inner sender.
pub struct MappedSender<'a, I, T> {
    inner: &'a dyn ProgressSender<T>,
    mapper: Box<dyn Fn(I) -> T + Sync + Send + 'a>,
}

#[async_trait::async_trait]
impl<'a, I: Send, T: Send> ProgressSender<I> for MappedSender<'a, I, T> {
    async fn update(&self, data: I) {
        let mapped = (self.mapper)(data);
        self.inner.update(mapped).await;
    }
}

impl<'a, I, T> MappedSender<'a, I, T> {
    pub fn new<F>(sender: &'a dyn ProgressSender<T>, mapper: F) -> Self
    where
        F: Fn(I) -> T + Sync + Send + 'a,
    {
        Self {
            inner: sender,
            mapper: Box::new(mapper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mapped_sender_test() {
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel::<String>();
        let mapped = MappedSender::new(&sender, |val: u32| val.to_string());

        mapped.update(1).await;
        mapped.update(2).await;

        assert_eq!(receiver.recv().await.as_deref(), Some("1"));
        assert_eq!(receiver.recv().await.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn closed_channel_is_ignored() {
        let (sender, receiver) = tokio::sync::mpsc::channel::<u32>(1);
        drop(receiver);

        sender.update(1).await;
        IgnoreProgress.update(1u32).await;
    }
}
