use async_trait::async_trait;

/// Randomized pause used between actions, between wallets and during backoff.
///
/// Implementations suspend the caller for a whole number of seconds drawn
/// uniformly from `[min_secs, max_secs]`.
#[async_trait]
pub trait Delayer: Send + Sync {
    async fn wait(&self, min_secs: u64, max_secs: u64);
}
