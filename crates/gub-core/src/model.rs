use async_trait::async_trait;

use crate::Result;

/// Port for a remote generative-text service.
///
/// One operation; any failure (network, quota, malformed response) surfaces as
/// `Error::Generation` with the underlying cause. Retries, if any, are the
/// caller's responsibility.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}
