use async_trait::async_trait;
use murmur_core::{CoreError, Post, PublishedPost};

/// Capability interface over a social platform. The pipeline never sees
/// transport details; each platform implements this small surface and is
/// selected at composition time.
///
/// Reads have no ordering dependency on each other and may be called
/// directly. All writes (`publish`, `like`, `share`, `quote`) are expected
/// to go through the [`crate::WriteQueue`] so the platform sees them one
/// at a time, in order.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    async fn fetch_timeline(&self, limit: usize) -> Result<Vec<Post>, CoreError>;

    /// `Ok(None)` means the post is gone or inaccessible, which callers
    /// treat as end-of-chain rather than a failure.
    async fn fetch_post(&self, id: &str) -> Result<Option<Post>, CoreError>;

    async fn publish(
        &self,
        text: &str,
        reply_to_id: Option<&str>,
    ) -> Result<PublishedPost, CoreError>;

    async fn like(&self, id: &str) -> Result<(), CoreError>;

    async fn share(&self, id: &str) -> Result<(), CoreError>;

    async fn quote(&self, text: &str, id: &str) -> Result<PublishedPost, CoreError>;
}
