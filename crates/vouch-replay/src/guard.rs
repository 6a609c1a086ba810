//! The `ReplayGuard` contract: rejects the second presentation of any
//! token-id within its validity window.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait ReplayGuard: Send + Sync {
    async fn is_used(&self, id: &str) -> Result<bool>;

    async fn mark_used(&self, id: &str, expires_at: i64) -> Result<()>;

    /// Checks and marks in one logically atomic step: `is_used` followed
    /// by `mark_used` is atomic per id. Returns `true` if this is the
    /// first presentation of `id`.
    async fn check_and_mark(&self, id: &str, expires_at: i64) -> Result<bool> {
        if self.is_used(id).await? {
            return Ok(false);
        }
        self.mark_used(id, expires_at).await?;
        Ok(true)
    }

    async fn cleanup_expired(&self) -> Result<usize>;
}
