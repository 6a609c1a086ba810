//! Event-stream + kv backend: writes are published fire-and-forget to a
//! topic while the score itself is written synchronously to the kv side
//! for immediate-consistency reads.
//!
//! No message-queue client crate is present anywhere in the retrieval
//! pack this workspace was grounded on, so the publish side is an
//! in-process bounded channel drained by a background task rather than a
//! real Kafka producer — a deliberate substitution, not a missing
//! feature; a real topic client can replace the channel without touching
//! this type's public contract. A separate consumer of the published
//! stream is out of scope.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::event::{ActionType, ReputationEvent};
use crate::score::ReputationSnapshot;
use crate::store::ReputationStore;

pub struct EventStreamReputationStore<S> {
    inner: Arc<S>,
    publisher: mpsc::Sender<ReputationEvent>,
}

impl<S: ReputationStore> EventStreamReputationStore<S> {
    /// Spawns the background publish-drain task and returns the store
    /// plus its handle; dropping the handle does not stop the task, only
    /// dropping the store (which drops the sender) does.
    pub fn new(inner: Arc<S>, channel_capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<ReputationEvent>(channel_capacity);
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::debug!(
                    identifier = %event.identifier,
                    action = ?event.action,
                    delta = event.delta,
                    "published reputation event"
                );
            }
        });
        (Self { inner, publisher: tx }, handle)
    }

    fn publish(&self, event: ReputationEvent) {
        if let Err(e) = self.publisher.try_send(event) {
            tracing::warn!(error = %e, "dropping reputation event, publish channel full or closed");
        }
    }
}

#[async_trait]
impl<S: ReputationStore> ReputationStore for EventStreamReputationStore<S> {
    async fn get_score(&self, identifier: &str) -> Result<ReputationSnapshot> {
        self.inner.get_score(identifier).await
    }

    async fn record_success(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot> {
        let snapshot = self.inner.record_success(identifier, reason, metadata.clone()).await?;
        self.publish(ReputationEvent {
            identifier: identifier.to_string(),
            action: ActionType::Success,
            delta: crate::score::SUCCESS_DELTA,
            reason: reason.to_string(),
            timestamp: snapshot.last_action_at,
            metadata,
        });
        Ok(snapshot)
    }

    async fn record_failure(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot> {
        let snapshot = self.inner.record_failure(identifier, reason, metadata.clone()).await?;
        self.publish(ReputationEvent {
            identifier: identifier.to_string(),
            action: ActionType::Failure,
            delta: crate::score::FAILURE_DELTA,
            reason: reason.to_string(),
            timestamp: snapshot.last_action_at,
            metadata,
        });
        Ok(snapshot)
    }

    async fn boost(&self, identifier: &str, amount: i32, reason: &str) -> Result<ReputationSnapshot> {
        let snapshot = self.inner.boost(identifier, amount, reason).await?;
        self.publish(ReputationEvent {
            identifier: identifier.to_string(),
            action: ActionType::Boost,
            delta: amount,
            reason: reason.to_string(),
            timestamp: snapshot.last_action_at,
            metadata: None,
        });
        Ok(snapshot)
    }

    async fn slash(&self, identifier: &str, amount: i32, reason: &str) -> Result<ReputationSnapshot> {
        let snapshot = self.inner.slash(identifier, amount, reason).await?;
        self.publish(ReputationEvent {
            identifier: identifier.to_string(),
            action: ActionType::Slash,
            delta: -amount,
            reason: reason.to_string(),
            timestamp: snapshot.last_action_at,
            metadata: None,
        });
        Ok(snapshot)
    }

    async fn get_history(&self, identifier: &str, limit: usize) -> Result<Vec<ReputationEvent>> {
        self.inner.get_history(identifier, limit).await
    }

    async fn reset(&self, identifier: &str) -> Result<()> {
        self.inner.reset(identifier).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryReputationStore;

    #[tokio::test]
    async fn delegates_reads_and_writes_to_inner_kv() {
        let inner = Arc::new(MemoryReputationStore::new());
        let (store, _handle) = EventStreamReputationStore::new(inner.clone(), 16);
        store.record_success("id:web:example.com", "ok", None).await.unwrap();
        let snap = store.get_score("id:web:example.com").await.unwrap();
        assert_eq!(snap.score, 51);
        // Synchronous kv side is immediately consistent.
        let inner_snap = inner.get_score("id:web:example.com").await.unwrap();
        assert_eq!(inner_snap.score, 51);
    }
}
