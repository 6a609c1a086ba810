//! The `ReputationStore` contract and its in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use vouch_core::{Clock, SystemClock};

use crate::error::Result;
use crate::event::{ActionType, ReputationEvent};
use crate::score::{
    ReputationScore, ReputationSnapshot, DEFAULT_DECAY_RATE_PER_DAY, DEFAULT_DECAY_WINDOW_DAYS,
    FAILURE_DELTA, SUCCESS_DELTA,
};

pub const MAX_HISTORY: usize = 1000;

#[async_trait]
pub trait ReputationStore: Send + Sync {
    async fn get_score(&self, identifier: &str) -> Result<ReputationSnapshot>;
    async fn record_success(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot>;
    async fn record_failure(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot>;
    async fn boost(&self, identifier: &str, amount: i32, reason: &str) -> Result<ReputationSnapshot>;
    async fn slash(&self, identifier: &str, amount: i32, reason: &str) -> Result<ReputationSnapshot>;
    async fn get_history(&self, identifier: &str, limit: usize) -> Result<Vec<ReputationEvent>>;
    async fn reset(&self, identifier: &str) -> Result<()>;
}

struct Record {
    score: ReputationScore,
    history: VecDeque<ReputationEvent>,
}

/// `RwLock<HashMap>`-backed store; mutations on the same identifier are
/// serialized by the per-record lock, mutations across identifiers
/// interleave freely.
pub struct MemoryReputationStore {
    records: RwLock<HashMap<String, Record>>,
    decay_window_days: i64,
    decay_rate_per_day: f64,
    clock: Arc<dyn Clock>,
}

impl MemoryReputationStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            decay_window_days: DEFAULT_DECAY_WINDOW_DAYS,
            decay_rate_per_day: DEFAULT_DECAY_RATE_PER_DAY,
            clock,
        }
    }

    fn mutate(
        &self,
        identifier: &str,
        action: ActionType,
        delta: i32,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> ReputationSnapshot {
        let now = self.clock.now_unix();
        let mut records = self.records.write();
        let record = records.entry(identifier.to_string()).or_insert_with(|| Record {
            score: ReputationScore::baseline(identifier, now),
            history: VecDeque::new(),
        });

        record.score.apply_delta(delta, now);
        if action == ActionType::Success {
            record.score.successes += 1;
        }

        record.history.push_back(ReputationEvent {
            identifier: identifier.to_string(),
            action,
            delta,
            reason: reason.to_string(),
            timestamp: now,
            metadata,
        });
        while record.history.len() > MAX_HISTORY {
            record.history.pop_front();
        }

        record
            .score
            .snapshot(now, self.decay_window_days, self.decay_rate_per_day)
    }
}

impl Default for MemoryReputationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReputationStore for MemoryReputationStore {
    async fn get_score(&self, identifier: &str) -> Result<ReputationSnapshot> {
        let now = self.clock.now_unix();
        let records = self.records.read();
        let snapshot = match records.get(identifier) {
            Some(record) => record.score.snapshot(now, self.decay_window_days, self.decay_rate_per_day),
            None => ReputationScore::baseline(identifier, now).snapshot(
                now,
                self.decay_window_days,
                self.decay_rate_per_day,
            ),
        };
        Ok(snapshot)
    }

    async fn record_success(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot> {
        Ok(self.mutate(identifier, ActionType::Success, SUCCESS_DELTA, reason, metadata))
    }

    async fn record_failure(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot> {
        Ok(self.mutate(identifier, ActionType::Failure, FAILURE_DELTA, reason, metadata))
    }

    async fn boost(&self, identifier: &str, amount: i32, reason: &str) -> Result<ReputationSnapshot> {
        Ok(self.mutate(identifier, ActionType::Boost, amount, reason, None))
    }

    async fn slash(&self, identifier: &str, amount: i32, reason: &str) -> Result<ReputationSnapshot> {
        Ok(self.mutate(identifier, ActionType::Slash, -amount, reason, None))
    }

    async fn get_history(&self, identifier: &str, limit: usize) -> Result<Vec<ReputationEvent>> {
        let records = self.records.read();
        let history = match records.get(identifier) {
            Some(record) => record.history.iter().cloned().collect::<Vec<_>>(),
            None => Vec::new(),
        };
        let start = history.len().saturating_sub(limit);
        Ok(history[start..].to_vec())
    }

    async fn reset(&self, identifier: &str) -> Result<()> {
        let now = self.clock.now_unix();
        self.records
            .write()
            .insert(identifier.to_string(), Record {
                score: ReputationScore::baseline(identifier, now),
                history: VecDeque::new(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_identifier_starts_at_baseline() {
        let store = MemoryReputationStore::new();
        let snap = store.get_score("id:web:example.com").await.unwrap();
        assert_eq!(snap.score, 50);
        assert_eq!(snap.total_actions, 0);
    }

    #[tokio::test]
    async fn three_success_one_failure_matches_worked_example() {
        let store = MemoryReputationStore::new();
        for _ in 0..3 {
            store
                .record_success("id:web:example.com", "ok", None)
                .await
                .unwrap();
        }
        let snap = store
            .record_failure("id:web:example.com", "timeout", None)
            .await
            .unwrap();
        assert_eq!(snap.score, 51);
        assert_eq!(snap.total_actions, 4);
        assert_eq!(snap.success_rate, 0.75);
    }

    #[tokio::test]
    async fn boost_and_slash_apply_explicit_amounts() {
        let store = MemoryReputationStore::new();
        store.boost("id:web:example.com", 10, "good behavior").await.unwrap();
        let snap = store.slash("id:web:example.com", 20, "bad behavior").await.unwrap();
        assert_eq!(snap.score, 40);
    }

    #[tokio::test]
    async fn history_is_chronological_and_bounded() {
        let store = MemoryReputationStore::new();
        for i in 0..5 {
            store
                .record_success("id:web:example.com", &format!("event-{i}"), None)
                .await
                .unwrap();
        }
        let history = store.get_history("id:web:example.com", 100).await.unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].reason, "event-0");
        assert_eq!(history[4].reason, "event-4");
    }

    #[tokio::test]
    async fn reset_returns_to_baseline() {
        let store = MemoryReputationStore::new();
        store.boost("id:web:example.com", 40, "x").await.unwrap();
        store.reset("id:web:example.com").await.unwrap();
        let snap = store.get_score("id:web:example.com").await.unwrap();
        assert_eq!(snap.score, 50);
        assert_eq!(snap.total_actions, 0);
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let store = MemoryReputationStore::new();
        store.boost("id:web:example.com", 10, "x").await.unwrap();
        store.reset("id:web:example.com").await.unwrap();
        store.reset("id:web:example.com").await.unwrap();
        let snap = store.get_score("id:web:example.com").await.unwrap();
        assert_eq!(snap.score, 50);
    }

    #[tokio::test]
    async fn score_never_leaves_valid_range_under_a_long_mixed_sequence() {
        let store = MemoryReputationStore::new();
        let ops: &[i32] = &[1, -2, -2, -2, 10, -20, 1, 1, 1, -2, 30, -40];
        for (i, delta) in ops.iter().enumerate() {
            let snap = if *delta >= 0 {
                store.boost("id:web:example.com", *delta, "op").await.unwrap()
            } else {
                store.slash("id:web:example.com", -delta, "op").await.unwrap()
            };
            assert!(snap.score <= 100, "iteration {i} out of range: {}", snap.score);
        }
    }
}
