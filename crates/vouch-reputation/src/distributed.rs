//! Redis-backed reputation store, sized for high-volume reads. Score
//! and bounded history are stored as JSON under namespaced keys.

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::error::{watch, ReputationError, Result};
use crate::event::{ActionType, ReputationEvent};
use crate::score::{ReputationScore, ReputationSnapshot, DEFAULT_DECAY_RATE_PER_DAY, DEFAULT_DECAY_WINDOW_DAYS};
use crate::store::{ReputationStore, MAX_HISTORY};

fn score_key(identifier: &str) -> String {
    format!("vouch:reputation:score:{identifier}")
}

fn history_key(identifier: &str) -> String {
    format!("vouch:reputation:history:{identifier}")
}

pub struct DistributedReputationStore {
    conn: redis::aio::ConnectionManager,
}

impl DistributedReputationStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(watch)?;
        let conn = client.get_connection_manager().await.map_err(watch)?;
        Ok(Self { conn })
    }

    async fn load(&self, identifier: &str) -> Result<ReputationScore> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(score_key(identifier)).await.map_err(watch)?;
        match json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| ReputationError::StoreUnavailable(e.to_string())),
            None => Ok(ReputationScore::baseline(identifier, vouch_core::clock::now_unix())),
        }
    }

    async fn save(&self, score: &ReputationScore) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(score)
            .map_err(|e| ReputationError::StoreUnavailable(e.to_string()))?;
        let _: () = conn.set(score_key(&score.identifier), json).await.map_err(watch)?;
        Ok(())
    }

    async fn append_event(&self, event: &ReputationEvent) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(event)
            .map_err(|e| ReputationError::StoreUnavailable(e.to_string()))?;
        let key = history_key(&event.identifier);
        let _: () = conn.rpush(&key, json).await.map_err(watch)?;
        let _: () = conn.ltrim(&key, -(MAX_HISTORY as isize), -1).await.map_err(watch)?;
        Ok(())
    }

    async fn mutate(
        &self,
        identifier: &str,
        action: ActionType,
        delta: i32,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot> {
        let now = vouch_core::clock::now_unix();
        let mut score = self.load(identifier).await?;
        score.apply_delta(delta, now);
        if action == ActionType::Success {
            score.successes += 1;
        }
        self.save(&score).await?;
        self.append_event(&ReputationEvent {
            identifier: identifier.to_string(),
            action,
            delta,
            reason: reason.to_string(),
            timestamp: now,
            metadata,
        })
        .await?;
        Ok(score.snapshot(now, DEFAULT_DECAY_WINDOW_DAYS, DEFAULT_DECAY_RATE_PER_DAY))
    }
}

#[async_trait]
impl ReputationStore for DistributedReputationStore {
    async fn get_score(&self, identifier: &str) -> Result<ReputationSnapshot> {
        let now = vouch_core::clock::now_unix();
        let score = self.load(identifier).await?;
        Ok(score.snapshot(now, DEFAULT_DECAY_WINDOW_DAYS, DEFAULT_DECAY_RATE_PER_DAY))
    }

    async fn record_success(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot> {
        self.mutate(identifier, ActionType::Success, crate::score::SUCCESS_DELTA, reason, metadata)
            .await
    }

    async fn record_failure(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ReputationSnapshot> {
        self.mutate(identifier, ActionType::Failure, crate::score::FAILURE_DELTA, reason, metadata)
            .await
    }

    async fn boost(&self, identifier: &str, amount: i32, reason: &str) -> Result<ReputationSnapshot> {
        self.mutate(identifier, ActionType::Boost, amount, reason, None).await
    }

    async fn slash(&self, identifier: &str, amount: i32, reason: &str) -> Result<ReputationSnapshot> {
        self.mutate(identifier, ActionType::Slash, -amount, reason, None).await
    }

    async fn get_history(&self, identifier: &str, limit: usize) -> Result<Vec<ReputationEvent>> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn
            .lrange(history_key(identifier), 0, -1)
            .await
            .map_err(watch)?;
        let mut events: Vec<ReputationEvent> = raw
            .iter()
            .filter_map(|s| serde_json::from_str(s).ok())
            .collect();
        let start = events.len().saturating_sub(limit);
        Ok(events.split_off(start))
    }

    async fn reset(&self, identifier: &str) -> Result<()> {
        let now = vouch_core::clock::now_unix();
        self.save(&ReputationScore::baseline(identifier, now)).await?;
        let mut conn = self.conn.clone();
        let _: () = conn.del(history_key(identifier)).await.map_err(watch)?;
        Ok(())
    }
}
