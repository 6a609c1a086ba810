//! File-backed `ReputationStore`: mirrors `MemoryReputationStore`'s
//! scoring and decay rules but persists each identifier's score and
//! history to a local JSON file between CLI invocations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use vouch_core::clock::now_unix;
use vouch_reputation::{
    ActionType, ReputationEvent, ReputationScore, ReputationSnapshot, ReputationStore,
};

const MAX_HISTORY: usize = 1000;
const SUCCESS_DELTA: i32 = 1;
const FAILURE_DELTA: i32 = -2;
const DECAY_WINDOW_DAYS: i64 = 7;
const DECAY_RATE_PER_DAY: f64 = 1.0;

#[derive(Default, Clone, Serialize, Deserialize)]
struct Record {
    score: Option<ReputationScore>,
    history: Vec<ReputationEvent>,
}

#[derive(Default, Serialize, Deserialize)]
struct Document {
    records: HashMap<String, Record>,
}

pub struct FileReputationStore {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl FileReputationStore {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let doc = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            Document::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            doc: Mutex::new(doc),
        })
    }

    fn persist(&self, doc: &Document) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(doc)?)
    }

    fn mutate(
        &self,
        identifier: &str,
        action: ActionType,
        delta: i32,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> (ReputationSnapshot, Document) {
        let now = now_unix();
        let mut doc = self.doc.lock();
        let record = doc.records.entry(identifier.to_string()).or_default();
        let mut score = record
            .score
            .take()
            .unwrap_or_else(|| ReputationScore::baseline(identifier, now));

        score.apply_delta(delta, now);
        if action == ActionType::Success {
            score.successes += 1;
        }

        record.history.push(ReputationEvent {
            identifier: identifier.to_string(),
            action,
            delta,
            reason: reason.to_string(),
            timestamp: now,
            metadata,
        });
        while record.history.len() > MAX_HISTORY {
            record.history.remove(0);
        }

        let snapshot = score.snapshot(now, DECAY_WINDOW_DAYS, DECAY_RATE_PER_DAY);
        record.score = Some(score);
        (snapshot, Document { records: doc.records.clone() })
    }
}

#[async_trait]
impl ReputationStore for FileReputationStore {
    async fn get_score(&self, identifier: &str) -> vouch_reputation::Result<ReputationSnapshot> {
        let now = now_unix();
        let doc = self.doc.lock();
        let snapshot = match doc.records.get(identifier).and_then(|r| r.score.as_ref()) {
            Some(score) => score.snapshot(now, DECAY_WINDOW_DAYS, DECAY_RATE_PER_DAY),
            None => ReputationScore::baseline(identifier, now).snapshot(now, DECAY_WINDOW_DAYS, DECAY_RATE_PER_DAY),
        };
        Ok(snapshot)
    }

    async fn record_success(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> vouch_reputation::Result<ReputationSnapshot> {
        let (snapshot, doc) = self.mutate(identifier, ActionType::Success, SUCCESS_DELTA, reason, metadata);
        self.persist(&doc).map_err(io_err)?;
        Ok(snapshot)
    }

    async fn record_failure(
        &self,
        identifier: &str,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> vouch_reputation::Result<ReputationSnapshot> {
        let (snapshot, doc) = self.mutate(identifier, ActionType::Failure, FAILURE_DELTA, reason, metadata);
        self.persist(&doc).map_err(io_err)?;
        Ok(snapshot)
    }

    async fn boost(&self, identifier: &str, amount: i32, reason: &str) -> vouch_reputation::Result<ReputationSnapshot> {
        let (snapshot, doc) = self.mutate(identifier, ActionType::Boost, amount, reason, None);
        self.persist(&doc).map_err(io_err)?;
        Ok(snapshot)
    }

    async fn slash(&self, identifier: &str, amount: i32, reason: &str) -> vouch_reputation::Result<ReputationSnapshot> {
        let (snapshot, doc) = self.mutate(identifier, ActionType::Slash, -amount, reason, None);
        self.persist(&doc).map_err(io_err)?;
        Ok(snapshot)
    }

    async fn get_history(&self, identifier: &str, limit: usize) -> vouch_reputation::Result<Vec<ReputationEvent>> {
        let doc = self.doc.lock();
        let history = doc
            .records
            .get(identifier)
            .map(|r| r.history.clone())
            .unwrap_or_default();
        let start = history.len().saturating_sub(limit);
        Ok(history[start..].to_vec())
    }

    async fn reset(&self, identifier: &str) -> vouch_reputation::Result<()> {
        let doc_snapshot = {
            let mut doc = self.doc.lock();
            doc.records.remove(identifier);
            Document { records: doc.records.clone() }
        };
        self.persist(&doc_snapshot).map_err(io_err)
    }
}

fn io_err(e: std::io::Error) -> vouch_reputation::ReputationError {
    vouch_reputation::ReputationError::StoreUnavailable(e.to_string())
}
