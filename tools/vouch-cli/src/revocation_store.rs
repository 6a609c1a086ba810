//! File-backed `RevocationStore`: persists the exact
//! `.well-known/did-revocations.json` document shape to a local file, so
//! `vouch revoke`/`vouch verify` invocations share state across
//! processes without a network-reachable registry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use vouch_revocation::{RevocationDocument, RevocationRecord, RevocationStore};

pub struct FileRevocationStore {
    path: PathBuf,
    doc: Mutex<RevocationDocument>,
}

impl FileRevocationStore {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let doc = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw).unwrap_or_else(|_| empty_document())
        } else {
            empty_document()
        };
        Ok(Self {
            path: path.to_path_buf(),
            doc: Mutex::new(doc),
        })
    }

    fn persist(&self, doc: &RevocationDocument) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, json)
    }
}

fn empty_document() -> RevocationDocument {
    RevocationDocument {
        updated_at: 0,
        revocations: Vec::new(),
    }
}

#[async_trait]
impl RevocationStore for FileRevocationStore {
    async fn revoke(
        &self,
        identifier: &str,
        reason: &str,
        authority: Option<&str>,
        effective_from: Option<i64>,
        revoked_at: i64,
    ) -> vouch_revocation::Result<()> {
        let record = RevocationRecord {
            identifier: identifier.to_string(),
            revoked_at,
            reason: reason.to_string(),
            authority: authority.map(str::to_string),
            effective_from,
        };

        let snapshot = {
            let mut doc = self.doc.lock();
            doc.revocations.retain(|r| r.identifier != identifier);
            doc.revocations.push(record);
            doc.updated_at = revoked_at;
            doc.clone()
        };
        self.persist(&snapshot)
            .map_err(|e| vouch_revocation::RevocationError::StoreUnavailable(e.to_string()))
    }

    async fn reinstate(&self, identifier: &str) -> vouch_revocation::Result<()> {
        let snapshot = {
            let mut doc = self.doc.lock();
            doc.revocations.retain(|r| r.identifier != identifier);
            doc.clone()
        };
        self.persist(&snapshot)
            .map_err(|e| vouch_revocation::RevocationError::StoreUnavailable(e.to_string()))
    }

    async fn get(&self, identifier: &str) -> vouch_revocation::Result<Option<RevocationRecord>> {
        Ok(self
            .doc
            .lock()
            .revocations
            .iter()
            .find(|r| r.identifier == identifier)
            .cloned())
    }

    async fn list(&self) -> vouch_revocation::Result<Vec<RevocationRecord>> {
        Ok(self.doc.lock().revocations.clone())
    }
}
