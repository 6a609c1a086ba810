//! `RevocationRecord` and the wire shape of
//! `.well-known/did-revocations.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevocationRecord {
    #[serde(rename = "did")]
    pub identifier: String,
    pub revoked_at: i64,
    pub reason: String,
    #[serde(rename = "revoked_by", skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<i64>,
}

impl RevocationRecord {
    /// Whether this record is already in effect at `now`.
    pub fn is_effective(&self, now: i64) -> bool {
        match self.effective_from {
            Some(from) => from <= now,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationDocument {
    pub updated_at: i64,
    pub revocations: Vec<RevocationRecord>,
}
