//! Read-only remote revocation source: fetches
//! `https://<domain>/.well-known/did-revocations.json`, per-domain TTL
//! cached.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use vouch_core::{Clock, SystemClock};

use crate::error::{RevocationError, Result};
use crate::record::{RevocationDocument, RevocationRecord};

pub const DEFAULT_CACHE_TTL_SECONDS: i64 = 300;

struct CachedEntry {
    fetched_at: i64,
    records: Vec<RevocationRecord>,
}

pub struct RemoteRevocationStore {
    client: reqwest::Client,
    cache: RwLock<HashMap<String, CachedEntry>>,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl RemoteRevocationStore {
    pub fn new(timeout: Duration, ttl_seconds: i64) -> Self {
        Self::with_clock(timeout, ttl_seconds, Arc::new(SystemClock))
    }

    pub fn with_clock(timeout: Duration, ttl_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build revocation fetch http client");
        Self {
            client,
            cache: RwLock::new(HashMap::new()),
            ttl_seconds,
            clock,
        }
    }

    /// Domain portion of a `id:web:<domain>[:<path>]` identifier.
    pub fn domain_of(identifier: &str) -> Option<&str> {
        let mut parts = identifier.splitn(3, ':');
        let scheme = parts.next()?;
        let method = parts.next()?;
        if scheme != "id" || method != "web" {
            return None;
        }
        let rest = parts.next()?;
        Some(rest.split(':').next().unwrap_or(rest))
    }

    async fn records_for_domain(&self, domain: &str) -> Result<Vec<RevocationRecord>> {
        let now = self.clock.now_unix();
        if let Some(entry) = self.cache.read().get(domain) {
            if now - entry.fetched_at <= self.ttl_seconds {
                return Ok(entry.records.clone());
            }
        }

        let url = format!("https://{domain}/.well-known/did-revocations.json");
        let response = self.client.get(&url).send().await.map_err(|e| {
            RevocationError::RemoteFetchFailed {
                domain: domain.to_string(),
                reason: e.to_string(),
            }
        })?;

        let records = if response.status() == reqwest::StatusCode::NOT_FOUND {
            Vec::new()
        } else if !response.status().is_success() {
            return Err(RevocationError::RemoteFetchFailed {
                domain: domain.to_string(),
                reason: format!("unexpected status {}", response.status()),
            });
        } else {
            let document: RevocationDocument =
                response.json().await.map_err(|e| RevocationError::RemoteFetchFailed {
                    domain: domain.to_string(),
                    reason: e.to_string(),
                })?;
            document.revocations
        };

        self.cache.write().insert(
            domain.to_string(),
            CachedEntry {
                fetched_at: now,
                records: records.clone(),
            },
        );
        Ok(records)
    }

    /// Whether `identifier` appears revoked-and-effective in its domain's
    /// published revocation document. Propagates fetch failures to the
    /// caller so the registry can apply its fail-open policy.
    pub async fn is_revoked(&self, identifier: &str, now: i64) -> Result<bool> {
        let Some(domain) = Self::domain_of(identifier) else {
            return Ok(false);
        };
        let records = self.records_for_domain(domain).await?;
        Ok(records
            .iter()
            .any(|r| r.identifier == identifier && r.is_effective(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_domain_from_web_identifier() {
        assert_eq!(
            RemoteRevocationStore::domain_of("id:web:example.com"),
            Some("example.com")
        );
        assert_eq!(
            RemoteRevocationStore::domain_of("id:web:example.com:agents:alice"),
            Some("example.com")
        );
    }

    #[test]
    fn non_web_identifiers_have_no_domain() {
        assert_eq!(RemoteRevocationStore::domain_of("id:key:zABC"), None);
    }
}
