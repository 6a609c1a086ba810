//! Resolves a domain-anchored identifier to its current public key by
//! fetching a well-known document, mirroring did:web.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use vouch_core::{Identifier, PublicKey};

use crate::document::DidDocument;
use crate::error::{IdentityError, Result};

/// Anything that can turn an [`Identifier`] into a [`PublicKey`].
/// Pure-read: implementations must never mutate state outside their own
/// cache.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, identifier: &Identifier) -> Result<PublicKey>;
}

/// Percent-decodes a string (only the subset actually used by domain
/// segments: `%XX` escapes). Not a general URL decoder.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Builds the `https://...did.json` URL for a `web`-method identifier.
pub fn did_web_to_url(identifier: &Identifier) -> Result<String> {
    let method = identifier
        .method()
        .map_err(|e| IdentityError::MalformedDocument(e.to_string()))?;
    if method != "web" {
        return Err(IdentityError::UnsupportedMethod(method.to_string()));
    }
    let rest = identifier
        .method_specific_id()
        .map_err(|e| IdentityError::MalformedDocument(e.to_string()))?;
    let mut segments = rest.split(':');
    let domain = percent_decode(segments.next().unwrap_or_default());
    let path_parts: Vec<&str> = segments.collect();

    if path_parts.is_empty() {
        Ok(format!("https://{domain}/.well-known/did.json"))
    } else {
        Ok(format!("https://{domain}/{}/did.json", path_parts.join("/")))
    }
}

/// Fetches `did.json` over HTTPS and extracts the first Ed25519 key.
pub struct DidWebResolver {
    client: reqwest::Client,
}

impl DidWebResolver {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build identity resolver http client");
        Self { client }
    }
}

#[async_trait]
impl IdentityResolver for DidWebResolver {
    async fn resolve(&self, identifier: &Identifier) -> Result<PublicKey> {
        let url = did_web_to_url(identifier)?;
        tracing::debug!(identifier = %identifier, url = %url, "resolving identity document");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/did+json, application/json")
            .send()
            .await
            .map_err(|e| IdentityError::HttpError(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::NotFound);
        }
        if !response.status().is_success() {
            return Err(IdentityError::HttpError(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let document: DidDocument = response
            .json()
            .await
            .map_err(|e| IdentityError::MalformedDocument(e.to_string()))?;

        let method = document
            .first_ed25519_method()
            .ok_or(IdentityError::NoMatchingKey)?;

        PublicKey::from_jwk(&method.public_key_jwk)
            .map_err(|e| IdentityError::MalformedDocument(e.to_string()))
    }
}

/// In-memory resolver for tests and for embedding identifiers that are
/// trusted without network resolution.
#[derive(Default)]
pub struct StaticResolver {
    keys: HashMap<Identifier, PublicKey>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: Identifier, key: PublicKey) {
        self.keys.insert(identifier, key);
    }
}

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn resolve(&self, identifier: &Identifier) -> Result<PublicKey> {
        self.keys
            .get(identifier)
            .copied()
            .ok_or(IdentityError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_well_known_url_without_path() {
        let id = Identifier::new("id:web:example.com").unwrap();
        assert_eq!(
            did_web_to_url(&id).unwrap(),
            "https://example.com/.well-known/did.json"
        );
    }

    #[test]
    fn builds_path_scoped_url() {
        let id = Identifier::new("id:web:example.com:agents:alice").unwrap();
        assert_eq!(
            did_web_to_url(&id).unwrap(),
            "https://example.com/agents/alice/did.json"
        );
    }

    #[test]
    fn rejects_non_web_method() {
        let id = Identifier::new("id:key:zABC").unwrap();
        assert!(matches!(
            did_web_to_url(&id),
            Err(IdentityError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn decodes_percent_encoded_domain() {
        let id = Identifier::new("id:web:example.com%3A3000").unwrap();
        assert_eq!(
            did_web_to_url(&id).unwrap(),
            "https://example.com:3000/.well-known/did.json"
        );
    }

    #[tokio::test]
    async fn static_resolver_round_trips() {
        let kp = vouch_core::KeyPair::generate(None);
        let id = Identifier::new("id:web:example.com").unwrap();
        let mut resolver = StaticResolver::new();
        resolver.insert(id.clone(), kp.public_key());
        let resolved = resolver.resolve(&id).await.unwrap();
        assert_eq!(resolved, kp.public_key());
    }

    #[tokio::test]
    async fn static_resolver_misses_unknown_identifier() {
        let resolver = StaticResolver::new();
        let id = Identifier::new("id:web:unknown.example").unwrap();
        assert!(resolver.resolve(&id).await.is_err());
    }
}
