//! Configuration defaults. Every field here has a documented default;
//! CLI and embedders override via TOML/env, never by editing these
//! constants.

use serde::{Deserialize, Serialize};

/// Signer-side knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    pub default_token_expiry: i64,
    pub max_delegation_depth: usize,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            default_token_expiry: 300,
            max_delegation_depth: 5,
        }
    }
}

/// Verifier-side knobs; also consulted by the stores it composes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub clock_skew_seconds: i64,
    pub max_token_expiry: i64,
    pub cache_max_size: usize,
    pub cache_ttl_seconds: i64,
    pub replay_max_size: usize,
    pub replay_grace_seconds: i64,
    pub resolver_timeout_seconds: u64,
    pub revocation_cache_ttl: i64,
    pub reputation_baseline: u8,
    pub reputation_decay_window_days: i64,
    pub max_delegation_depth: usize,
    pub max_concurrent_verifications: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            clock_skew_seconds: 30,
            max_token_expiry: 3600,
            cache_max_size: 10_000,
            cache_ttl_seconds: 300,
            replay_max_size: 100_000,
            replay_grace_seconds: 60,
            resolver_timeout_seconds: 10,
            revocation_cache_ttl: 300,
            reputation_baseline: 50,
            reputation_decay_window_days: 7,
            max_delegation_depth: 5,
            max_concurrent_verifications: 50,
        }
    }
}
