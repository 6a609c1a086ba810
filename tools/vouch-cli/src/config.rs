//! TOML-backed CLI configuration: where state files live and which
//! signer/verifier defaults to apply when a command doesn't override them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vouch_core::{SignerConfig, VerifierConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub signer: SignerConfig,
    pub verifier: VerifierConfig,
    pub revocation_file: PathBuf,
    pub reputation_file: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            signer: SignerConfig::default(),
            verifier: VerifierConfig::default(),
            revocation_file: default_state_dir().join("revocations.json"),
            reputation_file: default_state_dir().join("reputation.json"),
        }
    }
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_file(),
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse config file: {}", path.display()))
    }
}

fn default_state_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vouch")
}

pub fn default_config_file() -> PathBuf {
    default_state_dir().join("config.toml")
}
