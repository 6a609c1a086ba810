//! On-disk keypair format: a small JSON document carrying the Ed25519
//! secret key and its bound identifier, written with owner-only
//! permissions.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vouch_core::{base64url_decode, base64url_encode, Identifier, KeyPair};

#[derive(Serialize, Deserialize)]
struct KeyFile {
    identifier: Option<String>,
    secret_key: String,
}

pub fn save(path: &Path, keypair: &KeyPair) -> Result<()> {
    let doc = KeyFile {
        identifier: keypair.identifier().map(|id| id.to_string()),
        secret_key: base64url_encode(&keypair.secret_bytes()),
    };
    let json = serde_json::to_string_pretty(&doc)?;
    write_secret_file(path, json.as_bytes())
        .with_context(|| format!("failed to write key file: {}", path.display()))
}

pub fn load(path: &Path) -> Result<KeyPair> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file: {}", path.display()))?;
    let doc: KeyFile = serde_json::from_str(&raw)
        .with_context(|| format!("key file is not valid JSON: {}", path.display()))?;

    let bytes = base64url_decode(&doc.secret_key).context("invalid secret key encoding")?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("secret key must be 32 bytes"))?;
    let identifier = doc
        .identifier
        .map(Identifier::new)
        .transpose()
        .context("key file has an invalid identifier")?;

    Ok(KeyPair::from_bytes(&bytes, identifier))
}

/// Writes a file with restrictive permissions (0o600 on Unix), avoiding
/// the TOCTOU window of write() followed by set_permissions().
fn write_secret_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(data)?;
    }
    #[cfg(not(unix))]
    {
        std::fs::write(path, data)?;
    }
    Ok(())
}
