//! Domain-anchored agent identifiers: `id:<method>:<domain>[:<path>]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VouchError};

/// A stable name for an agent, rooted at a domain under its control.
/// The core only resolves the `web` method; other methods parse but are
/// rejected at resolution time with `UnresolvableIdentifier`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let id = Self(raw);
        id.method()?;
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The method segment, e.g. `web` for `id:web:example.com`.
    pub fn method(&self) -> Result<&str> {
        let mut parts = self.0.splitn(3, ':');
        let scheme = parts.next().unwrap_or_default();
        let method = parts.next();
        if scheme != "id" || method.is_none() {
            return Err(VouchError::MalformedToken(format!(
                "not a valid identifier: {}",
                self.0
            )));
        }
        Ok(method.unwrap())
    }

    /// Everything after `id:<method>:`, i.e. `<domain>[:<path>]`.
    pub fn method_specific_id(&self) -> Result<&str> {
        let prefix_len = self.0.find(':').map(|i| i + 1).unwrap_or(0);
        let rest = &self.0[prefix_len..];
        let rest_prefix_len = rest.find(':').map(|i| i + 1).unwrap_or(rest.len());
        if rest_prefix_len >= rest.len() && !rest.contains(':') {
            return Err(VouchError::MalformedToken(format!(
                "identifier missing method-specific-id: {}",
                self.0
            )));
        }
        Ok(&rest[rest_prefix_len..])
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = VouchError;
    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = VouchError;
    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}
