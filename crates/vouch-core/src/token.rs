//! Claim construction and the three-part compact token wire format:
//! `base64url(header) "." base64url(claims) "." base64url(sig)`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::canonical_json;
use crate::error::{Result, VouchError};

pub const PROTOCOL_VERSION: &str = "1.0";
pub const MAX_DELEGATION_DEPTH: usize = 5;

pub fn base64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn base64url_decode(s: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| VouchError::MalformedToken(format!("invalid base64url: {e}")))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Fixed protected header. `kid` is a hint only; verification always
/// validates against the resolved key, never trusts `kid` blindly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    pub kid: String,
    pub typ: String,
}

impl Header {
    pub fn new(kid: impl Into<String>) -> Self {
        Self {
            alg: "EdDSA".to_string(),
            kid: kid.into(),
            typ: "vouch+jwt".to_string(),
        }
    }
}

/// One link of a delegation chain: proof that `issuer` granted `subject`
/// the authority exercised under `intent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelegationLink {
    pub iss: String,
    pub sub: String,
    pub intent: String,
    pub iat: i64,
    pub signature: String,
}

/// The vouch-specific envelope nested under `claims.vouch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VouchEnvelope {
    pub version: String,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reputation_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation_chain: Option<Vec<DelegationLink>>,
}

/// The full claim set, frozen after signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub jti: String,
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub vouch: VouchEnvelope,
}

impl Claims {
    pub fn delegation_depth(&self) -> usize {
        self.vouch
            .delegation_chain
            .as_ref()
            .map(|c| c.len())
            .unwrap_or(0)
    }
}

/// A parsed, not-yet-verified three-part token.
#[derive(Debug, Clone)]
pub struct Token {
    pub header: Header,
    pub claims: Claims,
    pub signature: Vec<u8>,
    /// The original `header.claims` section, exactly as received, which is
    /// what the signature actually covers. Re-deriving this from the
    /// parsed structs would silently accept tokens whose JSON was
    /// re-ordered or re-whitespaced after signing.
    pub signed_part: String,
    pub raw: String,
}

impl Token {
    /// Builds the `header.claims` signable string and signs it, producing
    /// the full three-part token.
    pub fn encode(header: &Header, claims: &Claims, sign: impl FnOnce(&[u8]) -> Vec<u8>) -> Result<String> {
        let header_json = canonical_json(header)?;
        let claims_json = canonical_json(claims)?;
        let signed_part = format!(
            "{}.{}",
            base64url_encode(header_json.as_bytes()),
            base64url_encode(claims_json.as_bytes())
        );
        let signature = sign(signed_part.as_bytes());
        Ok(format!("{}.{}", signed_part, base64url_encode(&signature)))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() != 3 {
            return Err(VouchError::MalformedToken(format!(
                "expected 3 parts, found {}",
                parts.len()
            )));
        }
        let header_bytes = base64url_decode(parts[0])?;
        let claims_bytes = base64url_decode(parts[1])?;
        let signature = base64url_decode(parts[2])?;

        let header: Header = serde_json::from_slice(&header_bytes)
            .map_err(|e| VouchError::MalformedToken(format!("invalid header: {e}")))?;
        let claims: Claims = serde_json::from_slice(&claims_bytes)
            .map_err(|e| VouchError::MalformedToken(format!("invalid claims: {e}")))?;

        let signed_part = format!("{}.{}", parts[0], parts[1]);

        Ok(Self {
            header,
            claims,
            signature,
            signed_part,
            raw: raw.to_string(),
        })
    }
}

/// Decoded, validated claims surfaced by the Verifier. Short-lived: built
/// fresh per `verify`/`check_vouch` call, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passport {
    pub token_id: String,
    pub issuer: String,
    pub subject: String,
    pub issued_at: i64,
    pub not_before: i64,
    pub expires_at: i64,
    pub payload: serde_json::Value,
    pub reputation_score: Option<u8>,
    pub delegation_chain: Vec<DelegationLink>,
}

impl From<Claims> for Passport {
    fn from(c: Claims) -> Self {
        Self {
            token_id: c.jti,
            issuer: c.iss,
            subject: c.sub,
            issued_at: c.iat,
            not_before: c.nbf,
            expires_at: c.exp,
            payload: c.vouch.payload,
            reputation_score: c.vouch.reputation_score,
            delegation_chain: c.vouch.delegation_chain.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> Claims {
        Claims {
            jti: "abc".into(),
            iss: "id:web:example.com".into(),
            sub: "id:web:example.com".into(),
            iat: 1000,
            nbf: 1000,
            exp: 1300,
            vouch: VouchEnvelope {
                version: PROTOCOL_VERSION.to_string(),
                payload: serde_json::json!({"action": "read"}),
                reputation_score: None,
                delegation_chain: None,
            },
        }
    }

    #[test]
    fn encode_then_parse_preserves_signed_part() {
        let header = Header::new("id:web:example.com");
        let claims = sample_claims();
        let raw = Token::encode(&header, &claims, |msg| msg.to_vec()).unwrap();
        let parsed = Token::parse(&raw).unwrap();
        assert_eq!(parsed.claims.jti, "abc");
        assert_eq!(parsed.header.alg, "EdDSA");
    }

    #[test]
    fn rejects_wrong_part_count() {
        assert!(Token::parse("a.b").is_err());
        assert!(Token::parse("a.b.c.d").is_err());
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(Token::parse("not base64!.b.c").is_err());
    }

    #[test]
    fn base64url_roundtrip_is_a_no_op() {
        let bytes = b"hello world, vouch";
        let encoded = base64url_encode(bytes);
        let decoded = base64url_decode(&encoded).unwrap();
        assert_eq!(decoded, bytes);
    }
}
