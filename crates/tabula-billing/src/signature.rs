//! # Webhook Signatures
//!
//! Verifies Stripe-style signed webhook deliveries.
//!
//! ## Header Format
//! ```text
//! Stripe-Signature: t=1767225600,v1=5257a869e7ec...,v1=9f1c...
//!                   │            └── hex HMAC-SHA256(secret, "{t}.{raw body}")
//!                   └── unix seconds when the delivery was signed
//! ```
//!
//! Several `v1` entries may be present while a secret is being rolled; any
//! one matching is enough. Comparison is constant-time.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum distance between the signed timestamp and now.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Why a delivery was not accepted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing webhook signature header")]
    MissingHeader,

    #[error("malformed webhook signature header: {0}")]
    Malformed(String),

    #[error("webhook signature mismatch")]
    Mismatch,

    #[error("webhook timestamp outside tolerance ({age_secs}s)")]
    Stale { age_secs: i64 },
}

/// Checks deliveries against one shared secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance: Duration,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        WebhookVerifier {
            secret: secret.into(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Verifies `payload` against `header` using the system clock.
    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// Verifies `payload` against `header` as of `now` (unix seconds).
    pub fn verify_at(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: i64,
    ) -> Result<(), SignatureError> {
        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(SignatureError::MissingHeader)?;

        let parsed = parse_header(header)?;

        let mac = signed_mac(&self.secret, parsed.timestamp, payload)?;
        let matched = parsed
            .signatures
            .iter()
            .filter_map(|sig| hex::decode(sig).ok())
            .any(|bytes| mac.clone().verify_slice(&bytes).is_ok());
        if !matched {
            return Err(SignatureError::Mismatch);
        }

        let age_secs = now - parsed.timestamp;
        if age_secs.unsigned_abs() > self.tolerance.as_secs() {
            return Err(SignatureError::Stale { age_secs });
        }

        Ok(())
    }
}

struct ParsedHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<ParsedHeader<'_>, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                let ts = value
                    .parse::<i64>()
                    .map_err(|_| SignatureError::Malformed(format!("bad timestamp {value:?}")))?;
                timestamp = Some(ts);
            }
            "v1" => signatures.push(value),
            // v0 and future schemes are ignored
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| SignatureError::Malformed("no timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed("no v1 signature".to_string()));
    }

    Ok(ParsedHeader {
        timestamp,
        signatures,
    })
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SignatureError::Malformed(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Produces a signature header for `payload` as the processor would.
///
/// ## Example
/// ```rust
/// use tabula_billing::signature::{sign_payload, WebhookVerifier};
///
/// let header = sign_payload("whsec_test", 1_767_225_600, b"{}").unwrap();
/// let verifier = WebhookVerifier::new("whsec_test");
/// assert!(verifier.verify_at(b"{}", Some(&header), 1_767_225_610).is_ok());
/// ```
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let signature = signed_mac(secret, timestamp, payload)?.finalize().into_bytes();
    Ok(format!("t={timestamp},v1={}", hex::encode(signature)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_767_225_600;
    const BODY: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SECRET)
    }

    #[test]
    fn test_valid_signature() {
        let header = sign_payload(SECRET, NOW, BODY).unwrap();
        assert_eq!(verifier().verify_at(BODY, Some(&header), NOW), Ok(()));
    }

    #[test]
    fn test_header_shape() {
        // 32-byte MAC, hex encoded
        let header = sign_payload("key", 1, b"x").unwrap();
        assert!(header.starts_with("t=1,v1="));
        assert_eq!(header.len(), "t=1,v1=".len() + 64);
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            verifier().verify_at(BODY, None, NOW),
            Err(SignatureError::MissingHeader)
        );
        assert_eq!(
            verifier().verify_at(BODY, Some("  "), NOW),
            Err(SignatureError::MissingHeader)
        );
    }

    #[test]
    fn test_malformed_header() {
        let v = verifier();
        assert!(matches!(
            v.verify_at(BODY, Some("v1=abcd"), NOW),
            Err(SignatureError::Malformed(_))
        ));
        assert!(matches!(
            v.verify_at(BODY, Some("t=1767225600"), NOW),
            Err(SignatureError::Malformed(_))
        ));
        assert!(matches!(
            v.verify_at(BODY, Some("t=soon,v1=abcd"), NOW),
            Err(SignatureError::Malformed(_))
        ));
    }

    #[test]
    fn test_tampered_payload_or_wrong_secret() {
        let header = sign_payload(SECRET, NOW, BODY).unwrap();
        assert_eq!(
            verifier().verify_at(b"{\"type\":\"other\"}", Some(&header), NOW),
            Err(SignatureError::Mismatch)
        );

        let forged = sign_payload("whsec_other", NOW, BODY).unwrap();
        assert_eq!(
            verifier().verify_at(BODY, Some(&forged), NOW),
            Err(SignatureError::Mismatch)
        );

        assert_eq!(
            verifier().verify_at(BODY, Some("t=1767225600,v1=not-hex"), NOW),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_any_v1_entry_may_match() {
        let good = sign_payload(SECRET, NOW, BODY).unwrap();
        let good_sig = good.split_once(",v1=").unwrap().1;
        let header = format!("t={NOW},v1={},v1={good_sig},v0=ignored", "0".repeat(64));
        assert_eq!(verifier().verify_at(BODY, Some(&header), NOW), Ok(()));
    }

    #[test]
    fn test_timestamp_tolerance() {
        let header = sign_payload(SECRET, NOW, BODY).unwrap();
        let v = verifier();

        assert!(v.verify_at(BODY, Some(&header), NOW + 300).is_ok());
        assert!(v.verify_at(BODY, Some(&header), NOW - 300).is_ok());
        assert_eq!(
            v.verify_at(BODY, Some(&header), NOW + 301),
            Err(SignatureError::Stale { age_secs: 301 })
        );

        let lenient = verifier().tolerance(Duration::from_secs(3600));
        assert!(lenient.verify_at(BODY, Some(&header), NOW + 301).is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        assert!(!format!("{:?}", verifier()).contains(SECRET));
    }
}
