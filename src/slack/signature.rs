//! Slack request signature verification.
//!
//! Slack signs every Events API request with the app's signing secret:
//! `X-Slack-Signature: v0=<hex(HMAC-SHA256(secret, "v0:<timestamp>:<body>"))>`
//! alongside `X-Slack-Request-Timestamp`. Requests older than five minutes
//! are rejected to limit replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::error::SignatureError;

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme version prefix.
const VERSION: &str = "v0";

/// Maximum accepted request age in seconds.
const MAX_AGE_SECS: i64 = 60 * 5;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Verifies Slack request signatures with the app's signing secret.
#[derive(Clone)]
pub struct SlackVerifier {
    secret: String,
}

impl SlackVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Compute the `v0=...` signature for a timestamp and body.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> String {
        let mac = self.mac(timestamp, body);
        format!("{}={}", VERSION, hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify a request against the current time.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        self.verify_at(timestamp, signature, body, chrono::Utc::now().timestamp())
    }

    /// Verify a request as of `now` (unix seconds).
    pub fn verify_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

        let ts: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;
        if ts < now - MAX_AGE_SECS {
            return Err(SignatureError::Stale { timestamp: ts, now });
        }

        let expected = signature
            .strip_prefix(VERSION)
            .and_then(|s| s.strip_prefix('='))
            .and_then(|hex_sig| hex::decode(hex_sig).ok())
            .ok_or(SignatureError::Mismatch)?;

        // Constant-time comparison.
        self.mac(timestamp, body)
            .verify_slice(&expected)
            .map_err(|_| SignatureError::Mismatch)
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        mac
    }
}

impl std::fmt::Debug for SlackVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Example from Slack's "Verifying requests from Slack" guide.
    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const TIMESTAMP: &str = "1531420618";
    const BODY: &str = "token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
    const SIGNATURE: &str = "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503";

    fn now() -> i64 {
        TIMESTAMP.parse::<i64>().unwrap() + 10
    }

    #[test]
    fn test_sign_matches_slack_example() {
        let verifier = SlackVerifier::new(SECRET);
        assert_eq!(verifier.sign(TIMESTAMP, BODY.as_bytes()), SIGNATURE);
    }

    #[test]
    fn test_valid_signature_accepted() {
        let verifier = SlackVerifier::new(SECRET);
        let result = verifier.verify_at(Some(TIMESTAMP), Some(SIGNATURE), BODY.as_bytes(), now());
        tokio_test::assert_ok!(result);
    }

    #[test]
    fn test_tampered_body_rejected() {
        let verifier = SlackVerifier::new(SECRET);
        let body = BODY.replace("roadrunner", "coyote");
        let result = verifier.verify_at(Some(TIMESTAMP), Some(SIGNATURE), body.as_bytes(), now());
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = SlackVerifier::new("another-secret");
        let result = verifier.verify_at(Some(TIMESTAMP), Some(SIGNATURE), BODY.as_bytes(), now());
        assert_eq!(result, Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let verifier = SlackVerifier::new(SECRET);
        for signature in ["a2114d57", "v1=a2114d57", "v0=not-hex", ""] {
            let result =
                verifier.verify_at(Some(TIMESTAMP), Some(signature), BODY.as_bytes(), now());
            assert_eq!(result, Err(SignatureError::Mismatch), "signature {:?}", signature);
        }
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let verifier = SlackVerifier::new(SECRET);
        let later = TIMESTAMP.parse::<i64>().unwrap() + MAX_AGE_SECS + 1;
        let result = verifier.verify_at(Some(TIMESTAMP), Some(SIGNATURE), BODY.as_bytes(), later);
        assert!(matches!(result, Err(SignatureError::Stale { .. })));
    }

    #[test]
    fn test_missing_headers_rejected() {
        let verifier = SlackVerifier::new(SECRET);
        assert_eq!(
            verifier.verify_at(None, Some(SIGNATURE), BODY.as_bytes(), now()),
            Err(SignatureError::MissingHeader(TIMESTAMP_HEADER))
        );
        assert_eq!(
            verifier.verify_at(Some(TIMESTAMP), None, BODY.as_bytes(), now()),
            Err(SignatureError::MissingHeader(SIGNATURE_HEADER))
        );
        assert!(matches!(
            verifier.verify_at(Some("yesterday"), Some(SIGNATURE), BODY.as_bytes(), now()),
            Err(SignatureError::InvalidTimestamp(_))
        ));
    }
}
