//! Slack request signature verification.
//!
//! Every request to the events endpoint carries `X-Slack-Signature`
//! (`v0=<hex hmac-sha256>`) and `X-Slack-Request-Timestamp`. The signed base
//! string is `v0:<timestamp>:<body>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{SlackError, SlackResult};

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed clock skew between Slack and us, in seconds. Requests
/// older than this are rejected to blunt replay.
const MAX_TIMESTAMP_SKEW_SECS: i64 = 300;

/// Verify a request signature against the signing secret.
///
/// `now_epoch_secs` is passed in so callers (and tests) control the clock.
pub fn verify_signature(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now_epoch_secs: i64,
) -> SlackResult<()> {
    let ts: i64 = timestamp.parse().map_err(|_| {
        SlackError::SignatureVerification("invalid timestamp header".to_string())
    })?;

    if (now_epoch_secs - ts).abs() > MAX_TIMESTAMP_SKEW_SECS {
        return Err(SlackError::SignatureVerification(
            "request timestamp outside allowed window".to_string(),
        ));
    }

    let provided = signature.strip_prefix("v0=").ok_or_else(|| {
        SlackError::SignatureVerification("unexpected signature version".to_string())
    })?;
    let provided = hex::decode(provided).map_err(|_| {
        SlackError::SignatureVerification("signature is not valid hex".to_string())
    })?;

    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .map_err(|e| SlackError::SignatureVerification(e.to_string()))?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);

    mac.verify_slice(&provided)
        .map_err(|_| SlackError::SignatureVerification("signature mismatch".to_string()))
}
