//! Token inspection and the page-load session check

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SessionError};
use crate::store::CredentialStore;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Why the guard sent the visitor to the login view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    Missing,
    Malformed,
    Expired,
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectReason::Missing => write!(f, "no credential token"),
            RedirectReason::Malformed => write!(f, "malformed credential token"),
            RedirectReason::Expired => write!(f, "expired credential token"),
        }
    }
}

/// Outcome of a session check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionVerdict {
    /// Let the page continue loading
    Continue,
    /// Navigate to the login view
    Redirect(RedirectReason),
}

impl SessionVerdict {
    pub fn is_redirect(&self) -> bool {
        matches!(self, SessionVerdict::Redirect(_))
    }
}

/// Decode the payload segment of a three-part `header.payload.signature` token.
///
/// The signature is not verified. A `null` payload is malformed since it
/// carries no claims at all.
pub fn decode_payload(token: &str) -> Result<Value> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(SessionError::Malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = segments[1];
    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))?;
    match serde_json::from_slice(&bytes)? {
        Value::Null => Err(SessionError::Malformed("payload is null".to_string())),
        payload => Ok(payload),
    }
}

/// Expiry from a decoded payload, in epoch seconds.
///
/// A missing or zero `exp` means the token never expires.
pub fn expiry(payload: &Value) -> Option<f64> {
    let exp = match payload.get("exp")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if exp == 0.0 || exp.is_nan() {
        None
    } else {
        Some(exp)
    }
}

/// Run the page-load check against `store`.
///
/// A token that cannot be decoded or has expired is deleted from the store.
pub fn check_session(store: &mut dyn CredentialStore, now_epoch_secs: f64) -> SessionVerdict {
    let Some(token) = store.token() else {
        tracing::debug!("No credential token stored");
        return SessionVerdict::Redirect(RedirectReason::Missing);
    };

    let payload = match decode_payload(token) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("Discarding credential token: {}", e);
            store.remove_token();
            return SessionVerdict::Redirect(RedirectReason::Malformed);
        }
    };

    if let Some(exp) = expiry(&payload) {
        if now_epoch_secs > exp {
            tracing::debug!("Credential token expired at {} (now {})", exp, now_epoch_secs);
            store.remove_token();
            return SessionVerdict::Redirect(RedirectReason::Expired);
        }
    }

    SessionVerdict::Continue
}

/// Current wall-clock time in fractional epoch seconds
pub fn now_epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
