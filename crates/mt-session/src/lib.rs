//! Advisory session guard
//!
//! Reads a stored credential token, decodes its payload, and sends the visitor
//! to the login view when the token is absent, malformed, or expired. The check
//! is purely local and does not verify signatures.

pub mod error;
pub mod guard;
pub mod middleware;
pub mod store;

pub use error::{Result, SessionError};
pub use guard::{
    check_session, decode_payload, expiry, now_epoch_secs, RedirectReason, SessionVerdict,
};
pub use middleware::{cookie_value, require_session, SessionConfig};
pub use store::{CredentialStore, InMemoryCredentialStore};
