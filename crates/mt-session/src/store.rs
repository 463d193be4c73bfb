//! Credential storage abstraction

/// A single named slot holding a compact credential token.
///
/// The guard only reads the slot and, when the token is unusable, clears it.
pub trait CredentialStore {
    /// The stored token, if any
    fn token(&self) -> Option<&str>;

    /// Delete the stored token
    fn remove_token(&mut self);
}

/// Credential slot held in memory, e.g. a token lifted from a request cookie
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCredentialStore {
    token: Option<String>,
    removed: bool,
}

impl InMemoryCredentialStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            removed: false,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(Some(token.into()))
    }

    /// Whether `remove_token` deleted a token that was present
    pub fn was_removed(&self) -> bool {
        self.removed
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn remove_token(&mut self) {
        if self.token.take().is_some() {
            self.removed = true;
        }
    }
}
