//! The signed-in identity of a session.
//!
//! Authentication itself happens upstream; this module only tracks which
//! identity the current session acts for and notifies listeners when it
//! changes.

use std::fmt;

use tokio::sync::watch;

const MAX_IDENTITY_LEN: usize = 128;

/// An authenticated principal. Used as a path segment in both stores, so it
/// is restricted to ASCII letters, digits, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= MAX_IDENTITY_LEN
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        valid.then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Root of everything this identity owns.
    pub fn namespace(&self) -> String {
        format!("users/{}", self.0)
    }

    pub fn stories_collection(&self) -> String {
        format!("{}/stories", self.namespace())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub struct AuthSession {
    state: watch::Sender<Option<Identity>>,
}

impl AuthSession {
    pub fn new(initial: Option<Identity>) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    pub fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    /// Signing in again as the current identity notifies nobody.
    pub fn sign_in(&self, identity: Identity) {
        let changed = self.state.send_if_modified(|current| {
            if current.as_ref() == Some(&identity) {
                return false;
            }
            *current = Some(identity.clone());
            true
        });
        if changed {
            tracing::info!(identity = %identity, "session signed in");
        }
    }

    pub fn sign_out(&self) {
        let mut previous = None;
        self.state.send_if_modified(|current| {
            previous = current.take();
            previous.is_some()
        });
        if let Some(previous) = previous {
            tracing::info!(identity = %previous, "session signed out");
        }
    }

    /// Receives every identity change from now on.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new(None)
    }
}
