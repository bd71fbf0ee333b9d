//! Session holder shared by the request layer and the route guards.
//!
//! The context starts `Uninitialized`, and `load()` resolves it to either
//! `Authenticated` or `Anonymous` from session storage. Until then consumers
//! must treat the session as unknown.

pub mod claims;
pub mod storage;

use std::io;
use std::sync::RwLock;

use tracing::{debug, info, warn};

pub use claims::{inspect, TokenClaims, TokenStatus};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};

use crate::guard::Route;

pub const DEFAULT_STORAGE_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Uninitialized,
    Loading,
    Authenticated(String),
    Anonymous,
}

/// Point-in-time view of the session, as guards see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub token: Option<String>,
    pub is_loading: bool,
}

impl AuthSnapshot {
    pub fn loading() -> Self {
        Self { token: None, is_loading: true }
    }

    pub fn anonymous() -> Self {
        Self { token: None, is_loading: false }
    }

    pub fn authenticated(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()), is_loading: false }
    }
}

pub struct AuthContext {
    storage: Box<dyn SessionStorage>,
    storage_key: String,
    validate_expiry: bool,
    state: RwLock<AuthState>,
}

impl AuthContext {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            validate_expiry: true,
            state: RwLock::new(AuthState::Uninitialized),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_expiry_validation(mut self, enabled: bool) -> Self {
        self.validate_expiry = enabled;
        self
    }

    pub fn state(&self) -> AuthState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_state(&self, state: AuthState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Current token; `None` while loading or anonymous
    pub fn token(&self) -> Option<String> {
        match &*self.state.read().unwrap_or_else(|e| e.into_inner()) {
            AuthState::Authenticated(token) => Some(token.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state(), AuthState::Uninitialized | AuthState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), AuthState::Authenticated(_))
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        match self.state() {
            AuthState::Uninitialized | AuthState::Loading => AuthSnapshot::loading(),
            AuthState::Authenticated(token) => AuthSnapshot::authenticated(token),
            AuthState::Anonymous => AuthSnapshot::anonymous(),
        }
    }

    /// Resolve the session from storage. Storage failures and expired tokens
    /// both resolve to `Anonymous`.
    pub fn load(&self) -> AuthSnapshot {
        self.set_state(AuthState::Loading);

        let stored = match self.storage.get(&self.storage_key) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!("Failed to read session storage: {}", e);
                None
            }
        };

        let state = match stored {
            Some(token) if self.validate_expiry && inspect(&token) == TokenStatus::Expired => {
                warn!("Stored session token has expired; discarding it");
                if let Err(e) = self.storage.remove(&self.storage_key) {
                    warn!("Failed to clear expired token: {}", e);
                }
                AuthState::Anonymous
            }
            Some(token) => AuthState::Authenticated(token),
            None => AuthState::Anonymous,
        };

        debug!("session resolved: authenticated={}", matches!(state, AuthState::Authenticated(_)));
        self.set_state(state);
        self.snapshot()
    }

    /// Persist the token and mark the session authenticated
    pub fn login(&self, token: &str) -> io::Result<()> {
        self.storage.set(&self.storage_key, token)?;
        self.set_state(AuthState::Authenticated(token.to_string()));
        info!("Session started");
        Ok(())
    }

    /// Clear the persisted token; returns where the user is sent next
    pub fn logout(&self) -> io::Result<Route> {
        self.storage.remove(&self.storage_key)?;
        self.set_state(AuthState::Anonymous);
        info!("Session ended");
        Ok(Route::Login)
    }

    /// Claims of the current token, if it is a readable JWT
    pub fn claims(&self) -> Option<TokenClaims> {
        match inspect(&self.token()?) {
            TokenStatus::Valid(claims) => Some(claims),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uninitialized_and_loading() {
        let auth = AuthContext::new(MemorySessionStorage::new());
        assert_eq!(auth.state(), AuthState::Uninitialized);
        assert!(auth.is_loading());
        assert_eq!(auth.snapshot(), AuthSnapshot::loading());
        assert_eq!(auth.token(), None);
    }

    #[test]
    fn load_without_token_is_anonymous() {
        let auth = AuthContext::new(MemorySessionStorage::new());
        assert_eq!(auth.load(), AuthSnapshot::anonymous());
        assert!(!auth.is_loading());
    }

    #[test]
    fn load_with_stored_token_is_authenticated() {
        let auth = AuthContext::new(MemorySessionStorage::with_entry("token", "abc"));
        assert_eq!(auth.load(), AuthSnapshot::authenticated("abc"));
        assert_eq!(auth.token().as_deref(), Some("abc"));
    }

    #[test]
    fn login_then_logout() {
        let auth = AuthContext::new(MemorySessionStorage::new());
        auth.load();
        auth.login("fresh").unwrap();
        assert!(auth.is_authenticated());

        assert_eq!(auth.logout().unwrap(), Route::Login);
        assert_eq!(auth.state(), AuthState::Anonymous);

        // Nothing left to reload
        assert_eq!(auth.load(), AuthSnapshot::anonymous());
    }

    #[test]
    fn custom_storage_key_is_used() {
        let auth = AuthContext::new(MemorySessionStorage::with_entry("gym_token", "k"))
            .with_storage_key("gym_token");
        assert_eq!(auth.load().token.as_deref(), Some("k"));
    }
}
