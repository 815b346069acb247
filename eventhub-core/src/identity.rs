use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// The signed-in user, as far as the client knows it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

/// Holds the bearer token and cached user between calls.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn user(&self) -> Option<UserIdentity>;

    /// Replaces the token. The cached user is replaced too, even with `None`.
    fn store(&self, token: String, user: Option<UserIdentity>);

    fn set_user(&self, user: UserIdentity);

    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<UserIdentity>,
}

/// Process-local session. Nothing is written to disk.
#[derive(Debug, Default)]
pub struct InMemorySession {
    state: RwLock<SessionState>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.store(token.into(), None);
        session
    }
}

impl SessionStore for InMemorySession {
    fn token(&self) -> Option<String> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    fn user(&self) -> Option<UserIdentity> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        // A user without a token is stale.
        state.token.as_ref().and(state.user.clone())
    }

    fn store(&self, token: String, user: Option<UserIdentity>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = Some(token);
        state.user = user;
    }

    fn set_user(&self, user: UserIdentity) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).user = Some(user);
    }

    fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = None;
        state.user = None;
        tracing::debug!("Session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> UserIdentity {
        UserIdentity {
            id: "u-1".to_string(),
            email: "jane@example.com".to_string(),
            name: Some("Jane Roe".to_string()),
            user_type: Some("CUSTOMER".to_string()),
            is_verified: true,
        }
    }

    #[test]
    fn test_session_lifecycle() {
        let session = InMemorySession::new();
        assert!(!session.is_authenticated());

        session.store("tok-1".to_string(), Some(jane()));
        assert_eq!(session.token().as_deref(), Some("tok-1"));
        assert_eq!(session.user(), Some(jane()));

        session.clear();
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_user_without_token_is_hidden() {
        let session = InMemorySession::new();
        session.set_user(jane());
        assert!(session.user().is_none());
    }
}
