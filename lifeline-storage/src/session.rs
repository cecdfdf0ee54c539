//! Cached current user and session.
//!
//! Thin wrappers over [`OfflineStore`] so the signed-in identity survives a
//! lost backend. In development mode a placeholder user stands in when
//! nothing has been cached yet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::OfflineStore;

pub const CURRENT_USER_KEY: &str = "current_user";
pub const CURRENT_SESSION_KEY: &str = "current_session";

/// The signed-in user, as last seen from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserProfile {
    /// Stand-in user for development builds without a backend.
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            email: "dev@localhost".to_string(),
            display_name: Some("Development User".to_string()),
            roles: vec!["developer".to_string()],
        }
    }
}

/// The active session, as last seen from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::now_v7(),
            user_id: user_id.into(),
            issued_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

pub fn cache_current_user(store: &OfflineStore, user: &UserProfile) {
    store.set(CURRENT_USER_KEY, user);
}

pub fn current_user(store: &OfflineStore) -> Option<UserProfile> {
    store.get(CURRENT_USER_KEY)
}

pub fn cache_current_session(store: &OfflineStore, session: &SessionInfo) {
    store.set(CURRENT_SESSION_KEY, session);
}

/// The cached session, unless it has passed its own expiry.
pub fn current_session(store: &OfflineStore) -> Option<SessionInfo> {
    store
        .get::<SessionInfo>(CURRENT_SESSION_KEY)
        .filter(|session| !session.is_expired(Utc::now()))
}

/// Forget the cached user and session (sign-out).
pub fn clear_session(store: &OfflineStore) {
    store.delete(CURRENT_USER_KEY);
    store.delete(CURRENT_SESSION_KEY);
}

/// The cached user. With `dev_mode`, a placeholder is created and cached
/// when nothing is there, so it stays stable across calls.
pub fn current_user_or_placeholder(store: &OfflineStore, dev_mode: bool) -> Option<UserProfile> {
    if dev_mode {
        Some(store.get_or_insert_with(CURRENT_USER_KEY, UserProfile::placeholder))
    } else {
        current_user(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lifeline_core::OfflineStoreConfig;

    fn store() -> OfflineStore {
        OfflineStore::in_memory(OfflineStoreConfig::default()).unwrap()
    }

    fn user() -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            email: "ada@example.com".to_string(),
            display_name: Some("Ada".to_string()),
            roles: vec!["admin".to_string()],
        }
    }

    #[test]
    fn test_user_and_session_round_trip() {
        let store = store();
        cache_current_user(&store, &user());
        let session = SessionInfo::new("u-1");
        cache_current_session(&store, &session);

        assert_eq!(current_user(&store), Some(user()));
        assert_eq!(current_session(&store), Some(session));

        clear_session(&store);
        assert_eq!(current_user(&store), None);
        assert_eq!(current_session(&store), None);
    }

    #[test]
    fn test_expired_session_is_hidden() {
        let store = store();
        let session = SessionInfo::new("u-1").with_expiry(Utc::now() - Duration::minutes(1));
        cache_current_session(&store, &session);
        assert_eq!(current_session(&store), None);
    }

    #[test]
    fn test_placeholder_only_in_dev_mode() {
        let store = store();
        assert_eq!(current_user_or_placeholder(&store, false), None);

        let first = current_user_or_placeholder(&store, true).unwrap();
        let second = current_user_or_placeholder(&store, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.email, "dev@localhost");
    }

    #[test]
    fn test_cached_user_wins_over_placeholder() {
        let store = store();
        cache_current_user(&store, &user());
        assert_eq!(current_user_or_placeholder(&store, true), Some(user()));
    }
}
