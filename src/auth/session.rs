//! Session effect functions (thunks).
//!
//! Each function performs the I/O for one auth transition and applies the
//! matching [`AuthEvent`]s to the caller's [`AuthState`]. None of them
//! panic or propagate raw errors past their boundary: they resolve to `Ok`
//! or to `Err` carrying a user-facing message, and the state always ends in
//! a consistent shape.

use tracing::{debug, warn};

use super::state::{AuthEvent, AuthState, reduce};
use crate::api::BackendClient;
use crate::store::{KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, SessionStore};

/// Drives auth transitions against the backend and the session store.
#[derive(Debug, Clone)]
pub struct SessionManager {
    backend: BackendClient,
    store: SessionStore,
}

impl SessionManager {
    pub fn new(backend: BackendClient, store: SessionStore) -> Self {
        Self { backend, store }
    }

    /// Logs in with email and password.
    ///
    /// On success the tokens and user are persisted and the state becomes
    /// authenticated. On failure the state stays anonymous with a
    /// user-facing error message.
    pub async fn login(
        &self,
        state: &mut AuthState,
        email: &str,
        password: &str,
    ) -> Result<(), String> {
        reduce(state, AuthEvent::AttemptStarted);

        match self.backend.login(email, password).await {
            Ok(auth) => {
                self.establish(state, auth.user, auth.access_token, auth.refresh_token);
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                reduce(
                    state,
                    AuthEvent::AttemptFailed {
                        message: message.clone(),
                    },
                );
                Err(message)
            }
        }
    }

    /// Registers a new account. Same shape as login against the
    /// registration endpoint.
    pub async fn signup(
        &self,
        state: &mut AuthState,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), String> {
        reduce(state, AuthEvent::AttemptStarted);

        match self.backend.register(name, email, password).await {
            Ok(auth) => {
                self.establish(state, auth.user, auth.access_token, auth.refresh_token);
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                reduce(
                    state,
                    AuthEvent::AttemptFailed {
                        message: message.clone(),
                    },
                );
                Err(message)
            }
        }
    }

    /// Proactively rotates the token pair.
    ///
    /// Distinct from the middleware's inline refresh: this one is driven by
    /// the caller and fails with its own message when no refresh token is
    /// stored.
    pub async fn refresh(&self, state: &mut AuthState) -> Result<(), String> {
        reduce(state, AuthEvent::AttemptStarted);

        let Ok(Some(refresh_token)) = self.store.get(KEY_REFRESH_TOKEN) else {
            let message = "No refresh token available".to_string();
            reduce(
                state,
                AuthEvent::AttemptFailed {
                    message: message.clone(),
                },
            );
            return Err(message);
        };

        match self.backend.refresh(&refresh_token).await {
            Ok(pair) => {
                if let Err(e) = self.store.save_tokens(&pair.access_token, &pair.refresh_token) {
                    warn!(error = %e, "failed to persist refreshed tokens");
                }
                reduce(
                    state,
                    AuthEvent::TokensRefreshed {
                        access_token: pair.access_token,
                        refresh_token: pair.refresh_token,
                    },
                );
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                reduce(
                    state,
                    AuthEvent::AttemptFailed {
                        message: message.clone(),
                    },
                );
                Err(message)
            }
        }
    }

    /// Logs out: best-effort server invalidation, then unconditional local
    /// cleanup. Idempotent; always ends anonymous.
    pub async fn logout(&self, state: &mut AuthState) -> Result<(), String> {
        if let Ok(Some(refresh_token)) = self.store.get(KEY_REFRESH_TOKEN) {
            if let Err(e) = self.backend.logout(&refresh_token).await {
                // Logged, never surfaced: the user is logged out locally
                // regardless of the server-side outcome.
                warn!(error = %e, "server-side logout failed");
            }
        }

        if let Err(e) = self.store.clear_session() {
            warn!(error = %e, "failed to clear session store");
        }
        reduce(state, AuthEvent::SessionCleared);
        Ok(())
    }

    /// Restores a session from the store on cold start.
    ///
    /// Requires all of access token, refresh token, and user identity;
    /// otherwise the state settles anonymous. Never makes a network call.
    pub async fn check_auth_status(&self, state: &mut AuthState) -> Result<(), String> {
        reduce(state, AuthEvent::AttemptStarted);

        let access = self.store.get(KEY_ACCESS_TOKEN).unwrap_or_else(|e| {
            warn!(error = %e, "session store read failed");
            None
        });
        let refresh = self.store.get(KEY_REFRESH_TOKEN).unwrap_or_default();
        let user = self.store.load_user().unwrap_or_else(|e| {
            warn!(error = %e, "stored user info unreadable");
            None
        });

        match (access, refresh, user) {
            (Some(access), Some(refresh), Some(user)) => {
                // A previously logged-in user has necessarily passed
                // onboarding; force the flag retroactively.
                if !self.store.onboarding_completed() {
                    if let Err(e) = self.store.complete_onboarding() {
                        warn!(error = %e, "failed to persist onboarding flag");
                    }
                }
                debug!(user = %user.email, "session restored from store");
                reduce(
                    state,
                    AuthEvent::SessionEstablished {
                        user,
                        access_token: access,
                        refresh_token: refresh,
                    },
                );
                Ok(())
            }
            _ => {
                reduce(state, AuthEvent::AttemptSettled);
                Err("No stored session".to_string())
            }
        }
    }

    fn establish(&self, state: &mut AuthState, user: crate::models::User, access: String, refresh: String) {
        if let Err(e) = self.store.save_session(&access, &refresh, &user) {
            // Treated as "no persistence", not as a failed login.
            warn!(error = %e, "failed to persist session");
        }
        reduce(
            state,
            AuthEvent::SessionEstablished {
                user,
                access_token: access,
                refresh_token: refresh,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn manager(dir: &tempfile::TempDir) -> (SessionManager, SessionStore) {
        let store = SessionStore::at(dir.path().join("session.json"));
        // Port 9 (discard) is never connected to in these tests.
        let backend = BackendClient::new("http://127.0.0.1:9", store.clone());
        (SessionManager::new(backend, store.clone()), store)
    }

    /// Test: logout with no stored session completes without error and
    /// leaves the state fully anonymous.
    #[tokio::test]
    async fn test_logout_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _store) = manager(&dir);
        let mut state = AuthState::default();

        manager.logout(&mut state).await.unwrap();
        manager.logout(&mut state).await.unwrap();

        assert!(!state.is_authenticated);
        assert!(state.access_token.is_none());
        assert!(state.refresh_token.is_none());
        assert!(state.user.is_none());
    }

    /// Test: cold start with a complete stored session restores it without
    /// any network call.
    #[tokio::test]
    async fn test_check_auth_status_restores() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, store) = manager(&dir);
        let user = User {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            name: "Ada".to_string(),
        };
        store.save_session("acc", "ref", &user).unwrap();

        let mut state = AuthState::default();
        manager.check_auth_status(&mut state).await.unwrap();

        assert!(state.is_authenticated);
        assert_eq!(state.access_token.as_deref(), Some("acc"));
        assert_eq!(state.user.as_ref().unwrap().email, "a@b.com");
        // Retroactive onboarding: a restored user has seen onboarding.
        assert!(store.onboarding_completed());
    }

    /// Test: cold start with a partial session settles anonymous.
    #[tokio::test]
    async fn test_check_auth_status_partial_session() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, store) = manager(&dir);
        store.set(KEY_ACCESS_TOKEN, "acc").unwrap();

        let mut state = AuthState::default();
        assert!(manager.check_auth_status(&mut state).await.is_err());
        assert!(!state.is_authenticated);
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    /// Test: proactive refresh with no stored refresh token fails with a
    /// distinct message.
    #[tokio::test]
    async fn test_refresh_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let (manager, _store) = manager(&dir);

        let mut state = AuthState::default();
        let err = manager.refresh(&mut state).await.unwrap_err();
        assert_eq!(err, "No refresh token available");
        assert_eq!(state.error.as_deref(), Some("No refresh token available"));
    }
}
