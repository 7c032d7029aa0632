//! Authentication state and its pure reducer.
//!
//! The reducer only mutates state; all I/O lives in [`crate::auth::session`].
//! Every transition that clears tokens also clears `is_authenticated` in the
//! same step, so `is_authenticated == true` always implies a present access
//! token.

use crate::models::User;

/// In-memory authentication state mirrored from the session store.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    /// True while a transition (login/signup/refresh/restore) is in flight.
    pub loading: bool,
    /// User-facing message from the last failed attempt.
    pub error: Option<String>,
}

impl AuthState {
    /// Guest mode: browsing without a session. In-memory only, never
    /// persisted.
    pub fn is_guest(&self) -> bool {
        !self.is_authenticated
    }
}

/// Events applied to [`AuthState`] by the effect functions.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A new attempt started; clears any previous error.
    AttemptStarted,
    /// Login/signup/restore succeeded.
    SessionEstablished {
        user: User,
        access_token: String,
        refresh_token: String,
    },
    /// A proactive refresh rotated the token pair in place.
    TokensRefreshed {
        access_token: String,
        refresh_token: String,
    },
    /// The attempt failed with a user-facing message.
    AttemptFailed { message: String },
    /// The attempt finished without establishing a session and without a
    /// user-facing error (e.g., cold start with no stored session).
    AttemptSettled,
    /// Logout or forced session loss: tokens, user, and the authenticated
    /// flag are cleared in one transition.
    SessionCleared,
}

/// Applies one event to the state.
pub fn reduce(state: &mut AuthState, event: AuthEvent) {
    match event {
        AuthEvent::AttemptStarted => {
            state.loading = true;
            state.error = None;
        }
        AuthEvent::SessionEstablished {
            user,
            access_token,
            refresh_token,
        } => {
            state.user = Some(user);
            state.access_token = Some(access_token);
            state.refresh_token = Some(refresh_token);
            state.is_authenticated = true;
            state.loading = false;
            state.error = None;
        }
        AuthEvent::TokensRefreshed {
            access_token,
            refresh_token,
        } => {
            state.access_token = Some(access_token);
            state.refresh_token = Some(refresh_token);
            state.loading = false;
        }
        AuthEvent::AttemptFailed { message } => {
            state.loading = false;
            state.error = Some(message);
        }
        AuthEvent::AttemptSettled => {
            state.loading = false;
        }
        AuthEvent::SessionCleared => {
            state.user = None;
            state.access_token = None;
            state.refresh_token = None;
            state.is_authenticated = false;
            state.loading = false;
            state.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            name: "Ada".to_string(),
        }
    }

    fn invariant_holds(state: &AuthState) -> bool {
        !state.is_authenticated || state.access_token.is_some()
    }

    /// Test: authenticated implies a present access token across every
    /// reachable transition.
    #[test]
    fn test_auth_invariant() {
        let mut state = AuthState::default();
        assert!(invariant_holds(&state));

        reduce(&mut state, AuthEvent::AttemptStarted);
        assert!(invariant_holds(&state));

        reduce(
            &mut state,
            AuthEvent::SessionEstablished {
                user: user(),
                access_token: "a1".to_string(),
                refresh_token: "r1".to_string(),
            },
        );
        assert!(state.is_authenticated);
        assert!(invariant_holds(&state));

        reduce(
            &mut state,
            AuthEvent::TokensRefreshed {
                access_token: "a2".to_string(),
                refresh_token: "r2".to_string(),
            },
        );
        assert!(invariant_holds(&state));

        reduce(&mut state, AuthEvent::SessionCleared);
        assert!(!state.is_authenticated);
        assert!(state.access_token.is_none());
        assert!(state.refresh_token.is_none());
        assert!(state.user.is_none());
        assert!(invariant_holds(&state));
    }

    /// Test: a new attempt clears the previous error.
    #[test]
    fn test_attempt_clears_error() {
        let mut state = AuthState::default();
        reduce(
            &mut state,
            AuthEvent::AttemptFailed {
                message: "Invalid credentials".to_string(),
            },
        );
        assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
        assert!(!state.is_authenticated);

        reduce(&mut state, AuthEvent::AttemptStarted);
        assert!(state.error.is_none());
        assert!(state.loading);
    }

    /// Test: a failed attempt leaves any existing session intact.
    #[test]
    fn test_failure_keeps_session() {
        let mut state = AuthState::default();
        reduce(
            &mut state,
            AuthEvent::SessionEstablished {
                user: user(),
                access_token: "a1".to_string(),
                refresh_token: "r1".to_string(),
            },
        );

        reduce(
            &mut state,
            AuthEvent::AttemptFailed {
                message: "boom".to_string(),
            },
        );
        assert!(state.is_authenticated);
        assert_eq!(state.access_token.as_deref(), Some("a1"));
    }

    /// Test: settle only clears the loading flag.
    #[test]
    fn test_settled() {
        let mut state = AuthState::default();
        reduce(&mut state, AuthEvent::AttemptStarted);
        reduce(&mut state, AuthEvent::AttemptSettled);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(!state.is_authenticated);
    }
}
