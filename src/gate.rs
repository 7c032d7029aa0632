//! Session/route gate.
//!
//! A pure decision procedure re-evaluated whenever auth state, the
//! onboarding flag, or the current path changes. `decide` never performs
//! side effects; the outer driver (the CLI dispatcher here, a navigation
//! layer elsewhere) executes the returned action. Re-entry is safe: the
//! same inputs always yield the same decision, and an auth prompt goes
//! away as soon as the inputs stop matching its rule.

/// Route paths that require an authenticated session (prefix match).
/// Longer prefixes first so `/profile/edit` gets its own prompt.
const PROTECTED_PREFIXES: &[&str] = &["/profile/edit", "/profile", "/community"];

/// Routes only meaningful to unauthenticated users.
const AUTH_ROUTES: &[&str] = &["/login", "/signup", "/onboarding"];

/// The home route.
pub const HOME_PATH: &str = "/";
/// The onboarding route.
pub const ONBOARDING_PATH: &str = "/onboarding";

/// Inputs to the gate decision.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub onboarding_completed: bool,
    pub is_authenticated: bool,
    /// True while an auth transition is still in flight; the gate waits
    /// rather than acting on a half-settled state.
    pub loading: bool,
    pub path: &'a str,
}

/// Action the driver must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// Auth state is still settling; do nothing yet.
    Wait,
    /// Force navigation to onboarding.
    RedirectOnboarding,
    /// Block in place with an auth prompt (not a navigation).
    AuthPrompt {
        title: &'static str,
        message: &'static str,
    },
    /// Redirect an authenticated user away from an auth-only route.
    RedirectHome,
    /// No action; the route is available (guest browsing included).
    Allow,
}

/// Decides the gate action for the given inputs. First match wins.
pub fn decide(input: &GateInput) -> GateAction {
    if input.loading {
        return GateAction::Wait;
    }

    if !input.onboarding_completed && input.path != ONBOARDING_PATH {
        return GateAction::RedirectOnboarding;
    }

    if !input.is_authenticated {
        if let Some(prefix) = PROTECTED_PREFIXES
            .iter()
            .find(|p| input.path.starts_with(**p))
        {
            let (title, message) = prompt_for(prefix);
            return GateAction::AuthPrompt { title, message };
        }
    }

    if input.is_authenticated && AUTH_ROUTES.contains(&input.path) {
        return GateAction::RedirectHome;
    }

    GateAction::Allow
}

/// Context-specific prompt copy per protected prefix.
fn prompt_for(prefix: &str) -> (&'static str, &'static str) {
    match prefix {
        "/profile/edit" => (
            "Sign in to edit your profile",
            "Log in or create an account to update your profile details.",
        ),
        "/profile" => (
            "Sign in required",
            "Log in or create an account to view your profile.",
        ),
        "/community" => (
            "Join the community",
            "Log in or create an account to see the community leaderboard.",
        ),
        _ => (
            "Sign in required",
            "Log in or create an account to continue.",
        ),
    }
}
