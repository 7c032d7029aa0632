//! Auth state machine: pure state slice plus session effect functions.

pub mod session;
pub mod state;

pub use session::SessionManager;
pub use state::{AuthEvent, AuthState, reduce};
