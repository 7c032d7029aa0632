//! HTTP client layer: content source and backend API clients.

pub mod backend;
pub mod content;
pub mod error;

pub use backend::{BackendClient, RequestSpec};
pub use content::{ContentClient, PostsPage, retry_fixed};
pub use error::{ApiError, ApiErrorKind};
