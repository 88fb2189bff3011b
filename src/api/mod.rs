//! HTTP boundary: routing, shared context, error mapping, lifecycle.

pub mod error;
pub mod routes;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use routes::detection_router;
pub use server::{serve, start_server_on, ServerHandle};
pub use types::{ApiContext, DetectRequest};
