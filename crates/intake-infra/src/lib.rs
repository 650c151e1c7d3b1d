//! Intake Infrastructure Library
//!
//! Cross-cutting pieces shared by HTTP surfaces: tracing setup, request-id and
//! security-header middleware, and the error response body.

pub mod error;

#[cfg(feature = "middleware")]
pub mod middleware;

pub mod telemetry;

// Re-export commonly used types
pub use error::ErrorResponse;

#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
    SecurityHeaders,
};

pub use telemetry::init_telemetry;
