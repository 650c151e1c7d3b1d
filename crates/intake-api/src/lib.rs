//! Intake API Library
//!
//! HTTP surface for the ingestion pipeline: upload, undo and health routes, request
//! identity extraction, error rendering and server bootstrap.

mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod utils;

pub use api_doc::ApiDoc;
pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, RequestConfig};
