//! Data models for the ingestion pipeline

mod audit;
mod document;
mod request;
mod scan;
mod source;
mod source_type;

pub use audit::*;
pub use document::*;
pub use request::*;
pub use scan::*;
pub use source::*;
pub use source_type::*;
