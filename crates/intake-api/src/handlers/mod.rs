pub mod health;
pub mod source_delete;
pub mod source_upload;
