//! Test helpers: router over the in-memory ingestion harness.
//!
//! Run with `cargo test -p intake-api`. No database or scanner daemon is needed.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use intake_api::setup::routes::build_router;
use intake_api::state::{AppState, RequestConfig};
use intake_core::constants::API_PREFIX;
use intake_services::testing::{StaticScanner, TestHarness, TestHarnessBuilder};
use std::sync::Arc;
use uuid::Uuid;

pub const PRINCIPAL_HEADER: &str = "x-principal-id";

/// API path prefix for tests (e.g. `/api/v0/sources`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server plus the harness that owns storage and repositories.
pub struct TestApp {
    pub server: TestServer,
    pub harness: TestHarness,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub async fn setup_test_app(scanner: StaticScanner) -> TestApp {
    setup_test_app_with(TestHarness::builder(scanner), false).await
}

pub async fn setup_test_app_with(builder: TestHarnessBuilder, is_production: bool) -> TestApp {
    let harness = builder.build().await;
    let max_upload = harness.service.policy().max_upload_size_bytes;

    let state = Arc::new(AppState {
        ingestion: harness.service.clone(),
        request: RequestConfig::default(),
        is_production,
    });

    let server = TestServer::new(build_router(state, max_upload)).expect("start test server");
    TestApp { server, harness }
}

pub fn upload_form(source_type: &str, file_name: &str, mime: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new()
        .add_text("source_type", source_type.to_string())
        .add_part("file", Part::bytes(data).file_name(file_name).mime_type(mime))
}

pub fn new_principal() -> String {
    Uuid::new_v4().to_string()
}
