//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p streamgate-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use streamgate_api::constants;
use streamgate_api::setup::routes;
use streamgate_api::state::AppState;
use streamgate_core::Config;
use tempfile::TempDir;

pub const TEST_API_SECRET: &str = "integration-test-secret";
pub const TEST_MGMT_PASSWORD: &str = "integration-test-password";

/// API path with the control-plane prefix (e.g. `/terraform/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn bearer(value: &str) -> String {
    format!("Bearer {}", value)
}

/// Test application: server plus the temp directory backing it.
pub struct TestApp {
    pub server: TestServer,
    pub root: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }
}

/// Lay out a recordings root, a voice-prompt root and a sibling secret
/// directory the API must never serve.
fn create_fixtures(root: &TempDir) {
    let record = root.path().join("record/valid-uuid");
    fs::create_dir_all(&record).expect("create record dir");
    fs::write(record.join("valid-uuid.ts"), b"MPEG-TS segment").expect("write segment");
    fs::write(record.join("index.m3u8"), b"#EXTM3U\n").expect("write playlist");

    let secret = root.path().join("secret/data");
    fs::create_dir_all(&secret).expect("create secret dir");
    fs::write(secret.join("secret.ts"), b"do not serve").expect("write secret");

    let voices = root.path().join("containers/conf");
    fs::create_dir_all(&voices).expect("create voices dir");
    fs::write(voices.join("hello-english.aac"), b"AAC voice").expect("write voice");
    fs::write(voices.join("nginx.conf"), b"server { listen 80; }").expect("write nginx.conf");
}

pub fn create_test_config(root: &TempDir, api_secret: &str) -> Config {
    Config {
        api_secret: api_secret.to_string(),
        mgmt_password: Some(TEST_MGMT_PASSWORD.to_string()),
        record_dir: root.path().join("record"),
        voices_dir: root.path().join("containers/conf"),
        callback_timeout_secs: 2,
        ..Config::default()
    }
}

pub fn setup_test_app_with_secret(api_secret: &str) -> TestApp {
    let root = TempDir::new().expect("create temp dir");
    create_fixtures(&root);

    let config = create_test_config(&root, api_secret);
    let state = Arc::new(AppState::new(config).expect("build app state"));
    let app = routes::setup_routes(state);

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");
    TestApp { server, root }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_secret(TEST_API_SECRET)
}
