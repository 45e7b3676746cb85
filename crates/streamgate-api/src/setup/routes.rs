//! Route configuration and setup

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::{
    API_PREFIX, CALLBACK_CHECK_PATH, CALLBACK_TEST_PATH, HELLO_VOICES_PATH, LOGIN_PATH,
    MAX_BODY_BYTES, RECORD_HLS_PATH, TARGET_CHECK_PATH, TOKEN_PATH,
};
use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router<()> {
    let auth_state = Arc::new(AuthState {
        api_secret: state.config.api_secret.clone(),
    });

    // Protected routes (require authentication)
    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    public_routes()
        .merge(protected_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes reachable without a credential. File routes are still confined
/// to their directories and file types.
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            &api_path(RECORD_HLS_PATH),
            get(handlers::files::get_record_segment),
        )
        .route(
            &api_path(HELLO_VOICES_PATH),
            get(handlers::files::get_hello_voice),
        )
        .route(&api_path(LOGIN_PATH), post(handlers::mgmt::login))
        .route(&api_path(TOKEN_PATH), post(handlers::mgmt::verify_token))
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api_path(TARGET_CHECK_PATH),
            post(handlers::targets::check_target),
        )
        .route(
            &api_path(CALLBACK_CHECK_PATH),
            post(handlers::callbacks::check_callback),
        )
        .route(
            &api_path(CALLBACK_TEST_PATH),
            post(handlers::callbacks::test_callback),
        )
}
