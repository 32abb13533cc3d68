use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use spendtrack_auth::auth_routes;
use spendtrack_core::deployment::DeploymentMode;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    files::MOCK_FILES_PATH,
    handlers::{
        expenses::{create_expense, delete_expense, get_expense, list_expenses, update_expense},
        health::{healthz, livez},
        receipts::upload_receipt,
    },
    state::AppState,
};

/// Room for base64 expansion and the JSON around the receipt.
fn receipt_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes / 3 * 4 + 64 * 1024
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let body_limit = receipt_body_limit(state.config.max_upload_bytes);
    let account_routes: Router<AppState> = auth_routes().with_state(state.auth.clone());

    let mut router = Router::new()
        .route("/livez", get(livez))
        .route("/api/healthz/", get(healthz))
        .route("/api/expenses/", post(create_expense))
        .route("/api/expenses/list/", get(list_expenses))
        .route(
            "/api/expenses/{id}/",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route(
            "/api/receipts/upload/",
            post(upload_receipt).layer(DefaultBodyLimit::max(body_limit)),
        )
        .merge(account_routes);

    // Local receipts are served straight from the upload directory.
    if state.mode() == DeploymentMode::Local {
        router = router.nest_service(MOCK_FILES_PATH, ServeDir::new(&state.config.upload_dir));
    }

    let timeout = state.config.request_timeout;
    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .with_state(state)
}
