mod accounts;
mod error;
mod headers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use data404_core::Accounts;

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub accounts: Arc<Accounts>,
    pub static_root: PathBuf,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

/// Routes the two account endpoints; every other path is a file under
/// `static_root`. `ServeDir` rejects `..` segments, serves `index.html` for
/// directories and answers non-GET/HEAD methods with 405.
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_root);
    let shared = Arc::new(state);

    // Credentials are tiny; anything larger is not a legitimate form post.
    const AUTH_BODY_LIMIT: usize = 16 * 1024;

    let auth_routes = Router::new()
        .route(
            "/api/register",
            post(accounts::register).fallback(api_not_found),
        )
        .route("/api/login", post(accounts::login).fallback(api_not_found))
        .layer(DefaultBodyLimit::max(AUTH_BODY_LIMIT));

    let router = Router::new()
        .merge(auth_routes)
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(shared);

    headers::with_security_headers(router)
}

async fn api_not_found() -> error::AppError {
    error::AppError::NotFound("Endpoint not found")
}
