mod account;

use std::sync::Arc;

use axum::Router;

use crate::service::AuthService;

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the auth API router. Both routes are public; the server must list
/// them as such in its auth middleware.
pub fn build_router(svc: Arc<AuthService>) -> Router {
    Router::new()
        .nest("/auth", account::routes())
        .with_state(svc)
}
