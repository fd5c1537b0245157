mod organization;

use std::sync::Arc;

use axum::Router;

use crate::service::OrgService;

/// Shared application state.
pub type AppState = Arc<OrgService>;

/// Build the organization router. Every handler extracts the caller's
/// `Identity`, so the router must sit behind the auth middleware.
pub fn router(svc: Arc<OrgService>) -> Router {
    Router::new().merge(organization::routes()).with_state(svc)
}
