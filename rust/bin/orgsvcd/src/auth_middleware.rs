//! Bearer-token middleware.
//!
//! Resolves the caller through the injected `Authenticator` and stores the
//! `Identity` in request extensions for handlers to extract.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use orgsvc_core::{Authenticator, ServiceError};

/// Middleware that authenticates every non-public request.
pub async fn auth_middleware(
    State(authenticator): State<Arc<dyn Authenticator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let identity = authenticator.authenticate(request.headers())?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Check if a request path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    matches!(
        path,
        "/health" | "/version" | "/meta/schema" | "/auth/register" | "/auth/login"
    )
}
