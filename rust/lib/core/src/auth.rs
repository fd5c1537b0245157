//! Authentication seam shared by every module.
//!
//! Core does NOT depend on any specific auth module. It only knows the
//! [`Authenticator`] trait and the [`Identity`] it produces. The concrete
//! implementation is injected by the server at startup.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id (JWT `sub`).
    pub subject: String,
    pub email: String,
}

impl Identity {
    pub fn new(subject: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
        }
    }
}

/// Handlers take `Identity` as an extractor. The auth middleware places it
/// into the request extensions; a request that bypassed the middleware is
/// rejected instead of silently running unauthenticated.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("not authenticated".into()))
    }
}

/// Pluggable authenticator. The server middleware calls this for every
/// non-public request.
pub trait Authenticator: Send + Sync + 'static {
    /// Resolve the caller from the request headers.
    ///
    /// Returns `Err(ServiceError::Unauthorized)` when credentials are
    /// missing, malformed, expired, or forged.
    fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, ServiceError>;
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively. Returns `None` for a missing
/// header, another scheme, or an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
