//! Route registration. Collects all module routes + system endpoints.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Router};

use orgsvc_core::{Authenticator, Module};
use orgsvc_patch::OpKind;

use crate::auth_middleware;
use crate::request_log;

/// Build the complete router with all routes.
///
/// Module routes carry absolute paths and are merged as-is.
pub fn build_router(authenticator: Arc<dyn Authenticator>, modules: &[&dyn Module]) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/meta/schema", get(schema_endpoint));

    for module in modules {
        tracing::info!("Mounting {} routes", module.name());
        app = app.merge(module.routes());
    }

    app.layer(middleware::from_fn_with_state(
        authenticator,
        auth_middleware::auth_middleware,
    ))
    .layer(middleware::from_fn(request_log::request_log))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "orgsvcd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Describe the resources and the patch vocabulary.
async fn schema_endpoint() -> impl IntoResponse {
    let ops: Vec<serde_json::Value> = OpKind::ALL
        .iter()
        .map(|op| {
            serde_json::json!({
                "op": op.as_str(),
                "requires": {
                    "value": op.needs_value(),
                    "from": op.needs_from(),
                },
            })
        })
        .collect();

    axum::Json(serde_json::json!({
        "name": "orgsvc",
        "modules": [
            {
                "id": "auth",
                "endpoints": [
                    {"method": "POST", "path": "/auth/register", "public": true},
                    {"method": "POST", "path": "/auth/login", "public": true},
                ],
            },
            {
                "id": "org",
                "resources": [{
                    "name": "organization",
                    "path": "/organization",
                    "fields": {
                        "id": "string, assigned",
                        "name": "string, required",
                        "addresses": "Address[]",
                        "rev": "integer, assigned",
                        "createdAt": "rfc3339, assigned",
                        "updatedAt": "rfc3339, assigned",
                    },
                    "address": ["street", "city", "state", "zip", "country"],
                    "methods": ["POST", "GET", "PATCH", "DELETE"],
                    "preconditions": ["If-Match: <rev>"],
                }],
            },
        ],
        "patch": {
            "contentType": "application/json",
            "operations": ops,
            "pointer": "RFC 6901; '-' appends to a list",
        },
    }))
}
