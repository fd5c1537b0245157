use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use orgsvc_core::ServiceError;

use crate::api::AppState;
use crate::model::{Credentials, LoginResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(svc): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let Json(input) = body?;
    let user = svc.register(input)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

async fn login(
    State(svc): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, ServiceError> {
    let Json(input) = body?;
    let issued = svc.login(input)?;
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        token: issued.token,
        token_type: "Bearer".into(),
        expires_in: issued.expires_in,
        user: issued.user,
    }))
}
