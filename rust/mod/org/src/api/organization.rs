use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{ETAG, IF_MATCH};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use orgsvc_core::{Identity, ListParams, ListResult, ServiceError};

use crate::api::AppState;
use crate::model::{CreateOrganization, Organization};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organization", get(list_orgs).post(create_org))
        .route(
            "/organization/{id}",
            get(get_org).patch(patch_org).delete(delete_org),
        )
}

/// JSON body plus an `ETag` carrying the revision.
fn with_etag(status: StatusCode, org: Organization) -> Response {
    let mut resp = (status, Json(&org)).into_response();
    if let Ok(tag) = HeaderValue::from_str(&format!("\"{}\"", org.rev)) {
        resp.headers_mut().insert(ETAG, tag);
    }
    resp
}

/// `If-Match: 3` or `If-Match: "3"`. `*` and an absent header impose nothing.
fn expected_rev(headers: &HeaderMap) -> Result<Option<u64>, ServiceError> {
    let Some(value) = headers.get(IF_MATCH) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| ServiceError::Validation("If-Match must be a revision number".into()))?
        .trim();
    if raw == "*" {
        return Ok(None);
    }
    raw.trim_matches('"')
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ServiceError::Validation("If-Match must be a revision number".into()))
}

async fn create_org(
    State(svc): State<AppState>,
    who: Identity,
    body: Result<Json<CreateOrganization>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Json(input) = body?;
    let org = svc.create(&who, input)?;
    Ok(with_etag(StatusCode::CREATED, org))
}

async fn list_orgs(
    State(svc): State<AppState>,
    who: Identity,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResult<Organization>>, ServiceError> {
    let Query(params) = params?;
    Ok(Json(svc.list(&who, &params)?))
}

async fn get_org(
    State(svc): State<AppState>,
    who: Identity,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    let org = svc.get(&who, &id)?;
    Ok(with_etag(StatusCode::OK, org))
}

async fn patch_org(
    State(svc): State<AppState>,
    who: Identity,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let expected = expected_rev(&headers)?;
    let Json(patch) = body?;
    let org = svc.patch(&who, &id, &patch, expected)?;
    Ok(with_etag(StatusCode::OK, org))
}

async fn delete_org(
    State(svc): State<AppState>,
    who: Identity,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    let org = svc.delete(&who, &id)?;
    Ok(Json(serde_json::json!({
        "message": "Organization deleted successfully",
        "organization": org,
    })))
}
