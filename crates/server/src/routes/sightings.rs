use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::utils::logging::{Metadata, Severity};
use models::{Sighting, SightingInput};
use serde_json::json;
use service::errors::ServiceError;
use service::sighting::assign_id;

use crate::errors::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Decode a request body. The content type is not checked.
fn parse_input(body: &Bytes) -> Result<SightingInput, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid request body"))
}

/// Map a service outcome onto the response contract.
///
/// Only internal failures are logged; validation, not-found and conflict are
/// ordinary client traffic.
fn reject(state: &AppState, op: &str, err: ServiceError, id: Option<&str>, location: &str) -> ApiError {
    let (outcome, api) = match err {
        ServiceError::Validation(msg) => ("invalid", ApiError::bad_request(msg)),
        ServiceError::NotFound(_) => ("not_found", ApiError::not_found()),
        ServiceError::AlreadyExists(_) => ("conflict", ApiError::conflict()),
        e => {
            let mut meta = Metadata::new();
            meta.insert("op".into(), json!(op));
            meta.insert("id".into(), json!(id));
            if !location.is_empty() {
                meta.insert("location".into(), json!(location));
            }
            meta.insert("error".into(), json!(e.to_string()));
            state.logger.log(Severity::Error, &format!("failed to {op} sighting"), meta);
            ("error", ApiError::internal())
        }
    };
    metrics::record(op, outcome);
    api
}

pub async fn list_sightings(State(state): State<AppState>) -> Json<Vec<Sighting>> {
    metrics::record("list", "ok");
    Json(state.sightings.list().await)
}

pub async fn create_sighting(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Sighting>), ApiError> {
    let input = parse_input(&body).inspect_err(|_| metrics::record("create", "bad_body"))?;
    // assigned up front so a failed write can still be traced to its record
    let id = assign_id(&input);
    let location = input.location.clone();
    match state.sightings.create(id.clone(), input).await {
        Ok(created) => {
            metrics::record("create", "ok");
            Ok((StatusCode::CREATED, Json(created)))
        }
        Err(e) => Err(reject(&state, "create", e, Some(id.as_str()), &location)),
    }
}

pub async fn get_sighting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Sighting>, ApiError> {
    match state.sightings.get(&id).await {
        Ok(found) => {
            metrics::record("get", "ok");
            Ok(Json(found))
        }
        Err(e) => Err(reject(&state, "get", e, Some(id.as_str()), "")),
    }
}

pub async fn update_sighting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Sighting>, ApiError> {
    let input = parse_input(&body).inspect_err(|_| metrics::record("update", "bad_body"))?;
    let location = input.location.clone();
    match state.sightings.update(&id, input).await {
        Ok(updated) => {
            metrics::record("update", "ok");
            Ok(Json(updated))
        }
        Err(e) => Err(reject(&state, "update", e, Some(id.as_str()), &location)),
    }
}

pub async fn delete_sighting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.sightings.delete(&id).await {
        Ok(()) => {
            metrics::record("delete", "ok");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(reject(&state, "delete", e, Some(id.as_str()), "")),
    }
}

pub async fn missing_id() -> ApiError {
    ApiError::bad_request("Item ID required")
}
