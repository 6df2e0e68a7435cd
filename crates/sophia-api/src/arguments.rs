//! Handlers for `/arguments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/arguments` | Body: `{"conclusion", "premises"}`; 201 + `Location` |
//! | `GET`    | `/arguments` | `?conclusion=` required; JSON array |
//! | `GET`    | `/arguments/{id}` | Live version |
//! | `PATCH`  | `/arguments/{id}` | Body: `{"premises"}`; 204 + `Location` of the new version |
//! | `DELETE` | `/arguments/{id}` | 204 |
//! | `GET`    | `/arguments/{id}/version/{version}` | One historical version |
//!
//! Ids and version numbers that do not parse are treated as missing, so they
//! answer 404 rather than 400.

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::{Deserialize, de::DeserializeOwned};
use sophia_core::{
  Argument, ArgumentId, ArgumentWithId, VersionNumber, store::ArgumentStore,
  validate_argument, validate_premises,
};

use crate::error::ApiError;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn parse_id(raw: &str) -> Result<ArgumentId, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::NotFound(format!("argument {raw:?} does not exist")))
}

fn parse_version(id: ArgumentId, raw: &str) -> Result<VersionNumber, ApiError> {
  raw.parse().map_err(|_| {
    ApiError::NotFound(format!("argument {id} does not have a version {raw:?}"))
  })
}

/// Decode a JSON body regardless of its declared content type.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
  serde_json::from_slice(body)
    .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))
}

pub fn argument_location(id: ArgumentId) -> String { format!("/arguments/{id}") }

pub fn version_location(id: ArgumentId, version: VersionNumber) -> String {
  format!("/arguments/{id}/version/{version}")
}

// ─── Save ─────────────────────────────────────────────────────────────────────

/// `POST /arguments` returns 201 with `Location: /arguments/{id}`.
pub async fn save<S>(
  State(store): State<Arc<S>>,
  body: Bytes,
) -> Result<Response, ApiError>
where
  S: ArgumentStore,
{
  let argument: Argument = parse_body(&body)?;
  validate_argument(&argument)?;

  let id = store.save(argument).await.map_err(ApiError::from_store)?;
  Ok(
    (StatusCode::CREATED, [(header::LOCATION, argument_location(id))])
      .into_response(),
  )
}

// ─── List by conclusion ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub conclusion: Option<String>,
}

/// `GET /arguments?conclusion=<text>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ArgumentWithId>>, ApiError>
where
  S: ArgumentStore,
{
  let conclusion = params
    .conclusion
    .filter(|c| !c.is_empty())
    .ok_or_else(|| {
      ApiError::BadRequest("the conclusion query parameter is required".into())
    })?;

  let found = store
    .fetch_all(&conclusion)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(found))
}

// ─── Get live / get version ───────────────────────────────────────────────────

/// `GET /arguments/{id}`
pub async fn get_live<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<ArgumentWithId>, ApiError>
where
  S: ArgumentStore,
{
  let id = parse_id(&raw_id)?;
  let argument = store.fetch_live(id).await.map_err(ApiError::from_store)?;
  Ok(Json(ArgumentWithId { id, argument }))
}

/// `GET /arguments/{id}/version/{version}`
pub async fn get_version<S>(
  State(store): State<Arc<S>>,
  Path((raw_id, raw_version)): Path<(String, String)>,
) -> Result<Json<ArgumentWithId>, ApiError>
where
  S: ArgumentStore,
{
  let id = parse_id(&raw_id)?;
  let version = parse_version(id, &raw_version)?;
  let argument = store
    .fetch_version(id, version)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ArgumentWithId { id, argument }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /arguments/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  #[serde(default)]
  pub premises: Vec<String>,
}

/// `PATCH /arguments/{id}` returns 204 with
/// `Location: /arguments/{id}/version/{new_version}`.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
  body: Bytes,
) -> Result<Response, ApiError>
where
  S: ArgumentStore,
{
  let id = parse_id(&raw_id)?;
  // Any `conclusion` key is refused, even `null`.
  let fields: serde_json::Map<String, serde_json::Value> = parse_body(&body)?;
  if fields.contains_key("conclusion") {
    return Err(ApiError::BadRequest(
      "an argument's conclusion cannot be changed; only premises may be updated"
        .into(),
    ));
  }
  let body: UpdateBody =
    serde_json::from_value(serde_json::Value::Object(fields)).map_err(|e| {
      ApiError::BadRequest(format!("invalid request body: {e}"))
    })?;
  validate_premises(&body.premises)?;

  let version = store
    .update_premises(id, body.premises)
    .await
    .map_err(ApiError::from_store)?;
  Ok(
    (StatusCode::NO_CONTENT, [(header::LOCATION, version_location(id, version))])
      .into_response(),
  )
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /arguments/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: ArgumentStore,
{
  let id = parse_id(&raw_id)?;
  store.delete(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
