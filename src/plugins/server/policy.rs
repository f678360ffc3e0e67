use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use super::extract::{Id, Params, Payload};
use crate::{
  entity::policy,
  error::Status,
  prelude::*,
  state::AppState,
  sv::policy::PolicyRequest,
};

#[derive(Deserialize)]
pub struct ListParams {
  #[serde(default)]
  deleted: bool,
}

pub async fn list(
  State(app): State<Arc<AppState>>,
  Params(params): Params<ListParams>,
) -> Result<Json<Vec<policy::Model>>> {
  Ok(Json(app.sv().policy().all(params.deleted).await?))
}

pub async fn get(
  State(app): State<Arc<AppState>>,
  Id(id): Id<i64>,
) -> Result<Json<policy::Model>> {
  Ok(Json(app.sv().policy().by_id(id).await?))
}

pub async fn by_event_type(
  State(app): State<Arc<AppState>>,
  Id(event): Id<String>,
) -> Result<Json<policy::Model>> {
  Ok(Json(app.sv().policy().by_event_type(&event).await?))
}

pub async fn create(
  State(app): State<Arc<AppState>>,
  Payload(req): Payload<PolicyRequest>,
) -> Result<(StatusCode, Json<policy::Model>)> {
  let policy = app.sv().policy().create(req).await?;
  Ok((StatusCode::CREATED, Json(policy)))
}

pub async fn update(
  State(app): State<Arc<AppState>>,
  Id(id): Id<i64>,
  Payload(req): Payload<PolicyRequest>,
) -> Result<Json<policy::Model>> {
  Ok(Json(app.sv().policy().update(id, req).await?))
}

pub async fn delete(
  State(app): State<Arc<AppState>>,
  Id(id): Id<i64>,
) -> Result<Json<Status>> {
  app.sv().policy().delete(id).await?;
  Ok(Status::ok("Coupon policy deleted successfully"))
}
