use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use super::extract::{Id, Params, Payload, parse_ids};
use crate::{
  entity::coupon,
  error::Status,
  prelude::*,
  state::AppState,
  sv::coupon::CouponRequest,
};

#[derive(Deserialize)]
pub struct ListParams {
  active: Option<bool>,
  ids: Option<String>,
}

#[derive(Deserialize)]
pub struct UsedParams {
  ids: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateParams {
  count: i64,
}

pub async fn get(
  State(app): State<Arc<AppState>>,
  Id(id): Id<i64>,
) -> Result<Json<coupon::Model>> {
  Ok(Json(app.sv().coupon().by_id(id).await?))
}

pub async fn list(
  State(app): State<Arc<AppState>>,
  Params(params): Params<ListParams>,
) -> Result<Json<Vec<coupon::Model>>> {
  let sv = app.sv().coupon();
  let ids = params.ids.as_deref().map(parse_ids).transpose()?;

  let coupons = match (ids, params.active) {
    (Some(ids), Some(active)) => sv.by_ids_and_active(&ids, active).await?,
    (Some(ids), None) => sv.by_ids(&ids).await?,
    (None, Some(active)) => sv.by_active(active).await?,
    (None, None) => sv.all().await?,
  };

  Ok(Json(coupons))
}

pub async fn used(
  State(app): State<Arc<AppState>>,
  Params(params): Params<UsedParams>,
) -> Result<Json<Vec<coupon::Model>>> {
  let sv = app.sv().coupon();

  let coupons = match params.ids.as_deref().map(parse_ids).transpose()? {
    Some(ids) => sv.used_by_ids(&ids).await?,
    None => sv.used().await?,
  };

  Ok(Json(coupons))
}

pub async fn create(
  State(app): State<Arc<AppState>>,
  Params(params): Params<CreateParams>,
  Payload(req): Payload<CouponRequest>,
) -> Result<(StatusCode, Json<Vec<coupon::Model>>)> {
  let coupons = app.sv().coupon().create(req, params.count).await?;
  Ok((StatusCode::CREATED, Json(coupons)))
}

pub async fn redeem(
  State(app): State<Arc<AppState>>,
  Id(id): Id<i64>,
) -> Result<Json<coupon::Model>> {
  Ok(Json(app.sv().coupon().redeem(id).await?))
}

pub async fn deactivate(
  State(app): State<Arc<AppState>>,
  Id(id): Id<i64>,
) -> Result<Json<Status>> {
  app.sv().coupon().deactivate(id).await?;
  Ok(Status::ok("Coupon deactivated successfully"))
}
