use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coupon state faults: the requested transition already happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CouponState {
  #[error("Coupon has already been used")]
  AlreadyUsed,
  #[error("Coupon is already inactive")]
  Inactive,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Coupon with ID {0} not found")]
  CouponNotFound(i64),
  #[error("Coupon policy with ID {0} not found")]
  PolicyNotFound(i64),
  #[error("Coupon policy for event `{0}` not found")]
  EventPolicyNotFound(String),
  #[error("{0}")]
  InvalidRequest(String),
  #[error(transparent)]
  Coupon(#[from] CouponState),
  #[error("Key manager error: {0}")]
  KeyManager(String),
  #[error("Database error: {0}")]
  Db(#[from] sea_orm::DbErr),
  #[error("Internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidRequest(msg.into())
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::CouponNotFound(_)
      | Error::PolicyNotFound(_)
      | Error::EventPolicyNotFound(_) => StatusCode::NOT_FOUND,
      Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
      Error::Coupon(_) => StatusCode::CONFLICT,
      Error::KeyManager(_) | Error::Db(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self {
    Error::InvalidRequest(rejection.body_text())
  }
}

impl From<PathRejection> for Error {
  fn from(rejection: PathRejection) -> Self {
    Error::InvalidRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for Error {
  fn from(rejection: QueryRejection) -> Self {
    Error::InvalidRequest(rejection.body_text())
  }
}

#[derive(Serialize)]
pub struct Status {
  pub success: bool,
  pub msg: Option<String>,
}

impl Status {
  pub fn ok(msg: impl Into<String>) -> Json<Self> {
    Json(Self { success: true, msg: Some(msg.into()) })
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    let msg = if status.is_server_error() {
      tracing::error!("request failed: {self}");
      "An unexpected error occurred".to_string()
    } else {
      self.to_string()
    };

    (status, Json(Status { success: false, msg: Some(msg) })).into_response()
  }
}
