use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::{prelude::*, state::AppState};

#[derive(Serialize)]
pub struct Health {
  status: &'static str,
  service: &'static str,
  database: &'static str,
}

pub async fn health(
  State(app): State<Arc<AppState>>,
) -> (StatusCode, Json<Health>) {
  let serving = app.is_serving();
  let db_ok = app.db.ping().await.is_ok();

  if !db_ok {
    warn!("Health check: database unreachable");
  }

  let (code, status) = if serving && db_ok {
    (StatusCode::OK, "UP")
  } else {
    (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
  };

  let health = Health {
    status,
    service: if serving { "start" } else { "stop" },
    database: if db_ok { "UP" } else { "DOWN" },
  };

  (code, Json(health))
}

pub async fn up(State(app): State<Arc<AppState>>) -> StatusCode {
  app.set_serving(true);
  StatusCode::OK
}

pub async fn down(State(app): State<Arc<AppState>>) -> StatusCode {
  app.set_serving(false);
  StatusCode::OK
}
