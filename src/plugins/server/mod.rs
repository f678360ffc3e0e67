mod coupon;
mod extract;
mod policy;
mod status;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use axum::{
  Router,
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  timeout::TimeoutLayer,
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(app.config.rate_per_second)
        .burst_size(app.config.rate_burst)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let router = routes()
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(TimeoutLayer::new(app.config.request_timeout))
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .with_state(app.clone())
      .into_make_service_with_connect_info::<SocketAddr>();

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));
    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP server listening on {addr}");

    axum::serve(listener, router)
      .with_graceful_shutdown(shutdown_signal())
      .await
      .context("Server error")?;

    info!("HTTP server stopped");
    Ok(())
  }
}

pub fn routes() -> Router<Arc<AppState>> {
  Router::new()
    .route("/health", get(status::health))
    .route("/actuator/status/up", post(status::up))
    .route("/actuator/status/down", post(status::down))
    .route("/api/coupons", get(coupon::list).post(coupon::create))
    .route("/api/coupons/used", get(coupon::used))
    .route("/api/coupons/{id}", get(coupon::get))
    .route("/api/coupons/{id}/use", post(coupon::redeem))
    .route("/api/coupons/{id}/deactivate", post(coupon::deactivate))
    .route("/api/policies", get(policy::list).post(policy::create))
    .route(
      "/api/policies/{id}",
      get(policy::get).patch(policy::update).delete(policy::delete),
    )
    .route("/api/policies/{id}/eventType", get(policy::by_event_type))
}

async fn shutdown_signal() {
  if let Err(err) = tokio::signal::ctrl_c().await {
    error!("Failed to listen for shutdown signal: {err}");
    std::future::pending::<()>().await;
  }
  info!("Shutdown signal received");
}
