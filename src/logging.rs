//! Tracing setup and crash-log shipping.
//!
//! ERROR events are mirrored to a remote log collector when `LOG_CRASH_*`
//! is configured. Records go through a bounded queue drained by a background
//! task, so a slow collector never stalls request handling.

use std::fmt::{self, Write};

use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{
  Event, Level, Subscriber,
  field::{Field, Visit},
};
use tracing_subscriber::{
  EnvFilter, Layer, layer::Context, layer::SubscriberExt,
  util::SubscriberInitExt,
};

use crate::config::LogCrashConfig;

const QUEUE_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashLog {
  pub project_name: String,
  pub project_version: String,
  pub log_version: String,
  pub body: String,
  pub log_source: String,
  pub log_type: String,
  pub host: String,
  pub log_level: String,
}

impl CrashLog {
  pub fn new(appkey: &str, host: &str, body: String) -> Self {
    Self {
      project_name: appkey.to_string(),
      project_version: env!("CARGO_PKG_VERSION").to_string(),
      log_version: "v2".to_string(),
      body,
      log_source: "coupon".to_string(),
      log_type: "log".to_string(),
      host: host.to_string(),
      log_level: "ERROR".to_string(),
    }
  }
}

pub struct CrashLayer {
  tx: mpsc::Sender<CrashLog>,
  appkey: String,
  host: String,
}

impl CrashLayer {
  pub fn new(tx: mpsc::Sender<CrashLog>, config: &LogCrashConfig) -> Self {
    Self { tx, appkey: config.appkey.clone(), host: config.host.clone() }
  }

  /// Builds the layer and spawns the shipping task on the current runtime.
  pub fn spawn(config: &LogCrashConfig) -> Self {
    let (tx, rx) = mpsc::channel(QUEUE_SIZE);
    tokio::spawn(ship(rx, Client::new(), config.url.clone()));
    Self::new(tx, config)
  }
}

impl<S: Subscriber> Layer<S> for CrashLayer {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    if *event.metadata().level() != Level::ERROR {
      return;
    }

    let mut visitor = Message::default();
    event.record(&mut visitor);

    let body = format!(
      "[{}] {}{}",
      event.metadata().target(),
      visitor.message,
      visitor.fields
    );
    // a full queue drops the record
    let _ = self.tx.try_send(CrashLog::new(&self.appkey, &self.host, body));
  }
}

#[derive(Default)]
struct Message {
  message: String,
  fields: String,
}

impl Visit for Message {
  fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
    if field.name() == "message" {
      let _ = write!(self.message, "{value:?}");
    } else {
      let _ = write!(self.fields, " {}={value:?}", field.name());
    }
  }
}

async fn ship(mut rx: mpsc::Receiver<CrashLog>, client: Client, url: String) {
  while let Some(log) = rx.recv().await {
    // delivery failures must not produce ERROR events of their own
    let _ = client.post(&url).json(&log).send().await;
  }
}

pub fn init(log_crash: Option<&LogCrashConfig>) {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "coupon=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .with(log_crash.map(CrashLayer::spawn))
    .init();
}

#[cfg(test)]
mod tests {
  use tracing_subscriber::registry;

  use super::*;

  fn config() -> LogCrashConfig {
    LogCrashConfig {
      url: "http://collector.local".into(),
      appkey: "appkey".into(),
      host: "coupon-1".into(),
    }
  }

  #[test]
  fn test_crash_log_defaults() {
    let log = CrashLog::new("appkey", "coupon-1", "boom".into());

    assert_eq!(log.project_name, "appkey");
    assert_eq!(log.log_version, "v2");
    assert_eq!(log.log_level, "ERROR");
    assert_eq!(log.log_type, "log");
    assert_eq!(log.host, "coupon-1");
    assert_eq!(log.body, "boom");

    let value = json::to_value(&log).unwrap();
    assert_eq!(value["projectName"], "appkey");
    assert_eq!(value["logSource"], "coupon");
  }

  #[test]
  fn test_only_errors_are_shipped() {
    let (tx, mut rx) = mpsc::channel(8);
    let subscriber = registry().with(CrashLayer::new(tx, &config()));

    tracing::subscriber::with_default(subscriber, || {
      tracing::info!("fine");
      tracing::warn!("suspicious");
      tracing::error!(coupon = 7, "redeem failed");
    });

    let log = rx.try_recv().unwrap();
    assert!(log.body.ends_with("redeem failed coupon=7"));
    assert!(rx.try_recv().is_err());
  }
}
