use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, anyhow};

#[derive(Debug, Clone, PartialEq)]
pub struct KeyManagerConfig {
  pub url: String,
  pub appkey: String,
  pub key_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogCrashConfig {
  pub url: String,
  pub appkey: String,
  pub host: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub request_timeout: Duration,
  pub rate_per_second: u64,
  pub rate_burst: u32,
  pub key_manager: Option<KeyManagerConfig>,
  pub log_crash: Option<LogCrashConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: "sqlite:coupons.db?mode=rwc".into(),
      port: 3000,
      request_timeout: Duration::from_secs(30),
      rate_per_second: 10,
      rate_burst: 100,
      key_manager: None,
      log_crash: None,
    }
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  pub fn from_lookup(
    var: impl Fn(&str) -> Option<String>,
  ) -> anyhow::Result<Self> {
    let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());
    let default = Self::default();

    let request_timeout = match var("REQUEST_TIMEOUT") {
      Some(raw) => humantime::parse_duration(&raw)
        .with_context(|| format!("Invalid REQUEST_TIMEOUT `{raw}`"))?,
      None => default.request_timeout,
    };

    let key_manager = match (
      var("KEY_MANAGER_URL"),
      var("KEY_MANAGER_APPKEY"),
      var("KEY_MANAGER_KEY_ID"),
    ) {
      (Some(url), Some(appkey), Some(key_id)) => {
        Some(KeyManagerConfig { url, appkey, key_id })
      }
      (None, None, None) => None,
      _ => return Err(anyhow!("Key manager config is incomplete")),
    };

    let log_crash = match (var("LOG_CRASH_URL"), var("LOG_CRASH_APPKEY")) {
      (Some(url), Some(appkey)) => Some(LogCrashConfig {
        url,
        appkey,
        host: var("LOG_CRASH_HOST").unwrap_or_else(|| "coupon".into()),
      }),
      (None, None) => None,
      _ => return Err(anyhow!("Log crash config is incomplete")),
    };

    Ok(Self {
      database_url: var("DATABASE_URL").unwrap_or(default.database_url),
      port: parse(&var, "PORT")?.unwrap_or(default.port),
      request_timeout,
      rate_per_second: parse(&var, "RATE_LIMIT_PER_SECOND")?
        .unwrap_or(default.rate_per_second),
      rate_burst: parse(&var, "RATE_LIMIT_BURST")?
        .unwrap_or(default.rate_burst),
      key_manager,
      log_crash,
    })
  }
}

fn parse<T>(
  var: &impl Fn(&str) -> Option<String>,
  key: &str,
) -> anyhow::Result<Option<T>>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  var(key)
    .map(|raw| raw.trim().parse().with_context(|| format!("Invalid {key}")))
    .transpose()
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
    let vars: HashMap<String, String> =
      vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Config::from_lookup(|key| vars.get(key).cloned())
  }

  #[test]
  fn test_defaults() {
    assert_eq!(config(&[]).unwrap(), Config::default());
  }

  #[test]
  fn test_overrides() {
    let config = config(&[
      ("DATABASE_URL", "mysql://localhost/coupon"),
      ("PORT", "8081"),
      ("REQUEST_TIMEOUT", "1m 30s"),
      ("LOG_CRASH_URL", "https://collector.local/v2/log"),
      ("LOG_CRASH_APPKEY", "appkey"),
    ])
    .unwrap();

    assert_eq!(config.database_url, "mysql://localhost/coupon");
    assert_eq!(config.port, 8081);
    assert_eq!(config.request_timeout, Duration::from_secs(90));
    assert_eq!(config.log_crash.unwrap().host, "coupon");
    assert!(config.key_manager.is_none());
  }

  #[test]
  fn test_invalid_values() {
    assert!(config(&[("PORT", "http")]).is_err());
    assert!(config(&[("REQUEST_TIMEOUT", "soon")]).is_err());
    assert!(config(&[("KEY_MANAGER_URL", "https://km.local")]).is_err());
  }
}
