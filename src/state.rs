use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

use crate::{config::Config, prelude::*, sv};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  serving: AtomicBool,
}

impl AppState {
  pub fn new(db: DatabaseConnection, config: Config) -> Self {
    Self { db, config, serving: AtomicBool::new(true) }
  }

  /// Resolves the database URL (from the key manager when configured),
  /// connects and brings the schema up to date.
  pub async fn connect(config: Config) -> anyhow::Result<Self> {
    let db_url = match &config.key_manager {
      Some(km) => sv::KeyManager::new(km.clone())
        .fetch_database_url()
        .await
        .context("Failed to fetch database credentials")?,
      None => config.database_url.clone(),
    };

    let db = Database::connect(db_url.as_str())
      .await
      .context("Failed to connect to database")?;

    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Ok(Self::new(db, config))
  }

  pub fn sv(&self) -> Services<'_> {
    Services { db: &self.db }
  }

  pub fn is_serving(&self) -> bool {
    self.serving.load(Ordering::Relaxed)
  }

  /// Flips the status reported by the health endpoint, used to drain the
  /// instance from the load balancer before shutdown.
  pub fn set_serving(&self, serving: bool) {
    self.serving.store(serving, Ordering::Relaxed);
    info!("Service status set to {}", if serving { "UP" } else { "DOWN" });
  }
}

pub struct Services<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Services<'a> {
  pub fn coupon(&self) -> sv::Coupon<'a> {
    sv::Coupon::new(self.db)
  }

  pub fn policy(&self) -> sv::Policy<'a> {
    sv::Policy::new(self.db)
  }
}
