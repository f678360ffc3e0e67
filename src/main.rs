mod config;
mod entity;
mod error;
mod logging;
mod plugins;
mod prelude;
mod state;
mod sv;

use crate::{config::Config, prelude::*, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let config = Config::from_env()?;

  logging::init(config.log_crash.as_ref());

  info!("Starting Coupon Service v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::connect(config).await?);

  plugins::App::new().register(plugins::server::Plugin).run(app).await;

  Ok(())
}
