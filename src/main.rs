use std::sync::Arc;

use rocket::{routes, Build, Rocket};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use config::{Config, ConfigError};
use database::{SharedStore, SqlStore, StoreError};
use leaderboard::RankedView;
use ledger::ScoreLedger;

mod config;
mod database;
mod error;
mod leaderboard;
mod ledger;
mod requests;
mod score;

#[derive(Debug, Error)]
enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to prepare the score store: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Rocket(#[from] rocket::Error),
}

/// Mounts the routes and hands the ledger and ranked view to Rocket.
/// Both share `store`.
fn build_rocket(store: SharedStore, default_limit: usize) -> Rocket<Build> {
    rocket::build()
        .mount(
            "/",
            routes![
                requests::healthcheck,
                requests::update_score,
                requests::get_all,
                requests::preflight,
            ],
        )
        .attach(requests::Cors)
        .manage(ScoreLedger::new(Arc::clone(&store)))
        .manage(RankedView::new(store, default_limit))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

#[rocket::main]
async fn main() -> Result<(), StartupError> {
    init_logging();

    let config = Config::from_env()?;
    let store = Arc::new(SqlStore::connect(&config).await?);
    store.migrate().await?;

    let result = build_rocket(store.clone(), config.default_limit)
        .launch()
        .await;

    store.close().await;
    result?;
    Ok(())
}
