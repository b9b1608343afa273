// src/bin/migrate.rs
// DOCUMENTATION: Deployment-time schema migration
// PURPOSE: Apply ./migrations once; the server itself never alters the schema

use anyhow::Context;
use dotenv::dotenv;
use photo_board::config::{self, Config};

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,sqlx=warn");
    }
    env_logger::init();

    let config = Config::from_env();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    let pool = config::init_db_pool(&config)
        .await
        .context("failed to connect to database")?;

    config::run_migrations(&pool)
        .await
        .context("failed to apply migrations")?;

    log::info!("Migrations applied");
    pool.close().await;
    Ok(())
}
