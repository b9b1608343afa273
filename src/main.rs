// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, media host client, and start HTTP server

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use photo_board::config::{self, Config};
use photo_board::db::{PgPhotoStore, PhotoStore};
use photo_board::handlers;
use photo_board::services::{CloudinaryClient, MediaStorage};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.clone()
        } else {
            "info,actix_web=info,sqlx=warn".to_string()
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting photo-board...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool (schema is managed by the migrate binary)
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    let store: Arc<dyn PhotoStore> = Arc::new(PgPhotoStore::new(pool));

    // 5. Initialize media host client
    let media: Arc<dyn MediaStorage> = match CloudinaryClient::new(config.cloudinary.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("Failed to build Cloudinary client: {}", e);
            std::process::exit(1);
        }
    };

    std::fs::create_dir_all(&config.uploads.dir)?;
    log::info!("Staging uploads in {}", config.uploads.dir.display());

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let uploads = config.uploads.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            // Application state (store, media host, upload settings)
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::from(media.clone()))
            .app_data(web::Data::new(uploads.clone()))
            // Middleware
            .wrap(cors)
            .wrap(Logger::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::photos_config)
            .configure(handlers::comments_config)
            // Staged uploads, after the API routes so "/" stays the listing
            .service(Files::new("/", uploads.dir.clone()))
    })
    .bind(&server_addr)?
    .run()
    .await
}
