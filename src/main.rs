use std::sync::Arc;
use actix_web::{App, HttpServer, web, middleware::Logger};
use actix_cors::Cors;
use log::{info, error};
use dotenv::dotenv;
use std::env;

mod models;
mod handlers;
mod routes;
mod services;
mod traits;
mod utils;
mod config;

use config::{KeyConfig, ServerConfig};
use services::{ApifyScraper, MongoDBService, ReviewService, SessionService, WidgetService};
use traits::{ReviewScraper, Store};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(log_level));

    let config = ServerConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let mongodb = MongoDBService::init(&config.mongodb_uri, &config.mongodb_database)
        .await
        .map_err(|e| {
            error!("Failed to initialize MongoDB: {}", e);
            e
        })?;
    let store: web::Data<dyn Store> = web::Data::from(Arc::new(mongodb) as Arc<dyn Store>);

    // Load the session signing key from the environment or the JSON key file
    let key_config = KeyConfig::load().map_err(|e| {
        error!("Failed to load session key: {}", e);
        e
    })?;
    let sessions = web::Data::new(SessionService::new(
        key_config.session_signing_key,
        config.session_ttl_hours,
        config.cookie_secure,
    ));

    if config.apify.token.is_none() {
        error!("APIFY_TOKEN is not set - scrape requests will fail with 502");
    }
    let scraper: web::Data<dyn ReviewScraper> =
        web::Data::from(Arc::new(ApifyScraper::new(config.apify.clone())) as Arc<dyn ReviewScraper>);

    let widget_service = web::Data::new(WidgetService::new(store.clone()));
    let review_service = web::Data::new(ReviewService::new(store.clone(), scraper));

    let host = config.host.clone();
    let port = config.port;
    info!("Embed code will point at {}", config.public_app_url);
    let config_data = web::Data::new(config);

    info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        // Embeds are loaded from arbitrary customer sites
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .expose_headers(vec!["content-type", "content-length", "accept"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(sessions.clone())
            .app_data(config_data.clone())
            .app_data(widget_service.clone())
            .app_data(review_service.clone())
            .configure(routes::configure)
    })
    .bind(format!("{host}:{port}"))?
    .run()
    .await?;

    info!("Server shutting down");
    Ok(())
}
