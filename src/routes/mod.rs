mod auth_routes;
mod business_url_routes;
mod dashboard_routes;
mod embed_routes;
mod widget_routes;

use actix_web::web;

use crate::models::{ApiError, FieldError};

pub use auth_routes::configure as configure_auth_routes;
pub use business_url_routes::configure as configure_business_url_routes;
pub use dashboard_routes::configure as configure_dashboard_routes;
pub use embed_routes::configure as configure_embed_routes;
pub use widget_routes::configure as configure_widget_routes;

/// Malformed JSON bodies become a `body` field error instead of actix's plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::ValidationError(vec![FieldError::new("body", err.to_string())]).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(query_config());
    cfg.service(
        web::scope("/api")
            .configure(configure_auth_routes)
            .configure(configure_business_url_routes)
            .configure(configure_widget_routes)
            .configure(configure_dashboard_routes)
    );
    configure_embed_routes(cfg);
}
