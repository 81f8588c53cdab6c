use actix_web::web;
use crate::handlers::dashboard_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("/latest-reviews", web::get().to(dashboard_handlers::latest_reviews))
            .route("/stats", web::get().to(dashboard_handlers::stats))
    );
}
