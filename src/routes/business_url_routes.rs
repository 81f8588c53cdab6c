use actix_web::web;
use crate::handlers::business_url_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/business-urls")
            .route("", web::get().to(business_url_handlers::list_business_urls))
            .route("", web::post().to(business_url_handlers::create_business_url))
            .route("/{id}", web::get().to(business_url_handlers::get_business_url))
            .route("/{id}/reviews", web::get().to(business_url_handlers::get_reviews))
            .route("/{id}/scrape", web::post().to(business_url_handlers::scrape_business_url))
    );
}
