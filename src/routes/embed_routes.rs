use actix_web::web;
use crate::handlers::embed_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/widget.js", web::get().to(embed_handlers::widget_loader))
        .route("/embed/widget/{id}", web::get().to(embed_handlers::embed_widget))
        .route("/health", web::get().to(embed_handlers::health));
}
