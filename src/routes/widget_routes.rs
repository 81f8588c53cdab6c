use actix_web::web;
use crate::handlers::widget_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/widgets")
            .route("", web::get().to(widget_handlers::list_widgets))
            .route("", web::post().to(widget_handlers::create_widget))
            // Must precede /{id}
            .route("/preview", web::post().to(widget_handlers::preview_widget))
            .route("/{id}", web::get().to(widget_handlers::get_widget))
            .route("/{id}", web::patch().to(widget_handlers::update_widget))
            .route("/{id}", web::delete().to(widget_handlers::delete_widget))
            .route("/{id}/embed-code", web::get().to(widget_handlers::get_embed_code))
            .route("/{id}/preview", web::get().to(widget_handlers::preview_saved_widget))
    );
}
