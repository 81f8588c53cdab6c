use actix_web::http::header::{CacheControl, CacheDirective, ContentType};
use actix_web::{web, HttpResponse};
use log::{info, warn};

use crate::config::ServerConfig;
use crate::models::ApiError;
use crate::services::access::parse_object_id;
use crate::services::WidgetService;
use crate::utils::embed_code::loader_script;
use crate::utils::embed_page::render_page;

/// `/widget.js`, loaded by host pages through the script snippet.
pub async fn widget_loader(config: web::Data<ServerConfig>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .insert_header(CacheControl(vec![CacheDirective::Public, CacheDirective::MaxAge(300)]))
        .body(loader_script(&config.public_app_url))
}

/// Public iframe page. Every successful render counts one view.
pub async fn embed_widget(
    widgets: web::Data<WidgetService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "widget")?;
    let (widget, rendered) = widgets.record_view_and_render(&id).await.map_err(|e| {
        warn!("Embed render failed for widget {}: {}", id, e);
        e
    })?;

    info!("Served embed for widget {} (views: {})", widget.id, widget.views);
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .body(render_page(&widget.name, &rendered)))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};

    use crate::handlers::test_support::{TestState, PUBLIC_URL};
    use crate::models::{Source, Widget, WidgetConfig, WidgetLayout, WidgetSettings};
    use crate::utils::review_filter::review;

    #[actix_web::test]
    async fn test_embed_page_counts_views() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
        let owner = state.user("owner@example.com").await;
        let business = state.business(&owner, "https://maps.google.com/?cid=6", Source::Google).await;
        let mut hostile = review("<b>mallory</b>", Some(5.0));
        hostile.content = "<script>alert('x')</script>".to_string();
        state.reviews(&business, vec![hostile, review("ana", Some(4.0))]).await;

        let widget = state
            .store
            .create_widget(Widget::new(
                owner.id,
                "Homepage".to_string(),
                WidgetConfig {
                    business_url_id: business.id,
                    max_reviews: 10,
                    min_rating: 0.0,
                    settings: WidgetSettings::new(WidgetLayout::Carousel, "#3182CE".to_string(), true, true, true),
                },
            ))
            .await
            .unwrap();
        let uri = format!("/embed/widget/{}", widget.id.to_hex());

        for _ in 0..3 {
            let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body = test::read_body(resp).await;
            let html = std::str::from_utf8(&body).unwrap();
            assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
            assert!(!html.contains("<b>mallory</b>"));
            assert!(html.contains("rh-carousel"));
        }

        let stored = state.store.find_widget(&widget.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 3);
    }

    #[actix_web::test]
    async fn test_embed_unknown_widget() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

        let uri = format!("/embed/widget/{}", mongodb::bson::oid::ObjectId::new().to_hex());
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/embed/widget/xyz").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_loader_and_health() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/widget.js").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let script = std::str::from_utf8(&body).unwrap();
        assert!(script.contains("window.ReviewHub.initWidget"));
        assert!(script.contains(&format!("{}/embed/widget/", PUBLIC_URL)));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
