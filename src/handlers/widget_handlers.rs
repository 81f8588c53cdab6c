use actix_web::{web, HttpResponse};
use log::info;

use crate::config::ServerConfig;
use crate::models::{ApiError, WidgetPayload, WidgetView, WidgetsResponse};
use crate::services::access::{owned_widget, parse_object_id};
use crate::services::{AuthContext, WidgetService};
use crate::traits::Store;
use crate::utils::embed_code::embed_code;

pub async fn list_widgets(
    auth: AuthContext,
    widgets: web::Data<WidgetService>,
) -> Result<HttpResponse, ApiError> {
    info!("Listing widgets for user {}", auth.user_id);
    let views = widgets.list_views(&auth.user_id).await?;
    Ok(HttpResponse::Ok().json(WidgetsResponse { widgets: views }))
}

pub async fn create_widget(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    widgets: web::Data<WidgetService>,
    body: web::Json<WidgetPayload>,
) -> Result<HttpResponse, ApiError> {
    info!("Creating widget for user {}", auth.user_id);
    let widget = widgets.create(&auth.user_id, &body).await?;
    let business = store.find_business_url(&widget.business_url_id).await?;
    Ok(HttpResponse::Created().json(WidgetView::with_business(&widget, business.as_ref())))
}

pub async fn get_widget(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "widget")?;
    let widget = owned_widget(store.get_ref(), &auth.user_id, &id).await?;
    let business = store.find_business_url(&widget.business_url_id).await?;
    Ok(HttpResponse::Ok().json(WidgetView::with_business(&widget, business.as_ref())))
}

pub async fn update_widget(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    widgets: web::Data<WidgetService>,
    path: web::Path<String>,
    body: web::Json<WidgetPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "widget")?;
    let widget = owned_widget(store.get_ref(), &auth.user_id, &id).await?;

    info!("Updating widget {}", id);
    let updated = widgets.update(&auth.user_id, &widget, body.into_inner()).await?;
    let business = store.find_business_url(&updated.business_url_id).await?;
    Ok(HttpResponse::Ok().json(WidgetView::with_business(&updated, business.as_ref())))
}

pub async fn delete_widget(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "widget")?;
    owned_widget(store.get_ref(), &auth.user_id, &id).await?;

    if !store.delete_widget(&id).await? {
        return Err(ApiError::NotFound("Widget not found".to_string()));
    }
    info!("Deleted widget {}", id);
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_embed_code(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    config: web::Data<ServerConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "widget")?;
    let widget = owned_widget(store.get_ref(), &auth.user_id, &id).await?;
    Ok(HttpResponse::Ok().json(embed_code(&config.public_app_url, &widget.id.to_hex(), &widget.name)))
}

/// Renders a saved widget for the dashboard. Views are only counted on the embed route.
pub async fn preview_saved_widget(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    widgets: web::Data<WidgetService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "widget")?;
    let widget = owned_widget(store.get_ref(), &auth.user_id, &id).await?;
    Ok(HttpResponse::Ok().json(widgets.render_widget(&widget).await?))
}

/// On-demand render of an unsaved configuration. Side-effect free.
pub async fn preview_widget(
    auth: AuthContext,
    widgets: web::Data<WidgetService>,
    body: web::Json<WidgetPayload>,
) -> Result<HttpResponse, ApiError> {
    info!("Previewing widget configuration for user {}", auth.user_id);
    Ok(HttpResponse::Ok().json(widgets.preview(&auth.user_id, &body).await?))
}
