use actix_web::web;
use log::info;
use mongodb::bson::oid::ObjectId;

use crate::models::{ApiError, BusinessUrl, Widget, WidgetConfig, WidgetPayload, WidgetView};
use crate::services::access::owned_business_url;
use crate::traits::Store;
use crate::utils::layout_renderer::{render, BusinessSummary, RenderedWidget};
use crate::utils::widget_validator::{validate_config, validate_widget, ValidatedWidget};

/// Widget lifecycle plus the render pipeline shared by previews and the embed page.
#[derive(Clone)]
pub struct WidgetService {
    store: web::Data<dyn Store>,
}

impl WidgetService {
    pub fn new(store: web::Data<dyn Store>) -> Self {
        Self { store }
    }

    async fn owned_business_ids(&self, user_id: &ObjectId) -> Result<Vec<ObjectId>, ApiError> {
        Ok(self
            .store
            .list_business_urls(user_id)
            .await?
            .into_iter()
            .map(|b| b.id)
            .collect())
    }

    pub async fn validate(&self, user_id: &ObjectId, payload: &WidgetPayload) -> Result<ValidatedWidget, ApiError> {
        let owned = self.owned_business_ids(user_id).await?;
        validate_widget(payload, &owned).map_err(ApiError::ValidationError)
    }

    pub async fn create(&self, user_id: &ObjectId, payload: &WidgetPayload) -> Result<Widget, ApiError> {
        let validated = self.validate(user_id, payload).await?;
        let widget = self
            .store
            .create_widget(Widget::new(*user_id, validated.name, validated.config))
            .await?;
        info!("Created {} widget {} for user {}", widget.settings.layout().as_str(), widget.id, user_id);
        Ok(widget)
    }

    /// Overlays `patch` on the saved widget and validates the merged result as a whole.
    pub async fn update(&self, user_id: &ObjectId, widget: &Widget, patch: WidgetPayload) -> Result<Widget, ApiError> {
        let merged = widget.to_payload().overlay(patch);
        let validated = self.validate(user_id, &merged).await?;
        self.store
            .update_widget(&widget.id, &validated.name, &validated.config)
            .await?
            .ok_or_else(|| ApiError::NotFound("Widget not found".to_string()))
    }

    /// Widgets newest first, each with its listing summary when the listing still exists.
    pub async fn list_views(&self, user_id: &ObjectId) -> Result<Vec<WidgetView>, ApiError> {
        let widgets = self.store.list_widgets(user_id).await?;
        let businesses = self.store.list_business_urls(user_id).await?;
        Ok(widgets
            .iter()
            .map(|widget| {
                let business = businesses.iter().find(|b| b.id == widget.business_url_id);
                WidgetView::with_business(widget, business)
            })
            .collect())
    }

    async fn render_for(&self, config: &WidgetConfig, business: &BusinessUrl) -> Result<RenderedWidget, ApiError> {
        let reviews = self
            .store
            .find_review_batch(&business.id, business.source)
            .await?
            .map(|batch| batch.reviews)
            .unwrap_or_default();

        let summary = BusinessSummary {
            name: business.name.clone(),
            source: business.source,
        };
        Ok(render(config, &summary, &reviews))
    }

    /// Renders a saved widget. Does not touch the view counter.
    pub async fn render_widget(&self, widget: &Widget) -> Result<RenderedWidget, ApiError> {
        let business = self
            .store
            .find_business_url(&widget.business_url_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Business URL not found".to_string()))?;
        self.render_for(&widget.config(), &business).await
    }

    /// Renders an unsaved configuration against one of the caller's listings.
    pub async fn preview(&self, user_id: &ObjectId, payload: &WidgetPayload) -> Result<RenderedWidget, ApiError> {
        let owned = self.owned_business_ids(user_id).await?;
        let config = validate_config(&payload.config, &owned).map_err(ApiError::ValidationError)?;
        let business = owned_business_url(self.store.get_ref(), user_id, &config.business_url_id).await?;
        self.render_for(&config, &business).await
    }

    /// Public embed render: counts the view atomically, then renders.
    pub async fn record_view_and_render(&self, id: &ObjectId) -> Result<(Widget, RenderedWidget), ApiError> {
        let widget = self
            .store
            .increment_widget_views(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Widget not found".to_string()))?;
        let rendered = self.render_widget(&widget).await?;
        Ok((widget, rendered))
    }
}
