use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::models::{ApiError, BusinessUrl, ReviewBatch, ReviewItem, Source, User, Widget, WidgetConfig};
use crate::services::ScrapeError;

/// Persistence seam. Handlers only ever see `web::Data<dyn Store>`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Conflict when the email is already registered.
    async fn create_user(&self, user: User) -> Result<User, ApiError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>, ApiError>;

    /// Conflict when `(url_hash, source)` is already registered by anyone.
    async fn create_business_url(&self, business: BusinessUrl) -> Result<BusinessUrl, ApiError>;
    async fn find_business_url(&self, id: &ObjectId) -> Result<Option<BusinessUrl>, ApiError>;
    /// Newest first.
    async fn list_business_urls(&self, user_id: &ObjectId) -> Result<Vec<BusinessUrl>, ApiError>;
    async fn mark_business_url_scraped(&self, id: &ObjectId, at: DateTime<Utc>) -> Result<(), ApiError>;

    /// Replaces the whole batch for `(business_url_id, source)`. Last write wins.
    async fn upsert_review_batch(&self, batch: ReviewBatch) -> Result<ReviewBatch, ApiError>;
    async fn find_review_batch(&self, business_url_id: &ObjectId, source: Source) -> Result<Option<ReviewBatch>, ApiError>;
    /// Most recently scraped first.
    async fn list_review_batches(&self, business_url_ids: &[ObjectId]) -> Result<Vec<ReviewBatch>, ApiError>;

    async fn create_widget(&self, widget: Widget) -> Result<Widget, ApiError>;
    async fn find_widget(&self, id: &ObjectId) -> Result<Option<Widget>, ApiError>;
    /// Newest first.
    async fn list_widgets(&self, user_id: &ObjectId) -> Result<Vec<Widget>, ApiError>;
    /// Rewrites the editable fields only; `views` is left alone.
    async fn update_widget(&self, id: &ObjectId, name: &str, config: &WidgetConfig) -> Result<Option<Widget>, ApiError>;
    async fn delete_widget(&self, id: &ObjectId) -> Result<bool, ApiError>;
    /// Atomic increment; returns the widget after the update.
    async fn increment_widget_views(&self, id: &ObjectId) -> Result<Option<Widget>, ApiError>;
}

/// Upstream review provider.
#[async_trait]
pub trait ReviewScraper: Send + Sync {
    async fn scrape(&self, business: &BusinessUrl, max_reviews: u32) -> Result<Vec<ReviewItem>, ScrapeError>;
}
