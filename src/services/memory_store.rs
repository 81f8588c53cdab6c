//! In-process `Store` used by the handler and service tests. Enforces the same
//! uniqueness rules as the MongoDB indexes.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};

use crate::models::{ApiError, BusinessUrl, ReviewBatch, Source, User, Widget, WidgetConfig};
use crate::traits::Store;

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    business_urls: Vec<BusinessUrl>,
    review_batches: Vec<ReviewBatch>,
    widgets: Vec<Widget>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User, ApiError> {
        let mut db = self.lock();
        if db.users.iter().any(|u| u.email == user.email) {
            return Err(ApiError::Conflict("An account with this email already exists".to_string()));
        }
        db.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>, ApiError> {
        Ok(self.lock().users.iter().find(|u| &u.id == id).cloned())
    }

    async fn create_business_url(&self, business: BusinessUrl) -> Result<BusinessUrl, ApiError> {
        let mut db = self.lock();
        if db
            .business_urls
            .iter()
            .any(|b| b.url_hash == business.url_hash && b.source == business.source)
        {
            return Err(ApiError::Conflict("This business URL has already been added".to_string()));
        }
        db.business_urls.push(business.clone());
        Ok(business)
    }

    async fn find_business_url(&self, id: &ObjectId) -> Result<Option<BusinessUrl>, ApiError> {
        Ok(self.lock().business_urls.iter().find(|b| &b.id == id).cloned())
    }

    async fn list_business_urls(&self, user_id: &ObjectId) -> Result<Vec<BusinessUrl>, ApiError> {
        let mut found: Vec<BusinessUrl> = self
            .lock()
            .business_urls
            .iter()
            .filter(|b| &b.user_id == user_id)
            .cloned()
            .collect();
        found.reverse();
        found.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(found)
    }

    async fn mark_business_url_scraped(&self, id: &ObjectId, at: DateTime<Utc>) -> Result<(), ApiError> {
        if let Some(business) = self.lock().business_urls.iter_mut().find(|b| &b.id == id) {
            business.last_scraped_at = Some(bson::DateTime::from_chrono(at));
        }
        Ok(())
    }

    async fn upsert_review_batch(&self, batch: ReviewBatch) -> Result<ReviewBatch, ApiError> {
        let mut db = self.lock();
        let existing = db
            .review_batches
            .iter_mut()
            .find(|b| b.business_url_id == batch.business_url_id && b.source == batch.source);
        match existing {
            Some(current) => {
                let id = current.id;
                *current = ReviewBatch { id, ..batch };
                Ok(current.clone())
            }
            None => {
                let stored = ReviewBatch { id: Some(ObjectId::new()), ..batch };
                db.review_batches.push(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn find_review_batch(&self, business_url_id: &ObjectId, source: Source) -> Result<Option<ReviewBatch>, ApiError> {
        Ok(self
            .lock()
            .review_batches
            .iter()
            .find(|b| &b.business_url_id == business_url_id && b.source == source)
            .cloned())
    }

    async fn list_review_batches(&self, business_url_ids: &[ObjectId]) -> Result<Vec<ReviewBatch>, ApiError> {
        let mut found: Vec<ReviewBatch> = self
            .lock()
            .review_batches
            .iter()
            .filter(|b| business_url_ids.contains(&b.business_url_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.last_scraped_at.cmp(&a.last_scraped_at));
        Ok(found)
    }

    async fn create_widget(&self, widget: Widget) -> Result<Widget, ApiError> {
        self.lock().widgets.push(widget.clone());
        Ok(widget)
    }

    async fn find_widget(&self, id: &ObjectId) -> Result<Option<Widget>, ApiError> {
        Ok(self.lock().widgets.iter().find(|w| &w.id == id).cloned())
    }

    async fn list_widgets(&self, user_id: &ObjectId) -> Result<Vec<Widget>, ApiError> {
        let mut found: Vec<Widget> = self
            .lock()
            .widgets
            .iter()
            .filter(|w| &w.user_id == user_id)
            .cloned()
            .collect();
        found.reverse();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_widget(&self, id: &ObjectId, name: &str, config: &WidgetConfig) -> Result<Option<Widget>, ApiError> {
        let mut db = self.lock();
        Ok(db.widgets.iter_mut().find(|w| &w.id == id).map(|widget| {
            widget.name = name.to_string();
            widget.business_url_id = config.business_url_id;
            widget.max_reviews = config.max_reviews;
            widget.min_rating = config.min_rating;
            widget.settings = config.settings.clone();
            widget.updated_at = Utc::now();
            widget.clone()
        }))
    }

    async fn delete_widget(&self, id: &ObjectId) -> Result<bool, ApiError> {
        let mut db = self.lock();
        let before = db.widgets.len();
        db.widgets.retain(|w| &w.id != id);
        Ok(db.widgets.len() < before)
    }

    async fn increment_widget_views(&self, id: &ObjectId) -> Result<Option<Widget>, ApiError> {
        let mut db = self.lock();
        Ok(db.widgets.iter_mut().find(|w| &w.id == id).map(|widget| {
            widget.views += 1;
            widget.clone()
        }))
    }
}
