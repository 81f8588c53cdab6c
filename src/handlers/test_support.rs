//! Shared wiring for handler tests: the real route table over an in-memory store.

use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use ed25519_dalek::SigningKey;

use crate::config::{ApifyConfig, ServerConfig};
use crate::models::{BusinessUrl, ReviewBatch, ReviewItem, Source, User};
use crate::routes;
use crate::services::memory_store::MemoryStore;
use crate::services::password::hash_password;
use crate::services::{ReviewService, ScrapeError, SessionService, WidgetService};
use crate::traits::{ReviewScraper, Store};
use crate::utils::url_hash::url_hash;

pub const TEST_PASSWORD: &str = "correct-password";
pub const PUBLIC_URL: &str = "https://app.reviewhub.test";

/// Returns the configured reviews, or a provider failure when none are set.
pub struct StubScraper {
    reviews: Mutex<Option<Vec<ReviewItem>>>,
}

impl StubScraper {
    pub fn set(&self, reviews: Option<Vec<ReviewItem>>) {
        *self.reviews.lock().unwrap() = reviews;
    }
}

#[async_trait]
impl ReviewScraper for StubScraper {
    async fn scrape(&self, _business: &BusinessUrl, max_reviews: u32) -> Result<Vec<ReviewItem>, ScrapeError> {
        match self.reviews.lock().unwrap().as_ref() {
            Some(reviews) => Ok(reviews.iter().take(max_reviews as usize).cloned().collect()),
            None => Err(ScrapeError::Status(503)),
        }
    }
}

pub struct TestState {
    pub store: web::Data<dyn Store>,
    pub scraper: Arc<StubScraper>,
    pub sessions: web::Data<SessionService>,
    pub config: web::Data<ServerConfig>,
}

impl TestState {
    pub fn new() -> Self {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            mongodb_uri: String::new(),
            mongodb_database: "reviewhub_test".to_string(),
            public_app_url: PUBLIC_URL.to_string(),
            session_ttl_hours: 1,
            cookie_secure: false,
            apify: ApifyConfig {
                token: None,
                base_url: "http://127.0.0.1:9".to_string(),
                google_actor: "google".to_string(),
                facebook_actor: "facebook".to_string(),
            },
        };
        Self {
            store: web::Data::from(Arc::new(MemoryStore::new()) as Arc<dyn Store>),
            scraper: Arc::new(StubScraper { reviews: Mutex::new(Some(Vec::new())) }),
            sessions: web::Data::new(SessionService::new(SigningKey::from_bytes(&[42u8; 32]), 1, false)),
            config: web::Data::new(config),
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let scraper: web::Data<dyn ReviewScraper> = web::Data::from(self.scraper.clone() as Arc<dyn ReviewScraper>);
        cfg.app_data(self.store.clone())
            .app_data(self.sessions.clone())
            .app_data(self.config.clone())
            .app_data(web::Data::new(WidgetService::new(self.store.clone())))
            .app_data(web::Data::new(ReviewService::new(self.store.clone(), scraper)));
        routes::configure(cfg);
    }

    pub async fn user(&self, email: &str) -> User {
        let hash = hash_password(TEST_PASSWORD).unwrap();
        self.store
            .create_user(User::new(email, Some(email.to_string()), None, hash))
            .await
            .unwrap()
    }

    /// A stored user plus a bearer header value for them.
    pub async fn signed_in(&self, email: &str) -> (User, String) {
        let user = self.user(email).await;
        let token = self.sessions.sign(&self.sessions.claims_for(&user).unwrap()).unwrap();
        (user, format!("Bearer {}", token))
    }

    pub async fn business(&self, user: &User, url: &str, source: Source) -> BusinessUrl {
        self.store
            .create_business_url(BusinessUrl::new(
                user.id,
                "Corner Bakery".to_string(),
                url.to_string(),
                url_hash(url),
                source,
            ))
            .await
            .unwrap()
    }

    pub async fn reviews(&self, business: &BusinessUrl, reviews: Vec<ReviewItem>) {
        self.store
            .upsert_review_batch(ReviewBatch {
                id: None,
                business_url_id: business.id,
                url_hash: business.url_hash.clone(),
                url: business.url.clone(),
                source: business.source,
                reviews,
                last_scraped_at: Utc::now(),
            })
            .await
            .unwrap();
    }
}
