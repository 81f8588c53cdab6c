use std::collections::HashMap;

use actix_web::web;
use chrono::Utc;
use log::{error, info};
use mongodb::bson::oid::ObjectId;

use crate::models::{
    ApiError, BusinessUrl, DashboardStats, LatestReview, ReviewBatch, ReviewItemView, ReviewsBySource,
    ReviewsResponse, ScrapeResponse, Source,
};
use crate::traits::{ReviewScraper, Store};
use crate::utils::review_filter::{apply_query, round_to, summarize, ReviewQuery};

pub const DEFAULT_SCRAPE_LIMIT: u32 = 100;
pub const MAX_SCRAPE_LIMIT: u32 = 500;
pub const DEFAULT_FEED_LIMIT: usize = 10;
pub const MAX_FEED_LIMIT: usize = 100;

/// Scraping, per-listing review reads and the dashboard aggregates.
#[derive(Clone)]
pub struct ReviewService {
    store: web::Data<dyn Store>,
    scraper: web::Data<dyn ReviewScraper>,
}

impl ReviewService {
    pub fn new(store: web::Data<dyn Store>, scraper: web::Data<dyn ReviewScraper>) -> Self {
        Self { store, scraper }
    }

    /// Runs one scrape and replaces the stored batch. No retries.
    pub async fn scrape(&self, business: &BusinessUrl, max_reviews: Option<u32>) -> Result<ScrapeResponse, ApiError> {
        let limit = max_reviews.unwrap_or(DEFAULT_SCRAPE_LIMIT).clamp(1, MAX_SCRAPE_LIMIT);

        let reviews = self.scraper.scrape(business, limit).await.map_err(|e| {
            error!("Scrape of business URL {} failed: {}", business.id, e);
            ApiError::from(e)
        })?;

        let scraped_at = Utc::now();
        let batch = self
            .store
            .upsert_review_batch(ReviewBatch {
                id: None,
                business_url_id: business.id,
                url_hash: business.url_hash.clone(),
                url: business.url.clone(),
                source: business.source,
                reviews,
                last_scraped_at: scraped_at,
            })
            .await?;
        self.store.mark_business_url_scraped(&business.id, scraped_at).await?;

        info!("Stored {} {} reviews for business URL {}", batch.reviews.len(), business.source, business.id);
        Ok(ScrapeResponse {
            success: true,
            business_url_id: business.id.to_hex(),
            source: business.source,
            review_count: batch.reviews.len(),
            last_scraped_at: batch.last_scraped_at,
        })
    }

    /// `total` counts every review that passed the rating filter, before paging.
    pub async fn reviews_for(&self, business: &BusinessUrl, query: &ReviewQuery) -> Result<ReviewsResponse, ApiError> {
        let reviews = self
            .store
            .find_review_batch(&business.id, business.source)
            .await?
            .map(|batch| batch.reviews)
            .unwrap_or_default();

        let total = apply_query(&reviews, &ReviewQuery { offset: 0, limit: None, ..*query }).len();
        let page = apply_query(&reviews, query)
            .into_iter()
            .map(ReviewItemView::from)
            .collect();
        Ok(ReviewsResponse { reviews: page, total })
    }

    /// Most recently scraped listings first, at most `limit` reviews overall.
    pub async fn latest_reviews(&self, user_id: &ObjectId, limit: Option<usize>) -> Result<Vec<LatestReview>, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT);

        let businesses = self.store.list_business_urls(user_id).await?;
        let by_id: HashMap<ObjectId, &BusinessUrl> = businesses.iter().map(|b| (b.id, b)).collect();
        let ids: Vec<ObjectId> = by_id.keys().copied().collect();
        let batches = self.store.list_review_batches(&ids).await?;

        let mut feed = Vec::new();
        for batch in &batches {
            let Some(business) = by_id.get(&batch.business_url_id) else {
                continue;
            };
            for review in batch.reviews.iter().take(limit) {
                feed.push(LatestReview {
                    review: ReviewItemView::from(review),
                    business_name: business.name.clone(),
                    source: batch.source,
                    business_url: business.url.clone(),
                });
            }
        }
        feed.truncate(limit);
        Ok(feed)
    }

    pub async fn dashboard_stats(&self, user_id: &ObjectId) -> Result<DashboardStats, ApiError> {
        let businesses = self.store.list_business_urls(user_id).await?;
        let widgets = self.store.list_widgets(user_id).await?;
        let ids: Vec<ObjectId> = businesses.iter().map(|b| b.id).collect();
        let batches = self.store.list_review_batches(&ids).await?;

        let mut reviews_by_source = ReviewsBySource::default();
        for batch in &batches {
            match batch.source {
                Source::Google => reviews_by_source.google += batch.reviews.len(),
                Source::Facebook => reviews_by_source.facebook += batch.reviews.len(),
            }
        }
        let summary = summarize(batches.iter().flat_map(|batch| batch.reviews.iter()));

        Ok(DashboardStats {
            total_business_urls: businesses.len(),
            total_widgets: widgets.len(),
            total_reviews: summary.total,
            average_rating: summary.average.map(|avg| round_to(avg, 2)).unwrap_or(0.0),
            total_views: widgets.iter().map(|w| w.views).sum(),
            reviews_by_source,
        })
    }
}
