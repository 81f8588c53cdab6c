use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use mongodb::bson;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::ApifyConfig;
use crate::models::{ApiError, BusinessUrl, ReviewItem, Source};
use crate::traits::ReviewScraper;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Scraping provider is not configured")]
    NotConfigured,
    #[error("Request to scraping provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Scraping provider returned HTTP {0}")]
    Status(u16),
    #[error("Failed to decode scraping provider response: {0}")]
    Decode(String),
}

/// Provider details stay in the server log; clients get a fixed message per kind.
impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        let message = match err {
            ScrapeError::NotConfigured => "Scraping provider is not configured".to_string(),
            ScrapeError::Transport(_) => "Scraping provider is unreachable".to_string(),
            ScrapeError::Status(code) => format!("Scraping provider returned HTTP {}", code),
            ScrapeError::Decode(_) => "Scraping provider returned an unreadable response".to_string(),
        };
        ApiError::UpstreamError(message)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleReviewItem {
    review_id: Option<String>,
    name: Option<String>,
    text: Option<String>,
    stars: Option<f64>,
    published_at_date: Option<String>,
    publish_at: Option<String>,
    reviewer_photo_url: Option<String>,
    reviewer_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacebookUser {
    name: Option<String>,
    profile_url: Option<String>,
    profile_pic: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacebookReviewItem {
    id: Option<String>,
    user: Option<FacebookUser>,
    text: Option<String>,
    date: Option<String>,
    is_recommended: Option<bool>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn map_google(item: GoogleReviewItem, scraped_at: bson::DateTime) -> Option<ReviewItem> {
    Some(ReviewItem {
        review_id: item.review_id,
        author: non_empty(item.name)?,
        content: non_empty(item.text)?,
        rating: item.stars.filter(|s| s.is_finite()),
        posted_at: item.published_at_date.or(item.publish_at).unwrap_or_default(),
        profile_picture: non_empty(item.reviewer_photo_url),
        recommendation_status: None,
        user_profile: non_empty(item.reviewer_url),
        scraped_at: Some(scraped_at),
    })
}

fn map_facebook(item: FacebookReviewItem, scraped_at: bson::DateTime) -> Option<ReviewItem> {
    let (name, profile_url, profile_pic) = match item.user {
        Some(user) => (user.name, user.profile_url, user.profile_pic),
        None => (None, None, None),
    };
    Some(ReviewItem {
        review_id: item.id,
        author: non_empty(name)?,
        content: non_empty(item.text)?,
        rating: None,
        posted_at: item.date.unwrap_or_default(),
        profile_picture: non_empty(profile_pic),
        recommendation_status: item
            .is_recommended
            .map(|r| if r { "recommended" } else { "not_recommended" }.to_string()),
        user_profile: non_empty(profile_url),
        scraped_at: Some(scraped_at),
    })
}

/// Maps raw dataset items for `source`, dropping any without an author or text.
fn map_items(source: Source, items: Vec<serde_json::Value>) -> Vec<ReviewItem> {
    let scraped_at = bson::DateTime::from_chrono(Utc::now());
    items
        .into_iter()
        .filter_map(|value| match source {
            Source::Google => serde_json::from_value::<GoogleReviewItem>(value)
                .ok()
                .and_then(|item| map_google(item, scraped_at)),
            Source::Facebook => serde_json::from_value::<FacebookReviewItem>(value)
                .ok()
                .and_then(|item| map_facebook(item, scraped_at)),
        })
        .collect()
}

/// Client for the Apify actor API. Each scrape is one synchronous actor run.
#[derive(Clone)]
pub struct ApifyScraper {
    config: ApifyConfig,
    client: Client,
}

impl ApifyScraper {
    pub fn new(config: ApifyConfig) -> Self {
        info!("Scraper client using {}", config.base_url);
        Self {
            config,
            client: Client::new(),
        }
    }

    fn actor(&self, source: Source) -> &str {
        match source {
            Source::Google => &self.config.google_actor,
            Source::Facebook => &self.config.facebook_actor,
        }
    }

    fn input(source: Source, url: &str, max_reviews: u32) -> serde_json::Value {
        match source {
            Source::Google => json!({
                "startUrls": [{ "url": url }],
                "maxReviews": max_reviews,
                "reviewsSort": "newest",
            }),
            Source::Facebook => json!({
                "startUrls": [{ "url": url }],
                "resultsLimit": max_reviews,
            }),
        }
    }
}

#[async_trait]
impl ReviewScraper for ApifyScraper {
    async fn scrape(&self, business: &BusinessUrl, max_reviews: u32) -> Result<Vec<ReviewItem>, ScrapeError> {
        let token = self.config.token.as_deref().ok_or(ScrapeError::NotConfigured)?;
        let url = format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.config.base_url.trim_end_matches('/'),
            self.actor(business.source)
        );
        info!("Scraping up to {} {} reviews for {}", max_reviews, business.source, business.id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&Self::input(business.source, &business.url, max_reviews))
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Request to scraping provider failed: {}", e);
                ScrapeError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error response".to_string());
            error!("Scraping provider returned HTTP {} - {}", status, body);
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let items = response.json::<Vec<serde_json::Value>>().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to decode scraping provider response: {}", e);
            ScrapeError::Decode(e.to_string())
        })?;

        let reviews = map_items(business.source, items);
        info!("Scraped {} reviews for {}", reviews.len(), business.id);
        Ok(reviews)
    }
}
