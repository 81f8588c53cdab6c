use serde::{Deserialize, Serialize};
use mongodb::bson::{self, oid::ObjectId};
use chrono::{DateTime, Utc};

use super::business_url::Source;

/// One review as scraped from a provider. Embedded in a `ReviewBatch`.
///
/// `rating` is absent for Facebook reviews that only carry a
/// recommendation flag.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub posted_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<bson::DateTime>,
}

impl ReviewItem {
    pub fn is_recommended(&self) -> bool {
        self.recommendation_status.as_deref() == Some("recommended")
    }
}

/// The full set of reviews most recently scraped for one listing from one source.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBatch {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub business_url_id: ObjectId,
    pub url_hash: String,
    pub url: String,
    pub source: Source,
    #[serde(default)]
    pub reviews: Vec<ReviewItem>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub last_scraped_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItemView {
    pub review_id: Option<String>,
    pub author: String,
    pub content: String,
    pub rating: Option<f64>,
    pub posted_at: String,
    pub profile_picture: Option<String>,
    pub recommendation_status: Option<String>,
    pub user_profile: Option<String>,
    pub scraped_at: Option<DateTime<Utc>>,
}

impl From<&ReviewItem> for ReviewItemView {
    fn from(review: &ReviewItem) -> Self {
        Self {
            review_id: review.review_id.clone(),
            author: review.author.clone(),
            content: review.content.clone(),
            rating: review.rating,
            posted_at: review.posted_at.clone(),
            profile_picture: review.profile_picture.clone(),
            recommendation_status: review.recommendation_status.clone(),
            user_profile: review.user_profile.clone(),
            scraped_at: review.scraped_at.map(|at| at.to_chrono()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewItemView>,
    pub total: usize,
}

/// A review on the dashboard feed, annotated with the listing it came from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReview {
    #[serde(flatten)]
    pub review: ReviewItemView,
    pub business_name: String,
    pub source: Source,
    pub business_url: String,
}

#[derive(Debug, Serialize)]
pub struct LatestReviewsResponse {
    pub reviews: Vec<LatestReview>,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct ReviewsBySource {
    pub google: usize,
    pub facebook: usize,
}

#[derive(Debug, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_business_urls: usize,
    pub total_widgets: usize,
    pub total_reviews: usize,
    pub average_rating: f64,
    pub total_views: i64,
    pub reviews_by_source: ReviewsBySource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    pub success: bool,
    pub business_url_id: String,
    pub source: Source,
    pub review_count: usize,
    pub last_scraped_at: DateTime<Utc>,
}
