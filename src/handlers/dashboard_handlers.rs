use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;

use crate::models::{ApiError, LatestReviewsResponse};
use crate::services::{AuthContext, ReviewService};

#[derive(Debug, Deserialize)]
pub struct LatestReviewsParams {
    pub limit: Option<usize>,
}

pub async fn latest_reviews(
    auth: AuthContext,
    reviews: web::Data<ReviewService>,
    params: web::Query<LatestReviewsParams>,
) -> Result<HttpResponse, ApiError> {
    info!("Fetching latest reviews for user {}", auth.user_id);
    let feed = reviews.latest_reviews(&auth.user_id, params.limit).await?;
    Ok(HttpResponse::Ok().json(LatestReviewsResponse { reviews: feed }))
}

pub async fn stats(
    auth: AuthContext,
    reviews: web::Data<ReviewService>,
) -> Result<HttpResponse, ApiError> {
    info!("Computing dashboard stats for user {}", auth.user_id);
    Ok(HttpResponse::Ok().json(reviews.dashboard_stats(&auth.user_id).await?))
}
