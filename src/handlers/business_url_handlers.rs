use actix_web::{web, HttpResponse};
use log::info;
use reqwest::Url;
use serde::Deserialize;

use crate::models::{
    ApiError, BusinessUrl, BusinessUrlView, BusinessUrlsResponse, CreateBusinessUrlRequest, FieldError, Source,
};
use crate::services::access::{owned_business_url, parse_object_id};
use crate::services::{AuthContext, ReviewService};
use crate::traits::Store;
use crate::utils::review_filter::ReviewQuery;
use crate::utils::url_hash::url_hash;

pub const DEFAULT_REVIEWS_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub min_rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeParams {
    pub max_reviews: Option<u32>,
}

struct NewBusinessUrl {
    name: String,
    url: String,
    source: Source,
}

fn validate_business_url(request: CreateBusinessUrlRequest) -> Result<NewBusinessUrl, ApiError> {
    let mut errors = Vec::new();

    let name = request.name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Business name is required."));
    }

    let url = request.url.unwrap_or_default().trim().to_string();
    match Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() => {}
        _ => errors.push(FieldError::new("url", "Please enter a valid http(s) URL.")),
    }

    let source = match request.source.as_deref().map(str::trim) {
        Some(raw) => match raw.parse::<Source>() {
            Ok(source) => Some(source),
            Err(_) => {
                errors.push(FieldError::new("source", "Source must be google or facebook."));
                None
            }
        },
        None => {
            errors.push(FieldError::new("source", "Source is required."));
            None
        }
    };

    match source {
        Some(source) if errors.is_empty() => Ok(NewBusinessUrl { name, url, source }),
        _ => Err(ApiError::ValidationError(errors)),
    }
}

pub async fn list_business_urls(
    auth: AuthContext,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, ApiError> {
    info!("Listing business URLs for user {}", auth.user_id);
    let businesses = store.list_business_urls(&auth.user_id).await?;
    Ok(HttpResponse::Ok().json(BusinessUrlsResponse {
        business_urls: businesses.iter().map(BusinessUrlView::from).collect(),
    }))
}

pub async fn create_business_url(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    body: web::Json<CreateBusinessUrlRequest>,
) -> Result<HttpResponse, ApiError> {
    let new = validate_business_url(body.into_inner())?;
    info!("Adding {} business URL for user {}", new.source, auth.user_id);

    let hash = url_hash(&new.url);
    let business = store
        .create_business_url(BusinessUrl::new(auth.user_id, new.name, new.url, hash, new.source))
        .await?;

    info!("Created business URL {}", business.id);
    Ok(HttpResponse::Created().json(BusinessUrlView::from(&business)))
}

pub async fn get_business_url(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "business URL")?;
    let business = owned_business_url(store.get_ref(), &auth.user_id, &id).await?;
    Ok(HttpResponse::Ok().json(BusinessUrlView::from(&business)))
}

pub async fn get_reviews(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    reviews: web::Data<ReviewService>,
    path: web::Path<String>,
    params: web::Query<ReviewsParams>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "business URL")?;
    let business = owned_business_url(store.get_ref(), &auth.user_id, &id).await?;

    if let Some(min) = params.min_rating {
        if !(0.0..=5.0).contains(&min) {
            return Err(ApiError::field("minRating", "Rating must be between 0 and 5."));
        }
    }
    let query = ReviewQuery {
        min_rating: params.min_rating,
        offset: params.offset.unwrap_or(0),
        limit: Some(params.limit.unwrap_or(DEFAULT_REVIEWS_LIMIT)),
    };

    info!("Fetching reviews for business URL {}", id);
    Ok(HttpResponse::Ok().json(reviews.reviews_for(&business, &query).await?))
}

pub async fn scrape_business_url(
    auth: AuthContext,
    store: web::Data<dyn Store>,
    reviews: web::Data<ReviewService>,
    path: web::Path<String>,
    params: web::Query<ScrapeParams>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path, "business URL")?;
    let business = owned_business_url(store.get_ref(), &auth.user_id, &id).await?;

    info!("Scrape requested for business URL {} by user {}", id, auth.user_id);
    let response = reviews.scrape(&business, params.max_reviews).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::handlers::test_support::TestState;
    use crate::models::Source;
    use crate::utils::review_filter::review;

    #[actix_web::test]
    async fn test_create_and_list() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
        let (_, auth) = state.signed_in("owner@example.com").await;

        let req = test::TestRequest::post()
            .uri("/api/business-urls")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "name": "Corner Bakery", "url": "https://maps.google.com/?cid=42", "source": "google" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["source"], "google");
        assert_eq!(created["urlHash"].as_str().unwrap().len(), 64);

        let req = test::TestRequest::get()
            .uri("/api/business-urls")
            .insert_header(("Authorization", auth))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["businessUrls"].as_array().unwrap().len(), 1);
        assert_eq!(body["businessUrls"][0]["id"], created["id"]);
    }

    #[actix_web::test]
    async fn test_duplicate_url_conflicts_across_users() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
        let (first, _) = state.signed_in("first@example.com").await;
        let (_, second_auth) = state.signed_in("second@example.com").await;
        state.business(&first, "https://www.facebook.com/cornerbakery", Source::Facebook).await;

        let req = test::TestRequest::post()
            .uri("/api/business-urls")
            .insert_header(("Authorization", second_auth.clone()))
            .set_json(json!({ "name": "Mine", "url": " https://www.facebook.com/cornerbakery ", "source": "facebook" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // Same URL under the other source is a different listing
        let req = test::TestRequest::post()
            .uri("/api/business-urls")
            .insert_header(("Authorization", second_auth))
            .set_json(json!({ "name": "Mine", "url": "https://www.facebook.com/cornerbakery", "source": "google" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_create_reports_every_field() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
        let (_, auth) = state.signed_in("owner@example.com").await;

        let req = test::TestRequest::post()
            .uri("/api/business-urls")
            .insert_header(("Authorization", auth))
            .set_json(json!({ "name": " ", "url": "ftp://example.com", "source": "yelp" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        let paths: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["name", "url", "source"]);
    }

    #[actix_web::test]
    async fn test_ownership_and_ids() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
        let (owner, _) = state.signed_in("owner@example.com").await;
        let (_, intruder_auth) = state.signed_in("intruder@example.com").await;
        let business = state.business(&owner, "https://maps.google.com/?cid=7", Source::Google).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/business-urls/{}", business.id.to_hex()))
            .insert_header(("Authorization", intruder_auth.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/business-urls/not-an-id")
            .insert_header(("Authorization", intruder_auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri(&format!("/api/business-urls/{}", mongodb::bson::oid::ObjectId::new().to_hex()))
            .insert_header(("Authorization", intruder_auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/business-urls").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_reviews_are_filtered_and_paged() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
        let (owner, auth) = state.signed_in("owner@example.com").await;
        let business = state.business(&owner, "https://maps.google.com/?cid=8", Source::Google).await;
        state
            .reviews(&business, vec![review("a", Some(5.0)), review("b", Some(2.0)), review("c", None)])
            .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/business-urls/{}/reviews?minRating=3&limit=1", business.id.to_hex()))
            .insert_header(("Authorization", auth))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["reviews"].as_array().unwrap().len(), 1);
        assert_eq!(body["reviews"][0]["author"], "a");
    }

    #[actix_web::test]
    async fn test_scrape_success_and_upstream_failure() {
        let state = TestState::new();
        let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
        let (owner, auth) = state.signed_in("owner@example.com").await;
        let business = state.business(&owner, "https://maps.google.com/?cid=9", Source::Google).await;
        let uri = format!("/api/business-urls/{}/scrape?maxReviews=2", business.id.to_hex());

        state.scraper.set(Some(vec![review("a", Some(5.0)), review("b", Some(4.0)), review("c", Some(3.0))]));
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["reviewCount"], 2);

        state.scraper.set(None);
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", auth))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "UPSTREAM_ERROR");
    }
}
