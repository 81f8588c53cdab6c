use serde::{Deserialize, Serialize};
use mongodb::bson::{self, oid::ObjectId};
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// The review provider a listing is scraped from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Google,
    Facebook,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Google => "google",
            Source::Facebook => "facebook",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Source::Google),
            "facebook" => Ok(Source::Facebook),
            other => Err(format!("Unsupported source: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUrl {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub name: String,
    pub url: String,
    pub url_hash: String,
    pub source: Source,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scraped_at: Option<bson::DateTime>,
}

impl BusinessUrl {
    pub fn new(user_id: ObjectId, name: String, url: String, url_hash: String, source: Source) -> Self {
        Self {
            id: ObjectId::new(),
            user_id,
            name,
            url,
            url_hash,
            source,
            added_at: Utc::now(),
            last_scraped_at: None,
        }
    }

    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.user_id == user_id
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBusinessUrlRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUrlsResponse {
    pub business_urls: Vec<BusinessUrlView>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUrlView {
    pub id: String,
    pub name: String,
    pub url: String,
    pub url_hash: String,
    pub source: Source,
    pub added_at: DateTime<Utc>,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

impl From<&BusinessUrl> for BusinessUrlView {
    fn from(business: &BusinessUrl) -> Self {
        Self {
            id: business.id.to_hex(),
            name: business.name.clone(),
            url: business.url.clone(),
            url_hash: business.url_hash.clone(),
            source: business.source,
            added_at: business.added_at,
            last_scraped_at: business.last_scraped_at.map(|at| at.to_chrono()),
        }
    }
}
