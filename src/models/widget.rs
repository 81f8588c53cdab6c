use serde::{Deserialize, Serialize};
use mongodb::bson::{self, oid::ObjectId};
use chrono::{DateTime, Utc};
use std::str::FromStr;

use super::business_url::{BusinessUrl, BusinessUrlView};

pub const DEFAULT_MAX_REVIEWS: i32 = 10;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WidgetLayout {
    Grid,
    Carousel,
    List,
    Masonry,
    Badge,
}

impl WidgetLayout {
    pub const ALL: [WidgetLayout; 5] = [
        WidgetLayout::Grid,
        WidgetLayout::Carousel,
        WidgetLayout::List,
        WidgetLayout::Masonry,
        WidgetLayout::Badge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetLayout::Grid => "grid",
            WidgetLayout::Carousel => "carousel",
            WidgetLayout::List => "list",
            WidgetLayout::Masonry => "masonry",
            WidgetLayout::Badge => "badge",
        }
    }

    /// Most reviews a layout ever shows. The badge shows none.
    pub fn review_cap(&self) -> usize {
        match self {
            WidgetLayout::Grid => 6,
            WidgetLayout::Carousel => 10,
            WidgetLayout::List => 6,
            WidgetLayout::Masonry => 9,
            WidgetLayout::Badge => 0,
        }
    }
}

impl FromStr for WidgetLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetLayout::ALL
            .iter()
            .copied()
            .find(|layout| layout.as_str() == s)
            .ok_or_else(|| format!("Unknown layout: {}", s))
    }
}

/// Settings shared by every layout that lists individual reviews.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardLayoutSettings {
    pub theme_color: String,
    pub show_ratings: bool,
    pub show_dates: bool,
    pub show_profile_pictures: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeSettings {
    pub theme_color: String,
    pub show_ratings: bool,
}

/// Presentation settings, keyed by layout. Each variant carries only what
/// that layout renders.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum WidgetSettings {
    Grid(CardLayoutSettings),
    Carousel(CardLayoutSettings),
    List(CardLayoutSettings),
    Masonry(CardLayoutSettings),
    Badge(BadgeSettings),
}

impl WidgetSettings {
    pub fn new(
        layout: WidgetLayout,
        theme_color: String,
        show_ratings: bool,
        show_dates: bool,
        show_profile_pictures: bool,
    ) -> Self {
        let cards = || CardLayoutSettings {
            theme_color: theme_color.clone(),
            show_ratings,
            show_dates,
            show_profile_pictures,
        };
        match layout {
            WidgetLayout::Grid => WidgetSettings::Grid(cards()),
            WidgetLayout::Carousel => WidgetSettings::Carousel(cards()),
            WidgetLayout::List => WidgetSettings::List(cards()),
            WidgetLayout::Masonry => WidgetSettings::Masonry(cards()),
            WidgetLayout::Badge => WidgetSettings::Badge(BadgeSettings {
                theme_color: theme_color.clone(),
                show_ratings,
            }),
        }
    }

    pub fn layout(&self) -> WidgetLayout {
        match self {
            WidgetSettings::Grid(_) => WidgetLayout::Grid,
            WidgetSettings::Carousel(_) => WidgetLayout::Carousel,
            WidgetSettings::List(_) => WidgetLayout::List,
            WidgetSettings::Masonry(_) => WidgetLayout::Masonry,
            WidgetSettings::Badge(_) => WidgetLayout::Badge,
        }
    }

    pub fn theme_color(&self) -> &str {
        match self {
            WidgetSettings::Grid(s)
            | WidgetSettings::Carousel(s)
            | WidgetSettings::List(s)
            | WidgetSettings::Masonry(s) => &s.theme_color,
            WidgetSettings::Badge(s) => &s.theme_color,
        }
    }

    pub fn show_ratings(&self) -> bool {
        match self {
            WidgetSettings::Grid(s)
            | WidgetSettings::Carousel(s)
            | WidgetSettings::List(s)
            | WidgetSettings::Masonry(s) => s.show_ratings,
            WidgetSettings::Badge(s) => s.show_ratings,
        }
    }

    pub fn card_settings(&self) -> Option<&CardLayoutSettings> {
        match self {
            WidgetSettings::Grid(s)
            | WidgetSettings::Carousel(s)
            | WidgetSettings::List(s)
            | WidgetSettings::Masonry(s) => Some(s),
            WidgetSettings::Badge(_) => None,
        }
    }
}

/// The render-relevant part of a widget, saved or not.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub business_url_id: ObjectId,
    pub max_reviews: i32,
    pub min_rating: f64,
    pub settings: WidgetSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub business_url_id: ObjectId,
    pub name: String,
    #[serde(default = "default_max_reviews")]
    pub max_reviews: i32,
    pub min_rating: f64,
    pub settings: WidgetSettings,
    #[serde(default)]
    pub views: i64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_max_reviews() -> i32 {
    DEFAULT_MAX_REVIEWS
}

impl Widget {
    pub fn new(user_id: ObjectId, name: String, config: WidgetConfig) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            user_id,
            business_url_id: config.business_url_id,
            name,
            max_reviews: config.max_reviews,
            min_rating: config.min_rating,
            settings: config.settings,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn config(&self) -> WidgetConfig {
        WidgetConfig {
            business_url_id: self.business_url_id,
            max_reviews: self.max_reviews,
            min_rating: self.min_rating,
            settings: self.settings.clone(),
        }
    }

    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.user_id == user_id
    }

    /// Expands the saved widget back into a complete payload, so a partial
    /// edit can be overlaid and validated as a whole.
    pub fn to_payload(&self) -> WidgetPayload {
        let cards = self.settings.card_settings();
        WidgetPayload {
            name: Some(self.name.clone()),
            config: WidgetConfigInput {
                business_url_id: Some(self.business_url_id.to_hex()),
                theme_color: Some(self.settings.theme_color().to_string()),
                layout: Some(self.settings.layout().as_str().to_string()),
                min_rating: Some(self.min_rating),
                max_reviews: Some(self.max_reviews as i64),
                show_ratings: Some(self.settings.show_ratings()),
                show_dates: cards.map(|s| s.show_dates),
                show_profile_pictures: cards.map(|s| s.show_profile_pictures),
            },
        }
    }
}

/// Raw configuration fields as submitted. Everything is optional here so the
/// validator can report every missing or bad field at once.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfigInput {
    pub business_url_id: Option<String>,
    pub theme_color: Option<String>,
    pub layout: Option<String>,
    pub min_rating: Option<f64>,
    pub max_reviews: Option<i64>,
    pub show_ratings: Option<bool>,
    pub show_dates: Option<bool>,
    pub show_profile_pictures: Option<bool>,
}

impl WidgetConfigInput {
    fn overlay(self, patch: WidgetConfigInput) -> Self {
        Self {
            business_url_id: patch.business_url_id.or(self.business_url_id),
            theme_color: patch.theme_color.or(self.theme_color),
            layout: patch.layout.or(self.layout),
            min_rating: patch.min_rating.or(self.min_rating),
            max_reviews: patch.max_reviews.or(self.max_reviews),
            show_ratings: patch.show_ratings.or(self.show_ratings),
            show_dates: patch.show_dates.or(self.show_dates),
            show_profile_pictures: patch.show_profile_pictures.or(self.show_profile_pictures),
        }
    }
}

/// Create and edit body for a widget.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPayload {
    pub name: Option<String>,
    #[serde(flatten)]
    pub config: WidgetConfigInput,
}

impl WidgetPayload {
    /// Fields present in `patch` win over fields in `self`.
    pub fn overlay(self, patch: WidgetPayload) -> Self {
        Self {
            name: patch.name.or(self.name),
            config: self.config.overlay(patch.config),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub id: String,
    pub business_url_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub layout: WidgetLayout,
    pub max_reviews: i32,
    pub min_rating: f64,
    pub settings: WidgetSettings,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_url: Option<BusinessUrlView>,
}

impl WidgetView {
    pub fn with_business(widget: &Widget, business: Option<&BusinessUrl>) -> Self {
        Self {
            id: widget.id.to_hex(),
            business_url_id: widget.business_url_id.to_hex(),
            name: widget.name.clone(),
            layout: widget.settings.layout(),
            max_reviews: widget.max_reviews,
            min_rating: widget.min_rating,
            settings: widget.settings.clone(),
            views: widget.views,
            created_at: widget.created_at,
            updated_at: widget.updated_at,
            business_url: business.map(BusinessUrlView::from),
        }
    }
}

impl From<&Widget> for WidgetView {
    fn from(widget: &Widget) -> Self {
        WidgetView::with_business(widget, None)
    }
}

#[derive(Debug, Serialize)]
pub struct WidgetsResponse {
    pub widgets: Vec<WidgetView>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct EmbedCode {
    pub script: String,
    pub iframe: String,
}
