//! Maps a widget configuration and a review list to a renderable structure.
//!
//! Pure and deterministic: the same configuration and reviews always give
//! the same output. The JSON preview and the embed HTML page both render
//! from this structure.

use serde::Serialize;

use crate::models::{CardLayoutSettings, ReviewItem, Source, WidgetConfig, WidgetSettings};
use crate::utils::review_filter::{filter_by_rating, round_to, summarize, RatingSummary};

pub const MASONRY_COLUMNS: usize = 3;
const MASONRY_CHARS_PER_LINE: usize = 40;
const MASONRY_CARD_CHROME: usize = 3;

/// What the renderer needs to know about the listing behind a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessSummary {
    pub name: String,
    pub source: Source,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RatingDisplay {
    Stars { value: f64, filled: u8 },
    Recommended,
    NoRating,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Avatar {
    Image { url: String },
    Initial { letter: String },
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub author: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingDisplay>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetHeader {
    pub business_name: String,
    pub source: Source,
    pub theme_color: String,
    /// Rounded to one decimal; absent when ratings are hidden or nothing is rated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    pub total_reviews: usize,
}

/// Viewport-dependent column count; the client picks within this range.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct ColumnRange {
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarouselNavigation {
    pub manual: bool,
    pub autoplay: bool,
    pub slide_count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum RenderedWidget {
    Grid {
        header: WidgetHeader,
        columns: ColumnRange,
        cards: Vec<ReviewCard>,
    },
    Carousel {
        header: WidgetHeader,
        navigation: CarouselNavigation,
        slides: Vec<ReviewCard>,
    },
    List {
        header: WidgetHeader,
        cards: Vec<ReviewCard>,
    },
    Masonry {
        header: WidgetHeader,
        columns: Vec<Vec<ReviewCard>>,
    },
    #[serde(rename_all = "camelCase")]
    Badge {
        business_name: String,
        source: Source,
        theme_color: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        average_rating: Option<f64>,
        /// Average rounded to the nearest half star.
        #[serde(skip_serializing_if = "Option::is_none")]
        stars: Option<f64>,
        total_reviews: usize,
    },
}

impl RenderedWidget {
    pub fn card_count(&self) -> usize {
        match self {
            RenderedWidget::Grid { cards, .. } | RenderedWidget::List { cards, .. } => cards.len(),
            RenderedWidget::Carousel { slides, .. } => slides.len(),
            RenderedWidget::Masonry { columns, .. } => columns.iter().map(Vec::len).sum(),
            RenderedWidget::Badge { .. } => 0,
        }
    }
}

pub fn rating_display(review: &ReviewItem) -> RatingDisplay {
    match review.rating.filter(|r| r.is_finite()) {
        Some(value) => RatingDisplay::Stars {
            value,
            filled: value.round().clamp(0.0, 5.0) as u8,
        },
        None if review.is_recommended() => RatingDisplay::Recommended,
        None => RatingDisplay::NoRating,
    }
}

fn avatar(review: &ReviewItem) -> Avatar {
    match review.profile_picture.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => Avatar::Image { url: url.to_string() },
        None => Avatar::Initial {
            letter: review
                .author
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_else(|| "?".to_string()),
        },
    }
}

fn card(review: &ReviewItem, settings: &CardLayoutSettings) -> ReviewCard {
    ReviewCard {
        author: review.author.clone(),
        content: review.content.clone(),
        posted_at: settings.show_dates.then(|| review.posted_at.clone()),
        avatar: settings.show_profile_pictures.then(|| avatar(review)),
        rating: settings.show_ratings.then(|| rating_display(review)),
    }
}

fn header(business: &BusinessSummary, settings: &WidgetSettings, summary: &RatingSummary) -> WidgetHeader {
    WidgetHeader {
        business_name: business.name.clone(),
        source: business.source,
        theme_color: settings.theme_color().to_string(),
        average_rating: summary
            .average
            .filter(|_| settings.show_ratings())
            .map(|avg| round_to(avg, 1)),
        total_reviews: summary.total,
    }
}

/// Greedy column balancing: each card goes to the currently shortest column,
/// measured by an estimate of rendered height. Ties go to the leftmost column.
pub fn balance_columns(cards: Vec<ReviewCard>, column_count: usize) -> Vec<Vec<ReviewCard>> {
    let column_count = column_count.max(1);
    let mut columns: Vec<Vec<ReviewCard>> = vec![Vec::new(); column_count];
    let mut heights = vec![0usize; column_count];

    for card in cards {
        let estimate = MASONRY_CARD_CHROME + card.content.chars().count().div_ceil(MASONRY_CHARS_PER_LINE);
        let mut shortest = 0;
        for (index, height) in heights.iter().enumerate() {
            if *height < heights[shortest] {
                shortest = index;
            }
        }
        heights[shortest] += estimate;
        columns[shortest].push(card);
    }

    columns
}

/// Renders `reviews` for `config`. The rating filter, the aggregate, the
/// per-layout cap and the display toggles are all applied here.
pub fn render(config: &WidgetConfig, business: &BusinessSummary, reviews: &[ReviewItem]) -> RenderedWidget {
    let visible = filter_by_rating(reviews, config.min_rating);
    let summary = summarize(visible.iter().copied());
    let layout = config.settings.layout();
    let limit = layout.review_cap().min(config.max_reviews.max(0) as usize);

    let cards = |settings: &CardLayoutSettings| -> Vec<ReviewCard> {
        visible
            .iter()
            .take(limit)
            .map(|review| card(review, settings))
            .collect()
    };

    match &config.settings {
        WidgetSettings::Grid(settings) => RenderedWidget::Grid {
            header: header(business, &config.settings, &summary),
            columns: ColumnRange { min: 1, max: 3 },
            cards: cards(settings),
        },
        WidgetSettings::Carousel(settings) => {
            let slides = cards(settings);
            RenderedWidget::Carousel {
                header: header(business, &config.settings, &summary),
                navigation: CarouselNavigation {
                    manual: true,
                    autoplay: false,
                    slide_count: slides.len(),
                },
                slides,
            }
        }
        WidgetSettings::List(settings) => RenderedWidget::List {
            header: header(business, &config.settings, &summary),
            cards: cards(settings),
        },
        WidgetSettings::Masonry(settings) => RenderedWidget::Masonry {
            header: header(business, &config.settings, &summary),
            columns: balance_columns(cards(settings), MASONRY_COLUMNS),
        },
        WidgetSettings::Badge(settings) => {
            let average = summary.average.filter(|_| settings.show_ratings);
            RenderedWidget::Badge {
                business_name: business.name.clone(),
                source: business.source,
                theme_color: settings.theme_color.clone(),
                average_rating: average.map(|avg| round_to(avg, 1)),
                stars: average.map(|avg| (avg * 2.0).round() / 2.0),
                total_reviews: summary.total,
            }
        }
    }
}
