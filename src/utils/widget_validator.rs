use mongodb::bson::oid::ObjectId;

use crate::models::{FieldError, WidgetConfig, WidgetConfigInput, WidgetLayout, WidgetPayload, WidgetSettings, DEFAULT_MAX_REVIEWS};

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_REVIEWS_LIMIT: i64 = 100;

/// A widget payload that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWidget {
    pub name: String,
    pub config: WidgetConfig,
}

/// `#RGB` or `#RRGGBB`.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Checks a full widget payload and reports every failing field, not just the first.
/// `owned_business_ids` are the listings the requesting user may attach a widget to.
pub fn validate_widget(payload: &WidgetPayload, owned_business_ids: &[ObjectId]) -> Result<ValidatedWidget, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    if name.chars().count() < MIN_NAME_LEN {
        errors.push(FieldError::new("name", "Widget name must be at least 2 characters long."));
    }

    match validate_config(&payload.config, owned_business_ids) {
        Ok(config) if errors.is_empty() => Ok(ValidatedWidget {
            name: name.to_string(),
            config,
        }),
        Ok(_) => Err(errors),
        Err(config_errors) => {
            errors.extend(config_errors);
            Err(errors)
        }
    }
}

/// Checks the render-relevant fields on their own, as used for unsaved previews.
pub fn validate_config(input: &WidgetConfigInput, owned_business_ids: &[ObjectId]) -> Result<WidgetConfig, Vec<FieldError>> {
    let mut errors = Vec::new();

    let business_url_id = match input.business_url_id.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError::new("businessUrlId", "Please select a business source."));
            None
        }
        Some(raw) => match ObjectId::parse_str(raw) {
            Ok(id) if owned_business_ids.contains(&id) => Some(id),
            Ok(_) => {
                errors.push(FieldError::new("businessUrlId", "Business source not found."));
                None
            }
            Err(_) => {
                errors.push(FieldError::new("businessUrlId", "Invalid business source id."));
                None
            }
        },
    };

    let theme_color = match input.theme_color.as_deref() {
        Some(color) if is_hex_color(color) => Some(color.to_string()),
        Some(_) => {
            errors.push(FieldError::new("themeColor", "Must be a valid hex color (e.g., #RRGGBB)."));
            None
        }
        None => {
            errors.push(FieldError::new("themeColor", "Theme color is required."));
            None
        }
    };

    let layout = match input.layout.as_deref() {
        Some(raw) => match raw.parse::<WidgetLayout>() {
            Ok(layout) => Some(layout),
            Err(_) => {
                errors.push(FieldError::new(
                    "layout",
                    "Layout must be one of grid, carousel, list, masonry, badge.",
                ));
                None
            }
        },
        None => {
            errors.push(FieldError::new("layout", "Layout is required."));
            None
        }
    };

    let min_rating = match input.min_rating {
        Some(rating) if (0.0..=5.0).contains(&rating) => Some(rating),
        Some(_) => {
            errors.push(FieldError::new("minRating", "Rating must be between 0 and 5."));
            None
        }
        None => {
            errors.push(FieldError::new("minRating", "Minimum rating is required."));
            None
        }
    };

    let max_reviews = match input.max_reviews {
        None => Some(DEFAULT_MAX_REVIEWS),
        Some(count) if (1..=MAX_REVIEWS_LIMIT).contains(&count) => Some(count as i32),
        Some(_) => {
            errors.push(FieldError::new("maxReviews", "Max reviews must be between 1 and 100."));
            None
        }
    };

    match (business_url_id, theme_color, layout, min_rating, max_reviews) {
        (Some(business_url_id), Some(theme_color), Some(layout), Some(min_rating), Some(max_reviews)) if errors.is_empty() => {
            let settings = WidgetSettings::new(
                layout,
                theme_color,
                input.show_ratings.unwrap_or(true),
                input.show_dates.unwrap_or(true),
                input.show_profile_pictures.unwrap_or(true),
            );
            Ok(WidgetConfig {
                business_url_id,
                max_reviews,
                min_rating,
                settings,
            })
        }
        _ => Err(errors),
    }
}
