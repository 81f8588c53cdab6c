use crate::models::ReviewItem;

/// Filtering and paging applied to a batch of reviews before display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReviewQuery {
    pub min_rating: Option<f64>,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// Unrated reviews always pass; they carry a recommendation flag or nothing.
/// A non-finite stored rating counts as unrated.
pub fn passes_min_rating(review: &ReviewItem, min_rating: f64) -> bool {
    match review.rating.filter(|r| r.is_finite()) {
        Some(rating) => rating >= min_rating,
        None => true,
    }
}

pub fn filter_by_rating<'a>(reviews: &'a [ReviewItem], min_rating: f64) -> Vec<&'a ReviewItem> {
    reviews
        .iter()
        .filter(|review| passes_min_rating(review, min_rating))
        .collect()
}

/// Rating filter followed by an offset/limit slice.
pub fn apply_query<'a>(reviews: &'a [ReviewItem], query: &ReviewQuery) -> Vec<&'a ReviewItem> {
    let filtered = match query.min_rating {
        Some(min) => filter_by_rating(reviews, min),
        None => reviews.iter().collect(),
    };

    let page = filtered.into_iter().skip(query.offset);
    match query.limit {
        Some(limit) => page.take(limit).collect(),
        None => page.collect(),
    }
}

/// Aggregate over a set of reviews. The average only counts reviews that
/// carry a numeric rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub total: usize,
    pub rated: usize,
    pub average: Option<f64>,
}

pub fn summarize<'a, I>(reviews: I) -> RatingSummary
where
    I: IntoIterator<Item = &'a ReviewItem>,
{
    let mut total = 0;
    let mut rated = 0;
    let mut sum = 0.0;
    for review in reviews {
        total += 1;
        if let Some(rating) = review.rating.filter(|r| r.is_finite()) {
            rated += 1;
            sum += rating;
        }
    }

    RatingSummary {
        total,
        rated,
        average: (rated > 0).then(|| sum / rated as f64),
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
pub(crate) fn review(author: &str, rating: Option<f64>) -> ReviewItem {
    ReviewItem {
        review_id: None,
        author: author.to_string(),
        content: format!("Review by {}", author),
        rating,
        posted_at: "2 weeks ago".to_string(),
        profile_picture: None,
        recommendation_status: None,
        user_profile: None,
        scraped_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ReviewItem> {
        vec![
            review("ana", Some(5.0)),
            review("ben", None),
            review("cai", Some(3.0)),
            review("dee", Some(1.0)),
        ]
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let reviews = sample();
        let kept = filter_by_rating(&reviews, 0.0);
        assert_eq!(kept.len(), reviews.len());
        assert!(kept.iter().zip(reviews.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_unrated_always_pass() {
        let reviews = sample();
        for min in [0.0, 2.5, 5.0] {
            let kept = filter_by_rating(&reviews, min);
            assert!(kept.iter().any(|r| r.author == "ben"), "unrated dropped at {}", min);
        }
        let kept = filter_by_rating(&reviews, 4.0);
        let authors: Vec<&str> = kept.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(authors, vec!["ana", "ben"]);
    }

    #[test]
    fn test_non_finite_rating_counts_as_unrated() {
        let reviews = vec![review("nan", Some(f64::NAN)), review("ana", Some(5.0))];
        for min in [0.0, 3.0, 5.0] {
            let kept = filter_by_rating(&reviews, min);
            assert_eq!(kept.len(), 2, "non-finite rating dropped at {}", min);
        }
        let summary = summarize(reviews.iter());
        assert_eq!(summary.rated, 1);
        assert_eq!(summary.average, Some(5.0));
    }

    #[test]
    fn test_average_ignores_unrated() {
        let reviews = vec![review("a", Some(5.0)), review("b", None), review("c", Some(3.0))];
        let summary = summarize(&reviews);
        assert_eq!(summary.average, Some(4.0));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rated, 2);
    }

    #[test]
    fn test_average_of_unrated_only_is_none() {
        let reviews = vec![review("a", None), review("b", None)];
        assert_eq!(summarize(&reviews).average, None);
        assert_eq!(summarize(&Vec::<ReviewItem>::new()).average, None);
    }

    #[test]
    fn test_query_slices_after_filtering() {
        let reviews = sample();
        let query = ReviewQuery {
            min_rating: Some(2.0),
            offset: 1,
            limit: Some(1),
        };
        let page = apply_query(&reviews, &query);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].author, "ben");

        let past_end = ReviewQuery { offset: 10, ..Default::default() };
        assert!(apply_query(&reviews, &past_end).is_empty());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(4.666, 1), 4.7);
        assert_eq!(round_to(4.666, 2), 4.67);
    }
}
