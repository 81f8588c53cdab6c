//! Standalone HTML page served to iframes on third-party sites.

use crate::utils::layout_renderer::{Avatar, RatingDisplay, RenderedWidget, ReviewCard, WidgetHeader};

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn stars(filled: u8) -> String {
    let filled = filled.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Five glyphs for a value on the half-star scale, e.g. 4.5 is four full and one half.
fn half_star_glyphs(value: f64) -> String {
    let halves = (value.clamp(0.0, 5.0) * 2.0).round() as usize;
    let (full, half) = (halves / 2, halves % 2 == 1);
    let mut html = "★".repeat(full);
    if half {
        html.push_str("<span class=\"rh-half-star\">★</span>");
    }
    html.push_str(&"☆".repeat(5 - full - usize::from(half)));
    html
}

fn rating_html(rating: &RatingDisplay) -> String {
    match rating {
        RatingDisplay::Stars { value, filled } => format!(
            "<div class=\"rh-rating\" aria-label=\"{} out of 5\">{}</div>",
            value,
            stars(*filled)
        ),
        RatingDisplay::Recommended => "<div class=\"rh-rating rh-recommended\">Recommended</div>".to_string(),
        RatingDisplay::NoRating => "<div class=\"rh-rating rh-unrated\">No Rating</div>".to_string(),
    }
}

fn card_html(card: &ReviewCard) -> String {
    let mut html = String::from("<article class=\"rh-card\">");
    html.push_str("<header class=\"rh-author\">");
    match &card.avatar {
        Some(Avatar::Image { url }) => html.push_str(&format!(
            "<img class=\"rh-avatar\" src=\"{}\" alt=\"\" loading=\"lazy\">",
            escape_html(url)
        )),
        Some(Avatar::Initial { letter }) => {
            html.push_str(&format!("<span class=\"rh-avatar\">{}</span>", escape_html(letter)))
        }
        None => {}
    }
    html.push_str(&format!("<strong>{}</strong>", escape_html(&card.author)));
    if let Some(posted_at) = &card.posted_at {
        html.push_str(&format!("<time>{}</time>", escape_html(posted_at)));
    }
    html.push_str("</header>");
    if let Some(rating) = &card.rating {
        html.push_str(&rating_html(rating));
    }
    html.push_str(&format!("<p>{}</p></article>", escape_html(&card.content)));
    html
}

fn header_html(header: &WidgetHeader) -> String {
    let mut html = format!(
        "<div class=\"rh-header\"><h2>{}</h2><span class=\"rh-source\">{}</span>",
        escape_html(&header.business_name),
        header.source
    );
    if let Some(avg) = header.average_rating {
        html.push_str(&format!("<span class=\"rh-average\">{:.1}</span>", avg));
    }
    html.push_str(&format!(
        "<span class=\"rh-total\">{} reviews</span></div>",
        header.total_reviews
    ));
    html
}

fn cards_html(cards: &[ReviewCard]) -> String {
    if cards.is_empty() {
        return "<p class=\"rh-empty\">No reviews yet.</p>".to_string();
    }
    cards.iter().map(card_html).collect()
}

const CAROUSEL_SCRIPT: &str = r#"<script>
(function () {
  var slides = document.querySelectorAll(".rh-slide");
  var current = 0;
  function show(i) {
    if (!slides.length) return;
    current = (i + slides.length) % slides.length;
    slides.forEach(function (s, n) { s.hidden = n !== current; });
  }
  document.querySelector(".rh-prev").addEventListener("click", function () { show(current - 1); });
  document.querySelector(".rh-next").addEventListener("click", function () { show(current + 1); });
  show(0);
})();
</script>"#;

fn body_html(widget: &RenderedWidget) -> String {
    match widget {
        RenderedWidget::Grid { header, columns, cards } => format!(
            "{}<div class=\"rh-grid\" data-min-columns=\"{}\" data-max-columns=\"{}\">{}</div>",
            header_html(header),
            columns.min,
            columns.max,
            cards_html(cards)
        ),
        RenderedWidget::List { header, cards } => {
            format!("{}<div class=\"rh-list\">{}</div>", header_html(header), cards_html(cards))
        }
        RenderedWidget::Carousel { header, slides, .. } => {
            let slides_html: String = slides
                .iter()
                .map(|card| format!("<div class=\"rh-slide\">{}</div>", card_html(card)))
                .collect();
            format!(
                "{}<div class=\"rh-carousel\"><button class=\"rh-prev\" type=\"button\" aria-label=\"Previous\">&lsaquo;</button>{}<button class=\"rh-next\" type=\"button\" aria-label=\"Next\">&rsaquo;</button></div>{}",
                header_html(header),
                if slides.is_empty() { cards_html(slides) } else { slides_html },
                CAROUSEL_SCRIPT
            )
        }
        RenderedWidget::Masonry { header, columns } => {
            let columns_html: String = columns
                .iter()
                .map(|column| {
                    let cards: String = column.iter().map(card_html).collect();
                    format!("<div class=\"rh-column\">{}</div>", cards)
                })
                .collect();
            format!("{}<div class=\"rh-masonry\">{}</div>", header_html(header), columns_html)
        }
        RenderedWidget::Badge {
            business_name,
            source,
            average_rating,
            stars: half_stars,
            total_reviews,
            ..
        } => {
            let mut html = format!(
                "<div class=\"rh-badge\"><strong>{}</strong><span class=\"rh-source\">{}</span>",
                escape_html(business_name),
                source
            );
            if let (Some(avg), Some(rounded)) = (average_rating, half_stars) {
                html.push_str(&format!(
                    "<span class=\"rh-average\">{:.1}</span><span class=\"rh-rating\" data-stars=\"{}\">{}</span>",
                    avg,
                    rounded,
                    half_star_glyphs(*rounded)
                ));
            }
            html.push_str(&format!("<span class=\"rh-total\">{} reviews</span></div>", total_reviews));
            html
        }
    }
}

fn theme_color(widget: &RenderedWidget) -> &str {
    match widget {
        RenderedWidget::Grid { header, .. }
        | RenderedWidget::List { header, .. }
        | RenderedWidget::Carousel { header, .. }
        | RenderedWidget::Masonry { header, .. } => &header.theme_color,
        RenderedWidget::Badge { theme_color, .. } => theme_color,
    }
}

pub fn render_page(title: &str, widget: &RenderedWidget) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
:root {{ --rh-theme: {theme}; }}
body {{ margin: 0; font-family: system-ui, sans-serif; }}
.rh-header, .rh-badge {{ display: flex; gap: .5rem; align-items: center; padding: .75rem; border-bottom: 2px solid var(--rh-theme); }}
.rh-card {{ border: 1px solid #e2e8f0; border-radius: 8px; padding: .75rem; margin: .5rem; }}
.rh-rating {{ color: var(--rh-theme); }}
.rh-half-star {{ background: linear-gradient(90deg, var(--rh-theme) 50%, #cbd5e0 50%); -webkit-background-clip: text; background-clip: text; color: transparent; }}
.rh-avatar {{ width: 32px; height: 32px; border-radius: 50%; display: inline-flex; align-items: center; justify-content: center; background: var(--rh-theme); color: #fff; }}
.rh-grid {{ display: grid; grid-template-columns: repeat(1, 1fr); }}
@media (min-width: 640px) {{ .rh-grid {{ grid-template-columns: repeat(2, 1fr); }} }}
@media (min-width: 960px) {{ .rh-grid {{ grid-template-columns: repeat(3, 1fr); }} }}
.rh-masonry {{ display: flex; }}
.rh-column {{ flex: 1; }}
.rh-carousel {{ display: flex; align-items: center; }}
.rh-slide {{ flex: 1; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        theme = escape_html(theme_color(widget)),
        body = body_html(widget),
    )
}
