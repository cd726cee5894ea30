use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::models::{Candidate, Extraction, MediaKind, SourceDocument, StrategyId};

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[content]").unwrap());

/// Tag name -> kind of media it points at.
const MEDIA_TAGS: &[(&str, MediaKind)] = &[
    ("og:video:secure_url", MediaKind::Video),
    ("og:video", MediaKind::Video),
    ("og:video:url", MediaKind::Video),
    ("twitter:player:stream", MediaKind::Video),
    ("og:image:secure_url", MediaKind::Image),
    ("og:image", MediaKind::Image),
    ("og:image:url", MediaKind::Image),
    ("twitter:image", MediaKind::Image),
    ("twitter:image:src", MediaKind::Image),
];

/// Strategy 4: OpenGraph / Twitter card tags.
#[must_use]
pub fn extract(doc: &SourceDocument) -> Extraction {
    let html = Html::parse_document(&doc.body);
    let mut out = Extraction::empty();

    let mut image_size: (Option<u32>, Option<u32>) = (None, None);
    let mut video_size: (Option<u32>, Option<u32>) = (None, None);
    let mut description = None;
    let mut title = None;

    for el in html.select(&META) {
        let attrs = el.value();
        let Some(name) = attrs.attr("property").or_else(|| attrs.attr("name")) else {
            continue;
        };
        let content = attrs.attr("content").unwrap_or("").trim();
        let name = name.trim().to_ascii_lowercase();

        match name.as_str() {
            "og:image:width" => image_size.0 = content.parse().ok(),
            "og:image:height" => image_size.1 = content.parse().ok(),
            "og:video:width" => video_size.0 = content.parse().ok(),
            "og:video:height" => video_size.1 = content.parse().ok(),
            "og:description" | "description" if description.is_none() => {
                description = Some(content.to_string());
            }
            "og:title" if title.is_none() => title = Some(content.to_string()),
            _ => {}
        }

        if content.is_empty() {
            continue;
        }
        if let Some((_, kind)) = MEDIA_TAGS.iter().find(|(tag, _)| *tag == name) {
            out.candidates
                .push(Candidate::new(content, *kind, StrategyId::MetaTags));
        }
    }

    // Sizes usually follow their tag, so attach them once every tag is read.
    for c in &mut out.candidates {
        let size = match c.media_kind {
            MediaKind::Video => video_size,
            _ => image_size,
        };
        if let (Some(w), Some(h)) = size {
            c.quality_hint = Some(format!("{w}x{h}"));
        }
    }

    // <title> is skipped: login walls and error pages put the site name there
    out.caption = description.or(title).filter(|s| !s.is_empty());
    out
}
