use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::models::{Candidate, Extraction, MediaKind, SourceDocument, StrategyId};

static EMBED_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img.EmbeddedMediaImage").unwrap());
static USERNAME: Lazy<Selector> = Lazy::new(|| Selector::parse(".UsernameText").unwrap());
static CAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse(".Caption").unwrap());
static CAPTION_USERNAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".CaptionUsername").unwrap());

/// Strategy 7: the rendered markup of the embed page.
#[must_use]
pub fn extract(doc: &SourceDocument) -> Extraction {
    let html = Html::parse_document(&doc.body);
    let mut out = Extraction::empty();

    for img in html.select(&EMBED_IMAGE) {
        // srcset lists every rendition; src is the default one
        if let Some(srcset) = img.value().attr("srcset") {
            for (url, width) in parse_srcset(srcset) {
                out.candidates.push(
                    Candidate::new(url, MediaKind::Image, StrategyId::EmbedMarkup)
                        .with_hint(width.map(|w| format!("{w}w"))),
                );
            }
        }
        if let Some(src) = img.value().attr("src").filter(|s| !s.trim().is_empty()) {
            out.candidates
                .push(Candidate::new(src, MediaKind::Image, StrategyId::EmbedMarkup));
        }
    }
    if out.is_empty() {
        return out;
    }

    out.owner = html
        .select(&USERNAME)
        .next()
        .map(|el| text_of(&el).to_lowercase())
        .filter(|s| !s.is_empty());
    out.caption = html.select(&CAPTION).next().and_then(|el| caption_text(&el));
    out
}

fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Caption text minus the leading username link.
fn caption_text(el: &ElementRef<'_>) -> Option<String> {
    let full = text_of(el);
    let user = el
        .select(&CAPTION_USERNAME)
        .next()
        .map(|u| text_of(&u))
        .unwrap_or_default();
    let text = full.strip_prefix(user.as_str()).unwrap_or(&full).trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// "a.jpg 640w, b.jpg 1080w"
fn parse_srcset(s: &str) -> Vec<(String, Option<u32>)> {
    s.split(',')
        .filter_map(|part| {
            let mut it = part.split_whitespace();
            let url = it.next()?.to_string();
            let width = it
                .next()
                .and_then(|d| d.strip_suffix('w'))
                .and_then(|w| w.parse().ok());
            Some((url, width))
        })
        .collect()
}
