use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    html::decode_entities_basic,
    models::{Candidate, Extraction, MediaKind, SourceDocument, StrategyId},
};

// `"video_url":"..."` with JSON escapes kept; the normalizer deals with them.
static KEY_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\\?"(video_url|display_url|contentUrl)\\?"\s*:\s*\\?"((?:[^"\\]|\\[^"])+)\\?""#)
        .unwrap()
});
static SOURCE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<source\b[^>]*>").unwrap());
static VIDEO_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<video\b[^>]*>").unwrap());
static SRC_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());
static MP4_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\btype\s*=\s*["']video/mp4["']"#).unwrap());

const ID: StrategyId = StrategyId::RawPatterns;

/// Strategy 5: grep the raw text. Lowest confidence, highest recall.
#[must_use]
pub fn extract(doc: &SourceDocument) -> Extraction {
    let body = doc.body.as_str();
    let mut out = Extraction::empty();

    for caps in KEY_VALUE_RE.captures_iter(body) {
        let kind = match &caps[1] {
            "video_url" => MediaKind::Video,
            "display_url" => MediaKind::Image,
            _ => MediaKind::Unknown,
        };
        let url = caps[2].trim_end_matches('\\');
        if !url.is_empty() {
            out.candidates.push(Candidate::new(url, kind, ID));
        }
    }

    for tag in SOURCE_TAG_RE.find_iter(body) {
        let tag = tag.as_str();
        if MP4_TYPE_RE.is_match(tag)
            && let Some(src) = SRC_ATTR_RE.captures(tag)
        {
            out.candidates.push(Candidate::new(
                decode_entities_basic(&src[1]),
                MediaKind::Video,
                ID,
            ));
        }
    }

    for tag in VIDEO_TAG_RE.find_iter(body) {
        if let Some(src) = SRC_ATTR_RE.captures(tag.as_str()) {
            out.candidates.push(Candidate::new(
                decode_entities_basic(&src[1]),
                MediaKind::Video,
                ID,
            ));
        }
    }
    out
}
