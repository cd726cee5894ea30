use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::record::{MEDIA_PATHS, balanced_object, extract_found, first_at, parse_embedded};
use crate::models::{Extraction, SourceDocument, StrategyId};

static SHARED_DATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"window\._sharedData\s*=\s*").unwrap());

const SHORTCODE_MEDIA_KEY: &str = "\"shortcode_media\":";

/// Strategy 1: the page's global state blob (or a whole-body JSON response).
#[must_use]
pub fn extract(doc: &SourceDocument) -> Extraction {
    for root in state_roots(&doc.body) {
        if let Some(found) = first_at(&root, MEDIA_PATHS) {
            let out = extract_found(found, StrategyId::EmbeddedState);
            if !out.is_empty() {
                return out;
            }
        }
    }
    Extraction::empty()
}

/// Every JSON root worth walking, in order of trust.
fn state_roots(body: &str) -> Vec<Value> {
    let mut roots = Vec::new();

    // API endpoints answer with bare JSON.
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        match parse_embedded(trimmed) {
            Ok(v) => roots.push(v),
            Err(e) => tracing::debug!(error = %e, kind = %e.kind(), "body is not JSON"),
        }
    }

    if let Some(m) = SHARED_DATA_RE.find(body)
        && let Some(raw) = balanced_object(body, m.end())
    {
        match parse_embedded(raw) {
            Ok(v) => roots.push(v),
            Err(e) => tracing::debug!(error = %e, kind = %e.kind(), "window._sharedData"),
        }
    }

    // A bare `"shortcode_media":{...}` anywhere in the markup.
    if let Some(pos) = body.find(SHORTCODE_MEDIA_KEY)
        && let Some(raw) = balanced_object(body, pos + SHORTCODE_MEDIA_KEY.len())
    {
        match parse_embedded(raw) {
            Ok(media) => roots.push(serde_json::json!({ "shortcode_media": media })),
            Err(e) => tracing::debug!(error = %e, kind = %e.kind(), "shortcode_media blob"),
        }
    }

    roots
}
