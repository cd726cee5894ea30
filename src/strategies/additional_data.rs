use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::record::{MEDIA_PATHS, balanced_object, extract_found, first_at, parse_embedded};
use crate::models::{Extraction, SourceDocument, StrategyId};

static ADDITIONAL_DATA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"window\.__additionalDataLoaded\(\s*['"][^'"]*['"]\s*,\s*"#).unwrap()
});

const CONTEXT_JSON_KEY: &str = "\"contextJSON\":\"";

/// Strategy 2: secondary payloads (`__additionalDataLoaded(...)` calls and
/// the double-encoded `contextJSON` of embed pages).
#[must_use]
pub fn extract(doc: &SourceDocument) -> Extraction {
    let body = doc.body.as_str();
    let mut roots: Vec<Value> = Vec::new();

    for m in ADDITIONAL_DATA_RE.find_iter(body) {
        let Some(raw) = balanced_object(body, m.end()) else {
            continue;
        };
        match parse_embedded(raw) {
            Ok(v) => roots.push(v),
            Err(e) => tracing::debug!(error = %e, kind = %e.kind(), "__additionalDataLoaded"),
        }
    }

    if let Some(v) = context_json(body) {
        roots.push(v);
    }

    for root in &roots {
        if let Some(found) = first_at(root, MEDIA_PATHS) {
            let out = extract_found(found, StrategyId::AdditionalData);
            if !out.is_empty() {
                return out;
            }
        }
    }
    Extraction::empty()
}

/// Decode `"contextJSON":"{\"gql_data\":...}"`: a JSON string holding JSON.
fn context_json(body: &str) -> Option<Value> {
    let start = body.find(CONTEXT_JSON_KEY)? + CONTEXT_JSON_KEY.len() - 1;
    let bytes = body.as_bytes();

    let mut i = start + 1;
    let mut escaped = false;
    while i < bytes.len() {
        match bytes[i] {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'"' => break,
            _ => {}
        }
        i += 1;
    }
    let literal = body.get(start..=i)?;

    let inner: String = match serde_json::from_str(literal) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(error = %e, "contextJSON string literal");
            return None;
        }
    };
    match parse_embedded(&inner) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(error = %e, kind = %e.kind(), "contextJSON payload");
            None
        }
    }
}
