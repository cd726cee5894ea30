use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

use super::record::parse_embedded;
use crate::models::{Candidate, Extraction, MediaKind, SourceDocument, StrategyId};

static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

const ID: StrategyId = StrategyId::LinkedData;

/// Strategy 3: schema.org blocks, all of them, concatenated in page order.
#[must_use]
pub fn extract(doc: &SourceDocument) -> Extraction {
    let html = Html::parse_document(&doc.body);
    let mut out = Extraction::empty();

    for node in html.select(&LD_JSON) {
        let raw = node.text().collect::<String>();
        match parse_embedded(raw.trim()) {
            Ok(value) => walk(&value, &mut out),
            Err(e) => tracing::debug!(error = %e, kind = %e.kind(), "ld+json block"),
        }
    }
    out
}

fn walk(v: &Value, out: &mut Extraction) {
    match v {
        Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
        Value::Object(o) => {
            if let Some(graph) = o.get("@graph") {
                walk(graph, out);
            }
            grab(o, out);
        }
        _ => {}
    }
}

fn grab(o: &Map<String, Value>, out: &mut Extraction) {
    let type_is = |name: &str| match o.get("@type") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case(name),
        Some(Value::Array(a)) => a
            .iter()
            .any(|x| x.as_str().is_some_and(|s| s.eq_ignore_ascii_case(name))),
        _ => false,
    };

    if type_is("VideoObject") {
        push_object(o, MediaKind::Video, out);
    } else if type_is("ImageObject") {
        push_object(o, MediaKind::Image, out);
    }

    match o.get("video") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .for_each(|v| push_object(v, MediaKind::Video, out)),
        Some(Value::Object(v)) => push_object(v, MediaKind::Video, out),
        _ => {}
    }

    match o.get("image") {
        Some(Value::String(s)) => push(s, None, MediaKind::Image, out),
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(s) => push(s, None, MediaKind::Image, out),
                    Value::Object(io) => push_object(io, MediaKind::Image, out),
                    _ => {}
                }
            }
        }
        Some(Value::Object(io)) => push_object(io, MediaKind::Image, out),
        _ => {}
    }

    if out.caption.is_none() {
        out.caption = ["articleBody", "caption", "description"]
            .iter()
            .find_map(|k| o.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }
    if out.owner.is_none() {
        out.owner = o
            .get("author")
            .and_then(|a| a.get("alternateName").or_else(|| a.get("identifier")))
            .and_then(Value::as_str)
            .map(|s| s.trim_start_matches('@').to_lowercase())
            .filter(|s| !s.is_empty());
    }
}

/// `{contentUrl|url, width, height}`
fn push_object(o: &Map<String, Value>, kind: MediaKind, out: &mut Extraction) {
    let Some(url) = o
        .get("contentUrl")
        .or_else(|| o.get("url"))
        .and_then(Value::as_str)
    else {
        return;
    };
    let dim = |k: &str| {
        o.get(k).and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        })
    };
    let hint = match (dim("width"), dim("height")) {
        (Some(w), Some(h)) => Some(format!("{w}x{h}")),
        _ => None,
    };
    push(url, hint, kind, out);
}

fn push(url: &str, hint: Option<String>, kind: MediaKind, out: &mut Extraction) {
    if url.trim().is_empty() {
        return;
    }
    out.candidates
        .push(Candidate::new(url, kind, ID).with_hint(hint));
}
