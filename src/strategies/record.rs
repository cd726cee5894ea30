//! Walking schema-less media records.
//!
//! Every lookup goes through `Value::pointer` / `Value::get` and yields
//! `None` for a missing segment; nothing here panics on odd shapes.

use serde_json::Value;

use crate::{
    error::ExtractError,
    models::{Candidate, Extraction, MediaKind, StrategyId},
};

/// Places a post/story record has been seen in, tried in order.
pub const MEDIA_PATHS: &[&str] = &[
    "/entry_data/PostPage/0/graphql/shortcode_media",
    "/graphql/shortcode_media",
    "/data/xdt_shortcode_media",
    "/data/shortcode_media",
    "/shortcode_media",
    "/gql_data/shortcode_media",
    "/gql_data/xdt_shortcode_media",
    "/reel/items",
    "/items",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discriminator {
    Image,
    Video,
    Carousel,
}

/// Parse an embedded blob, reporting failure as `MalformedEmbeddedData`.
pub fn parse_embedded(raw: &str) -> Result<Value, ExtractError> {
    Ok(serde_json::from_str(raw)?)
}

/// First value found at any of `paths`.
#[must_use]
pub fn first_at<'a>(root: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .find_map(|p| root.pointer(p).filter(|v| !v.is_null()))
}

/// Read the kind of a record from `__typename`, `media_type` or `is_video`.
#[must_use]
pub fn discriminate(record: &Value) -> Option<Discriminator> {
    if let Some(name) = record.get("__typename").and_then(Value::as_str) {
        if name.ends_with("Sidecar") {
            return Some(Discriminator::Carousel);
        }
        if name.ends_with("Video") {
            return Some(Discriminator::Video);
        }
        if name.ends_with("Image") {
            return Some(Discriminator::Image);
        }
    }
    match record.get("media_type").and_then(Value::as_u64) {
        Some(1) => return Some(Discriminator::Image),
        Some(2) => return Some(Discriminator::Video),
        Some(8) => return Some(Discriminator::Carousel),
        _ => {}
    }
    if carousel_children(record).is_some() {
        return Some(Discriminator::Carousel);
    }
    match record.get("is_video").and_then(Value::as_bool) {
        Some(true) => Some(Discriminator::Video),
        Some(false) => Some(Discriminator::Image),
        None if record.get("display_url").is_some() => Some(Discriminator::Image),
        None => None,
    }
}

fn carousel_children(record: &Value) -> Option<Vec<&Value>> {
    if let Some(edges) = record
        .pointer("/edge_sidecar_to_children/edges")
        .and_then(Value::as_array)
    {
        return Some(edges.iter().filter_map(|e| e.get("node")).collect());
    }
    record
        .get("carousel_media")
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
}

/// Turn whatever sits at a media path into candidates.
///
/// An array of several records (story reels, API `items`) is an ordered
/// carousel of its own.
#[must_use]
pub fn extract_found(found: &Value, strategy: StrategyId) -> Extraction {
    match found {
        Value::Array(items) if items.len() > 1 => {
            let mut out = Extraction {
                carousel: true,
                ..Extraction::default()
            };
            for (i, item) in items.iter().enumerate() {
                out.candidates.extend(single_record(item, strategy, Some(i)));
            }
            if let Some(first) = items.first() {
                out.caption = caption(first);
                out.owner = owner(first);
            }
            out
        }
        Value::Array(items) => items
            .first()
            .map(|item| extract_record(item, strategy))
            .unwrap_or_default(),
        other => extract_record(other, strategy),
    }
}

/// Candidates from one post record, descending into carousel children.
#[must_use]
pub fn extract_record(record: &Value, strategy: StrategyId) -> Extraction {
    let caption = caption(record);
    let owner = owner(record);

    match discriminate(record) {
        Some(Discriminator::Carousel) => {
            let children = carousel_children(record).unwrap_or_default();
            let candidates = children
                .iter()
                .enumerate()
                .flat_map(|(i, child)| single_record(child, strategy, Some(i)))
                .collect();
            Extraction {
                candidates,
                carousel: true,
                caption,
                owner,
            }
        }
        Some(_) => Extraction {
            candidates: single_record(record, strategy, None),
            carousel: false,
            caption,
            owner,
        },
        None => Extraction::empty(),
    }
}

/// One image or video record; videos also yield their thumbnail as an image.
fn single_record(record: &Value, strategy: StrategyId, slot: Option<usize>) -> Vec<Candidate> {
    let mut out = Vec::new();
    let dims = dimensions_hint(record);

    if discriminate(record) == Some(Discriminator::Video) {
        if let Some(url) = url_at(record, "video_url") {
            out.push(
                Candidate::new(url, MediaKind::Video, strategy)
                    .with_hint(dims.clone())
                    .at_slot(slot),
            );
        }
        for (url, hint) in sized_list(record.get("video_versions"), "url", "width", "height") {
            out.push(
                Candidate::new(url, MediaKind::Video, strategy)
                    .with_hint(hint)
                    .at_slot(slot),
            );
        }
    }

    if let Some(url) = url_at(record, "display_url") {
        out.push(
            Candidate::new(url, MediaKind::Image, strategy)
                .with_hint(dims)
                .at_slot(slot),
        );
    }
    for (url, hint) in sized_list(
        record.get("display_resources"),
        "src",
        "config_width",
        "config_height",
    ) {
        out.push(
            Candidate::new(url, MediaKind::Image, strategy)
                .with_hint(hint)
                .at_slot(slot),
        );
    }
    for (url, hint) in sized_list(
        record.pointer("/image_versions2/candidates"),
        "url",
        "width",
        "height",
    ) {
        out.push(
            Candidate::new(url, MediaKind::Image, strategy)
                .with_hint(hint)
                .at_slot(slot),
        );
    }
    out
}

/// `(url, "WxH")` pairs from a list of sized resources.
fn sized_list<'a>(
    list: Option<&'a Value>,
    url_key: &str,
    w_key: &str,
    h_key: &str,
) -> Vec<(&'a str, Option<String>)> {
    let Some(items) = list.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let url = url_at(item, url_key)?;
            let w = item.get(w_key).and_then(Value::as_u64);
            let h = item.get(h_key).and_then(Value::as_u64);
            let hint = match (w, h) {
                (Some(w), Some(h)) => Some(format!("{w}x{h}")),
                _ => None,
            };
            Some((url, hint))
        })
        .collect()
}

/// A string field that is present and not blank.
fn url_at<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn dimensions_hint(record: &Value) -> Option<String> {
    let w = record.pointer("/dimensions/width").and_then(Value::as_u64)?;
    let h = record.pointer("/dimensions/height").and_then(Value::as_u64)?;
    Some(format!("{w}x{h}"))
}

#[must_use]
pub fn caption(record: &Value) -> Option<String> {
    let text = record
        .pointer("/edge_media_to_caption/edges/0/node/text")
        .or_else(|| record.pointer("/caption/text"))
        .or_else(|| record.get("caption").filter(|c| c.is_string()))
        .and_then(Value::as_str)?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[must_use]
pub fn owner(record: &Value) -> Option<String> {
    record
        .pointer("/owner/username")
        .or_else(|| record.pointer("/user/username"))
        .and_then(Value::as_str)
        .map(str::to_lowercase)
}

/// Slice out the balanced `{...}` object that starts at or after `from`.
///
/// String literals and escapes are respected so braces inside captions do not
/// end the object early.
#[must_use]
pub fn balanced_object(text: &str, from: usize) -> Option<&str> {
    let rest = text.get(from..)?;
    let start = from + rest.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}
