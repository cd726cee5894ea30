use url::Url;

use crate::models::{Candidate, Extraction, MediaKind, SourceDocument, StrategyId};

const CDN_HOST_SUFFIXES: &[&str] = &["cdninstagram.com", "fbcdn.net"];

/// Query parameters that only track the sharer; signature params stay.
const TRACKING_PARAMS: &[&str] = &["igshid", "igsh", "fbclid", "si"];

/// True when `input` is already a media file on a known CDN host.
#[must_use]
pub fn is_cdn_url(input: &str) -> bool {
    Url::parse(input.trim()).is_ok_and(|u| is_cdn_host(&u))
}

fn is_cdn_host(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|host| {
            let host = host.to_ascii_lowercase();
            CDN_HOST_SUFFIXES
                .iter()
                .any(|suffix| host == *suffix || host.ends_with(&format!(".{suffix}")))
        })
}

fn is_tracking(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

/// Drop tracking query parameters, leaving the rest byte-for-byte.
#[must_use]
pub fn strip_tracking(url: &Url) -> Url {
    let kept: Vec<&str> = url
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or("");
            !pair.is_empty() && !is_tracking(key)
        })
        .collect();

    let mut clean = url.clone();
    clean.set_fragment(None);
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.set_query(Some(&kept.join("&")));
    }
    clean
}

/// Strategy 6: the input itself is a CDN media URL; no fetch needed.
#[must_use]
pub fn extract(doc: &SourceDocument) -> Extraction {
    let Ok(url) = Url::parse(doc.body.trim()) else {
        return Extraction::empty();
    };
    if !is_cdn_host(&url) {
        return Extraction::empty();
    }
    let clean = strip_tracking(&url);
    let kind = match MediaKind::from_url(clean.as_str()) {
        MediaKind::Unknown => MediaKind::Image,
        known => known,
    };
    Extraction {
        candidates: vec![Candidate::new(clean.as_str(), kind, StrategyId::DirectCdn)],
        ..Extraction::default()
    }
}
