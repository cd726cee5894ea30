//! Comparable quality scores for normalized candidates.
//!
//! A score is a coarse bucket taken from tokens in the URL or the quality hint
//! (or from the frame size when one is spelled out), plus a megapixel bonus
//! when the URL or hint carries `WIDTHxHEIGHT`. A srcset width (`750w`) counts
//! as a square frame of that width.
//!
//! Only the URL path and its `stp` size parameter are scanned; signature
//! parameters are random text.
//! Scores are only ever compared between candidates of the same media kind.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::models::NormalizedCandidate;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// No recognizable signal at all.
    Unknown,
    Low,
    Standard,
    Hd,
    FullHd,
}

impl Bucket {
    #[must_use]
    pub const fn base(self) -> f64 {
        match self {
            Self::Unknown => 1.0,
            Self::Low => 10.0,
            Self::Standard => 20.0,
            Self::Hd => 30.0,
            Self::FullHd => 40.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Standard => "standard",
            Self::Hd => "hd",
            Self::FullHd => "full_hd",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quality {
    pub bucket: Bucket,
    pub dimensions: Option<(u32, u32)>,
    pub score: f64,
}

impl Quality {
    /// Human label: the pixel size when known, else the bucket name.
    #[must_use]
    pub fn label(&self) -> String {
        match self.dimensions {
            Some((w, h)) => format!("{w}x{h}"),
            None => self.bucket.label().to_string(),
        }
    }
}

/// Token table, highest bucket first.
const TOKENS: &[(Bucket, &[&str])] = &[
    (Bucket::FullHd, &["1080", "fullhd", "fhd"]),
    (Bucket::Hd, &["720", "hd", "high"]),
    (Bucket::Standard, &["standard", "sd", "medium"]),
    (Bucket::Low, &["480", "360", "low"]),
];

static TOKEN_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]+|[0-9]+").unwrap());
static DIMENSIONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{2,5})x([0-9]{2,5})(?:[^0-9]|$)").unwrap());
static WIDTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([0-9]{2,5})w\s*$").unwrap());

/// Query parameters that spell out a rendition size.
const SIZE_PARAMS: &[&str] = &["stp"];

#[must_use]
pub fn score(candidate: &NormalizedCandidate) -> f64 {
    classify(candidate).score
}

#[must_use]
pub fn classify(candidate: &NormalizedCandidate) -> Quality {
    let hint = candidate.quality_hint.as_deref().unwrap_or("");
    let url = signal_text(&candidate.url);
    let text = format!("{url} {hint}").to_ascii_lowercase();

    let dimensions = find_dimensions(&url).or_else(|| find_dimensions(hint));
    let frame = dimensions.or_else(|| find_width(hint).map(|w| (w, w)));
    let bucket = bucket_for(&text).max(frame.map_or(Bucket::Unknown, bucket_for_size));

    let mut score = bucket.base();
    if let Some((w, h)) = frame {
        score += f64::from(w) * f64::from(h) / 1_000_000.0;
    }
    Quality {
        bucket,
        dimensions,
        score,
    }
}

/// Path plus size parameters; the host and everything else are left out.
fn signal_text(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.split(['?', '#']).next().unwrap_or(url).to_string();
    };
    let mut text = parsed.path().to_string();
    for (key, value) in parsed.query_pairs() {
        if SIZE_PARAMS.iter().any(|p| *p == key) {
            text.push(' ');
            text.push_str(&value);
        }
    }
    text
}

fn bucket_for(text: &str) -> Bucket {
    if text.contains("full_hd") || text.contains("full-hd") {
        return Bucket::FullHd;
    }
    // "1080p" and "hd720" both split into usable tokens
    let tokens: Vec<&str> = TOKEN_SPLIT_RE.find_iter(text).map(|m| m.as_str()).collect();
    for (bucket, words) in TOKENS {
        if tokens.iter().any(|t| words.contains(t)) {
            return *bucket;
        }
    }
    Bucket::Unknown
}

/// Bucket implied by the short side of a frame.
const fn bucket_for_size((w, h): (u32, u32)) -> Bucket {
    let short = if w < h { w } else { h };
    if short >= 1080 {
        Bucket::FullHd
    } else if short >= 720 {
        Bucket::Hd
    } else if short > 480 {
        Bucket::Standard
    } else {
        Bucket::Low
    }
}

fn find_dimensions(text: &str) -> Option<(u32, u32)> {
    let caps = DIMENSIONS_RE.captures(text)?;
    let w: u32 = caps[1].parse().ok()?;
    let h: u32 = caps[2].parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

fn find_width(hint: &str) -> Option<u32> {
    let w: u32 = WIDTH_RE.captures(hint)?[1].parse().ok()?;
    (w > 0).then_some(w)
}
