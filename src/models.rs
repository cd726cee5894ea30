use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/* ---------- Candidates ---------- */

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

impl MediaKind {
    /// Guess a kind from the path extension of a URL.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
        let ext = path.rsplit('.').next().unwrap_or("");
        match ext {
            "mp4" | "mov" | "m4v" | "webm" => Self::Video,
            "jpg" | "jpeg" | "png" | "webp" | "heic" | "gif" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Replace `Unknown` with whatever the URL suggests.
    #[must_use]
    pub fn or_infer(self, url: &str) -> Self {
        match self {
            Self::Unknown => Self::from_url(url),
            known => known,
        }
    }
}

/// Stable identifiers of the extraction strategies.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    EmbeddedState,
    AdditionalData,
    LinkedData,
    MetaTags,
    RawPatterns,
    DirectCdn,
    EmbedMarkup,
}

impl StrategyId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmbeddedState => "embedded_state",
            Self::AdditionalData => "additional_data",
            Self::LinkedData => "linked_data",
            Self::MetaTags => "meta_tags",
            Self::RawPatterns => "raw_patterns",
            Self::DirectCdn => "direct_cdn",
            Self::EmbedMarkup => "embed_markup",
        }
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub raw_url: String,
    pub media_kind: MediaKind,
    pub quality_hint: Option<String>,
    pub source_strategy: StrategyId,
    pub carousel_index: Option<usize>,
}

impl Candidate {
    #[must_use]
    pub fn new(raw_url: impl Into<String>, media_kind: MediaKind, source_strategy: StrategyId) -> Self {
        Self {
            raw_url: raw_url.into(),
            media_kind,
            quality_hint: None,
            source_strategy,
            carousel_index: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.quality_hint = hint;
        self
    }

    #[must_use]
    pub const fn at_slot(mut self, index: Option<usize>) -> Self {
        self.carousel_index = index;
        self
    }
}

/// A candidate whose URL went through [`crate::normalize::normalize`].
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedCandidate {
    pub url: String,
    pub media_kind: MediaKind,
    pub quality_hint: Option<String>,
    pub source_strategy: StrategyId,
    pub carousel_index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: NormalizedCandidate,
    pub quality: crate::quality::Quality,
}

impl ScoredCandidate {
    #[must_use]
    pub fn score(&self) -> f64 {
        self.quality.score
    }
}

/// Everything one strategy pulled out of one document.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    pub candidates: Vec<Candidate>,
    /// Set when the winning record's discriminator said "carousel".
    pub carousel: bool,
    pub caption: Option<String>,
    pub owner: Option<String>,
}

impl Extraction {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no candidate carries a URL worth normalizing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.iter().all(|c| c.raw_url.trim().is_empty())
    }

    /// Drop candidates whose URL is blank.
    pub fn discard_blank(&mut self) {
        self.candidates.retain(|c| !c.raw_url.trim().is_empty());
    }
}

/* ---------- Documents ---------- */

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// The user's own input, never fetched.
    Input,
    Primary,
    Embed,
    Api,
    Mirror,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Input => "input",
            Self::Primary => "primary",
            Self::Embed => "embed",
            Self::Api => "api",
            Self::Mirror => "mirror",
        };
        f.write_str(s)
    }
}

/// One entry of the ordered document plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub kind: DocumentKind,
    pub url: String,
}

impl Endpoint {
    #[must_use]
    pub fn new(kind: DocumentKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }

    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self.kind, DocumentKind::Input)
    }
}

/// Raw text from one fetch attempt, tagged with where it came from.
#[derive(Clone, Debug)]
pub struct SourceDocument {
    pub endpoint: Endpoint,
    pub body: String,
}

/* ---------- Output ---------- */

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub url: String,
    pub kind: MediaKind,
    pub quality: String,
    pub position: usize,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MethodUsed {
    pub strategy: StrategyId,
    pub priority: u8,
    pub document: DocumentKind,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub success: bool,
    pub assets: Vec<MediaAsset>,
    pub is_carousel: bool,
    pub caption: Option<String>,
    pub owner: Option<String>,
    pub method_used: Option<MethodUsed>,
    pub error: Option<ErrorKind>,
}

impl ResolutionResult {
    #[must_use]
    pub const fn failure(error: ErrorKind) -> Self {
        Self {
            success: false,
            assets: Vec::new(),
            is_carousel: false,
            caption: None,
            owner: None,
            method_used: None,
            error: Some(error),
        }
    }
}
