//! Extraction strategies: pure functions from one source document to
//! candidate media URLs, kept in an ordered registry.
//!
//! Adding a heuristic means writing one `fn(&SourceDocument) -> Extraction`
//! and registering it with a priority; the chain controller never changes.

pub mod additional_data;
pub mod direct_cdn;
pub mod embed_markup;
pub mod embedded_state;
pub mod linked_data;
pub mod meta_tags;
pub mod raw_patterns;
pub mod record;

use crate::models::{DocumentKind, Extraction, SourceDocument, StrategyId};

pub type ExtractFn = fn(&SourceDocument) -> Extraction;

/// Which documents a strategy may look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Fetched page or API bodies.
    Fetched,
    /// The user's raw input, before any fetch.
    Input,
}

impl Scope {
    #[must_use]
    pub const fn accepts(self, kind: DocumentKind) -> bool {
        matches!(
            (self, kind),
            (Self::Input, DocumentKind::Input)
                | (
                    Self::Fetched,
                    DocumentKind::Primary
                        | DocumentKind::Embed
                        | DocumentKind::Api
                        | DocumentKind::Mirror
                )
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Strategy {
    pub id: StrategyId,
    /// Lower runs first.
    pub priority: u8,
    pub scope: Scope,
    pub extract: ExtractFn,
}

impl Strategy {
    #[must_use]
    pub const fn new(id: StrategyId, priority: u8, scope: Scope, extract: ExtractFn) -> Self {
        Self {
            id,
            priority,
            scope,
            extract,
        }
    }
}

/// Default priority of each built-in strategy.
#[must_use]
pub const fn priority_of(id: StrategyId) -> u8 {
    match id {
        StrategyId::EmbeddedState => 1,
        StrategyId::AdditionalData => 2,
        StrategyId::LinkedData => 3,
        StrategyId::MetaTags => 4,
        StrategyId::RawPatterns => 5,
        StrategyId::DirectCdn => 6,
        StrategyId::EmbedMarkup => 7,
    }
}

/// Ordered strategy list.
#[derive(Clone, Debug)]
pub struct StrategyRegistry {
    strategies: Vec<Strategy>,
}

impl StrategyRegistry {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Insert keeping priority order; equal priorities keep registration order.
    pub fn register(&mut self, strategy: Strategy) -> &mut Self {
        let at = self
            .strategies
            .iter()
            .position(|s| s.priority > strategy.priority)
            .unwrap_or(self.strategies.len());
        self.strategies.insert(at, strategy);
        self
    }

    #[must_use]
    pub fn with(mut self, strategy: Strategy) -> Self {
        self.register(strategy);
        self
    }

    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Strategies allowed to look at a document of this kind, in order.
    pub fn applicable(&self, kind: DocumentKind) -> impl Iterator<Item = &Strategy> {
        self.strategies.iter().filter(move |s| s.scope.accepts(kind))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        const fn builtin(id: StrategyId, scope: Scope, extract: ExtractFn) -> Strategy {
            Strategy::new(id, priority_of(id), scope, extract)
        }

        Self::empty()
            .with(builtin(StrategyId::EmbeddedState, Scope::Fetched, embedded_state::extract))
            .with(builtin(StrategyId::AdditionalData, Scope::Fetched, additional_data::extract))
            .with(builtin(StrategyId::LinkedData, Scope::Fetched, linked_data::extract))
            .with(builtin(StrategyId::MetaTags, Scope::Fetched, meta_tags::extract))
            .with(builtin(StrategyId::RawPatterns, Scope::Fetched, raw_patterns::extract))
            .with(builtin(StrategyId::DirectCdn, Scope::Input, direct_cdn::extract))
            .with(builtin(StrategyId::EmbedMarkup, Scope::Fetched, embed_markup::extract))
    }
}
