//! Strategy chain controller.
//!
//! Documents are visited in plan order, one at a time. For each document the
//! applicable strategies run in priority order and the first extraction with
//! at least one non-blank URL ends the whole run. A failed fetch counts as an
//! empty document.

use std::fmt;

use crate::{
    fetch::{Headers, PageFetcher},
    models::{Endpoint, Extraction, MethodUsed, SourceDocument},
    strategies::StrategyRegistry,
};

/// Where the controller is; `Success` and `Exhausted` are terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    TryingStrategy { document: usize, strategy: usize },
    NextStrategy { document: usize, strategy: usize },
    NextDocument { document: usize },
    Success,
    Exhausted,
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::TryingStrategy { document, strategy } => {
                write!(f, "trying strategy {strategy} on document {document}")
            }
            Self::NextStrategy { document, strategy } => {
                write!(f, "next strategy {strategy} on document {document}")
            }
            Self::NextDocument { document } => write!(f, "next document {document}"),
            Self::Success => write!(f, "success"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

#[derive(Debug)]
pub struct ChainHit {
    pub extraction: Extraction,
    pub method: MethodUsed,
}

#[derive(Debug)]
pub enum ChainOutcome {
    Success(ChainHit),
    Exhausted,
}

pub struct ChainController<'a, F> {
    fetcher: &'a F,
    registry: &'a StrategyRegistry,
    headers: &'a Headers,
    timeout_ms: u64,
    state: ChainState,
}

impl<'a, F: PageFetcher> ChainController<'a, F> {
    #[must_use]
    pub const fn new(
        fetcher: &'a F,
        registry: &'a StrategyRegistry,
        headers: &'a Headers,
        timeout_ms: u64,
    ) -> Self {
        Self {
            fetcher,
            registry,
            headers,
            timeout_ms,
            state: ChainState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ChainState {
        &self.state
    }

    fn enter(&mut self, next: ChainState) {
        tracing::trace!(from = %self.state, to = %next, "chain transition");
        self.state = next;
    }

    /// Run the plan to a terminal state.
    pub async fn run(&mut self, plan: &[Endpoint]) -> ChainOutcome {
        for (d, endpoint) in plan.iter().enumerate() {
            let Some(doc) = self.load(endpoint).await else {
                self.enter(ChainState::NextDocument { document: d + 1 });
                continue;
            };

            if let Some(hit) = self.try_document(d, &doc) {
                self.enter(ChainState::Success);
                return ChainOutcome::Success(hit);
            }
            self.enter(ChainState::NextDocument { document: d + 1 });
        }
        self.enter(ChainState::Exhausted);
        ChainOutcome::Exhausted
    }

    /// Fetch a document, or wrap the inline input. Failures are logged, not raised.
    async fn load(&self, endpoint: &Endpoint) -> Option<SourceDocument> {
        if endpoint.is_inline() {
            return Some(SourceDocument {
                endpoint: endpoint.clone(),
                body: endpoint.url.clone(),
            });
        }
        match self
            .fetcher
            .fetch(&endpoint.url, self.headers, self.timeout_ms)
            .await
        {
            Ok(body) => {
                tracing::debug!(document = %endpoint.kind, url = %endpoint.url, bytes = body.len(), "fetched");
                Some(SourceDocument {
                    endpoint: endpoint.clone(),
                    body,
                })
            }
            Err(e) => {
                tracing::warn!(document = %endpoint.kind, error = %e, kind = %e.kind(), "fetch failed, moving on");
                None
            }
        }
    }

    fn try_document(&mut self, d: usize, doc: &SourceDocument) -> Option<ChainHit> {
        let registry = self.registry;
        for (s, strategy) in registry.applicable(doc.endpoint.kind).enumerate() {
            self.enter(ChainState::TryingStrategy {
                document: d,
                strategy: s,
            });
            let mut extraction = (strategy.extract)(doc);
            extraction.discard_blank();
            if !extraction.is_empty() {
                tracing::debug!(
                    strategy = %strategy.id,
                    document = %doc.endpoint.kind,
                    candidates = extraction.candidates.len(),
                    "strategy matched"
                );
                return Some(ChainHit {
                    extraction,
                    method: MethodUsed {
                        strategy: strategy.id,
                        priority: strategy.priority,
                        document: doc.endpoint.kind,
                    },
                });
            }
            self.enter(ChainState::NextStrategy {
                document: d,
                strategy: s + 1,
            });
        }
        None
    }
}
