use crate::{
    aggregate::aggregate,
    chain::{ChainController, ChainOutcome},
    error::ErrorKind,
    fetch::{DEFAULT_USER_AGENT, Headers, PageFetcher, browser_headers},
    models::{DocumentKind, Endpoint, ResolutionResult},
    normalize::DEFAULT_ORIGIN,
    reference::{self, PostPath, Reference, ShortcodeRef, UsernameRef},
    strategies::{StrategyRegistry, direct_cdn},
};

/// JSON variants of a post, tried in order.
const API_PATHS: &[&str] = &[
    "/p/{code}/?__a=1&__d=dis",
    "/p/{code}/?__a=1",
    "/api/v1/media/{code}/info/",
];

/// Knobs handed to the fetcher and the endpoint planner.
#[derive(Clone, Debug)]
pub struct ResolverSettings {
    pub origin: String,
    pub headers: Headers,
    pub timeout_ms: u64,
    pub embed_variant: bool,
    pub api_variant: bool,
    pub mirrors: Vec<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            headers: browser_headers(DEFAULT_USER_AGENT),
            timeout_ms: 10_000,
            embed_variant: true,
            api_variant: true,
            mirrors: Vec::new(),
        }
    }
}

impl ResolverSettings {
    /// Ordered documents to try for a parsed reference.
    #[must_use]
    pub fn plan(&self, reference: &Reference) -> Vec<Endpoint> {
        let origin = self.origin.trim_end_matches('/');
        let mut plan = vec![Endpoint::new(
            DocumentKind::Primary,
            primary_url(reference, origin),
        )];

        // usernames only ever get stories pages
        if let Reference::Shortcode(ShortcodeRef { code, path }) = reference
            && !matches!(path, PostPath::Story { .. })
        {
            if self.embed_variant {
                plan.push(Endpoint::new(
                    DocumentKind::Embed,
                    format!("{origin}/p/{code}/embed/captioned/"),
                ));
            }
            if self.api_variant {
                plan.extend(API_PATHS.iter().map(|p| {
                    Endpoint::new(
                        DocumentKind::Api,
                        format!("{origin}{}", p.replace("{code}", code)),
                    )
                }));
            }
        }

        for mirror in &self.mirrors {
            plan.push(Endpoint::new(
                DocumentKind::Mirror,
                mirror_url(reference, mirror.trim_end_matches('/')),
            ));
        }
        plan
    }
}

/// Mirrors only know `/p/{code}/` for posts; stories keep their path.
fn mirror_url(reference: &Reference, mirror: &str) -> String {
    match reference {
        Reference::Shortcode(ShortcodeRef { code, path }) if !matches!(path, PostPath::Story { .. }) => {
            format!("{mirror}/p/{code}/")
        }
        other => primary_url(other, mirror),
    }
}

fn primary_url(reference: &Reference, origin: &str) -> String {
    match reference {
        Reference::Username(UsernameRef { username }) => format!("{origin}/stories/{username}/"),
        shortcode => shortcode.canonical_url(origin),
    }
}

/// The pipeline: parse, fetch-and-extract chain, rank, aggregate.
#[derive(Clone, Debug)]
pub struct Resolver<F> {
    fetcher: F,
    registry: StrategyRegistry,
    settings: ResolverSettings,
}

impl<F: PageFetcher> Resolver<F> {
    pub fn new(fetcher: F, settings: ResolverSettings) -> Self {
        Self::with_registry(fetcher, settings, StrategyRegistry::default())
    }

    pub const fn with_registry(
        fetcher: F,
        settings: ResolverSettings,
        registry: StrategyRegistry,
    ) -> Self {
        Self {
            fetcher,
            registry,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve a post/story/profile reference (or a CDN link) to media assets.
    pub async fn resolve(&self, input: &str) -> ResolutionResult {
        let input = input.trim();

        let plan = if direct_cdn::is_cdn_url(input) {
            vec![Endpoint::new(DocumentKind::Input, input)]
        } else {
            match reference::parse(input) {
                Ok(reference) => {
                    tracing::debug!(%reference, "parsed reference");
                    self.settings.plan(&reference)
                }
                Err(e) => {
                    tracing::info!(error = %e, "rejected reference");
                    return ResolutionResult::failure(e.kind());
                }
            }
        };

        let mut chain = ChainController::new(
            &self.fetcher,
            &self.registry,
            &self.settings.headers,
            self.settings.timeout_ms,
        );
        match chain.run(&plan).await {
            ChainOutcome::Success(hit) => {
                let result = aggregate(hit, &self.settings.origin);
                tracing::info!(
                    method = ?result.method_used,
                    assets = result.assets.len(),
                    carousel = result.is_carousel,
                    "resolved"
                );
                result
            }
            ChainOutcome::Exhausted => {
                tracing::info!(documents = plan.len(), "no strategy found media");
                ResolutionResult::failure(ErrorKind::NoMediaFound)
            }
        }
    }
}
