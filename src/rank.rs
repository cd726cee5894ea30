use std::collections::HashSet;

use crate::{
    models::{Candidate, MediaKind, NormalizedCandidate, ScoredCandidate},
    normalize::normalize_with_origin,
    quality,
    strategies::priority_of,
};

/// Normalize, dedupe and score candidates.
///
/// `Unknown` kinds are re-read from the normalized URL's extension.
/// Output is grouped by media kind (in order of first appearance) and sorted
/// by descending score inside each group; scores of different kinds are
/// never compared. Ties keep strategy priority, then input order.
#[must_use]
pub fn rank(candidates: Vec<Candidate>) -> Vec<ScoredCandidate> {
    rank_with_origin(candidates, crate::normalize::DEFAULT_ORIGIN)
}

#[must_use]
pub fn rank_with_origin(candidates: Vec<Candidate>, origin: &str) -> Vec<ScoredCandidate> {
    let normalized = candidates.into_iter().map(|c| {
        let url = normalize_with_origin(&c.raw_url, origin);
        NormalizedCandidate {
            media_kind: c.media_kind.or_infer(&url),
            url,
            quality_hint: c.quality_hint,
            source_strategy: c.source_strategy,
            carousel_index: c.carousel_index,
        }
    });

    let mut seen = HashSet::new();
    let unique: Vec<NormalizedCandidate> = normalized
        .filter(|c| !c.url.is_empty() && seen.insert(c.url.clone()))
        .collect();

    let mut kinds: Vec<MediaKind> = Vec::new();
    for c in &unique {
        if !kinds.contains(&c.media_kind) {
            kinds.push(c.media_kind);
        }
    }

    let mut scored: Vec<ScoredCandidate> = unique
        .into_iter()
        .map(|candidate| {
            let quality = quality::classify(&candidate);
            ScoredCandidate { candidate, quality }
        })
        .collect();

    // Stable: equal keys keep input order.
    scored.sort_by(|a, b| {
        let group = |c: &ScoredCandidate| kinds.iter().position(|k| *k == c.candidate.media_kind);
        group(a)
            .cmp(&group(b))
            .then_with(|| b.score().total_cmp(&a.score()))
            .then_with(|| {
                priority_of(a.candidate.source_strategy)
                    .cmp(&priority_of(b.candidate.source_strategy))
            })
    });
    scored
}
