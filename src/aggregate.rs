use std::collections::BTreeMap;

use crate::{
    chain::ChainHit,
    models::{MediaAsset, MediaKind, ResolutionResult, ScoredCandidate},
    rank::rank_with_origin,
};

/// Build the terminal result from the chain's winning extraction.
#[must_use]
pub fn aggregate(hit: ChainHit, origin: &str) -> ResolutionResult {
    let ChainHit { extraction, method } = hit;
    let ranked = rank_with_origin(extraction.candidates, origin);

    let assets = if extraction.carousel {
        carousel_assets(ranked)
    } else {
        best_of(&ranked)
            .map(|best| vec![asset(best, 0)])
            .unwrap_or_default()
    };

    if assets.is_empty() {
        return ResolutionResult::failure(crate::error::ErrorKind::NoMediaFound);
    }

    ResolutionResult {
        success: true,
        is_carousel: extraction.carousel,
        assets,
        caption: extraction.caption,
        owner: extraction.owner,
        method_used: Some(method),
        error: None,
    }
}

/// One asset per slot, slots in source order.
fn carousel_assets(ranked: Vec<ScoredCandidate>) -> Vec<MediaAsset> {
    let mut slots: BTreeMap<usize, Vec<ScoredCandidate>> = BTreeMap::new();
    for c in ranked {
        if let Some(i) = c.candidate.carousel_index {
            slots.entry(i).or_default().push(c);
        }
    }
    slots
        .values()
        .filter_map(|slot| best_of(slot))
        .enumerate()
        .map(|(position, best)| asset(best, position))
        .collect()
}

/// Top video if there is one, else top image, else whatever is left.
///
/// `ranked` is grouped by kind and sorted within each group, so the first
/// match of a kind is that kind's best.
fn best_of(ranked: &[ScoredCandidate]) -> Option<&ScoredCandidate> {
    let first_of = |kind: MediaKind| ranked.iter().find(|c| c.candidate.media_kind == kind);
    first_of(MediaKind::Video)
        .or_else(|| first_of(MediaKind::Image))
        .or_else(|| ranked.first())
}

fn asset(best: &ScoredCandidate, position: usize) -> MediaAsset {
    let kind = match best.candidate.media_kind.or_infer(&best.candidate.url) {
        MediaKind::Video => MediaKind::Video,
        _ => MediaKind::Image,
    };
    MediaAsset {
        url: best.candidate.url.clone(),
        kind,
        quality: best.quality.label(),
        position,
    }
}
