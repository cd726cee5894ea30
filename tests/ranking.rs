use postgrab::{
    models::{Candidate, MediaKind, NormalizedCandidate, StrategyId},
    quality::{Bucket, classify, score},
    rank::rank,
};

fn normalized(url: &str, kind: MediaKind, hint: Option<&str>) -> NormalizedCandidate {
    NormalizedCandidate {
        url: url.to_string(),
        media_kind: kind,
        quality_hint: hint.map(str::to_string),
        source_strategy: StrategyId::EmbeddedState,
        carousel_index: None,
    }
}

fn video(url: &str) -> Candidate {
    Candidate::new(url, MediaKind::Video, StrategyId::RawPatterns)
}

#[test]
fn tokens_pick_buckets() {
    let q = |url: &str| classify(&normalized(url, MediaKind::Video, None)).bucket;
    assert_eq!(q("https://cdn.example/clip_1080p.mp4"), Bucket::FullHd);
    assert_eq!(q("https://cdn.example/clip_hd720.mp4"), Bucket::Hd);
    assert_eq!(q("https://cdn.example/clip-sd.mp4"), Bucket::Standard);
    assert_eq!(q("https://cdn.example/clip_480.mp4"), Bucket::Low);
    assert_eq!(q("https://cdn.example/clip.mp4"), Bucket::Unknown);
}

#[test]
fn resolution_1080_beats_720() {
    let hd = score(&normalized(
        "https://cdn.example/v/clip_720.mp4",
        MediaKind::Video,
        None,
    ));
    let full = score(&normalized(
        "https://cdn.example/v/clip_1080.mp4",
        MediaKind::Video,
        None,
    ));
    assert!(full > hd, "{full} should beat {hd}");
}

#[test]
fn no_signal_scores_below_low() {
    let nothing = score(&normalized("https://cdn.example/a.jpg", MediaKind::Image, None));
    let low = score(&normalized(
        "https://cdn.example/a_low.jpg",
        MediaKind::Image,
        None,
    ));
    assert!(nothing > 0.0);
    assert!(nothing < low);
}

#[test]
fn dimensions_add_a_bonus_and_a_label() {
    let square = classify(&normalized(
        "https://cdn.example/a.jpg",
        MediaKind::Image,
        Some("1080x1080"),
    ));
    let portrait = classify(&normalized(
        "https://cdn.example/b.jpg",
        MediaKind::Image,
        Some("1080x1350"),
    ));
    assert_eq!(square.bucket, Bucket::FullHd);
    assert_eq!(portrait.bucket, Bucket::FullHd);
    assert!(portrait.score > square.score);
    assert_eq!(portrait.dimensions, Some((1080, 1350)));
    assert_eq!(portrait.label(), "1080x1350");

    let small = classify(&normalized(
        "https://cdn.example/s640x640/c.jpg",
        MediaKind::Image,
        None,
    ));
    assert_eq!(small.bucket, Bucket::Standard);
    assert_eq!(small.label(), "640x640");

    let plain = classify(&normalized("https://cdn.example/hd/d.jpg", MediaKind::Image, None));
    assert_eq!(plain.label(), "hd");
}

#[test]
fn escaped_and_plain_forms_collapse_to_one() {
    let ranked = rank(vec![
        video(r"https:\/\/cdn.example\/v.mp4?a=1&b=2"),
        video("https://cdn.example/v.mp4?a=1&amp;b=2"),
        video("https://cdn.example/v.mp4?a=1&b=2"),
    ]);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].candidate.url, "https://cdn.example/v.mp4?a=1&b=2");
}

#[test]
fn empty_urls_are_dropped() {
    let ranked = rank(vec![video("   "), video("https://cdn.example/v.mp4")]);
    assert_eq!(ranked.len(), 1);
}

#[test]
fn sorted_best_first_within_each_kind() {
    let ranked = rank(vec![
        video("https://cdn.example/v_720.mp4"),
        Candidate::new(
            "https://cdn.example/i.jpg",
            MediaKind::Image,
            StrategyId::RawPatterns,
        )
        .with_hint(Some("1080x1080".into())),
        video("https://cdn.example/v_1080.mp4"),
    ]);
    let urls: Vec<&str> = ranked.iter().map(|c| c.candidate.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://cdn.example/v_1080.mp4",
            "https://cdn.example/v_720.mp4",
            "https://cdn.example/i.jpg",
        ]
    );
}

#[test]
fn ties_go_to_the_higher_priority_strategy() {
    let ranked = rank(vec![
        Candidate::new("https://cdn.example/a.jpg", MediaKind::Image, StrategyId::RawPatterns),
        Candidate::new("https://cdn.example/b.jpg", MediaKind::Image, StrategyId::LinkedData),
        Candidate::new("https://cdn.example/c.jpg", MediaKind::Image, StrategyId::RawPatterns),
    ]);
    let urls: Vec<&str> = ranked.iter().map(|c| c.candidate.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://cdn.example/b.jpg",
            "https://cdn.example/a.jpg",
            "https://cdn.example/c.jpg",
        ]
    );
}

#[test]
fn unknown_kinds_are_read_from_the_extension() {
    let ranked = rank(vec![Candidate::new(
        "https://cdn.example/clip.mp4?x=1",
        MediaKind::Unknown,
        StrategyId::LinkedData,
    )]);
    assert_eq!(ranked[0].candidate.media_kind, MediaKind::Video);
}

#[test]
fn srcset_widths_are_scored_by_size() {
    let narrow = classify(&normalized("https://cdn.example/a.jpg", MediaKind::Image, Some("640w")));
    let wide = classify(&normalized("https://cdn.example/b.jpg", MediaKind::Image, Some("750w")));
    assert_eq!(narrow.bucket, Bucket::Standard);
    assert!(wide.score > narrow.score);
    assert_eq!(wide.dimensions, None);
    assert_eq!(wide.label(), "standard");

    let ranked = rank(vec![
        Candidate::new("https://cdn.example/a.jpg", MediaKind::Image, StrategyId::EmbedMarkup)
            .with_hint(Some("640w".into())),
        Candidate::new("https://cdn.example/b.jpg", MediaKind::Image, StrategyId::EmbedMarkup)
            .with_hint(Some("1080w".into())),
    ]);
    assert_eq!(ranked[0].candidate.url, "https://cdn.example/b.jpg");
    assert_eq!(ranked[0].quality.bucket, Bucket::FullHd);
}

#[test]
fn signature_parameters_carry_no_quality_signal() {
    let q = classify(&normalized(
        "https://scontent.cdninstagram.com/v/t51/pic.jpg?oh=00_A12x3456hd&_nc_ohc=9hd3_1080",
        MediaKind::Image,
        None,
    ));
    assert_eq!(q.bucket, Bucket::Unknown);
    assert_eq!(q.dimensions, None);

    let sized = classify(&normalized(
        "https://scontent.cdninstagram.com/v/t51/pic.jpg?stp=dst-jpg_e35_p1080x1350&oh=abc",
        MediaKind::Image,
        None,
    ));
    assert_eq!(sized.dimensions, Some((1080, 1350)));
    assert_eq!(sized.bucket, Bucket::FullHd);
}
