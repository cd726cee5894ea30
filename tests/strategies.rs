use postgrab::{
    ErrorKind,
    models::{DocumentKind, Endpoint, MediaKind, SourceDocument, StrategyId},
    normalize::normalize,
    strategies::{
        Scope, Strategy, StrategyRegistry, additional_data, direct_cdn, embed_markup,
        embedded_state, linked_data, meta_tags, raw_patterns, record,
    },
};

fn page(body: &str) -> SourceDocument {
    SourceDocument {
        endpoint: Endpoint::new(DocumentKind::Primary, "https://example.com/p/ABC/"),
        body: body.to_string(),
    }
}

fn input(url: &str) -> SourceDocument {
    SourceDocument {
        endpoint: Endpoint::new(DocumentKind::Input, url),
        body: url.to_string(),
    }
}

const SHARED_DATA_VIDEO: &str = r#"<html><script type="text/javascript">window._sharedData = {"entry_data":{"PostPage":[{"graphql":{"shortcode_media":{"__typename":"GraphVideo","is_video":true,"video_url":"https:\/\/cdn.example\/v.mp4","display_url":"https:\/\/cdn.example\/thumb.jpg","dimensions":{"width":1080,"height":1920},"owner":{"username":"Alice"},"edge_media_to_caption":{"edges":[{"node":{"text":"hello {world}"}}]}}}}]}};</script></html>"#;

#[test]
fn embedded_state_reads_shared_data() {
    let out = embedded_state::extract(&page(SHARED_DATA_VIDEO));
    assert!(!out.carousel);
    assert_eq!(out.caption.as_deref(), Some("hello {world}"));
    assert_eq!(out.owner.as_deref(), Some("alice"));

    let kinds: Vec<MediaKind> = out.candidates.iter().map(|c| c.media_kind).collect();
    assert_eq!(kinds, [MediaKind::Video, MediaKind::Image]);
    assert_eq!(out.candidates[0].raw_url, "https://cdn.example/v.mp4");
    assert_eq!(out.candidates[0].quality_hint.as_deref(), Some("1080x1920"));
    assert!(
        out.candidates
            .iter()
            .all(|c| c.source_strategy == StrategyId::EmbeddedState)
    );
}

#[test]
fn embedded_state_walks_sidecar_children_in_order() {
    let body = r#"<script>window._sharedData = {"graphql":{"shortcode_media":{"__typename":"GraphSidecar","edge_sidecar_to_children":{"edges":[
        {"node":{"__typename":"GraphImage","display_url":"https://cdn.example/1.jpg"}},
        {"node":{"__typename":"GraphVideo","is_video":true,"video_url":"https://cdn.example/2.mp4","display_url":"https://cdn.example/2.jpg"}}
    ]}}}};</script>"#;
    let out = embedded_state::extract(&page(body));
    assert!(out.carousel);
    let slots: Vec<(Option<usize>, MediaKind)> = out
        .candidates
        .iter()
        .map(|c| (c.carousel_index, c.media_kind))
        .collect();
    assert_eq!(
        slots,
        [
            (Some(0), MediaKind::Image),
            (Some(1), MediaKind::Video),
            (Some(1), MediaKind::Image),
        ]
    );
}

#[test]
fn embedded_state_reads_api_json_with_resolution_lists() {
    let body = r#"{"items":[{"media_type":2,
        "video_versions":[
            {"url":"https://cdn.example/v_small.mp4","width":480,"height":854},
            {"url":"https://cdn.example/v_big.mp4","width":1080,"height":1920}],
        "image_versions2":{"candidates":[{"url":"https://cdn.example/t.jpg","width":1080,"height":1920}]},
        "user":{"username":"Bob"},"caption":{"text":"hi"}}]}"#;
    let out = embedded_state::extract(&page(body));
    assert!(!out.carousel);
    assert_eq!(out.candidates.len(), 3);
    assert_eq!(out.candidates[0].quality_hint.as_deref(), Some("480x854"));
    assert_eq!(out.owner.as_deref(), Some("bob"));
    assert_eq!(out.caption.as_deref(), Some("hi"));
}

#[test]
fn embedded_state_finds_a_bare_shortcode_media_blob() {
    let body = r#"<script>require("x",{"props":{"shortcode_media":{"__typename":"XDTGraphImage","display_url":"https://cdn.example/bare.jpg"}}});</script>"#;
    let out = embedded_state::extract(&page(body));
    assert_eq!(out.candidates.len(), 1);
    assert_eq!(out.candidates[0].raw_url, "https://cdn.example/bare.jpg");
}

#[test]
fn malformed_state_is_an_empty_result() {
    let body = r#"<script>window._sharedData = {"entry_data": {oops}};</script>"#;
    assert!(embedded_state::extract(&page(body)).is_empty());

    let err = record::parse_embedded("{oops}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedEmbeddedData);
}

#[test]
fn missing_key_paths_are_absent_not_errors() {
    let root: serde_json::Value =
        serde_json::from_str(r#"{"graphql":null,"data":{"shortcode_media":{"display_url":"u"}}}"#)
            .unwrap();
    let found = record::first_at(&root, record::MEDIA_PATHS).unwrap();
    assert_eq!(found["display_url"], "u");
    assert!(record::first_at(&serde_json::json!([1, 2]), record::MEDIA_PATHS).is_none());
}

#[test]
fn balanced_object_ignores_braces_in_strings() {
    let text = r#"x = {"a":"}{","b":{"c":"\"}"}} trailing }"#;
    assert_eq!(
        record::balanced_object(text, 0),
        Some(r#"{"a":"}{","b":{"c":"\"}"}}"#)
    );
    assert_eq!(record::balanced_object("{ never closed", 0), None);
}

#[test]
fn additional_data_reads_loaded_payloads() {
    let body = r#"<script>window.__additionalDataLoaded('/p/ABC/',{"graphql":{"shortcode_media":{"__typename":"GraphImage","display_url":"https://cdn.example/extra.jpg","owner":{"username":"eve"}}}});</script>"#;
    let out = additional_data::extract(&page(body));
    assert_eq!(out.candidates.len(), 1);
    assert_eq!(out.candidates[0].source_strategy, StrategyId::AdditionalData);
    assert_eq!(out.owner.as_deref(), Some("eve"));
}

#[test]
fn additional_data_decodes_context_json() {
    let body = r#"<script>new Embed({"contextJSON":"{\"gql_data\":{\"shortcode_media\":{\"__typename\":\"GraphImage\",\"display_url\":\"https:\\/\\/cdn.example\\/e.jpg\"}}}"});</script>"#;
    let out = additional_data::extract(&page(body));
    assert_eq!(out.candidates.len(), 1);
    assert_eq!(normalize(&out.candidates[0].raw_url), "https://cdn.example/e.jpg");
}

#[test]
fn linked_data_collects_video_and_image_objects() {
    let body = r#"<html><head><script type="application/ld+json">
        {"@context":"https://schema.org","@type":"SocialMediaPosting","articleBody":"Sunset",
         "author":{"alternateName":"@Carol"},
         "video":[{"@type":"VideoObject","contentUrl":"https://cdn.example/v.mp4","width":"720","height":"1280"}],
         "image":"https://cdn.example/i.jpg"}
    </script></head></html>"#;
    let out = linked_data::extract(&page(body));
    let got: Vec<(&str, MediaKind, Option<&str>)> = out
        .candidates
        .iter()
        .map(|c| (c.raw_url.as_str(), c.media_kind, c.quality_hint.as_deref()))
        .collect();
    assert_eq!(
        got,
        [
            ("https://cdn.example/v.mp4", MediaKind::Video, Some("720x1280")),
            ("https://cdn.example/i.jpg", MediaKind::Image, None),
        ]
    );
    assert_eq!(out.caption.as_deref(), Some("Sunset"));
    assert_eq!(out.owner.as_deref(), Some("carol"));
}

#[test]
fn meta_tags_read_open_graph() {
    let body = r#"<html><head>
        <meta property="og:image" content="https://cdn.example/i.jpg">
        <meta property="og:image:width" content="1080">
        <meta property="og:image:height" content="1350">
        <meta property="og:video" content="https://cdn.example/v.mp4">
        <meta property="og:description" content="Nice shot">
        <meta name="viewport" content="width=device-width">
    </head></html>"#;
    let out = meta_tags::extract(&page(body));
    let got: Vec<(&str, MediaKind, Option<&str>)> = out
        .candidates
        .iter()
        .map(|c| (c.raw_url.as_str(), c.media_kind, c.quality_hint.as_deref()))
        .collect();
    assert_eq!(
        got,
        [
            ("https://cdn.example/i.jpg", MediaKind::Image, Some("1080x1350")),
            ("https://cdn.example/v.mp4", MediaKind::Video, None),
        ]
    );
    assert_eq!(out.caption.as_deref(), Some("Nice shot"));
}

#[test]
fn meta_tags_never_caption_with_the_page_title() {
    let body = r#"<html><head><title>Instagram</title>
        <meta property="og:image" content="https://cdn.example/i.jpg"></head></html>"#;
    let out = meta_tags::extract(&page(body));
    assert_eq!(out.candidates.len(), 1);
    assert_eq!(out.caption, None);

    let titled = r#"<html><head><title>Instagram</title>
        <meta property="og:title" content="Beach">
        <meta property="og:image" content="https://cdn.example/i.jpg"></head></html>"#;
    assert_eq!(meta_tags::extract(&page(titled)).caption.as_deref(), Some("Beach"));
}

#[test]
fn blank_record_urls_are_skipped() {
    let body = r#"<script>window._sharedData = {"graphql":{"shortcode_media":{"__typename":"GraphImage","display_url":"",
        "display_resources":[{"src":" ","config_width":640,"config_height":640}]}}};</script>"#;
    assert!(embedded_state::extract(&page(body)).is_empty());
}

#[test]
fn meta_tags_ignore_pages_without_media() {
    let body = "<html><head><title>Login</title><meta name=\"robots\" content=\"noindex\"></head></html>";
    assert!(meta_tags::extract(&page(body)).is_empty());
}

#[test]
fn raw_patterns_grep_escaped_keys_and_video_tags() {
    let body = r#"<div>{\"video_url\":\"https:\\/\\/cdn.example\\/v.mp4\"}</div>
        <video class="x" src="https://cdn.example/w.mp4?a=1&amp;b=2"></video>
        <source type="video/mp4" src="https://cdn.example/s.mp4">
        <source type="video/webm" src="https://cdn.example/skip.webm">"#;
    let out = raw_patterns::extract(&page(body));
    let urls: Vec<String> = out.candidates.iter().map(|c| normalize(&c.raw_url)).collect();
    assert_eq!(
        urls,
        [
            "https://cdn.example/v.mp4",
            "https://cdn.example/s.mp4",
            "https://cdn.example/w.mp4?a=1&b=2",
        ]
    );
    assert!(out.candidates.iter().all(|c| c.media_kind == MediaKind::Video));
}

#[test]
fn raw_patterns_plain_json_keys() {
    let body = r#"{"display_url":"https://cdn.example/d.jpg","contentUrl":"https://cdn.example/c.mp4"}"#;
    let out = raw_patterns::extract(&page(body));
    let kinds: Vec<MediaKind> = out.candidates.iter().map(|c| c.media_kind).collect();
    assert_eq!(kinds, [MediaKind::Image, MediaKind::Unknown]);
}

#[test]
fn direct_cdn_recognizes_hosts_only() {
    assert!(direct_cdn::is_cdn_url(
        "https://scontent-lhr8-1.cdninstagram.com/v/t51.2885-15/abc_n.jpg"
    ));
    assert!(direct_cdn::is_cdn_url("https://video.fxyz1-1.fna.fbcdn.net/o1/v.mp4"));
    assert!(!direct_cdn::is_cdn_url("https://www.instagram.com/p/ABC/"));
    assert!(!direct_cdn::is_cdn_url("https://evilcdninstagram.com/a.jpg"));
    assert!(!direct_cdn::is_cdn_url("ftp://scontent.cdninstagram.com/a.jpg"));
    assert!(!direct_cdn::is_cdn_url("scontent.cdninstagram.com/a.jpg"));
}

#[test]
fn direct_cdn_strips_tracking_and_keeps_signatures() {
    let url = "https://scontent.cdninstagram.com/v/t51/abc_n.jpg?stp=dst-jpg&igshid=XYZ&_nc_ht=a%2Fb&utm_source=ig_web&oh=00_Af&si=1#top";
    let out = direct_cdn::extract(&input(url));
    assert_eq!(out.candidates.len(), 1);
    let c = &out.candidates[0];
    assert_eq!(
        c.raw_url,
        "https://scontent.cdninstagram.com/v/t51/abc_n.jpg?stp=dst-jpg&_nc_ht=a%2Fb&oh=00_Af"
    );
    assert_eq!(c.media_kind, MediaKind::Image);
    assert_eq!(c.source_strategy, StrategyId::DirectCdn);

    let video = direct_cdn::extract(&input("https://x.fbcdn.net/v/clip.mp4?igsh=1"));
    assert_eq!(video.candidates[0].raw_url, "https://x.fbcdn.net/v/clip.mp4");
    assert_eq!(video.candidates[0].media_kind, MediaKind::Video);

    let odd = direct_cdn::extract(&input("https://x.fbcdn.net/v/blob"));
    assert_eq!(odd.candidates[0].media_kind, MediaKind::Image);

    assert!(direct_cdn::extract(&input("https://www.instagram.com/p/ABC/")).is_empty());
}

#[test]
fn embed_markup_reads_rendered_embed() {
    let body = r#"<div class="Embed">
        <a class="UsernameText" href="/dave/">Dave</a>
        <img class="EmbeddedMediaImage" src="https://cdn.example/e640.jpg"
             srcset="https://cdn.example/e640.jpg 640w,https://cdn.example/e1080.jpg 1080w">
        <div class="Caption"><a class="CaptionUsername">dave</a> Beach day</div>
    </div>"#;
    let out = embed_markup::extract(&page(body));
    let got: Vec<(&str, Option<&str>)> = out
        .candidates
        .iter()
        .map(|c| (c.raw_url.as_str(), c.quality_hint.as_deref()))
        .collect();
    assert_eq!(
        got,
        [
            ("https://cdn.example/e640.jpg", Some("640w")),
            ("https://cdn.example/e1080.jpg", Some("1080w")),
            ("https://cdn.example/e640.jpg", None),
        ]
    );
    assert_eq!(out.owner.as_deref(), Some("dave"));
    assert_eq!(out.caption.as_deref(), Some("Beach day"));
}

#[test]
fn default_registry_is_priority_ordered() {
    let registry = StrategyRegistry::default();
    let ids: Vec<StrategyId> = registry.strategies().iter().map(|s| s.id).collect();
    assert_eq!(
        ids,
        [
            StrategyId::EmbeddedState,
            StrategyId::AdditionalData,
            StrategyId::LinkedData,
            StrategyId::MetaTags,
            StrategyId::RawPatterns,
            StrategyId::DirectCdn,
            StrategyId::EmbedMarkup,
        ]
    );
    let priorities: Vec<u8> = registry.strategies().iter().map(|s| s.priority).collect();
    assert_eq!(priorities, [1, 2, 3, 4, 5, 6, 7]);

    let on_input: Vec<StrategyId> = registry
        .applicable(DocumentKind::Input)
        .map(|s| s.id)
        .collect();
    assert_eq!(on_input, [StrategyId::DirectCdn]);
    assert_eq!(registry.applicable(DocumentKind::Embed).count(), 6);
}

fn nothing(_: &SourceDocument) -> postgrab::models::Extraction {
    postgrab::models::Extraction::empty()
}

#[test]
fn register_keeps_order_for_equal_priorities() {
    let mut registry = StrategyRegistry::empty();
    registry
        .register(Strategy::new(StrategyId::MetaTags, 4, Scope::Fetched, nothing))
        .register(Strategy::new(StrategyId::RawPatterns, 4, Scope::Fetched, nothing))
        .register(Strategy::new(StrategyId::LinkedData, 0, Scope::Fetched, nothing));
    let ids: Vec<StrategyId> = registry.strategies().iter().map(|s| s.id).collect();
    assert_eq!(
        ids,
        [StrategyId::LinkedData, StrategyId::MetaTags, StrategyId::RawPatterns]
    );
}
