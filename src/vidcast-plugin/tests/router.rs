//! End-to-end handler tests against a mock catalog.

use vidcast_catalog::models::tags;
use vidcast_catalog::CatalogClient;
use vidcast_core::settings::keys as setting_keys;
use vidcast_core::{MemorySettings, NavigationNode, PlayTarget, Request, SettingsStore};
use vidcast_plugin::{HandlerError, Outcome, PlaybackEngine, Router};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> CatalogClient {
    let base = format!("{}/v1/", server.uri());
    let token = format!("{}/tokens/client.jwt", server.uri());
    CatalogClient::new(&base, &token).expect("client should build")
}

fn playable(key: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "naturalKey": key,
        "title": title,
        "files": [{
            "label": "720p",
            "downloadUrl": format!("https://cdn.example/{key}.mp4"),
            "filesize": 1000,
        }],
    })
}

async fn mock_category(server: &MockServer, lang: &str, key: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/categories/{lang}/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "category": body
        })))
        .mount(server)
        .await;
}

async fn mock_media_item(server: &MockServer, lang: &str, key: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/media-items/{lang}/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "media": [body]
        })))
        .mount(server)
        .await;
}

fn queue_keys(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Queue(items) => items.iter().map(|item| item.key.0.clone()).collect(),
        other => panic!("expected queue, got {other:?}"),
    }
}

#[tokio::test]
async fn root_page_lists_categories_and_search_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/categories/en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "categories": [
                {"key": "VODMovies", "name": "Movies"},
                {"key": "VODSecret", "name": "Secret", "tags": [tags::HIDDEN]},
                {"name": "Broken"},
            ]
        })))
        .mount(&server)
        .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router.handle(&Request::root()).await.expect("root should list");

    let Outcome::Listing(items) = outcome else {
        panic!("expected listing");
    };
    assert_eq!(items.len(), 2, "hidden and keyless categories are dropped");
    assert!(matches!(items[0], NavigationNode::Category(_)));
    assert!(matches!(items.last(), Some(NavigationNode::Action(_))));
}

#[tokio::test]
async fn browse_gates_hidden_media_and_drops_unplayable() {
    let server = MockServer::start().await;
    mock_category(
        &server,
        "en",
        "VODMovies",
        serde_json::json!({
            "key": "VODMovies",
            "name": "Movies",
            "subcategories": [
                {"key": "VODNew", "name": "New"},
                {"key": "VODGone", "name": "Gone", "tags": [tags::HIDDEN]},
            ],
            "media": [
                playable("pub-a", "A"),
                {"naturalKey": "pub-hidden", "title": "H", "tags": [tags::HIDDEN],
                 "files": [{"label": "360p", "downloadUrl": "https://cdn.example/h.mp4"}]},
                {"naturalKey": "pub-broken", "title": "B"},
            ],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=browse&category=VODMovies"))
        .await
        .expect("browse should list");

    let Outcome::Listing(items) = outcome else {
        panic!("expected listing");
    };
    // One subcategory, one playable, one gated placeholder; the hidden
    // subcategory and the file-less item are gone.
    assert_eq!(items.len(), 3);
    assert!(matches!(items[0], NavigationNode::Category(_)));
    assert!(matches!(items[1], NavigationNode::Media(_)));
    match &items[2] {
        NavigationNode::Gated(placeholder) => {
            assert_eq!(placeholder.unlock.media(), Some("pub-hidden"));
        }
        other => panic!("expected gated placeholder, got {other:?}"),
    }
}

#[tokio::test]
async fn play_resolves_best_file_for_preferences() {
    let server = MockServer::start().await;
    mock_media_item(
        &server,
        "en",
        "pub-x",
        serde_json::json!({
            "naturalKey": "pub-x",
            "title": "X",
            "files": [
                {"label": "720p", "downloadUrl": "https://cdn.example/720.mp4"},
                {"label": "360p", "downloadUrl": "https://cdn.example/360.mp4"},
            ],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    store.set(setting_keys::RESOLUTION, "3"); // cap at 360
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=play&media=pub-x"))
        .await
        .expect("play should resolve");

    let Outcome::Resolved(media) = outcome else {
        panic!("expected resolved media");
    };
    assert_eq!(media.url.as_ref(), "https://cdn.example/360.mp4");
}

#[tokio::test]
async fn play_with_explicit_language_updates_history() {
    let server = MockServer::start().await;
    mock_media_item(&server, "de", "pub-x", playable("pub-x", "X")).await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    router
        .handle(&Request::decode("mode=play&media=pub-x&language=de"))
        .await
        .expect("play should resolve");

    assert_eq!(store.get(setting_keys::LANGUAGE_HISTORY).as_deref(), Some("de"));
}

#[tokio::test]
async fn play_consumes_one_shot_playback_language() {
    let server = MockServer::start().await;
    mock_media_item(&server, "fi", "pub-x", playable("pub-x", "X")).await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    store.set(setting_keys::PLAYBACK_LANGUAGE, "fi");
    let mut router = Router::new(&catalog, &mut store);
    router
        .handle(&Request::decode("mode=play&media=pub-x"))
        .await
        .expect("play should resolve");

    assert_eq!(store.get(setting_keys::PLAYBACK_LANGUAGE).as_deref(), Some(""));
    assert_eq!(store.get(setting_keys::LANGUAGE_HISTORY).as_deref(), Some("fi"));
}

#[tokio::test]
async fn play_without_files_is_a_hard_failure() {
    let server = MockServer::start().await;
    mock_media_item(
        &server,
        "en",
        "pub-x",
        serde_json::json!({"naturalKey": "pub-x", "title": "X"}),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let err = router
        .handle(&Request::decode("mode=play&media=pub-x"))
        .await
        .expect_err("no files should fail");
    assert!(matches!(err, HandlerError::NotPlayable { .. }));
}

#[tokio::test]
async fn play_undubbed_borrows_localized_subtitles() {
    let server = MockServer::start().await;
    mock_media_item(&server, "en", "pub-x", playable("pub-x", "X")).await;
    mock_media_item(
        &server,
        "de",
        "pub-x",
        serde_json::json!({
            "naturalKey": "pub-x",
            "title": "X",
            "files": [{
                "label": "720p",
                "downloadUrl": "https://cdn.example/de.mp4",
                "subtitles": {"url": "https://cdn.example/de.vtt"},
            }],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    store.set(setting_keys::LANGUAGE, "de");
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=play_undubbed&media=pub-x"))
        .await
        .expect("undubbed play should resolve");

    let Outcome::Resolved(media) = outcome else {
        panic!("expected resolved media");
    };
    // Reference-language stream, viewer-language subtitles.
    assert_eq!(media.url.as_ref(), "https://cdn.example/pub-x.mp4");
    assert_eq!(media.subtitles.as_deref(), Some("https://cdn.example/de.vtt"));
}

#[tokio::test]
async fn play_undubbed_survives_enrichment_failure() {
    let server = MockServer::start().await;
    mock_media_item(&server, "en", "pub-x", playable("pub-x", "X")).await;
    Mock::given(method("GET"))
        .and(path("/v1/media-items/de/pub-x"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    store.set(setting_keys::LANGUAGE, "de");
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=play_undubbed&media=pub-x"))
        .await
        .expect("enrichment failure must stay soft");

    let Outcome::Resolved(media) = outcome else {
        panic!("expected resolved media");
    };
    assert_eq!(media.url.as_ref(), "https://cdn.example/pub-x.mp4");
    assert_eq!(media.subtitles, None);
}

struct RecordingEngine {
    tracks: usize,
    shown: bool,
}

impl PlaybackEngine for RecordingEngine {
    fn subtitle_track_count(&self) -> usize {
        self.tracks
    }

    fn show_subtitles(&mut self, visible: bool) {
        self.shown = visible;
    }
}

#[tokio::test]
async fn language_override_with_subtitles_toggles_the_player() {
    let server = MockServer::start().await;
    mock_media_item(
        &server,
        "de",
        "pub-x",
        serde_json::json!({
            "naturalKey": "pub-x",
            "title": "X",
            "files": [{
                "label": "720p",
                "downloadUrl": "https://cdn.example/de.mp4",
                "subtitles": {"url": "https://cdn.example/de.vtt"},
            }],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut engine = RecordingEngine {
        tracks: 1,
        shown: false,
    };
    let mut router = Router::new(&catalog, &mut store).with_playback(&mut engine);
    router
        .handle(&Request::decode("mode=play&media=pub-x&language=de"))
        .await
        .expect("play should resolve");

    assert!(engine.shown, "subtitles should be revealed after playback");
}

#[tokio::test]
async fn search_fetches_token_when_cache_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokens/client.jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tok-1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(query_param("q", "creation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hits": [
                {"displayTitle": "Creation", "naturalKey": "pub-creation"},
                {"displayTitle": "Ghost"},
            ]
        })))
        .mount(&server)
        .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=search&query=creation"))
        .await
        .expect("search should succeed");

    let Outcome::Listing(items) = outcome else {
        panic!("expected listing");
    };
    assert_eq!(items.len(), 1, "keyless hits are dropped");
    match &items[0] {
        NavigationNode::Media(node) => {
            assert!(matches!(&node.target, PlayTarget::Deferred(request)
                if request.media() == Some("pub-creation")));
        }
        other => panic!("expected media node, got {other:?}"),
    }
    assert_eq!(store.get(setting_keys::AUTH_TOKEN).as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn search_refreshes_token_and_retries_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tokens/client.jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"hits": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    store.set(setting_keys::AUTH_TOKEN, "stale");
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=search&query=anything"))
        .await
        .expect("retry should succeed");

    assert!(matches!(outcome, Outcome::Listing(items) if items.is_empty()));
    assert_eq!(store.get(setting_keys::AUTH_TOKEN).as_deref(), Some("fresh"));
}

#[tokio::test]
async fn second_auth_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tokens/client.jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    store.set(setting_keys::AUTH_TOKEN, "stale");
    let mut router = Router::new(&catalog, &mut store);
    let err = router
        .handle(&Request::decode("mode=search&query=anything"))
        .await
        .expect_err("second 401 should be fatal");
    assert!(matches!(err, HandlerError::Auth(_)));
}

#[tokio::test]
async fn stream_queues_a_permutation_of_eligible_media() {
    let server = MockServer::start().await;
    mock_category(
        &server,
        "en",
        "Music",
        serde_json::json!({
            "key": "Music",
            "name": "Music",
            "media": [playable("m1", "One"), playable("m2", "Two")],
            "subcategories": [
                {
                    "key": "MusicVideos",
                    "name": "Videos",
                    "tags": [tags::SHUFFLE_IN_PARENT],
                    "media": [playable("m3", "Three")],
                },
                {
                    "key": "MusicFeatured",
                    "name": "Featured",
                    "media": [playable("m4", "Duplicate")],
                },
            ],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=stream&category=Music"))
        .await
        .expect("stream should queue");

    let mut keys = queue_keys(&outcome);
    keys.sort();
    assert_eq!(keys, ["m1", "m2", "m3"]);
}

#[tokio::test]
async fn stream_drops_hidden_and_unplayable_items() {
    let server = MockServer::start().await;
    mock_category(
        &server,
        "en",
        "Music",
        serde_json::json!({
            "key": "Music",
            "name": "Music",
            "media": [
                playable("m1", "One"),
                {"naturalKey": "m-hidden", "title": "H", "tags": [tags::HIDDEN],
                 "files": [{"label": "360p", "downloadUrl": "https://cdn.example/h.mp4"}]},
                {"naturalKey": "m-broken", "title": "B"},
            ],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=stream&category=Music"))
        .await
        .expect("stream should queue");
    assert_eq!(queue_keys(&outcome), ["m1"]);
}

#[tokio::test]
async fn languages_float_history_and_build_set_language_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/languages/en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "languages": [
                {"code": "de", "name": "German", "vernacular": "Deutsch"},
                {"code": "en", "name": "English"},
                {"code": "fi", "name": "Finnish", "vernacular": "suomi"},
                {"code": "sv", "name": "Swedish", "vernacular": "svenska"},
            ]
        })))
        .mount(&server)
        .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    store.set(setting_keys::LANGUAGE_HISTORY, "fi sv");
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=languages"))
        .await
        .expect("languages should list");

    let Outcome::Listing(items) = outcome else {
        panic!("expected listing");
    };
    let codes: Vec<Option<&str>> = items
        .iter()
        .map(|node| match node {
            NavigationNode::Action(action) => action.request.language(),
            other => panic!("expected action node, got {other:?}"),
        })
        .collect();
    assert_eq!(
        codes,
        [Some("fi"), Some("sv"), Some("de"), Some("en")],
        "recent languages float, catalog order otherwise"
    );
    assert_eq!(items.iter().filter(|node| matches!(node, NavigationNode::Action(_))).count(), 4);
}

#[tokio::test]
async fn languages_for_media_intersect_and_link_to_play() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/languages/en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "languages": [
                {"code": "de", "name": "German"},
                {"code": "en", "name": "English"},
                {"code": "fi", "name": "Finnish"},
            ]
        })))
        .mount(&server)
        .await;
    mock_media_item(
        &server,
        "en",
        "pub-x",
        serde_json::json!({
            "naturalKey": "pub-x",
            "title": "X",
            "availableLanguages": ["de", "fi"],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=languages&media=pub-x"))
        .await
        .expect("languages should list");

    let Outcome::Listing(items) = outcome else {
        panic!("expected listing");
    };
    assert_eq!(items.len(), 2);
    for node in &items {
        match node {
            NavigationNode::Action(action) => {
                assert_eq!(action.request.media(), Some("pub-x"));
                assert!(action.request.language().is_some());
            }
            other => panic!("expected action node, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn set_language_persists_and_reports_updated() {
    let server = MockServer::start().await;
    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=set_language&language=sv"))
        .await
        .expect("set_language should succeed");

    assert!(matches!(outcome, Outcome::Updated));
    assert_eq!(store.get(setting_keys::LANGUAGE).as_deref(), Some("sv"));
    assert_eq!(store.get(setting_keys::LANGUAGE_HISTORY).as_deref(), Some("sv"));
}

#[tokio::test]
async fn ask_hidden_emits_the_single_uncensored_node() {
    let server = MockServer::start().await;
    mock_media_item(
        &server,
        "en",
        "pub-secret",
        serde_json::json!({
            "naturalKey": "pub-secret",
            "title": "Secret",
            "tags": [tags::HIDDEN],
            "files": [{"label": "360p", "downloadUrl": "https://cdn.example/s.mp4"}],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=ask_hidden&media=pub-secret"))
        .await
        .expect("ask_hidden should list");

    let Outcome::Listing(items) = outcome else {
        panic!("expected listing");
    };
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], NavigationNode::Media(_)));
}

#[tokio::test]
async fn legacy_streaming_mode_shuffles_with_full_mode_as_key() {
    let server = MockServer::start().await;
    mock_category(
        &server,
        "en",
        "StreamingXYZ",
        serde_json::json!({
            "key": "StreamingXYZ",
            "name": "Old Channel",
            "media": [playable("m1", "One")],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=StreamingXYZ"))
        .await
        .expect("legacy stream should queue");
    assert_eq!(queue_keys(&outcome), ["m1"]);
}

#[tokio::test]
async fn bare_streaming_token_browses_instead() {
    let server = MockServer::start().await;
    mock_category(
        &server,
        "en",
        "Streaming",
        serde_json::json!({
            "key": "Streaming",
            "name": "Streaming",
            "media": [playable("m1", "One")],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=Streaming"))
        .await
        .expect("bare token should browse");
    assert!(matches!(outcome, Outcome::Listing(_)));
}

#[tokio::test]
async fn unknown_mode_browses_by_key() {
    let server = MockServer::start().await;
    mock_category(
        &server,
        "en",
        "VODMovies",
        serde_json::json!({
            "key": "VODMovies",
            "name": "Movies",
            "media": [playable("m1", "One")],
        }),
    )
    .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let outcome = router
        .handle(&Request::decode("mode=VODMovies"))
        .await
        .expect("unknown mode should browse");
    assert!(matches!(outcome, Outcome::Listing(items) if items.len() == 1));
}

#[tokio::test]
async fn missing_parameter_is_reported() {
    let server = MockServer::start().await;
    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let err = router
        .handle(&Request::decode("mode=play"))
        .await
        .expect_err("play without media should fail");
    assert!(matches!(err, HandlerError::MissingParam { name: "media" }));
}

#[tokio::test]
async fn navigation_fetch_failure_is_hard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/categories/en/VODMovies"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = client_for(&server);
    let mut store = MemorySettings::new();
    let mut router = Router::new(&catalog, &mut store);
    let err = router
        .handle(&Request::decode("mode=browse&category=VODMovies"))
        .await
        .expect_err("fetch failure should abort");
    assert!(matches!(err, HandlerError::Catalog(_)));
}
