//! HTTP Server & Routing Integration Tests
//!
//! The router is driven with `oneshot`; chart sources point at the local
//! fixture server from `helpers`.

mod helpers;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use trf_ca::config::CaConfig;
use trf_ca::models::ChartQuery;
use trf_ca::services::ChartService;
use trf_ca::{build_router, AppState};

/// Config with every upstream pointed at `base`
fn fixture_config(base: &str) -> CaConfig {
    let mut config = CaConfig::default();
    config.sources.kworb_base_url = base.to_string();
    config.sources.tokchart_base_url = base.to_string();
    config.sources.deezer_base_url = base.to_string();
    config.sources.apple_rss_base_url = base.to_string();
    config.sources.apple_music_base_url = base.to_string();
    config.sources.apple_music_playlist_id = Some(helpers::PLAYLIST_ID.to_string());
    config.apple_music_token = Some(helpers::APPLE_MUSIC_TOKEN.to_string());
    config.enrichment.itunes_base_url = base.to_string();
    config.enrichment.requests_per_minute = 6000;
    config
}

fn app_from_config(config: &CaConfig) -> Router {
    let service = ChartService::from_config(config).unwrap();
    let defaults = ChartQuery::new(&config.default_region, config.default_limit);
    build_router(AppState::new(service, defaults))
}

async fn test_app() -> Router {
    let base = helpers::spawn_fixture_server().await;
    app_from_config(&fixture_config(&base))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn titles(body: &Value) -> Vec<String> {
    body["tracks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

/// TC-HTTP-001: health endpoint reports module identity
#[tokio::test]
async fn tc_http_001_health() {
    let (status, body) = get(test_app().await, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "trf-ca");
    assert!(body["uptime_seconds"].is_u64());
    assert!(body.get("last_error").is_none());
}

/// TC-HTTP-002: all configured sources registered, breakers closed
#[tokio::test]
async fn tc_http_002_sources_listed() {
    let (status, body) = get(test_app().await, "/api/sources").await;

    assert_eq!(status, StatusCode::OK);
    let sources = body["sources"].as_array().unwrap();
    let ids: Vec<&str> = sources.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["kworb", "tokchart", "deezer", "apple_rss", "apple_music"]);
    assert!(sources.iter().all(|s| s["breaker"] == "closed"));
}

/// TC-HTTP-003: categories in rule order, deduplicated, fallback included
#[tokio::test]
async fn tc_http_003_categories() {
    let (status, body) = get(test_app().await, "/api/categories").await;

    assert_eq!(status, StatusCode::OK);
    let categories: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert_eq!(categories[0], "House (120–128 BPM)");
    assert_eq!(categories[1], "Techno (125–135 BPM)");
    assert_eq!(
        categories.iter().filter(|c| c.starts_with("House")).count(),
        1
    );
}

/// TC-HTTP-004: all sources merged, duplicates across sources removed
#[tokio::test]
async fn tc_http_004_charts_merged_and_deduplicated() {
    let (status, body) = get(test_app().await, "/api/charts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["warnings"].as_array().unwrap().len(), 0);
    assert_eq!(
        titles(&body),
        vec![
            "HOTLINE BLING",
            "Anxiety",
            "Back to Friends",
            "Chandelier",
            "Levitating",
            "Greedy",
            "Houdini",
            "Espresso",
            "Not Like Us",
            "Tennessee Whiskey",
        ]
    );
    assert!(body["fetched_at"].is_string());
}

/// TC-HTTP-005: genres looked up or carried through, then mapped to a remix category
#[tokio::test]
async fn tc_http_005_tracks_enriched() {
    let (_, body) = get(test_app().await, "/api/charts?sources=kworb,apple_rss").await;
    let tracks = body["tracks"].as_array().unwrap();

    let doechii = &tracks[1];
    assert_eq!(doechii["genre"], "Hip-Hop/Rap");
    assert_eq!(doechii["tag_suggestion"]["category"], "Techno");

    let drake = &tracks[0];
    assert_eq!(drake["genre"], "Unknown");
    assert_eq!(drake["tag_suggestion"]["category"], "House");

    let espresso = &tracks[3];
    assert_eq!(espresso["genre"], "Pop");
    assert_eq!(espresso["tag_suggestion"]["bpm_min"], 120);
    assert!(espresso["external_links"]["video_search"]
        .as_str()
        .unwrap()
        .starts_with("https://www.youtube.com/results?search_query="));
}

/// TC-HTTP-006: selected category first, relative order kept
#[tokio::test]
async fn tc_http_006_category_sort() {
    let (_, body) = get(
        test_app().await,
        "/api/charts?sources=kworb,apple_rss&category=techno",
    )
    .await;

    assert_eq!(
        titles(&body),
        vec!["Anxiety", "Not Like Us", "HOTLINE BLING", "Back to Friends", "Espresso"]
    );
}

/// TC-HTTP-007: keyword filter is a case-insensitive substring match
#[tokio::test]
async fn tc_http_007_keyword_filter() {
    let app = test_app().await;

    let (_, body) = get(app.clone(), "/api/charts?keyword=DRAKE").await;
    assert_eq!(titles(&body), vec!["HOTLINE BLING"]);

    let (_, body) = get(app, "/api/charts?keyword=no%20such%20song").await;
    assert!(titles(&body).is_empty());
}

/// TC-HTTP-008: unknown source id is a client error
#[tokio::test]
async fn tc_http_008_unknown_source_rejected() {
    let (status, body) = get(test_app().await, "/api/charts?sources=deezer,napster").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("napster"));
}

/// TC-HTTP-009: limit outside 1..=200 rejected
#[tokio::test]
async fn tc_http_009_limit_bounds() {
    let app = test_app().await;

    let (status, _) = get(app.clone(), "/api/charts?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app.clone(), "/api/charts?limit=201").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(app, "/api/charts?sources=deezer&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Hotline Bling", "Chandelier"]);
}

/// TC-HTTP-010: malformed region rejected
#[tokio::test]
async fn tc_http_010_region_validated() {
    let (status, _) = get(test_app().await, "/api/charts?region=usa").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// TC-HTTP-011: a failing source becomes a warning, other sources still served
#[tokio::test]
async fn tc_http_011_partial_failure_is_warning() {
    let base = helpers::spawn_fixture_server().await;
    let mut config = fixture_config(&base);
    config.sources.deezer_base_url = helpers::closed_port_url().await;
    let app = app_from_config(&config);

    let (status, body) = get(app.clone(), "/api/charts?sources=deezer,apple_rss").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Espresso", "Not Like Us"]);
    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().starts_with("Could not fetch Deezer"));

    let (_, health) = get(app, "/health").await;
    assert!(health["last_error"]
        .as_str()
        .unwrap()
        .starts_with("Could not fetch Deezer"));
}

/// TC-HTTP-012: Apple Music without a playlist id stays unregistered
#[tokio::test]
async fn tc_http_012_unregistered_source_is_warning() {
    let base = helpers::spawn_fixture_server().await;
    let mut config = fixture_config(&base);
    config.sources.apple_music_playlist_id = None;
    let app = app_from_config(&config);

    let (_, body) = get(app.clone(), "/api/sources").await;
    assert_eq!(body["sources"].as_array().unwrap().len(), 4);

    let (status, body) = get(app, "/api/charts?sources=apple_music").await;
    assert_eq!(status, StatusCode::OK);
    assert!(titles(&body).is_empty());
    assert!(body["warnings"][0]
        .as_str()
        .unwrap()
        .contains("source not configured"));
}

/// TC-HTTP-013: refresh with a JSON body
#[tokio::test]
async fn tc_http_013_refresh_with_body() {
    let (status, body) = post_json(
        test_app().await,
        "/api/charts/refresh",
        r#"{"sources":["apple_rss"],"limit":1}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Espresso"]);
}

/// TC-HTTP-014: refresh without a body uses every registered source
#[tokio::test]
async fn tc_http_014_refresh_without_body() {
    let response = test_app()
        .await
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/charts/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = read(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body).len(), 10);
}

/// TC-HTTP-015: refresh rejects unknown sources like GET does
#[tokio::test]
async fn tc_http_015_refresh_unknown_source() {
    let (status, body) = post_json(
        test_app().await,
        "/api/charts/refresh",
        r#"{"sources":["spotify"]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

/// TC-HTTP-016: unknown route is 404
#[tokio::test]
async fn tc_http_016_unknown_route() {
    let response = test_app()
        .await
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn delete(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

/// TC-HTTP-017: cached charts can be dropped per source and per query
#[tokio::test]
async fn tc_http_017_invalidate_cache() {
    let app = test_app().await;

    get(app.clone(), "/api/charts?sources=deezer,apple_rss&limit=2").await;
    get(app.clone(), "/api/charts?sources=deezer&limit=3").await;

    let (status, body) = delete(app.clone(), "/api/charts/cache?sources=deezer&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invalidated"], 1);

    let (_, body) = delete(app.clone(), "/api/charts/cache?sources=deezer").await;
    assert_eq!(body["invalidated"], 1);

    let (_, body) = delete(app.clone(), "/api/charts/cache").await;
    assert_eq!(body["invalidated"], 1);

    let (_, body) = delete(app, "/api/charts/cache").await;
    assert_eq!(body["invalidated"], 0);
}

/// TC-HTTP-018: invalidation rejects unknown sources
#[tokio::test]
async fn tc_http_018_invalidate_unknown_source() {
    let (status, body) = delete(test_app().await, "/api/charts/cache?sources=napster").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
