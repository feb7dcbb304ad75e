//! Shared helpers for trf-ca integration tests
//!
//! `spawn_fixture_server` starts an axum server on an ephemeral port that
//! mimics every upstream chart and lookup endpoint with canned bodies.

#![allow(dead_code)]

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;

pub const APPLE_MUSIC_TOKEN: &str = "test-developer-token";
pub const PLAYLIST_ID: &str = "pl.test";

/// Five Deezer entries, positions 1..=5
pub const DEEZER_CHART: &str = r#"{"data":[
    {"title":"Hotline Bling","position":1,"artist":{"name":"Drake"}},
    {"title":"Chandelier","position":2,"artist":{"name":"Sia"}},
    {"title":"Levitating","position":3,"artist":{"name":"Dua Lipa"}},
    {"title":"Greedy","position":4,"artist":{"name":"Tate McRae"}},
    {"title":"Houdini","position":5,"artist":{"name":"Eminem"}}
]}"#;

/// Header row plus three data rows
pub const TIKTOK_TABLE: &str = r#"<html><body>
<h1>TikTok chart</h1>
<table>
  <tr><th>#</th><th>Artist</th><th>Title</th></tr>
  <tr><td>1</td><td>drake</td><td>HOTLINE BLING</td></tr>
  <tr><td>2</td><td>Doechii</td><td>Anxiety</td></tr>
  <tr><td>3</td><td>Sombr</td><td>Back to Friends</td></tr>
</table>
</body></html>"#;

pub const APPLE_RSS_FEED: &str = r#"{"feed":{"title":"Top Songs","results":[
    {"name":"Espresso","artistName":"Sabrina Carpenter","genres":[{"name":"Pop"},{"name":"Music"}]},
    {"name":"Not Like Us","artistName":"Kendrick Lamar","genres":[{"name":"Hip-Hop/Rap"}]}
]}}"#;

pub const APPLE_MUSIC_PLAYLIST: &str = r#"{"data":[{"id":"pl.test","relationships":{"tracks":{"data":[
    {"id":"1","attributes":{"name":"Tennessee Whiskey","artistName":"Chris Stapleton","genreNames":["Country","Music"]}}
]}}}]}"#;

/// Start the fixture server and return its base URL
pub async fn spawn_fixture_server() -> String {
    let app = Router::new()
        .route("/chart/0/tracks", get(|| async { DEEZER_CHART }))
        .route("/charts/tiktok/us.html", get(|| async { Html(TIKTOK_TABLE) }))
        .route("/charts/tiktok/zz.html", get(|| async { StatusCode::NOT_FOUND }))
        .route("/", get(|| async { Html(TIKTOK_TABLE) }))
        .route(
            "/api/v2/us/music/most-played/:limit/songs.json",
            get(|Path(_limit): Path<u32>| async { APPLE_RSS_FEED }),
        )
        .route("/v1/catalog/us/playlists/:id", get(apple_music_playlist))
        .route("/search", get(itunes_search))
        .route("/broken/chart/0/tracks", get(|| async { "<html>maintenance</html>" }));

    serve(app).await
}

/// Server whose every route answers only after `delay`
pub async fn spawn_slow_server(delay: Duration) -> String {
    let app = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        DEEZER_CHART
    });

    serve(app).await
}

/// Base URL of a port with nothing listening
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn apple_music_playlist(Path(id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    let expected = format!("Bearer {}", APPLE_MUSIC_TOKEN);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);

    if !authorized {
        return (StatusCode::UNAUTHORIZED, "").into_response();
    }
    if id != PLAYLIST_ID {
        return (StatusCode::NOT_FOUND, "").into_response();
    }
    APPLE_MUSIC_PLAYLIST.into_response()
}

async fn itunes_search(
    axum::extract::Query(params): axum::extract::Query<std::collections::HashMap<String, String>>,
) -> String {
    let term = params.get("term").cloned().unwrap_or_default().to_lowercase();
    let genre = if term.contains("doechii") {
        "Hip-Hop/Rap"
    } else if term.contains("sombr") {
        "Alternative"
    } else {
        return r#"{"resultCount":0,"results":[]}"#.to_string();
    };
    format!(
        r#"{{"resultCount":1,"results":[{{"primaryGenreName":"{}"}}]}}"#,
        genre
    )
}
