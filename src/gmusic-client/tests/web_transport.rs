//! HTTP-level tests of `WebTransport` against a mock server.
//!
//! The transport is blocking and owns its own runtime, so every call runs on
//! a blocking task while the mock server lives on the test runtime.

use gmusic_client::{Transport, TransportError, WebTransport, WebTransportConfig};
use gmusic_core::models::{EntryId, PlaylistId, SongId};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

fn transport_for(uri: &str) -> WebTransport {
    WebTransport::new(WebTransportConfig::new(uri).with_session_token("test-token"))
        .expect("transport should build")
}

#[tokio::test]
async fn load_playlist_maps_songs_and_entry_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/loadplaylist"))
        .and(body_partial_json(json!({ "id": "pl-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "playlist": [
                { "id": "s1", "playlistEntryId": "e1", "title": "First" },
                { "id": "s2", "playlistEntryId": "e2", "title": "Second" }
            ]
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let tracks = run_blocking(move || {
        let transport = transport_for(&uri);
        transport.fetch_playlist_tracks(&PlaylistId::new("pl-1"))
    })
    .await
    .expect("fetch should succeed");

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].song_id, SongId::new("s1"));
    assert_eq!(tracks[0].entry_id, Some(EntryId::new("e1")));
    assert_eq!(tracks[1].entry_id, Some(EntryId::new("e2")));
}

#[tokio::test]
async fn unknown_playlist_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/loadplaylist"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = run_blocking(move || {
        let transport = transport_for(&uri);
        transport.fetch_playlist_tracks(&PlaylistId::new("missing"))
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        TransportError::NotFound { playlist_id } if playlist_id == PlaylistId::new("missing")
    ));
}

#[tokio::test]
async fn server_errors_surface_as_call_failures_naming_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/addplaylist"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = run_blocking(move || {
        let transport = transport_for(&uri);
        transport.create_playlist("New Mix")
    })
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        TransportError::CallFailure {
            endpoint: "addplaylist",
            ..
        }
    ));
}

#[tokio::test]
async fn add_tracks_returns_one_pair_per_occurrence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/addtoplaylist"))
        .and(body_partial_json(json!({
            "playlistId": "pl-1",
            "songIds": ["s1", "s1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "songIds": [
                { "songId": "s1", "playlistEntryId": "e10" },
                { "songId": "s1", "playlistEntryId": "e11" }
            ]
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let pairs = run_blocking(move || {
        let transport = transport_for(&uri);
        transport.add_tracks(
            &PlaylistId::new("pl-1"),
            &[SongId::new("s1"), SongId::new("s1")],
        )
    })
    .await
    .expect("add should succeed");

    assert_eq!(
        pairs,
        vec![
            (SongId::new("s1"), EntryId::new("e10")),
            (SongId::new("s1"), EntryId::new("e11")),
        ]
    );
}

#[tokio::test]
async fn delete_entries_recovers_song_ids_from_the_playlist() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/loadplaylist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "playlist": [
                { "id": "s1", "playlistEntryId": "e1" },
                { "id": "s2", "playlistEntryId": "e2" }
            ]
        })))
        .mount(&server)
        .await;
    // The deletion endpoint wants matching song and entry ids.
    Mock::given(method("POST"))
        .and(path("/services/deletesong"))
        .and(body_partial_json(json!({
            "listId": "pl-1",
            "songIds": ["s2"],
            "entryIds": ["e2"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deleteIds": ["s2:e2"]
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let deleted = run_blocking(move || {
        let transport = transport_for(&uri);
        transport.delete_entries(&PlaylistId::new("pl-1"), &[EntryId::new("e2")])
    })
    .await
    .expect("delete should succeed");

    assert_eq!(deleted, vec!["s2:e2".to_owned()]);
}

#[tokio::test]
async fn name_index_groups_playlists_sharing_a_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/loadplaylist"))
        .and(body_partial_json(json!({ "id": "all" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "playlists": [
                { "playlistId": "p1", "title": "Mix" },
                { "playlistId": "p2", "title": "Mix" },
                { "playlistId": "p3", "title": "Focus" }
            ]
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let index = run_blocking(move || {
        let transport = transport_for(&uri);
        transport.fetch_playlist_name_index()
    })
    .await
    .expect("index should load");

    assert_eq!(index["Mix"], vec![PlaylistId::new("p1"), PlaylistId::new("p2")]);
    assert_eq!(index["Focus"], vec![PlaylistId::new("p3")]);
}

#[tokio::test]
async fn set_order_refuses_empty_or_mismatched_input_without_a_request() {
    // No mock mounted: a request would fail the test with a connection error
    // rather than the expected validation failure.
    let server = MockServer::start().await;
    let uri = server.uri();

    let (empty, mismatched) = run_blocking(move || {
        let transport = transport_for(&uri);
        let empty = transport.set_order(&PlaylistId::new("pl-1"), &[], &[]);
        let mismatched = transport.set_order(
            &PlaylistId::new("pl-1"),
            &[SongId::new("s1")],
            &[EntryId::new("e1"), EntryId::new("e2")],
        );
        (empty, mismatched)
    })
    .await;

    assert!(matches!(
        empty.unwrap_err(),
        TransportError::CallFailure {
            endpoint: "changeplaylistorder",
            ..
        }
    ));
    assert!(matches!(
        mismatched.unwrap_err(),
        TransportError::CallFailure {
            endpoint: "changeplaylistorder",
            ..
        }
    ));
}

#[tokio::test]
async fn stream_url_is_fetched_per_song() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/play"))
        .and(query_param("songid", "s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://stream.example/abc"
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let url = run_blocking(move || {
        let transport = transport_for(&uri);
        transport.fetch_stream_url(&SongId::new("s1"))
    })
    .await
    .expect("stream url should resolve");

    assert_eq!(url, "https://stream.example/abc");
}
