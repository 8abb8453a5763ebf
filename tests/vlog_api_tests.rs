// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vlog API tests against a mocked YouTube.
//!
//! These run as the owner, whose tokens come from configuration, so the
//! offline database is never touched.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use mockito::{Matcher, Mock, Server};
use reliving::config::Config;
use reliving::models::UserType;
use tower::ServiceExt;

mod common;
use common::{
    body_json, config_for_server, create_app, multipart_body, session_for, test_db_offline,
};

const OWNER_TOKEN: &str = "Bearer owner_static_access";

async fn mock_channel(server: &mut Server, auth: &str) -> (Mock, Mock) {
    let channel = server
        .mock("GET", "/channels")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("part".into(), "id".into()),
            Matcher::UrlEncoded("mine".into(), "true".into()),
        ]))
        .match_header("authorization", auth)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items":[{"id":"UC1"}]}"#)
        .create_async()
        .await;

    let uploads = server
        .mock("GET", "/channels")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("part".into(), "contentDetails".into()),
            Matcher::UrlEncoded("id".into(), "UC1".into()),
        ]))
        .match_header("authorization", auth)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items":[{"id":"UC1","contentDetails":{"relatedPlaylists":{"uploads":"UU1"}}}]}"#)
        .create_async()
        .await;

    (channel, uploads)
}

fn playlist_item(video_id: &str, privacy: &str, with_thumbnail: bool) -> serde_json::Value {
    let thumbnails = if with_thumbnail {
        serde_json::json!({"high": {"url": format!("https://i.ytimg.com/vi/{}/hq.jpg", video_id)}})
    } else {
        serde_json::json!({})
    };
    serde_json::json!({
        "snippet": {
            "title": format!("Video {}", video_id),
            "description": "",
            "publishedAt": "2025-01-01T00:00:00Z",
            "thumbnails": thumbnails,
            "resourceId": {"kind": "youtube#video", "videoId": video_id}
        },
        "status": {"privacyStatus": privacy}
    })
}

fn get(uri: &str, session: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("auth-token={}", session))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_list_follows_pages_and_maps_fields() {
    let mut server = Server::new_async().await;
    let _channel = mock_channel(&mut server, OWNER_TOKEN).await;

    let _page1 = server
        .mock("GET", "/playlistItems")
        .match_query(Matcher::Regex("maxResults=50$".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "items": [playlist_item("v1", "private", true)],
                "nextPageToken": "P2"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let _page2 = server
        .mock("GET", "/playlistItems")
        .match_query(Matcher::Regex("pageToken=P2$".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({"items": [playlist_item("v2", "unlisted", false)]}).to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let response = app.oneshot(get("/api/vlogs", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let vlogs = body.as_array().unwrap();
    assert_eq!(vlogs.len(), 2);

    assert_eq!(vlogs[0]["id"], "v1");
    assert_eq!(vlogs[0]["visibility"], "private");
    assert_eq!(vlogs[0]["thumbnail"], "https://i.ytimg.com/vi/v1/hq.jpg");
    assert_eq!(vlogs[0]["url"], "https://www.youtube.com/watch?v=v1");
    assert_eq!(vlogs[0]["userId"], "owner-id");

    assert_eq!(vlogs[1]["visibility"], "unlisted");
    assert_eq!(
        vlogs[1]["thumbnail"],
        "https://img.youtube.com/vi/v2/hqdefault.jpg"
    );

    search.assert_async().await;
}

#[tokio::test]
async fn test_empty_playlist_falls_back_to_search() {
    let mut server = Server::new_async().await;
    let _channel = mock_channel(&mut server, OWNER_TOKEN).await;

    let _playlist = server
        .mock("GET", "/playlistItems")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items":[]}"#)
        .create_async()
        .await;

    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("forMine".into(), "true".into()),
            Matcher::UrlEncoded("type".into(), "video".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"items":[{"id":{"kind":"youtube#video","videoId":"s1"},"snippet":{"title":"Found","description":"d","publishedAt":"2025-02-01T00:00:00Z","thumbnails":{"default":{"url":"https://i.ytimg.com/vi/s1/default.jpg"}}}}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let response = app.oneshot(get("/api/vlogs", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body[0]["id"], "s1");
    assert_eq!(body[0]["visibility"], "public");
    assert_eq!(body[0]["thumbnail"], "https://i.ytimg.com/vi/s1/default.jpg");
    search.assert_async().await;
}

#[tokio::test]
async fn test_no_channel_is_404() {
    let mut server = Server::new_async().await;
    let _channel = server
        .mock("GET", "/channels")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items":[]}"#)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let response = app.oneshot(get("/api/vlogs", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_once_and_retried() {
    let mut server = Server::new_async().await;

    let rejected = server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .match_header("authorization", OWNER_TOKEN)
        .with_status(401)
        .with_body(r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#)
        .expect(1)
        .create_async()
        .await;

    let token = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "owner_static_refresh".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"fresh","expires_in":3599,"token_type":"Bearer"}"#)
        .expect(1)
        .create_async()
        .await;

    let accepted = server
        .mock("GET", "/videos")
        .match_query(Matcher::UrlEncoded("id".into(), "v1".into()))
        .match_header("authorization", "Bearer fresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"items":[{"id":"v1","snippet":{"title":"Hello","description":"","publishedAt":"2025-01-01T00:00:00Z","thumbnails":{}},"status":{"privacyStatus":"public"}}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let response = app.oneshot(get("/api/vlogs/v1", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Hello");

    rejected.assert_async().await;
    token.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_second_rejection_asks_for_reauth() {
    let mut server = Server::new_async().await;

    let rejected = server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(2)
        .create_async()
        .await;

    let token = server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"fresh","expires_in":3599}"#)
        .expect(1)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let response = app.oneshot(get("/api/vlogs/v1", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["reauthRequired"], true);

    rejected.assert_async().await;
    token.assert_async().await;
}

#[tokio::test]
async fn test_missing_video_is_404() {
    let mut server = Server::new_async().await;
    let _videos = server
        .mock("GET", "/videos")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items":[]}"#)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let response = app.oneshot(get("/api/vlogs/nope", &session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_survives_thumbnail_failure() {
    let mut server = Server::new_async().await;
    let session_url = format!("{}/upload-session/1", server.url());

    let start = server
        .mock("POST", "/upload/videos")
        .match_query(Matcher::UrlEncoded("uploadType".into(), "resumable".into()))
        .match_header("x-upload-content-type", "video/mp4")
        .match_header("x-upload-content-length", "10")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "snippet": {"title": "Day one", "categoryId": "22"},
            "status": {"privacyStatus": "private"}
        })))
        .with_status(200)
        .with_header("location", &session_url)
        .expect(1)
        .create_async()
        .await;

    let put = server
        .mock("PUT", "/upload-session/1")
        .match_body("0123456789")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"newvid"}"#)
        .expect(1)
        .create_async()
        .await;

    let thumbnail = server
        .mock("POST", "/upload/thumbnails/set")
        .match_query(Matcher::UrlEncoded("videoId".into(), "newvid".into()))
        .with_status(403)
        .with_body(r#"{"error":{"code":403,"message":"The authenticated user doesnt have permissions to upload and set custom video thumbnails."}}"#)
        .expect(1)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let boundary = "XBOUNDARYX";
    let body = multipart_body(
        boundary,
        &[
            ("title", None, b"Day one"),
            ("description", None, b"first"),
            ("visibility", None, b"private"),
            ("video", Some(("clip.mp4", "video/mp4")), b"0123456789"),
            ("thumbnail", Some(("thumb.jpg", "image/jpeg")), b"jpeg"),
        ],
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/vlogs")
                .header(header::COOKIE, format!("auth-token={}", session))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["id"], "newvid");
    assert_eq!(body["thumbnailSet"], false);
    assert_eq!(body["url"], "https://www.youtube.com/watch?v=newvid");

    start.assert_async().await;
    put.assert_async().await;
    thumbnail.assert_async().await;
}

#[tokio::test]
async fn test_upload_without_video_is_bad_request() {
    let (app, state) = create_app(Config::test_default(), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let boundary = "XBOUNDARYX";
    let body = multipart_body(boundary, &[("title", None, b"No video")]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/vlogs")
                .header(header::COOKIE, format!("auth-token={}", session))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete() {
    let mut server = Server::new_async().await;

    let update = server
        .mock("PUT", "/videos")
        .match_query(Matcher::UrlEncoded("part".into(), "snippet,status".into()))
        .match_body(Matcher::Json(serde_json::json!({
            "id": "v1",
            "snippet": {"title": "Renamed", "description": "", "categoryId": "22"},
            "status": {"privacyStatus": "public"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"v1"}"#)
        .expect(1)
        .create_async()
        .await;

    let delete = server
        .mock("DELETE", "/videos")
        .match_query(Matcher::UrlEncoded("id".into(), "v1".into()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let boundary = "XBOUNDARYX";
    let body = multipart_body(
        boundary,
        &[("title", None, b"Renamed"), ("visibility", None, b"public")],
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/vlogs/v1")
                .header(header::COOKIE, format!("auth-token={}", session))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body.get("thumbnailSet").is_none());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/vlogs/v1")
                .header(header::COOKIE, format!("auth-token={}", session))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_edit_without_visibility_is_rejected() {
    let mut server = Server::new_async().await;
    let update = server
        .mock("PUT", "/videos")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let boundary = "XBOUNDARYX";
    let body = multipart_body(boundary, &[("title", None, b"Just a rename")]);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/vlogs/v1")
                .header(header::COOKIE, format!("auth-token={}", session))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"].as_str().unwrap().contains("visibility"));

    update.assert_async().await;
}

#[tokio::test]
async fn test_delete_already_deleted_video_is_404() {
    let mut server = Server::new_async().await;
    let delete = server
        .mock("DELETE", "/videos")
        .match_query(Matcher::UrlEncoded("id".into(), "gone".into()))
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"code":404,"message":"Video not found."}}"#)
        .expect(1)
        .create_async()
        .await;

    let (app, state) = create_app(config_for_server(&server.url()), test_db_offline());
    let session = session_for(&state, "owner-id", UserType::Owner);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/vlogs/gone")
                .header(header::COOKIE, format!("auth-token={}", session))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "youtube_error");

    delete.assert_async().await;
}
