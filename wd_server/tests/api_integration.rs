//! HTTP API integration tests for the word duel server.
//!
//! Drives the router directly with tower's `oneshot`, covering the health
//! check and the CSV upload boundary.

use axum::body::Body;
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use wd_server::api::{AppState, create_router};
use word_duel::{PlayerId, RoomCode, RoomConfig, RoomManager, WordEntry};

fn create_test_app() -> (axum::Router, Arc<RoomManager>) {
    let room_manager = Arc::new(RoomManager::new(RoomConfig::default()));
    let app = create_router(AppState {
        room_manager: room_manager.clone(),
    });
    (app, room_manager)
}

const BOUNDARY: &str = "----wdtestboundary";

/// Build a multipart body carrying one CSV file field.
fn multipart_csv(csv: &str) -> (String, String) {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"words.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );
    let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
    (body, content_type)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_reports_room_count() {
    let (app, room_manager) = create_test_app();
    room_manager.create_room(PlayerId::new()).await.unwrap();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["rooms"]["active_count"], 1);
}

#[tokio::test]
async fn upload_stores_word_list_for_room() {
    let (app, room_manager) = create_test_app();
    let code = room_manager.create_room(PlayerId::new()).await.unwrap();

    let (body, content_type) =
        multipart_csv("Word,Definition\napple,a fruit\npear,another fruit\nplum,a third fruit\n");
    let response = app
        .oneshot(
            Request::post(format!("/upload/{code}"))
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 3);

    let status = room_manager.room_status(&code).await.unwrap();
    assert_eq!(status.word_list_size, 3);
}

#[tokio::test]
async fn upload_to_unknown_room_is_not_found() {
    let (app, _) = create_test_app();

    let (body, content_type) = multipart_csv("Word,Definition\napple,a fruit\n");
    let response = app
        .oneshot(
            Request::post("/upload/9999")
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_with_wrong_headers_is_rejected() {
    let (app, room_manager) = create_test_app();
    let code = room_manager.create_room(PlayerId::new()).await.unwrap();

    let (body, content_type) = multipart_csv("Term,Meaning\napple,a fruit\n");
    let response = app
        .oneshot(
            Request::post(format!("/upload/{code}"))
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid CSV format"));

    // No state mutation on rejection.
    let status = room_manager.room_status(&code).await.unwrap();
    assert_eq!(status.word_list_size, 0);
}

#[tokio::test]
async fn upload_after_start_is_rejected() {
    let (app, room_manager) = create_test_app();
    let host = PlayerId::new();
    let code = room_manager.create_room(host).await.unwrap();
    room_manager.join_room(&code, PlayerId::new()).await.unwrap();
    room_manager
        .set_word_list(
            &code,
            vec![
                WordEntry::new("A", "1"),
                WordEntry::new("B", "2"),
                WordEntry::new("C", "3"),
                WordEntry::new("D", "4"),
            ],
        )
        .await
        .unwrap();
    room_manager.start_game(&code, host).await.unwrap();

    let (body, content_type) = multipart_csv("Word,Definition\napple,a fruit\n");
    let response = app
        .oneshot(
            Request::post(format!("/upload/{code}"))
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let status = room_manager.room_status(&code).await.unwrap();
    assert_eq!(status.word_list_size, 4);
}

#[tokio::test]
async fn malformed_room_code_is_not_found() {
    let (app, _) = create_test_app();
    assert!(RoomCode::parse("abcd").is_none());

    let (body, content_type) = multipart_csv("Word,Definition\napple,a fruit\n");
    let response = app
        .oneshot(
            Request::post("/upload/abcd")
                .header(CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
