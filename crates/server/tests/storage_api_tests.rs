use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use unitrack_storage::StorageFolder;

fn app(dir: &std::path::Path) -> Router {
    unitrack_server::create_router(StorageFolder::new(dir), None)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn save(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/save-progress")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = send(app(dir.path()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_save_then_load_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage");
    let app = app(&storage);

    let (status, json) = send(
        app.clone(),
        save(json!({ "fileName": "backup.json", "content": "{\"totalUnits\":0,\"units\":{}}" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    // Strings are stored verbatim.
    let raw = std::fs::read_to_string(storage.join("backup.json")).unwrap();
    assert_eq!(raw, "{\"totalUnits\":0,\"units\":{}}");

    let (status, json) = send(app.clone(), get("/api/load-progress/backup.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["totalUnits"], 0);

    let (status, json) = send(app, get("/api/storage-files")).await;
    assert_eq!(status, StatusCode::OK);
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "backup.json");
    assert!(files[0]["modified"].as_str().is_some());
}

#[tokio::test]
async fn test_object_content_is_pretty_printed() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _) = send(
        app(dir.path()),
        save(json!({ "fileName": "obj.json", "content": { "a": 1 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let raw = std::fs::read_to_string(dir.path().join("obj.json")).unwrap();
    assert_eq!(raw, "{\n  \"a\": 1\n}");
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = send(app(dir.path()), get("/api/load-progress/none.json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("none.json"));
}

#[tokio::test]
async fn test_traversal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = send(
        app(dir.path()),
        save(json!({ "fileName": "../escape.json", "content": "{}" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(!dir.path().parent().unwrap().join("escape.json").exists());

    let (status, _) = send(app(dir.path()), get("/api/load-progress/..")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_delete_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("old-metadata.json"), "{}").unwrap();

    let (status, json) = send(app(dir.path()), delete("/api/delete-progress/old-metadata.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(!dir.path().join("old-metadata.json").exists());

    let (status, json) = send(app(dir.path()), delete("/api/delete-progress/old-metadata.json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_invalid_stored_json_is_500() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
    let (status, json) = send(app(dir.path()), get("/api/load-progress/broken.json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_listing_empty_or_missing_folder() {
    let dir = tempfile::tempdir().unwrap();
    let (status, json) = send(app(&dir.path().join("absent")), get("/api/storage-files")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["files"], json!([]));
}

#[tokio::test]
async fn test_static_fallback() {
    let storage = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("index.html"), "<html>app</html>").unwrap();

    let app = unitrack_server::create_router(StorageFolder::new(storage.path()), Some(site.path()));
    let response = app.oneshot(get("/index.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<html>app</html>");
}
