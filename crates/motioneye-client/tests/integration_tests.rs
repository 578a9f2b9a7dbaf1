//! Integration tests for motioneye-client
//!
//! These tests run small axum routers that mimic the motionEye HTTP API and
//! drive them through the client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use url::Url;

use motioneye_client::signature::{compute_signature, password_key, SIGNATURE_PARAM};
use motioneye_client::testing::{unused_local_addr, TestServer};
use motioneye_client::{
    Action, CameraConfig, ClientConfig, MotionEyeClient, MotionEyeClientError, KEY_ID,
};

type Params = Query<HashMap<String, String>>;

fn object(value: Value) -> CameraConfig {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

/// Router answering `path` with a fixed JSON body
fn json_route(path: &str, body: Value) -> Router {
    Router::new().route(path, get(move || async move { Json(body) }))
}

// =============================================================================
// Login / authentication
// =============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = TestServer::start(json_route("/login", json!({})))
        .await
        .unwrap();

    let result = server.client.login().await.unwrap();
    assert_eq!(result, Some(json!({})));
}

#[tokio::test]
async fn test_login_signature() {
    let router = Router::new().route(
        "/login",
        get(|Query(params): Params| async move {
            Json(json!({
                "username": params.get("_username"),
                "signature": params.get("_signature"),
            }))
        }),
    );
    let server = TestServer::start_with(router, |config| {
        config
            .admin("admin", "password")
            .surveillance("user", "user_password")
    })
    .await
    .unwrap();

    let echoed = server.client.login().await.unwrap().unwrap();
    assert_eq!(echoed["username"], json!("admin"));
    assert_eq!(
        echoed["signature"],
        json!("010aec346f06cb5cf7f25dd5e3a33798d3032ae7")
    );
}

#[tokio::test]
async fn test_login_failure() {
    let router = Router::new().route(
        "/login",
        get(|| async {
            (
                StatusCode::FORBIDDEN,
                Json(json!({"prompt": true, "error": "unauthorized"})),
            )
        }),
    );
    let server = TestServer::start(router).await.unwrap();

    match server.client.login().await {
        Err(MotionEyeClientError::InvalidAuth { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "unauthorized");
        }
        other => panic!("expected InvalidAuth, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forbidden_on_admin_call() {
    let router = Router::new().route("/config/list", get(|| async { StatusCode::FORBIDDEN }));
    let server = TestServer::start(router).await.unwrap();

    let err = server.client.get_cameras().await.unwrap_err();
    assert!(matches!(
        err,
        MotionEyeClientError::InvalidAuth { status: 403, .. }
    ));
}

#[tokio::test]
async fn test_unauthorized_is_invalid_auth() {
    let router = Router::new().route("/manifest.json", get(|| async { StatusCode::UNAUTHORIZED }));
    let server = TestServer::start(router).await.unwrap();

    assert!(matches!(
        server.client.get_manifest().await,
        Err(MotionEyeClientError::InvalidAuth { status: 401, .. })
    ));
}

/// Router that verifies signatures the way the motionEye server does
fn verifying_router(password: &'static str, calls: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/config/{id}/set",
        post(move |uri: Uri, body: String| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let url = Url::parse(&format!("http://motioneye{}", uri)).unwrap();
            let sent = url
                .query_pairs()
                .find(|(name, _)| name == SIGNATURE_PARAM)
                .map(|(_, value)| value.into_owned());
            let expected = compute_signature("POST", &url, Some(body.as_str()), &password_key(password));

            if sent.as_deref() == Some(expected.as_str()) {
                Json(json!({})).into_response()
            } else {
                (StatusCode::FORBIDDEN, Json(json!({"error": "unauthorized"}))).into_response()
            }
        }),
    )
}

#[tokio::test]
async fn test_signed_post_accepted_by_verifying_server() {
    let calls = Arc::new(AtomicUsize::new(0));
    let server = TestServer::start_with(verifying_router("s3cret", calls.clone()), |config| {
        config.admin("admin", "s3cret")
    })
    .await
    .unwrap();

    let config = object(json!({"name": "Front door", "video_streaming": true}));
    assert_eq!(
        server.client.set_camera(3, &config).await.unwrap(),
        Some(json!({}))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_signed_post_with_wrong_password_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let server = TestServer::start_with(verifying_router("s3cret", calls), |config| {
        config.admin("admin", "wrong")
    })
    .await
    .unwrap();

    let err = server
        .client
        .set_camera(3, &CameraConfig::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MotionEyeClientError::InvalidAuth { .. }));
}

// =============================================================================
// Transport and decoding failures
// =============================================================================

#[tokio::test]
async fn test_not_found_is_request_error() {
    let server = TestServer::start(Router::new()).await.unwrap();

    match server.client.login().await {
        Err(MotionEyeClientError::Request { status, .. }) => assert_eq!(status, Some(404)),
        other => panic!("expected Request, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_message() {
    let router = Router::new().route(
        "/config/main/get",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "boom"})),
            )
        }),
    );
    let server = TestServer::start(router).await.unwrap();

    match server.client.get_server_config().await {
        Err(MotionEyeClientError::Request { status, message }) => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "boom");
        }
        other => panic!("expected Request, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_response() {
    let router = Router::new().route("/manifest.json", get(|| async { "this is not json" }));
    let server = TestServer::start(router).await.unwrap();

    assert!(matches!(
        server.client.get_manifest().await,
        Err(MotionEyeClientError::Request { .. })
    ));
}

#[tokio::test]
async fn test_empty_body_is_none() {
    let router = Router::new().route("/login", get(|| async { "" }));
    let server = TestServer::start(router).await.unwrap();

    assert_eq!(server.client.login().await.unwrap(), None);
}

#[tokio::test]
async fn test_cannot_connect() {
    let addr = unused_local_addr().await.unwrap();
    let client = MotionEyeClient::new(&format!("http://{}", addr)).unwrap();

    assert!(matches!(
        client.login().await,
        Err(MotionEyeClientError::Connection(_))
    ));
}

// =============================================================================
// Server endpoints
// =============================================================================

#[tokio::test]
async fn test_get_manifest() {
    let manifest = json!({"version": "0.43.1", "hostname": "cams"});
    let server = TestServer::start(json_route("/manifest.json", manifest.clone()))
        .await
        .unwrap();

    assert_eq!(server.client.get_manifest().await.unwrap(), manifest);
}

#[tokio::test]
async fn test_get_server_config() {
    let config = json!({"key": "value"});
    let server = TestServer::start(json_route("/config/main/get", config.clone()))
        .await
        .unwrap();

    assert_eq!(server.client.get_server_config().await.unwrap(), config);
}

#[tokio::test]
async fn test_get_cameras() {
    let cameras = json!([
        {"id": 1, "name": "Front", "streaming_port": 8081},
        {"id": 2, "name": "Back"},
        {"id": 3, "name": "Garage", "video_streaming": false},
    ]);
    let server = TestServer::start(json_route("/config/list", json!({"cameras": cameras})))
        .await
        .unwrap();

    let result = server.client.get_cameras().await.unwrap();
    let result: Vec<Value> = result.into_iter().map(Value::Object).collect();
    assert_eq!(Value::Array(result), cameras);
}

#[tokio::test]
async fn test_get_cameras_missing_envelope() {
    let server = TestServer::start(json_route("/config/list", json!({"key": "value"})))
        .await
        .unwrap();

    assert!(matches!(
        server.client.get_cameras().await,
        Err(MotionEyeClientError::Request { .. })
    ));
}

#[tokio::test]
async fn test_get_camera() {
    let camera = json!({"id": 100, "name": "Porch"});
    let server = TestServer::start(json_route("/config/100/get", camera.clone()))
        .await
        .unwrap();

    let result = server.client.get_camera(100).await.unwrap();
    assert_eq!(Value::Object(result), camera);
}

#[tokio::test]
async fn test_set_camera() {
    let received = Arc::new(Mutex::new(None));
    let router = Router::new()
        .route(
            "/config/100/set",
            post(
                |State(received): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                    *received.lock() = Some(body);
                    Json(json!({}))
                },
            ),
        )
        .with_state(received.clone());
    let server = TestServer::start(router).await.unwrap();

    let camera = object(json!({"key": "value"}));
    assert_eq!(
        server.client.set_camera(100, &camera).await.unwrap(),
        Some(json!({}))
    );
    assert_eq!(*received.lock(), Some(json!({"key": "value"})));
}

#[derive(Clone)]
struct CameraStore {
    config: Arc<Mutex<Value>>,
    reads: Arc<AtomicUsize>,
}

#[tokio::test]
async fn test_get_set_get_is_not_cached() {
    let store = CameraStore {
        config: Arc::new(Mutex::new(json!({"id": 5, "name": "Old"}))),
        reads: Arc::new(AtomicUsize::new(0)),
    };
    let router = Router::new()
        .route(
            "/config/5/get",
            get(|State(store): State<CameraStore>| async move {
                store.reads.fetch_add(1, Ordering::SeqCst);
                Json(store.config.lock().clone())
            }),
        )
        .route(
            "/config/5/set",
            post(
                |State(store): State<CameraStore>, Json(body): Json<Value>| async move {
                    *store.config.lock() = body;
                    Json(json!({}))
                },
            ),
        )
        .with_state(store.clone());
    let server = TestServer::start(router).await.unwrap();

    let mut camera = server.client.get_camera(5).await.unwrap();
    assert_eq!(camera["name"], json!("Old"));

    camera.insert("name".to_string(), json!("New"));
    server.client.set_camera(5, &camera).await.unwrap();

    let camera = server.client.get_camera(5).await.unwrap();
    assert_eq!(camera["name"], json!("New"));
    assert_eq!(camera[KEY_ID], json!(5));
    assert_eq!(store.reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_action() {
    let router = Router::new().route(
        "/action/100/snapshot",
        post(|Json(body): Json<Value>| async move { Json(json!({"received": body})) }),
    );
    let server = TestServer::start(router).await.unwrap();

    let result = server
        .client
        .action(100, Action::Snapshot.as_str())
        .await
        .unwrap();
    assert_eq!(result, Some(json!({"received": {}})));
}

#[tokio::test]
async fn test_invalid_arguments_fail_before_request() {
    let addr = unused_local_addr().await.unwrap();
    let client = MotionEyeClient::new(&format!("http://{}", addr)).unwrap();

    assert!(matches!(
        client.action(1, "").await,
        Err(MotionEyeClientError::Path(_))
    ));
    assert!(matches!(
        client.get_camera(0).await,
        Err(MotionEyeClientError::Path(_))
    ));
}

#[tokio::test]
async fn test_action_name_cannot_leave_action_path() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/config/main/set",
        post(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Json(json!({}))
        }),
    );
    let server = TestServer::start(router).await.unwrap();

    for name in ["../../config/main/set", "snapshot/../../x", "snapshot?x=1", "snapshot#x"] {
        assert!(matches!(
            server.client.action(1, name).await,
            Err(MotionEyeClientError::Path(_))
        ));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Media listings
// =============================================================================

fn media_router(kind: &str) -> Router {
    let list = |Query(params): Params| async move {
        Json(json!({
            "mediaList": [
                {"path": "/2024-01-01/10-00-00.mp4", "prefix": params.get("prefix")},
            ],
            "cameraName": "Front",
        }))
    };
    Router::new()
        .route(&format!("/{}/100/list", kind), get(list))
        .route(&format!("/{}/101/list", kind), get(list))
}

#[tokio::test]
async fn test_get_movies() {
    let server = TestServer::start(media_router("movie")).await.unwrap();

    let movies = server.client.get_movies(100, None).await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["path"], json!("/2024-01-01/10-00-00.mp4"));
    assert_eq!(movies[0]["prefix"], Value::Null);

    let movies = server.client.get_movies(101, Some("moo")).await.unwrap();
    assert_eq!(movies[0]["prefix"], json!("moo"));
}

#[tokio::test]
async fn test_get_images() {
    let server = TestServer::start(media_router("picture")).await.unwrap();

    let images = server.client.get_images(100, None).await.unwrap();
    assert_eq!(images[0]["prefix"], Value::Null);

    let images = server.client.get_images(101, Some("moo")).await.unwrap();
    assert_eq!(images[0]["prefix"], json!("moo"));
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[tokio::test]
async fn test_closed_client_fails_with_connection_error() {
    let server = TestServer::start(json_route("/manifest.json", json!({"v": 1})))
        .await
        .unwrap();

    server.client.get_manifest().await.unwrap();
    server.client.close();

    assert!(server.client.is_closed());
    assert!(matches!(
        server.client.get_manifest().await,
        Err(MotionEyeClientError::Connection(_))
    ));
    assert!(matches!(
        server.client.login().await,
        Err(MotionEyeClientError::Connection(_))
    ));
}

#[tokio::test]
async fn test_external_session_survives_close() {
    let server = TestServer::start(json_route("/manifest.json", json!({"v": 1})))
        .await
        .unwrap();

    let session = reqwest::Client::new();
    let client =
        MotionEyeClient::with_session(ClientConfig::new(server.base_url()), session.clone())
            .unwrap();
    assert!(!client.owns_session());

    assert_eq!(client.get_manifest().await.unwrap(), json!({"v": 1}));
    client.close();
    drop(client);

    let response = session
        .get(format!("{}manifest.json", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}
