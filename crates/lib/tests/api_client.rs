//! Integration test: run a mock admin backend (axum) on a free port and exercise every
//! `ApiClient` call against it. The server task is left running when the test ends.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use lib::api::{ApiClient, ApiError, ProfileOwner};
use lib::model::{Collection, ItemRef, Kind};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    auth: Option<String>,
    body: String,
}

type Requests = Arc<Mutex<Vec<Seen>>>;

fn envelope(data: Value) -> Json<Value> {
    Json(json!({ "status": "success", "message": "", "data": data }))
}

async fn residents() -> Json<Value> {
    envelope(json!({ "residents": [
        { "resident_id": "R1", "display_name": "Ada", "avatar_url": "https://img/ada.png",
          "is_agent": false, "email": "ada@example.org", "role": "admin", "agent": "disabled",
          "state": "active", "last_login_timestamp_ms": 1700000000000i64 },
        { "resident_id": "R2", "display_name": "Bot", "avatar_url": "", "is_agent": true }
    ] }))
}

async fn groups() -> Json<Value> {
    envelope(json!({ "groups": [
        { "group_id": "G1", "name": "Lobby", "alias": "#lobby:example.org", "size": 12,
          "public": false, "encryption": { "algorithm": "m.megolm.v1.aes-sha2" } }
    ] }))
}

async fn models() -> Json<Value> {
    envelope(json!({ "llm_model_list": [
        { "provider": "ollama", "model_id": "qwen2.5", "group_id": "G1", "size": 7.6, "version": "2.5" }
    ] }))
}

async fn resident_profile(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "profile": format!("profile of {}", id) }))
}

async fn group_profile() -> Json<Value> {
    Json(json!({ "profile": null }))
}

async fn record(
    State(requests): State<Requests>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let path = uri.path().to_string();
    let failing = path.contains("BROKEN") || body.contains("\"taken\"");
    requests.lock().unwrap().push(Seen {
        method,
        path,
        auth: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    if failing {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn not_json() -> &'static str {
    "<html>not json</html>"
}

async fn spawn_backend() -> (String, Requests) {
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/residents", get(residents))
        .route("/api/groups", get(groups))
        .route("/api/models", get(models))
        .route("/api/residents/:id", put(record))
        .route("/api/groups/:id", put(record))
        .route("/api/resident_profile/:id", get(resident_profile))
        .route("/api/group_profile/:id", get(group_profile))
        .route("/api/resident_profile/:id/", post(record))
        .route("/api/group_profile/:id/", post(record))
        .route("/api/register", put(record))
        .route("/api/agents/run", post(record))
        .route("/api/agents/stop", post(record))
        .route("/bad/residents", get(not_json))
        .with_state(requests.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://127.0.0.1:{}", port), requests)
}

fn last(requests: &Requests) -> Seen {
    requests.lock().unwrap().last().cloned().expect("a recorded request")
}

#[tokio::test]
async fn fetches_every_kind_from_the_envelope() {
    let (base, _) = spawn_backend().await;
    let api = ApiClient::new(format!("{}/api/", base));

    let residents = api.fetch_collection(Kind::Residents).await.unwrap();
    assert_eq!(residents.len(), 2);
    match residents.find("R1") {
        Some(ItemRef::Resident(r)) => {
            assert_eq!(r.display_name, "Ada");
            assert_eq!(r.email.as_deref(), Some("ada@example.org"));
        }
        other => panic!("unexpected {:?}", other),
    }

    let groups = api.fetch_collection(Kind::Groups).await.unwrap();
    match &groups {
        Collection::Groups(g) => {
            assert_eq!(g[0].size, 12);
            assert!(g[0].encryption.is_some());
        }
        other => panic!("unexpected {:?}", other),
    }

    let models = api.fetch_collection(Kind::Models).await.unwrap();
    assert_eq!(models.find("qwen2.5").map(|m| m.kind()), Some(Kind::Models));

    let again = api.fetch_collection(Kind::Residents).await.unwrap();
    assert_eq!(again, residents);
}

#[tokio::test]
async fn update_sends_full_record_with_bearer() {
    let (base, requests) = spawn_backend().await;
    let api = ApiClient::new(format!("{}/api", base)).with_bearer(Some("tok".to_string()));

    let collection = api.fetch_collection(Kind::Residents).await.unwrap();
    let mut resident = match collection.find("R1") {
        Some(ItemRef::Resident(r)) => r.clone(),
        other => panic!("unexpected {:?}", other),
    };
    resident.display_name = "Foo".to_string();
    api.update_resident(&resident).await.unwrap();

    let seen = last(&requests);
    assert_eq!(seen.method, Method::PUT);
    assert_eq!(seen.path, "/api/residents/R1");
    assert_eq!(seen.auth.as_deref(), Some("Bearer tok"));
    let body: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body["display_name"], "Foo");
    assert_eq!(body["resident_id"], "R1");
    assert_eq!(body["email"], "ada@example.org");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (base, _) = spawn_backend().await;
    let api = ApiClient::new(format!("{}/api", base));
    let collection = api.fetch_collection(Kind::Groups).await.unwrap();
    let mut group = match collection.find("G1") {
        Some(ItemRef::Group(g)) => g.clone(),
        other => panic!("unexpected {:?}", other),
    };
    group.group_id = "BROKEN".to_string();
    match api.update_group(&group).await {
        Err(ApiError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn profiles_load_and_save() {
    let (base, requests) = spawn_backend().await;
    let api = ApiClient::new(format!("{}/api", base));

    let text = api.fetch_profile(ProfileOwner::Resident, "R1").await.unwrap();
    assert_eq!(text, "profile of R1");
    let empty = api.fetch_profile(ProfileOwner::Group, "G1").await.unwrap();
    assert_eq!(empty, "");

    api.save_profile(ProfileOwner::Group, "G1", "  kept verbatim\n")
        .await
        .unwrap();
    let seen = last(&requests);
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.path, "/api/group_profile/G1/");
    let body: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body, json!({ "profile_text": "  kept verbatim\n" }));
}

#[tokio::test]
async fn ids_are_percent_encoded_in_paths() {
    let (base, requests) = spawn_backend().await;
    let api = ApiClient::new(format!("{}/api", base));

    let text = api
        .fetch_profile(ProfileOwner::Resident, "Qwen/Qwen2.5-7B?x")
        .await
        .unwrap();
    assert_eq!(text, "profile of Qwen/Qwen2.5-7B?x");

    api.save_profile(ProfileOwner::Group, "a/b#c", "hi").await.unwrap();
    assert_eq!(last(&requests).path, "/api/group_profile/a%2Fb%23c/");

    let collection = api.fetch_collection(Kind::Groups).await.unwrap();
    let mut group = match collection.find("G1") {
        Some(ItemRef::Group(g)) => g.clone(),
        other => panic!("unexpected {:?}", other),
    };
    group.group_id = "team/ops".to_string();
    api.update_group(&group).await.unwrap();
    let seen = last(&requests);
    assert_eq!(seen.path, "/api/groups/team%2Fops");
    let body: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body["group_id"], "team/ops");
}

#[tokio::test]
async fn register_and_agent_actions() {
    let (base, requests) = spawn_backend().await;
    let api = ApiClient::new(format!("{}/api", base)).with_bearer(Some("tok".to_string()));

    api.register("alice", "secret").await.unwrap();
    let seen = last(&requests);
    assert_eq!(seen.method, Method::PUT);
    assert_eq!(seen.path, "/api/register");
    let body: Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(body, json!({ "username": "alice", "password": "secret" }));

    assert!(matches!(
        api.register("taken", "pw").await,
        Err(ApiError::Status { status: 500, .. })
    ));

    api.run_agents().await.unwrap();
    assert_eq!(last(&requests).path, "/api/agents/run");
    api.stop_agents().await.unwrap();
    let seen = last(&requests);
    assert_eq!(seen.path, "/api/agents/stop");
    assert_eq!(seen.method, Method::POST);
    assert_eq!(seen.auth.as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn requests_without_token_carry_no_auth_header() {
    let (base, requests) = spawn_backend().await;
    let api = ApiClient::new(format!("{}/api", base));
    api.run_agents().await.unwrap();
    assert_eq!(last(&requests).auth, None);
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let (base, _) = spawn_backend().await;
    let api = ApiClient::new(format!("{}/bad", base));
    assert!(matches!(
        api.fetch_collection(Kind::Residents).await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn unreachable_backend_is_a_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    drop(listener);
    let api = ApiClient::new(format!("http://127.0.0.1:{}/api", port));
    assert!(matches!(
        api.fetch_collection(Kind::Groups).await,
        Err(ApiError::Request(_))
    ));
}
