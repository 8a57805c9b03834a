//! HTTP-level tests against a served sync server.

use std::sync::Arc;
use stint_store::Database;
use stint_sync_protocol::{Snapshot, API_TOKEN_HEADER};
use stint_sync_server::{serve_on, SyncServer, Token, TokenInfo, TokenRegistry};

struct Harness {
    base_url: String,
    server: Arc<SyncServer>,
    client: reqwest::Client,
}

impl Harness {
    async fn start(registry: TokenRegistry) -> Self {
        let server = Arc::new(SyncServer::new(Database::open_in_memory().unwrap()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve_on(
            listener,
            Arc::clone(&server),
            Arc::new(registry),
        ));
        Self {
            base_url: format!("http://{addr}"),
            server,
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, token: &str, body: Option<String>) -> reqwest::Response {
        let mut request = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header(API_TOKEN_HEADER, token);
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        request.send().await.unwrap()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .header(API_TOKEN_HEADER, token)
            .send()
            .await
            .unwrap()
    }
}

fn sync_registry(entries: &[(&Token, &str)]) -> TokenRegistry {
    let mut registry = TokenRegistry::new();
    for (token, name) in entries {
        registry.insert(token.hash(), TokenInfo::sync_client(*name));
    }
    registry
}

#[tokio::test(flavor = "multi_thread")]
async fn lock_contention_over_http() {
    let laptop = Token::generate();
    let desktop = Token::generate();
    let harness = Harness::start(sync_registry(&[(&laptop, "laptop"), (&desktop, "desktop")]))
        .await;

    let response = harness.post("/lock", laptop.as_str(), None).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = harness.post("/lock", desktop.as_str(), None).await;
    assert_eq!(response.status().as_u16(), 409);
    assert!(response.text().await.unwrap().contains("laptop"));

    // Only the holder may unlock.
    let response = harness.post("/unlock", desktop.as_str(), None).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = harness.post("/unlock", laptop.as_str(), None).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = harness.post("/lock", desktop.as_str(), None).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test(flavor = "multi_thread")]
async fn tokens_gate_every_endpoint() {
    let issued = Token::generate();
    let harness = Harness::start(sync_registry(&[(&issued, "laptop")])).await;

    // Absent or misshapen tokens are malformed.
    let response = harness.post("/lock", "", None).await;
    assert_eq!(response.status().as_u16(), 400);

    // Well-formed but unissued tokens are refused.
    let stranger = Token::generate();
    let response = harness.get("/database", stranger.as_str()).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = harness.get("/database", issued.as_str()).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test(flavor = "multi_thread")]
async fn permissionless_tokens_are_refused() {
    let token = Token::generate();
    let mut registry = TokenRegistry::new();
    registry.insert(
        token.hash(),
        TokenInfo {
            name: "viewer".into(),
            permissions: vec![],
        },
    );
    let harness = Harness::start(registry).await;

    let response = harness.get("/database", token.as_str()).await;
    assert_eq!(response.status().as_u16(), 403);
    assert!(response.text().await.unwrap().contains("database:sync"));
}

#[tokio::test(flavor = "multi_thread")]
async fn changes_round_trip_through_the_snapshot() {
    let token = Token::generate();
    let harness = Harness::start(sync_registry(&[(&token, "laptop")])).await;

    let body = r#"{
        "Sessions": [],
        "Timeframes": null,
        "Tasks": [
            { "Operation": 0, "Data": { "ID": "t1", "Description": "errands" } }
        ]
    }"#;
    let response = harness
        .post("/database/changes", token.as_str(), Some(body.into()))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let response = harness.get("/database", token.as_str()).await;
    assert_eq!(response.status().as_u16(), 200);
    let snapshot: Snapshot = response.json().await.unwrap();
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.tasks[0].id, "t1");

    // Remove it again.
    let body = r#"{
        "Tasks": [
            { "Operation": 1, "Data": { "ID": "t1", "Description": "errands" } }
        ]
    }"#;
    let response = harness
        .post("/database/changes", token.as_str(), Some(body.into()))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(harness.server.store().export().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_changesets_are_rejected() {
    let token = Token::generate();
    let harness = Harness::start(sync_registry(&[(&token, "laptop")])).await;

    let response = harness
        .post("/database/changes", token.as_str(), Some("not json".into()))
        .await;
    assert_eq!(response.status().as_u16(), 400);

    // Unknown operation codes fail deserialization.
    let body = r#"{
        "Tasks": [
            { "Operation": 7, "Data": { "ID": "t1", "Description": "errands" } }
        ]
    }"#;
    let response = harness
        .post("/database/changes", token.as_str(), Some(body.into()))
        .await;
    assert_eq!(response.status().as_u16(), 400);
}
