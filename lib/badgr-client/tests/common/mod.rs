#![allow(dead_code, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rstest::fixture;
use serde_json::{Value, json};
use tracing::info;

use badgr_client::{ApiClient, Transport, TransportError, TransportRequest};

pub const BASE_URL: &str = "http://localhost:8000";
pub const TEST_USER: &str = "test";
pub const TEST_PASSWORD: &str = "test_pass";

pub const TEST_BADGES: [(&str, &str); 2] = [
    ("Speak Up!", "s0ziri1rZs6cNQVnHw"),
    ("Baby Badgr", "t0ziri1LRpyrZs6cN"),
];

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// In-memory transport recording every request.
///
/// Token requests are answered from the token queue, or with a fresh long-lived token.
/// Other requests are answered from the response queue, or with an empty result list.
/// A yielding transport gives way to other tasks before answering, like a real network call.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    yield_on_send: bool,
}

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<TransportRequest>,
    tokens: VecDeque<Result<Value, TransportError>>,
    responses: VecDeque<Result<Value, TransportError>>,
    issued_tokens: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yielding() -> Self {
        Self {
            yield_on_send: true,
            ..Self::default()
        }
    }

    pub fn push_token(&self, token: Result<Value, TransportError>) {
        self.state.lock().expect("mock state").tokens.push_back(token);
    }

    pub fn respond(&self, body: Value) {
        self.state
            .lock()
            .expect("mock state")
            .responses
            .push_back(Ok(body));
    }

    pub fn fail(&self, status_code: u16, body: &str) {
        self.state
            .lock()
            .expect("mock state")
            .responses
            .push_back(Err(TransportError::Status {
                status_code,
                body: body.to_string(),
            }));
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.state.lock().expect("mock state").requests.clone()
    }

    pub fn token_requests(&self) -> Vec<TransportRequest> {
        self.requests().into_iter().filter(is_token_request).collect()
    }

    pub fn api_requests(&self) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|request| !is_token_request(request))
            .collect()
    }

    /// `METHOD /path?query` of every non-token request.
    pub fn api_calls(&self) -> Vec<String> {
        self.api_requests().iter().map(describe).collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().expect("mock state").requests.clear();
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value, TransportError> {
        if self.yield_on_send {
            tokio::task::yield_now().await;
        }

        let mut state = self.state.lock().expect("mock state");
        let token_request = is_token_request(&request);
        state.requests.push(request);

        if token_request {
            state.issued_tokens += 1;
            let count = state.issued_tokens;
            return state
                .tokens
                .pop_front()
                .unwrap_or_else(|| Ok(token_body(&format!("mock_token_{count}"), 86400)));
        }

        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(json!({ "result": [] })))
    }
}

fn is_token_request(request: &TransportRequest) -> bool {
    request.url.path() == "/o/token"
}

pub fn describe(request: &TransportRequest) -> String {
    match request.url.query() {
        Some(query) => format!("{} {}?{query}", request.method, request.url.path()),
        None => format!("{} {}", request.method, request.url.path()),
    }
}

pub fn bearer(request: &TransportRequest) -> Option<String> {
    request
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

pub fn token_body(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "expires_in": expires_in,
        "token_type": "Bearer",
        "scope": "rw:profile rw:issuer rw:backpack",
        "refresh_token": "mock_refresh_token",
    })
}

pub fn badgeclass_data(name: &str, entity_id: &str, issuer: &str) -> Value {
    json!({
        "entityType": "BadgeClass",
        "entityId": entity_id,
        "openBadgeId": format!("{BASE_URL}/public/badges/{entity_id}"),
        "createdAt": "2020-08-28T05:34:28.482098Z",
        "issuer": issuer,
        "name": name,
        "image": format!("{BASE_URL}/media/test/some.png"),
        "description": "Participated in an IRC meeting.",
        "criteriaUrl": null,
        "criteriaNarrative": null,
        "alignments": [],
        "tags": ["irc", "community"],
        "expires": {"amount": null, "duration": null},
        "extensions": {},
    })
}

pub fn result(items: impl IntoIterator<Item = Value>) -> Value {
    json!({
        "status": {"success": true, "description": "ok"},
        "result": items.into_iter().collect::<Vec<_>>(),
    })
}

pub fn test_client(unique_badge_names: bool) -> ApiClient<MockTransport> {
    test_client_with(MockTransport::new(), unique_badge_names)
}

pub fn test_client_with(
    transport: MockTransport,
    unique_badge_names: bool,
) -> ApiClient<MockTransport> {
    init_tracing();
    ApiClient::builder()
        .with_base_url(BASE_URL)
        .with_password_grant(TEST_USER, TEST_PASSWORD)
        .with_client_id("kewl_client")
        .with_unique_badge_names(unique_badge_names)
        .with_transport(transport)
        .build()
        .expect("client should build")
}

#[fixture]
pub fn client() -> ApiClient<MockTransport> {
    test_client(false)
}

#[fixture]
pub fn unique_client() -> ApiClient<MockTransport> {
    test_client(true)
}

/// A client enforcing unique names, with the names of issuer `test` loaded.
#[fixture]
pub async fn loaded_client() -> ApiClient<MockTransport> {
    load_test_badges(test_client(true)).await
}

/// Loads [`TEST_BADGES`] as the names of issuer `test`, then forgets the requests.
pub async fn load_test_badges(client: ApiClient<MockTransport>) -> ApiClient<MockTransport> {
    client.transport().respond(result(
        TEST_BADGES
            .iter()
            .map(|(name, eid)| badgeclass_data(name, eid, "test")),
    ));

    let count = client
        .load_badge_names("test")
        .await
        .expect("badge names should load");
    assert_eq!(count, TEST_BADGES.len());

    client.transport().clear_requests();
    client
}
