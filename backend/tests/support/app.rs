//! In-process application harness backed by the in-memory store.
//!
//! Every request runs through the full middleware stack and route table over
//! shared state, so suites observe the same behaviour as the deployed
//! server without a database.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::TimeDelta;
use serde_json::{Value, json};

use callboard::Trace;
use callboard::domain::TRACE_ID_HEADER;
use callboard::inbound::http::configure;
use callboard::inbound::http::state::{CookiePolicy, DrivenPorts, HttpState, HttpStatePorts};
use callboard::outbound::security::JwtTokenService;
use callboard::test_support::clock::MutableClock;
use callboard::test_support::hasher::FakePasswordHasher;
use callboard::test_support::store::InMemoryStore;

pub const ADMIN_PASSWORD: &str = "admin-password";
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// Status, trace id, and decoded body of one response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub trace_id: Option<String>,
    pub body: Value,
}

impl Reply {
    /// `details.code` of an error body.
    pub fn detail_code(&self) -> Option<&str> {
        self.body["details"]["code"].as_str()
    }
}

pub struct TestApp {
    state: web::Data<HttpState>,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<MutableClock>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(MutableClock::default());
        let ports = HttpStatePorts::from_driven(DrivenPorts {
            users: store.clone(),
            lists: store.clone(),
            calls: store.clone(),
            hasher: Arc::new(FakePasswordHasher::default()),
            tokens: Arc::new(JwtTokenService::new(
                b"integration-signing-key-0123456789",
                clock.clone(),
            )),
            clock: clock.clone(),
            token_ttl: TimeDelta::minutes(TOKEN_TTL_MINUTES),
        });
        let state = HttpState::new(ports).with_cookie_policy(CookiePolicy { secure: false });
        Self {
            state: web::Data::new(state),
            store,
            clock,
        }
    }

    pub async fn send(&self, request: TestRequest) -> Reply {
        let app = test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(Trace)
                .configure(configure),
        )
        .await;
        let res = test::call_service(&app, request.to_request()).await;
        let status = res.status();
        let trace_id = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = test::read_body(res).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        Reply {
            status,
            trace_id,
            body,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Reply {
        self.send(
            TestRequest::post()
                .uri("/token")
                .set_json(json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Create the first administrator and return their token.
    pub async fn bootstrap_admin(&self) -> String {
        let reply = self
            .send(
                TestRequest::post()
                    .uri("/init-admin")
                    .set_json(json!({ "username": "root", "password": ADMIN_PASSWORD })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "init-admin: {:?}", reply.body);
        self.token_for("root", ADMIN_PASSWORD).await
    }

    pub async fn token_for(&self, username: &str, password: &str) -> String {
        let reply = self.login(username, password).await;
        assert_eq!(reply.status, StatusCode::OK, "login: {:?}", reply.body);
        reply.body["access_token"]
            .as_str()
            .expect("access token")
            .to_owned()
    }

    /// Create a user with a chosen password and return their token.
    pub async fn member(&self, admin_token: &str, username: &str) -> String {
        let password = format!("{username}-password");
        let reply = self
            .send(
                authorised(TestRequest::post().uri("/admin/users"), admin_token).set_json(json!({
                    "username": username,
                    "password": password,
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "create user: {:?}", reply.body);
        self.token_for(username, &password).await
    }

    /// Create a log list and return its id.
    pub async fn log_list(&self, token: &str, name: &str) -> String {
        let reply = self
            .send(
                authorised(TestRequest::post().uri("/log-lists/"), token)
                    .set_json(json!({ "name": name })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "create list: {:?}", reply.body);
        reply.body["id"].as_str().expect("list id").to_owned()
    }

    pub async fn record_call(&self, token: &str, list_id: &str, call_type: &str) -> Reply {
        self.send(
            authorised(TestRequest::post().uri("/calls/"), token)
                .set_json(json!({ "log_list_id": list_id, "call_type": call_type })),
        )
        .await
    }
}

/// Attach a bearer token.
pub fn authorised(request: TestRequest, token: &str) -> TestRequest {
    request.insert_header(("Authorization", format!("Bearer {token}")))
}
