//! Tests for credential extraction and the session extractors.

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{HttpResponse, web};
use rstest::rstest;

use super::*;
use crate::domain::Role;
use crate::domain::error::detail;
use crate::inbound::http::test_utils::{MockPorts, TEST_TOKEN, app_with, bearer, identity};

async fn whoami(session: ApiSession) -> HttpResponse {
    HttpResponse::Ok().body(session.identity().user().username().to_string())
}

async fn page(session: PageSession) -> HttpResponse {
    HttpResponse::Ok().body(session.identity().user().username().to_string())
}

#[rstest]
#[case::header_wins(Some("Bearer from-header"), Some("Bearer from-cookie"), Some(("authorization_header", "from-header")))]
#[case::cookie_fallback(None, Some("Bearer from-cookie"), Some(("access_token_cookie", "from-cookie")))]
#[case::lowercase_scheme(Some("bearer lower"), None, Some(("authorization_header", "lower")))]
#[case::cookie_without_prefix(None, Some("from-cookie"), None)]
#[case::basic_scheme(Some("Basic dXNlcjpwYXNz"), None, None)]
#[case::empty_bearer(Some("Bearer "), None, None)]
#[case::nothing(None, None, None)]
fn api_sources_are_tried_in_order(
    #[case] header: Option<&str>,
    #[case] cookie: Option<&str>,
    #[case] expected: Option<(&str, &str)>,
) {
    let mut req = TestRequest::default();
    if let Some(value) = header {
        req = req.insert_header(("Authorization", value));
    }
    if let Some(value) = cookie {
        req = req.cookie(Cookie::new(ACCESS_TOKEN_COOKIE, value.to_owned()));
    }

    let credential = extract_credential(&req.to_http_request(), API_SOURCES);

    assert_eq!(
        credential
            .as_ref()
            .map(|found| (found.source, found.token.as_str())),
        expected
    );
}

#[rstest]
fn page_sources_ignore_the_header() {
    let req = TestRequest::default()
        .insert_header(("Authorization", "Bearer from-header"))
        .to_http_request();

    assert!(extract_credential(&req, PAGE_SOURCES).is_none());
}

#[actix_web::test]
async fn api_session_resolves_bearer_token() {
    let ports = MockPorts::default().signed_in(identity("ada", Role::User));
    let app = test::init_service(app_with(ports).route("/me", web::get().to(whoami))).await;

    let res = test::call_service(
        &app,
        TestRequest::get().uri("/me").insert_header(bearer()).to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(test::read_body(res).await, "ada");
}

#[actix_web::test]
async fn api_session_without_token_is_unauthorised_with_challenge() {
    let app =
        test::init_service(app_with(MockPorts::default()).route("/me", web::get().to(whoami)))
            .await;

    let res = test::call_service(&app, TestRequest::get().uri("/me").to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok()),
        Some("Bearer")
    );
}

#[actix_web::test]
async fn api_session_surfaces_inactive_account() {
    let mut ports = MockPorts::default();
    ports.sessions.expect_resolve().returning(|_| {
        Err(Error::unauthorized("account is inactive").with_detail_code(detail::INACTIVE_ACCOUNT))
    });
    let app = test::init_service(app_with(ports).route("/me", web::get().to(whoami))).await;

    let res = test::call_service(
        &app,
        TestRequest::get().uri("/me").insert_header(bearer()).to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Error = test::read_body_json(res).await;
    assert_eq!(body.detail_code(), Some(detail::INACTIVE_ACCOUNT));
}

#[actix_web::test]
async fn page_session_reads_cookie() {
    let ports = MockPorts::default().signed_in(identity("ada", Role::User));
    let app = test::init_service(app_with(ports).route("/", web::get().to(page))).await;

    let res = test::call_service(
        &app,
        TestRequest::get()
            .uri("/")
            .cookie(access_token_cookie(TEST_TOKEN, 60, false))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[case::no_cookie(None)]
#[case::rejected_token(Some("stale-token"))]
#[actix_web::test]
async fn page_session_redirects_to_login(#[case] token: Option<&str>) {
    let ports = MockPorts::default().signed_in(identity("ada", Role::User));
    let app = test::init_service(app_with(ports).route("/", web::get().to(page))).await;

    let mut req = TestRequest::get().uri("/");
    if let Some(token) = token {
        req = req.cookie(access_token_cookie(token, 60, false));
    }
    let res = test::call_service(&app, req.to_request()).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(LOGIN_PATH)
    );
}

#[actix_web::test]
async fn page_session_passes_store_outages_through() {
    let mut ports = MockPorts::default();
    ports
        .sessions
        .expect_resolve()
        .returning(|_| Err(Error::service_unavailable("database unavailable")));
    let app = test::init_service(app_with(ports).route("/", web::get().to(page))).await;

    let res = test::call_service(
        &app,
        TestRequest::get()
            .uri("/")
            .cookie(access_token_cookie(TEST_TOKEN, 60, false))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[rstest]
fn issued_cookie_is_http_only_bearer() {
    let cookie = access_token_cookie("abc", 1800, true);

    assert_eq!(cookie.value(), "Bearer abc");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.max_age(), Some(Duration::seconds(1800)));
}

#[rstest]
fn cleared_cookie_expires_immediately() {
    let cookie = cleared_access_token_cookie(false);

    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}
