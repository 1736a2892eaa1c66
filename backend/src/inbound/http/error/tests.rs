//! Response shaping for domain errors.

use super::*;
use crate::domain::error::detail;
use actix_web::body::to_bytes;
use actix_web::test::{self, TestRequest};
use actix_web::{App, post, web};
use rstest::rstest;
use serde::Deserialize;
use serde_json::{Value, json};

const TRACE: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

async fn envelope_of(response: HttpResponse) -> Error {
    let bytes = to_bytes(response.into_body())
        .await
        .expect("error body is readable");
    serde_json::from_slice(&bytes).expect("error body is an envelope")
}

#[rstest]
#[case::validation(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case::last_list(Error::integrity_violation("last list"), StatusCode::BAD_REQUEST)]
#[case::no_session(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case::foreign_list(Error::forbidden("not yours"), StatusCode::FORBIDDEN)]
#[case::missing(Error::not_found("gone"), StatusCode::NOT_FOUND)]
#[case::race(Error::conflict("retry"), StatusCode::CONFLICT)]
#[case::pool(Error::service_unavailable("pool"), StatusCode::SERVICE_UNAVAILABLE)]
#[case::bug(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn each_code_has_one_status(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(error.status_code(), status);
}

#[actix_web::test]
async fn internal_errors_keep_only_code_and_trace() {
    let leaky = Error::internal("duplicate key value violates \"users_username_key\"")
        .with_trace_id(TRACE)
        .with_details(json!({ "sql": "INSERT INTO users" }));

    let response = leaky.error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers().get(TRACE_ID_HEADER).and_then(|v| v.to_str().ok()),
        Some(TRACE)
    );

    let body = envelope_of(response).await;
    assert_eq!(body.code(), ErrorCode::InternalError);
    assert_eq!(body.message(), REDACTED_MESSAGE);
    assert_eq!(body.trace_id(), Some(TRACE));
    assert!(body.details().is_none());
}

#[actix_web::test]
async fn refusals_keep_their_detail_code() {
    let refusal = Error::integrity_violation("cannot delete the last log list")
        .with_detail_code(detail::LAST_LOG_LIST);

    let response = refusal.error_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(TRACE_ID_HEADER).is_none());

    let body = envelope_of(response).await;
    assert_eq!(body.code(), ErrorCode::IntegrityViolation);
    assert_eq!(body.detail_code(), Some(detail::LAST_LOG_LIST));
}

#[rstest]
#[case::unauthorised(Error::unauthorized("login required"), true)]
#[case::forbidden(Error::forbidden("denied"), false)]
#[case::invalid(Error::invalid_request("bad"), false)]
fn only_unauthorised_responses_challenge(#[case] error: Error, #[case] challenged: bool) {
    let response = error.error_response();
    let challenge = response.headers().get(header::WWW_AUTHENTICATE);

    assert_eq!(challenge.is_some(), challenged);
    if let Some(value) = challenge {
        assert_eq!(value, BEARER_CHALLENGE);
    }
}

#[derive(Deserialize)]
struct Probe {
    name: String,
}

#[post("/probe")]
async fn probe(body: web::Json<Probe>) -> HttpResponse {
    HttpResponse::Ok().body(body.into_inner().name)
}

#[actix_web::test]
async fn malformed_json_uses_the_envelope() {
    let app = test::init_service(
        App::new()
            .app_data(web::JsonConfig::default().error_handler(json_rejection))
            .service(probe),
    )
    .await;

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/probe")
            .insert_header(header::ContentType::json())
            .set_payload("{\"name\":")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "malformed_body");
}
