//! Tests for the administrator handlers.

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::error::detail;
use crate::domain::metrics::{CallStats, UserStats};
use crate::domain::test_fixtures;
use crate::domain::ErrorCode;
use crate::inbound::http::test_utils::{MockPorts, app_with, bearer, identity};

fn admin_ports() -> MockPorts {
    MockPorts::default().signed_in(identity("root", Role::Admin))
}

fn empty_stats() -> CallStats {
    CallStats {
        total_calls: 0,
        potential_calls: 0,
        transfer_rate: 0.0,
    }
}

#[rstest]
#[case::defaults("/admin/users", 0, 100)]
#[case::explicit("/admin/users?skip=20&limit=10", 20, 10)]
#[case::clamped("/admin/users?limit=9000", 0, 500)]
#[actix_web::test]
async fn list_users_applies_paging(#[case] uri: &str, #[case] skip: u32, #[case] limit: u32) {
    let mut ports = admin_ports();
    ports
        .users
        .expect_list_users()
        .withf(move |_, page| page.skip == skip && page.limit == limit)
        .times(1)
        .returning(|_, _| Ok(vec![test_fixtures::user("bob", Role::User)]));
    let app = test::init_service(app_with(ports).service(list_users)).await;

    let res = test::call_service(
        &app,
        TestRequest::get().uri(uri).insert_header(bearer()).to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body[0]["username"], "bob");
}

#[actix_web::test]
async fn list_users_surfaces_role_rejection() {
    let mut ports = MockPorts::default().signed_in(identity("ada", Role::User));
    ports
        .users
        .expect_list_users()
        .returning(|_, _| Err(Error::forbidden("administrator role required")));
    let app = test::init_service(app_with(ports).service(list_users)).await;

    let res = test::call_service(
        &app,
        TestRequest::get()
            .uri("/admin/users")
            .insert_header(bearer())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn create_user_returns_generated_password_once() {
    let mut ports = admin_ports();
    ports
        .users
        .expect_create_user()
        .withf(|_, request| {
            request.username.to_string() == "bob"
                && request.display_name.to_string() == "bob"
                && request.role == Role::User
                && request.password.is_none()
        })
        .times(1)
        .returning(|_, request| {
            Ok(CreatedUser {
                user: test_fixtures::user(&request.username.to_string(), request.role)
                    .with_must_change_password(true),
                temporary_password: Some(Secret::new("Tmp-123456")),
            })
        });
    let app = test::init_service(app_with(ports).service(create_user)).await;

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/admin/users")
            .insert_header(bearer())
            .set_json(json!({ "username": "bob" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["username"], "bob");
    assert_eq!(body["user"]["must_change_password"], true);
    assert_eq!(body["temporary_password"], "Tmp-123456");
}

#[actix_web::test]
async fn create_user_with_chosen_password_hides_secret() {
    let mut ports = admin_ports();
    ports
        .users
        .expect_create_user()
        .withf(|_, request| {
            request.role == Role::Admin
                && request
                    .password
                    .as_ref()
                    .is_some_and(|secret| secret.expose() == "chosen-secret")
        })
        .returning(|_, request| {
            Ok(CreatedUser {
                user: test_fixtures::user(&request.username.to_string(), request.role),
                temporary_password: None,
            })
        });
    let app = test::init_service(app_with(ports).service(create_user)).await;

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/admin/users")
            .insert_header(bearer())
            .set_json(json!({
                "username": "carol",
                "display_name": "Carol",
                "role": "admin",
                "password": "chosen-secret",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert!(body.get("temporary_password").is_none());
}

#[rstest]
#[case::unknown_role(json!({ "username": "bob", "role": "OWNER" }), "role")]
#[case::bad_username(json!({ "username": "b" }), "username")]
#[case::empty_password(json!({ "username": "bob", "password": "" }), "password")]
#[actix_web::test]
async fn create_user_rejects_malformed_input(#[case] body: Value, #[case] field: &str) {
    let app = test::init_service(app_with(admin_ports()).service(create_user)).await;

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/admin/users")
            .insert_header(bearer())
            .set_json(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn duplicate_username_is_a_validation_error() {
    let mut ports = admin_ports();
    ports.users.expect_create_user().returning(|_, _| {
        Err(Error::invalid_request("username is already taken")
            .with_detail_code(detail::DUPLICATE_USERNAME))
    });
    let app = test::init_service(app_with(ports).service(create_user)).await;

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri("/admin/users")
            .insert_header(bearer())
            .set_json(json!({ "username": "bob" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Error = test::read_body_json(res).await;
    assert_eq!(body.detail_code(), Some(detail::DUPLICATE_USERNAME));
}

#[actix_web::test]
async fn update_user_forwards_partial_changes() {
    let target = test_fixtures::user("bob", Role::User);
    let target_id = *target.id();
    let mut ports = admin_ports();
    ports
        .users
        .expect_update_user()
        .withf(move |_, id, update| {
            *id == target_id
                && update
                    .display_name
                    .as_ref()
                    .is_some_and(|name| name.to_string() == "Robert")
                && update.role.is_none()
                && update.is_active.is_none()
        })
        .times(1)
        .returning(move |_, _, _| Ok(target.clone()));
    let app = test::init_service(app_with(ports).service(update_user)).await;

    let res = test::call_service(
        &app,
        TestRequest::put()
            .uri(&format!("/admin/users/{target_id}"))
            .insert_header(bearer())
            .set_json(json!({ "display_name": "Robert" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn malformed_user_id_is_rejected() {
    let app = test::init_service(app_with(admin_ports()).service(delete_user)).await;

    let res = test::call_service(
        &app,
        TestRequest::delete()
            .uri("/admin/users/not-a-uuid")
            .insert_header(bearer())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[rstest]
#[case::deactivate("deactivate", false)]
#[case::activate("activate", true)]
#[actix_web::test]
async fn activation_endpoints_toggle_the_flag(#[case] action: &str, #[case] active: bool) {
    let target = test_fixtures::user("bob", Role::User).with_active(active);
    let target_id = *target.id();
    let mut ports = admin_ports();
    ports
        .users
        .expect_set_active()
        .withf(move |_, id, flag| *id == target_id && *flag == active)
        .times(1)
        .returning(move |_, _, _| Ok(target.clone()));
    let app = test::init_service(
        app_with(ports)
            .service(deactivate_user)
            .service(activate_user),
    )
    .await;

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri(&format!("/admin/users/{target_id}/{action}"))
            .insert_header(bearer())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["is_active"], active);
}

#[rstest]
#[case::ok(None, StatusCode::NO_CONTENT)]
#[case::has_calls(Some(detail::USER_HAS_CALL_LOGS), StatusCode::BAD_REQUEST)]
#[case::self_deletion(Some(detail::SELF_DELETION), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn delete_user_maps_outcomes(
    #[case] refusal: Option<&'static str>,
    #[case] expected: StatusCode,
) {
    let mut ports = admin_ports();
    ports.users.expect_delete_user().returning(move |_, _| match refusal {
        None => Ok(()),
        Some(code) => Err(Error::integrity_violation("refused").with_detail_code(code)),
    });
    let app = test::init_service(app_with(ports).service(delete_user)).await;

    let res = test::call_service(
        &app,
        TestRequest::delete()
            .uri(&format!("/admin/users/{}", UserId::random()))
            .insert_header(bearer())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
    if let Some(code) = refusal {
        let body: Error = test::read_body_json(res).await;
        assert_eq!(body.code(), ErrorCode::IntegrityViolation);
        assert_eq!(body.detail_code(), Some(code));
    }
}

#[actix_web::test]
async fn reset_password_returns_temporary_secret() {
    let mut ports = admin_ports();
    ports.users.expect_reset_password().returning(|_, _| {
        Ok(PasswordReset {
            user: test_fixtures::user("bob", Role::User).with_must_change_password(true),
            temporary_password: Secret::new("Reset-98765"),
        })
    });
    let app = test::init_service(app_with(ports).service(reset_password)).await;

    let res = test::call_service(
        &app,
        TestRequest::post()
            .uri(&format!("/admin/users/{}/reset-password", UserId::random()))
            .insert_header(bearer())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["temporary_password"], "Reset-98765");
    assert_eq!(body["user"]["must_change_password"], true);
}

#[actix_web::test]
async fn user_details_and_overview_are_serialised() {
    let mut ports = admin_ports();
    ports.stats.expect_user_details().returning(|_, _| {
        Ok(UserDetails {
            user: test_fixtures::user("bob", Role::User),
            stats: UserStats {
                stats: empty_stats(),
                log_lists_count: 1,
            },
            log_lists: Vec::new(),
        })
    });
    ports.stats.expect_overview().returning(|_| {
        Ok(Overview {
            totals: empty_stats(),
            log_lists: Vec::new(),
        })
    });
    let app = test::init_service(
        app_with(ports).service(user_details).service(overview),
    )
    .await;

    let details = test::call_service(
        &app,
        TestRequest::get()
            .uri(&format!("/admin/users/{}/details", UserId::random()))
            .insert_header(bearer())
            .to_request(),
    )
    .await;
    assert_eq!(details.status(), StatusCode::OK);
    let body: Value = test::read_body_json(details).await;
    assert_eq!(body["stats"]["log_lists_count"], 1);
    assert_eq!(body["stats"]["transfer_rate"], 0.0);

    let totals = test::call_service(
        &app,
        TestRequest::get()
            .uri("/admin/overview")
            .insert_header(bearer())
            .to_request(),
    )
    .await;
    assert_eq!(totals.status(), StatusCode::OK);
    let body: Value = test::read_body_json(totals).await;
    assert_eq!(body["totals"]["total_calls"], 0);
}
