//! Behaviour tests for log list ownership and integrity rules.
//!
//! Each step drives the in-process application; the world keeps tokens and
//! ids by the names the feature file uses.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// Each suite uses a different subset of the harness.
#[allow(dead_code)]
#[path = "support/app.rs"]
mod app;

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

use actix_web::test::TestRequest;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use app::{Reply, TestApp, authorised};

struct OwnershipWorld {
    app: TestApp,
    admin: RefCell<Option<String>>,
    tokens: RefCell<HashMap<String, String>>,
    lists: RefCell<HashMap<String, String>>,
    last: RefCell<Option<Reply>>,
}

impl OwnershipWorld {
    fn new() -> Self {
        Self {
            app: TestApp::new(),
            admin: RefCell::new(None),
            tokens: RefCell::new(HashMap::new()),
            lists: RefCell::new(HashMap::new()),
            last: RefCell::new(None),
        }
    }

    fn admin_token(&self) -> String {
        self.admin.borrow().clone().expect("administrator signed in")
    }

    fn token(&self, user: &str) -> String {
        self.tokens
            .borrow()
            .get(user)
            .cloned()
            .unwrap_or_else(|| panic!("{user} is not signed in"))
    }

    fn list(&self, name: &str) -> String {
        self.lists
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no list named {name}"))
    }

    fn record(&self, reply: Reply) {
        *self.last.borrow_mut() = Some(reply);
    }

    fn last(&self) -> Reply {
        self.last.borrow().clone().expect("a request was sent")
    }
}

fn run<F: Future>(future: F) -> F::Output {
    actix_rt::System::new().block_on(future)
}

#[fixture]
fn world() -> OwnershipWorld {
    OwnershipWorld::new()
}

#[given("an administrator and a member named \"{user}\"")]
fn an_administrator_and_a_member(world: &OwnershipWorld, user: String) {
    let admin = run(world.app.bootstrap_admin());
    *world.admin.borrow_mut() = Some(admin);
    a_member_named(world, user);
}

#[given("a member named \"{user}\"")]
fn a_member_named(world: &OwnershipWorld, user: String) {
    let token = run(world.app.member(&world.admin_token(), &user));
    world.tokens.borrow_mut().insert(user, token);
}

#[given("\"{user}\" owns a log list named \"{name}\"")]
fn user_owns_a_log_list(world: &OwnershipWorld, user: String, name: String) {
    let id = run(world.app.log_list(&world.token(&user), &name));
    world.lists.borrow_mut().insert(name, id);
}

#[given("\"{user}\" logged a \"{call_type}\" call in \"{name}\"")]
fn user_logged_a_call(world: &OwnershipWorld, user: String, call_type: String, name: String) {
    let reply = run(
        world
            .app
            .record_call(&world.token(&user), &world.list(&name), &call_type),
    );
    assert_eq!(reply.status.as_u16(), 201, "record call: {:?}", reply.body);
}

#[when("\"{user}\" logs calls of types {types} in \"{name}\"")]
fn user_logs_calls(world: &OwnershipWorld, user: String, types: String, name: String) {
    for call_type in types.split(',').map(str::trim) {
        user_logged_a_call(world, user.clone(), call_type.to_owned(), name.clone());
    }
}

#[when("\"{user}\" requests the log list \"{name}\"")]
fn user_requests_the_log_list(world: &OwnershipWorld, user: String, name: String) {
    let uri = format!("/log-lists/{}", world.list(&name));
    let reply = run(
        world
            .app
            .send(authorised(TestRequest::get().uri(&uri), &world.token(&user))),
    );
    world.record(reply);
}

#[when("\"{user}\" deletes the log list \"{name}\"")]
fn user_deletes_the_log_list(world: &OwnershipWorld, user: String, name: String) {
    let uri = format!("/log-lists/{}", world.list(&name));
    let reply = run(
        world
            .app
            .send(authorised(TestRequest::delete().uri(&uri), &world.token(&user))),
    );
    world.record(reply);
}

#[when("the administrator deletes \"{user}\"")]
fn the_administrator_deletes(world: &OwnershipWorld, user: String) {
    let reply = run(async {
        let me = world
            .app
            .send(authorised(
                TestRequest::get().uri("/users/me"),
                &world.token(&user),
            ))
            .await;
        let id = me.body["id"].as_str().expect("user id").to_owned();
        world
            .app
            .send(authorised(
                TestRequest::delete().uri(&format!("/admin/users/{id}")),
                &world.admin_token(),
            ))
            .await
    });
    world.record(reply);
}

#[then("the transfer rate of \"{name}\" for \"{user}\" is {rate}")]
fn the_transfer_rate_is(world: &OwnershipWorld, name: String, user: String, rate: f64) {
    user_requests_the_log_list(world, user, name);
    let reply = world.last();
    assert_eq!(reply.status.as_u16(), 200);
    assert_eq!(reply.body["transfer_rate"].as_f64(), Some(rate));
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &OwnershipWorld, status: u16) {
    let reply = world.last();
    assert_eq!(reply.status.as_u16(), status, "body: {:?}", reply.body);
}

#[then("the error detail code is \"{code}\"")]
fn the_error_detail_code_is(world: &OwnershipWorld, code: String) {
    assert_eq!(world.last().detail_code(), Some(code.as_str()));
}

#[scenario(
    path = "tests/features/ownership.feature",
    name = "Transfer rate over mixed call types"
)]
fn transfer_rate_over_mixed_call_types(world: OwnershipWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ownership.feature",
    name = "Another member's list is off limits"
)]
fn another_members_list_is_off_limits(world: OwnershipWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ownership.feature",
    name = "The last list cannot be deleted"
)]
fn the_last_list_cannot_be_deleted(world: OwnershipWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ownership.feature",
    name = "Deleting a user with an empty list"
)]
fn deleting_a_user_with_an_empty_list(world: OwnershipWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/ownership.feature",
    name = "Deleting a user blocked by call records"
)]
fn deleting_a_user_blocked_by_call_records(world: OwnershipWorld) {
    drop(world);
}
