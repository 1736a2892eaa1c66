//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::{App, web};

use crate::domain::access::Identity;
use crate::domain::ports::{
    MockAccountCommand, MockAdminBootstrap, MockCallLogCommand, MockLogListCommand,
    MockLogListQuery, MockLoginService, MockSessionResolver, MockStatsQuery,
    MockUserAdministration,
};
use crate::domain::{Error, Role};

use super::state::{CookiePolicy, HttpState, HttpStatePorts};

/// Token accepted by [`MockPorts::signed_in`].
pub const TEST_TOKEN: &str = "test-token";

/// One mock per driving port. Unconfigured mocks panic when called.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub sessions: MockSessionResolver,
    pub bootstrap: MockAdminBootstrap,
    pub account: MockAccountCommand,
    pub users: MockUserAdministration,
    pub log_lists: MockLogListCommand,
    pub log_lists_query: MockLogListQuery,
    pub calls: MockCallLogCommand,
    pub stats: MockStatsQuery,
}

impl MockPorts {
    /// Resolve [`TEST_TOKEN`] to `identity` and reject anything else.
    pub fn signed_in(mut self, identity: Identity) -> Self {
        self.sessions.expect_resolve().returning(move |token| {
            if token == TEST_TOKEN {
                Ok(identity.clone())
            } else {
                Err(Error::unauthorized("invalid or expired session"))
            }
        });
        self
    }

    /// Wrap the mocks into shared handler state with insecure cookies.
    pub fn into_state(self) -> web::Data<HttpState> {
        let state = HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            sessions: Arc::new(self.sessions),
            bootstrap: Arc::new(self.bootstrap),
            account: Arc::new(self.account),
            users: Arc::new(self.users),
            log_lists: Arc::new(self.log_lists),
            log_lists_query: Arc::new(self.log_lists_query),
            calls: Arc::new(self.calls),
            stats: Arc::new(self.stats),
        })
        .with_cookie_policy(CookiePolicy { secure: false });
        web::Data::new(state)
    }
}

/// Identity for a fresh account with the given role.
pub fn identity(name: &str, role: Role) -> Identity {
    crate::domain::test_fixtures::identity(name, role)
}

/// `Authorization` header value carrying [`TEST_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}

/// An [`App`] with the mocks installed as state.
pub fn app_with(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(ports.into_state())
}
