//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;

use crate::domain::ports::{
    AccountCommand, AdminBootstrap, CallLogCommand, CallLogRepository, LogListCommand,
    LogListQuery, LogListRepository, LoginService, PasswordHasher, SessionResolver, StatsQuery,
    TokenService, UserAdministration, UserRepository,
};
use crate::domain::{AccountService, LogBookService, ReportingService, SessionService};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Credential exchange.
    pub login: Arc<dyn LoginService>,
    /// Token to identity resolution.
    pub sessions: Arc<dyn SessionResolver>,
    /// First-administrator bootstrap.
    pub bootstrap: Arc<dyn AdminBootstrap>,
    /// Self-service account changes.
    pub account: Arc<dyn AccountCommand>,
    /// Administrator account management.
    pub users: Arc<dyn UserAdministration>,
    /// Log list commands.
    pub log_lists: Arc<dyn LogListCommand>,
    /// Log list reads.
    pub log_lists_query: Arc<dyn LogListQuery>,
    /// Call record commands.
    pub calls: Arc<dyn CallLogCommand>,
    /// Transfer-rate views.
    pub stats: Arc<dyn StatsQuery>,
}

/// Driven adapters the domain services are assembled from.
pub struct DrivenPorts<U, L, C, H, T> {
    /// User store.
    pub users: Arc<U>,
    /// Log list store.
    pub lists: Arc<L>,
    /// Call record store.
    pub calls: Arc<C>,
    /// Password hashing.
    pub hasher: Arc<H>,
    /// Token signing and verification.
    pub tokens: Arc<T>,
    /// Time source for timestamps and token issue.
    pub clock: Arc<dyn Clock>,
    /// Lifetime of issued tokens.
    pub token_ttl: TimeDelta,
}

impl HttpStatePorts {
    /// Assemble the domain services over a set of driven adapters.
    ///
    /// One [`AccountService`] backs the login, session-adjacent, and user
    /// administration ports; [`LogBookService`] backs the commands and
    /// [`ReportingService`] the queries.
    pub fn from_driven<U, L, C, H, T>(driven: DrivenPorts<U, L, C, H, T>) -> Self
    where
        U: UserRepository + 'static,
        L: LogListRepository + 'static,
        C: CallLogRepository + 'static,
        H: PasswordHasher + 'static,
        T: TokenService + 'static,
    {
        let DrivenPorts {
            users,
            lists,
            calls,
            hasher,
            tokens,
            clock,
            token_ttl,
        } = driven;
        let accounts = Arc::new(
            AccountService::new(users.clone(), hasher, tokens.clone(), clock.clone())
                .with_token_ttl(token_ttl),
        );
        let sessions = Arc::new(SessionService::new(users.clone(), tokens));
        let log_book = Arc::new(LogBookService::new(lists.clone(), calls.clone(), clock));
        let reporting = Arc::new(ReportingService::new(users, lists, calls));
        Self {
            login: accounts.clone(),
            sessions,
            bootstrap: accounts.clone(),
            account: accounts.clone(),
            users: accounts,
            log_lists: log_book.clone(),
            log_lists_query: reporting.clone(),
            calls: log_book,
            stats: reporting,
        }
    }
}

/// Cookie policy applied to the `access_token` cookie issued at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Whether the cookie carries the `Secure` attribute.
    pub secure: bool,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self { secure: true }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential exchange.
    pub login: Arc<dyn LoginService>,
    /// Token to identity resolution.
    pub sessions: Arc<dyn SessionResolver>,
    /// First-administrator bootstrap.
    pub bootstrap: Arc<dyn AdminBootstrap>,
    /// Self-service account changes.
    pub account: Arc<dyn AccountCommand>,
    /// Administrator account management.
    pub users: Arc<dyn UserAdministration>,
    /// Log list commands.
    pub log_lists: Arc<dyn LogListCommand>,
    /// Log list reads.
    pub log_lists_query: Arc<dyn LogListQuery>,
    /// Call record commands.
    pub calls: Arc<dyn CallLogCommand>,
    /// Transfer-rate views.
    pub stats: Arc<dyn StatsQuery>,
    /// Session cookie attributes.
    pub cookies: CookiePolicy,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with the default cookie policy.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use actix_web::web;
    /// use callboard::inbound::http::state::{HttpState, HttpStatePorts};
    /// # fn ports() -> HttpStatePorts { unimplemented!() }
    ///
    /// let state = HttpState::new(ports());
    /// let _data = web::Data::new(state);
    /// ```
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            sessions,
            bootstrap,
            account,
            users,
            log_lists,
            log_lists_query,
            calls,
            stats,
        } = ports;
        Self {
            login,
            sessions,
            bootstrap,
            account,
            users,
            log_lists,
            log_lists_query,
            calls,
            stats,
            cookies: CookiePolicy::default(),
        }
    }

    /// Override the cookie policy, typically from application settings.
    #[must_use]
    pub fn with_cookie_policy(mut self, cookies: CookiePolicy) -> Self {
        self.cookies = cookies;
        self
    }
}
