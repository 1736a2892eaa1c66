//! Session extraction for HTTP handlers.
//!
//! A raw token is looked up in an ordered list of named credential sources
//! and resolved to an [`Identity`] through the [`SessionResolver`] port.
//! Handlers take [`ApiSession`] (header or cookie, `401` on failure) or
//! [`PageSession`] (cookie only, `302` to `/login` on failure) and never see
//! which channel the token arrived on.
//!
//! [`SessionResolver`]: crate::domain::ports::SessionResolver

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::access::Identity;
use crate::domain::{Error, ErrorCode};

use super::state::HttpState;

/// Name of the cookie carrying `Bearer <token>` for browser sessions.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Where page-mode requests without a session are sent.
pub const LOGIN_PATH: &str = "/login";

const BEARER_PREFIX: &str = "Bearer ";

/// A named channel that may carry a raw session token.
#[derive(Clone, Copy)]
pub struct CredentialSource {
    name: &'static str,
    extract: fn(&HttpRequest) -> Option<String>,
}

impl CredentialSource {
    /// Label used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Pull a non-empty token from `req`, if this source carries one.
    #[must_use]
    pub fn extract(&self, req: &HttpRequest) -> Option<String> {
        (self.extract)(req).filter(|token| !token.is_empty())
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSource")
            .field("name", &self.name)
            .finish()
    }
}

fn from_authorization_header(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case(BEARER_PREFIX.trim_end())
        .then(|| token.trim().to_owned())
}

fn from_access_token_cookie(req: &HttpRequest) -> Option<String> {
    let cookie = req.cookie(ACCESS_TOKEN_COOKIE)?;
    cookie
        .value()
        .strip_prefix(BEARER_PREFIX)
        .map(ToOwned::to_owned)
}

/// `Authorization: Bearer <token>`.
pub const AUTHORIZATION_HEADER: CredentialSource = CredentialSource {
    name: "authorization_header",
    extract: from_authorization_header,
};

/// `access_token` cookie holding `Bearer <token>`; any other prefix is ignored.
pub const ACCESS_TOKEN_COOKIE_SOURCE: CredentialSource = CredentialSource {
    name: "access_token_cookie",
    extract: from_access_token_cookie,
};

/// Sources consulted by API endpoints, in priority order.
pub const API_SOURCES: &[CredentialSource] = &[AUTHORIZATION_HEADER, ACCESS_TOKEN_COOKIE_SOURCE];
/// Sources consulted by page endpoints.
pub const PAGE_SOURCES: &[CredentialSource] = &[ACCESS_TOKEN_COOKIE_SOURCE];

/// A raw token together with the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Name of the source that produced the token.
    pub source: &'static str,
    /// Raw token text.
    pub token: String,
}

/// Return the first token yielded by `sources`.
///
/// # Examples
/// ```
/// use actix_web::test::TestRequest;
/// use callboard::inbound::http::session::{API_SOURCES, extract_credential};
///
/// let req = TestRequest::default()
///     .insert_header(("Authorization", "Bearer abc"))
///     .to_http_request();
/// let credential = extract_credential(&req, API_SOURCES).expect("token");
/// assert_eq!(credential.source, "authorization_header");
/// assert_eq!(credential.token, "abc");
/// ```
#[must_use]
pub fn extract_credential(req: &HttpRequest, sources: &[CredentialSource]) -> Option<Credential> {
    sources.iter().find_map(|source| {
        source.extract(req).map(|token| Credential {
            source: source.name(),
            token,
        })
    })
}

async fn resolve(
    state: Option<web::Data<HttpState>>,
    credential: Option<Credential>,
) -> Result<Identity, Error> {
    let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let Some(credential) = credential else {
        return Err(Error::unauthorized("login required"));
    };
    debug!(source = credential.source, "resolving session token");
    state.sessions.resolve(&credential.token).await
}

/// Identity resolved from the header or cookie. Rejects with `401`.
#[derive(Debug, Clone)]
pub struct ApiSession(pub Identity);

impl ApiSession {
    /// The resolved caller.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl FromRequest for ApiSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let credential = extract_credential(req, API_SOURCES);
        Box::pin(async move {
            resolve(state, credential)
                .await
                .map(ApiSession)
                .map_err(actix_web::Error::from)
        })
    }
}

/// Rejection for page requests without a usable session.
#[derive(Debug, thiserror::Error)]
#[error("login required")]
pub struct LoginRedirect;

impl ResponseError for LoginRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, LOGIN_PATH))
            .finish()
    }
}

/// Identity resolved from the cookie only. Redirects to `/login` when the
/// session is missing or rejected.
#[derive(Debug, Clone)]
pub struct PageSession(pub Identity);

impl PageSession {
    /// The resolved caller.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl FromRequest for PageSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let credential = extract_credential(req, PAGE_SOURCES);
        Box::pin(async move {
            match resolve(state, credential).await {
                Ok(identity) => Ok(PageSession(identity)),
                Err(error) if error.code() == ErrorCode::Unauthorized => {
                    Err(actix_web::Error::from(LoginRedirect))
                }
                Err(error) => Err(actix_web::Error::from(error)),
            }
        })
    }
}

/// Cookie carrying a freshly issued token.
#[must_use]
pub fn access_token_cookie(token: &str, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, format!("{BEARER_PREFIX}{token}"))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

/// Cookie instructing the browser to forget the session.
#[must_use]
pub fn cleared_access_token_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
