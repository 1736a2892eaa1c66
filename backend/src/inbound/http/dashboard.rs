//! Dashboard views.
//!
//! `GET /` is the browser entry point: it reads the session cookie only and
//! redirects to `/login` when there is no usable session. `GET /dashboard`
//! serves the same view to API clients.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::access::Identity;
use crate::domain::ports::Dashboard;
use crate::domain::{Error, LogListId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{ApiSession, PageSession};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{LOG_LIST_ID, parse_id};

/// Optional list selection for member dashboards.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// List whose calls are shown. Defaults to the first owned list.
    pub log_list_id: Option<String>,
}

impl DashboardQuery {
    fn selected(&self) -> Result<Option<LogListId>, Error> {
        self.log_list_id
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_id(raw, LOG_LIST_ID))
            .transpose()
    }
}

async fn render(
    state: &HttpState,
    identity: &Identity,
    query: &DashboardQuery,
) -> ApiResult<web::Json<Dashboard>> {
    let selected = query.selected()?;
    let view = state.stats.dashboard(identity, selected).await?;
    Ok(web::Json(view))
}

/// HTML landing page; anonymous visitors are sent to the login page.
#[utoipa::path(
    get,
    path = "/",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Member or administrator view", body = Dashboard),
        (status = 302, description = "No session; redirect to /login"),
        (status = 403, description = "Password change pending or list not accessible", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboardPage",
    security(("cookieAuth" = []))
)]
#[get("/")]
pub async fn dashboard_page(
    state: web::Data<HttpState>,
    session: PageSession,
    query: web::Query<DashboardQuery>,
) -> ApiResult<web::Json<Dashboard>> {
    render(&state, session.identity(), &query).await
}

/// Role-shaped landing data as JSON.
#[utoipa::path(
    get,
    path = "/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Member or administrator view", body = Dashboard),
        (status = 401, description = "No session", body = Error),
        (status = 403, description = "Password change pending or list not accessible", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: ApiSession,
    query: web::Query<DashboardQuery>,
) -> ApiResult<web::Json<Dashboard>> {
    render(&state, session.identity(), &query).await
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
