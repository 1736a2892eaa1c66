//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod auth;
pub mod calls;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod log_lists;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every domain endpoint along with the body and query rejection
/// handlers. Health probes and API docs are mounted
/// separately by the server.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use callboard::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_rejection))
        .app_data(web::QueryConfig::default().error_handler(error::query_rejection))
        .service(auth::issue_token)
        .service(auth::logout)
        .service(auth::init_admin)
        .service(users::current_user)
        .service(users::change_password)
        .service(admin::list_users)
        .service(admin::create_user)
        .service(admin::update_user)
        .service(admin::deactivate_user)
        .service(admin::activate_user)
        .service(admin::delete_user)
        .service(admin::user_details)
        .service(admin::reset_password)
        .service(admin::overview)
        .service(log_lists::create_log_list)
        .service(log_lists::list_log_lists)
        .service(log_lists::get_log_list)
        .service(log_lists::delete_log_list)
        .service(calls::record_call)
        .service(calls::delete_call)
        .service(dashboard::dashboard_page)
        .service(dashboard::dashboard);
}
