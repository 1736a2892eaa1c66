//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, tokens) are implemented by outbound
//! adapters. Driving ports are implemented by domain services and consumed by
//! the HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod admin_bootstrap;
mod call_log_command;
mod call_log_repository;
mod log_list_command;
mod log_list_query;
mod log_list_repository;
mod login_service;
mod password_hasher;
mod session_resolver;
mod stats_query;
mod token_service;
mod user_administration;
mod user_repository;

pub use account_command::AccountCommand;
#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use admin_bootstrap::{AdminBootstrap, BootstrapAdminRequest};
#[cfg(test)]
pub use admin_bootstrap::MockAdminBootstrap;
pub use call_log_command::CallLogCommand;
#[cfg(test)]
pub use call_log_command::MockCallLogCommand;
#[cfg(test)]
pub use call_log_repository::MockCallLogRepository;
pub use call_log_repository::{CallLogRepository, CallLogRepositoryError};
pub use log_list_command::LogListCommand;
#[cfg(test)]
pub use log_list_command::MockLogListCommand;
pub use log_list_query::LogListQuery;
#[cfg(test)]
pub use log_list_query::MockLogListQuery;
#[cfg(test)]
pub use log_list_repository::MockLogListRepository;
pub use log_list_repository::{
    DeletionScope, LogListDeletion, LogListRepository, LogListRepositoryError,
};
pub use login_service::{LoginService, SessionGrant};
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use session_resolver::MockSessionResolver;
pub use session_resolver::SessionResolver;
#[cfg(test)]
pub use stats_query::MockStatsQuery;
pub use stats_query::{Dashboard, Overview, StatsQuery, UserDetails};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::{CreateUserRequest, CreatedUser, PasswordReset, UserAdministration};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    NewUser, UserDeletion, UserPage, UserPersistenceError, UserRecord, UserRepository, UserUpdate,
};
