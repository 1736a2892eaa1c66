//! Callboard backend library.
//!
//! Hexagonal layout: `domain` holds entities, access rules, and services;
//! `inbound::http` adapts them to Actix handlers; `outbound` implements the
//! driven ports over PostgreSQL and the credential primitives.

#![cfg_attr(not(test), deny(missing_docs))]

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
