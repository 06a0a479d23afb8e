//! The request pipeline, outermost first:
//! panic containment, CORS, rate limiting, authentication.
//!
//! Layer order is fixed in [`crate::http::router::build_router`].

pub mod auth;
pub mod cors;
pub mod panic;
pub mod rate_limit;
