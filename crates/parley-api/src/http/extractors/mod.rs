//! Request extractors: caller identity guards and JSON bodies.

pub mod identity;
pub mod json;

pub use identity::{AuthenticatedUser, CurrentIdentity, RequireAnonymous};
pub use json::AppJson;
