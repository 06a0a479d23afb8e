//! Business logic and port trait definitions for Parley.
//!
//! This crate defines the "ports" (repository and store traits) that the
//! infrastructure layer implements, plus the services built on them:
//! sessions, login, rate limiting, provider resolution and the chat
//! orchestrator. It depends only on `parley-types` -- never on
//! `parley-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod ratelimit;
pub mod session;
pub mod storage;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;
