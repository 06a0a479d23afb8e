//! Infrastructure layer for Parley.
//!
//! Contains implementations of the port traits defined in `parley-core`:
//! SQLite storage for users and conversations, Redis (or in-process) expiring
//! key-value storage for sessions, HTTP clients for the LLM providers and
//! Google OAuth, and the configuration loader.

pub mod config;
pub mod kv;
pub mod llm;
pub mod oauth;
pub mod sqlite;
