//! Shared domain types for Parley.
//!
//! This crate contains the domain types used across the Parley chat backend:
//! users and caller identity, sessions, chats, LLM request shapes, server
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, secrecy, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod user;
