//! HTTP API layer for Parley.
//!
//! Axum router with the request pipeline (panic containment, CORS, rate
//! limiting, authentication), identity extractors, and the
//! `{"error": ...}` envelope.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
