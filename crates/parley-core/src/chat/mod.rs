//! Chat persistence abstractions and the chat orchestrator.

pub mod repository;
pub mod service;
pub mod title;
pub mod validation;

pub use repository::ChatRepository;
pub use service::ChatService;
