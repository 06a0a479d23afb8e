//! Users, the external identity provider, and the login/account flows.

pub mod identity;
pub mod repository;
pub mod service;

pub use identity::IdentityProvider;
pub use repository::UserRepository;
pub use service::UserService;
