//! OAuth identity provider clients.

pub mod google;

pub use google::GoogleOAuthClient;
