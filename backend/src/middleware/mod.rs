/// API key authentication middleware
pub mod auth;
