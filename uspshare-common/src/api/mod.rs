//! Shared HTTP API functionality
//!
//! Contains only pure functions and database operations; the service crate
//! wraps them with framework-specific middleware.

pub mod auth;

pub use auth::{hash_password, load_or_init_secret, verify_password, Claims, TokenKeys};
