//! # USPShare Common Library
//!
//! Core of the resource-sharing backend, shared with the HTTP service:
//! - Persistence gateway ([`db::Store`]) over SQLite
//! - Comment tree assembly
//! - Notification dispatch
//! - Aggregated read model and badge evaluation
//! - Credential primitives and configuration loading

pub mod api;
pub mod badges;
pub mod comment_tree;
pub mod config;
pub mod db;
pub mod error;
pub mod notify;
pub mod read_model;
pub mod time;

pub use error::{Error, Result};
