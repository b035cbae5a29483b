//! Persistence gateway: schema, models and the [`Store`] operations

pub mod catalog;
pub mod comments;
pub mod deadline;
pub mod init;
pub mod likes;
pub mod models;
pub mod notifications;
pub mod resources;
pub mod store;
pub mod users;

pub use deadline::{bounded, QueryCost};
pub use init::*;
pub use models::*;
pub use store::Store;
pub use users::USER_SEARCH_LIMIT;
