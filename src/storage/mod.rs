mod db;
mod feeds;
mod types;

pub use db::{Database, Driver};
pub use types::{DatabaseError, FeedRecord};
