//! # relwatch Database
//!
//! SQLite persistence of service status. Writes arrive through the persist
//! sink and are applied by [`StatusDatabase::run`], the sink's only consumer.

mod database;
mod error;
mod schema;

pub use database::StatusDatabase;
pub use error::PersistenceError;
pub use schema::init_schema;
