//! SQLite persistence for wedding-plan profiles.

mod connection;
mod migrations;
pub mod profile;

pub use connection::Storage;
pub use migrations::{run_migrations, SCHEMA_VERSION};
