//! Sigil Database: SurrealDB connection management, schema
//! migrations, and the [`UserRepository`] implementation.
//!
//! [`UserRepository`]: sigil_core::repository::UserRepository

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, connect};
pub use error::DbError;
pub use repository::SurrealUserRepository;
pub use schema::run_migrations;
