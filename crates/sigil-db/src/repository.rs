//! SurrealDB repository implementation.

mod user;

pub use user::SurrealUserRepository;
