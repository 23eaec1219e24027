//! Sigil Core: domain models, error taxonomy, and the repository
//! trait shared by the storage and authentication layers.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{SigilError, SigilResult};
pub use repository::UserRepository;
