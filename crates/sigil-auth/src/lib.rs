//! Sigil Auth: password verification, paired JWT issuance and
//! validation, and session lifecycle orchestration.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{LoginInput, LoginOutput, RegisterInput, RotateOutput, SessionService};
pub use token::TokenClaims;
