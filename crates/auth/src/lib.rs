//! Account Authentication
//!
//! - Argon2id password hashing and verification
//! - HS256 bearer tokens carrying the account identity

mod password;
mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

use thiserror::Error;

/// Authentication error types
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token signing key is not configured")]
    MissingSecret,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}
