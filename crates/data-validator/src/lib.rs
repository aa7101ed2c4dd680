//! Request Validation
//!
//! Provides required-field, range and format checks for ServiLog requests, and
//! the monotonic mileage timeline rules.

mod error;
mod timeline;
mod validator;

pub use error::ValidationError;
pub use timeline::{check_reading, Reading};
pub use validator::{required, ValidationConfig, Validator};
