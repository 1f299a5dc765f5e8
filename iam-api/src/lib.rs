pub mod error;

pub mod users;
pub mod groups;
pub mod policies;
pub mod sessions;

pub use error::{ApiError, ApiErrorKind, Detail};

/// request payload validation. checked by the handlers before any
/// storage work happens
pub trait Validator {
    fn validate(&self) -> Result<(), error::ApiError>;

    fn has_work(&self) -> bool {
        true
    }
}
