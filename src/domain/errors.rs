//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// A required positional argument was not supplied.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// The amount argument could not be coerced into a finite number.
    #[error("invalid amount '{0}': expected a number")]
    InvalidAmount(String),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Chat gateway error: {0}")]
    Chat(String),
}
