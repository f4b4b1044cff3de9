use thiserror::Error;

use crate::repository::errors::FetchError;

/// Errors surfaced by list services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Filter input rejected; shown next to the offending control.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Form error: {0}")]
    Form(String),

    #[error("Type constraint violation: {0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
