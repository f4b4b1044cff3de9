//! Error conversion glue between the domain and service layers.
//!
//! The domain layer must not depend on service error types, so the
//! conversions live here.

use crate::domain::filter::FilterError;
use crate::domain::types::TypeConstraintError;
use crate::query_state::MalformedQuery;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<FilterError> for ServiceError {
    fn from(val: FilterError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<MalformedQuery> for ServiceError {
    fn from(val: MalformedQuery) -> Self {
        ServiceError::Form(val.to_string())
    }
}
