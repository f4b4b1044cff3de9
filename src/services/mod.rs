pub mod coordinator;
pub mod errors;
pub mod users;

pub use errors::{ServiceError, ServiceResult};
