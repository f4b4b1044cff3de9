//! DTO modules that bridge services with HTTP responses.

pub mod list;
