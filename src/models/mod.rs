//! Configuration models shared across the service.

pub mod config;
