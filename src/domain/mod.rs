//! Domain values shared by list views and the coordinator.

pub mod accumulated;
pub mod filter;
pub mod page;
pub mod sort;
pub mod types;
pub mod user;
