pub mod client;
pub mod models;

#[cfg(test)]
pub(crate) mod fixtures;

pub use client::{ApiClient, DashboardApi, KILL_SECRET_HEADER};
pub use models::*;
