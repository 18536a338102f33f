pub mod app_error;

pub use app_error::{DashboardError, DashboardResult};
