pub mod dashboard;
pub mod env;
pub mod log;

pub use dashboard::DashboardConfig;
