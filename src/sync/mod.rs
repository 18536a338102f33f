pub mod state;
pub mod synchronizer;

pub use state::{DashboardState, FetchedBundle};
pub use synchronizer::{fetch_all, DashboardSynchronizer};
