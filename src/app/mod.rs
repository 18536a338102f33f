pub mod bootstrap;
pub mod cli;
pub mod input;
pub mod shutdown;

pub use bootstrap::{app_init, run};
pub use cli::{Cli, Command};
