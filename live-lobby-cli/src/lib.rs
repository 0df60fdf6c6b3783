pub mod application;
pub mod infrastructure;

pub use application::{render_view, wire_schemas, write_schemas, ConsoleObserver};
pub use infrastructure::{CliError, LogConfig, LogGuard, Result};
