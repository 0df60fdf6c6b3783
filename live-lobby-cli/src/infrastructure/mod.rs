pub mod error;
pub mod observability;

pub use error::{CliError, Result};
pub use observability::{LogConfig, LogGuard};
