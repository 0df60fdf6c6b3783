pub mod console_observer;
pub mod schema;

pub use console_observer::{render_view, ConsoleObserver};
pub use schema::{wire_schemas, write_schemas};
