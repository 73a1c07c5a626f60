pub mod config;
pub mod error;
pub mod handlers;
pub mod item_log;
pub mod middleware;
pub mod request_counter;
pub mod server;

pub use config::Config;
pub use error::{LoggerError, Result};
pub use handlers::{AppState, SharedState};
pub use item_log::{ItemLog, LogItem, Page};
pub use request_counter::{RequestCount, RequestCounter};
pub use server::create_app;
