pub mod config;
pub mod error;
pub mod types;

pub use config::HarvesterBotConfig;
pub use error::{BotError, Result};
