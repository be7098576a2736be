pub mod config;
pub mod models;
pub mod plugins;
pub mod scheduler;
pub mod scraper;
pub mod stock_state;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use scheduler::StockMonitor;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
