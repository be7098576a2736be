// Notifier plugin implementations
pub mod format;
pub mod telegram;

pub use telegram::{TelegramCredentials, TelegramNotifier};
