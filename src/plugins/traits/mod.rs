pub mod extractor;
pub mod notifier;

pub use extractor::SiteExtractor;
pub use notifier::{NotifierPlugin, NotificationMessage, NotificationResult, ParseMode};
