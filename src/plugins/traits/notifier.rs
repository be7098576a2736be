use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

/// Chat formatting dialect the message text was written for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    MarkdownV2,
    Html,
}

impl ParseMode {
    /// Name expected by the Bot API `parse_mode` field.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ParseMode::MarkdownV2 => "MarkdownV2",
            ParseMode::Html => "HTML",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Fully formatted text; user data inside it is already escaped.
    pub text: String,
    pub parse_mode: ParseMode,
    pub disable_link_preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

/// Trait for implementing notification channels
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    /// Plugin metadata
    fn name(&self) -> &str;
    fn plugin_type(&self) -> &str;

    /// Core functionality
    async fn notify(&self, message: &NotificationMessage) -> Result<NotificationResult, AppError>;
    async fn test_connection(&self) -> Result<bool, AppError>;
}
