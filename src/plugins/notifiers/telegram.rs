use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{TELEGRAM_CHAT_ID_ENV, TELEGRAM_TOKEN_ENV, TelegramConfig};
use crate::plugins::traits::{NotificationMessage, NotificationResult, NotifierPlugin};
use crate::utils::error::AppError;

#[derive(Clone, PartialEq, Eq)]
pub struct TelegramCredentials {
    pub bot_token: String,
    pub chat_id: i64,
}

impl std::fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramCredentials {
    pub fn from_config(config: &TelegramConfig) -> Result<Self, AppError> {
        let bot_token = config
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::MissingCredentials(format!("{} not set", TELEGRAM_TOKEN_ENV))
            })?;

        let chat_id = config
            .chat_id
            .as_deref()
            .map(str::trim)
            .filter(|chat_id| !chat_id.is_empty())
            .ok_or_else(|| {
                AppError::MissingCredentials(format!("{} not set", TELEGRAM_CHAT_ID_ENV))
            })?;

        // Bot tokens look like "<bot id>:<secret>"
        if !bot_token.contains(':') || bot_token.contains(char::is_whitespace) {
            return Err(AppError::InvalidCredentials(format!(
                "{} is not a bot token",
                TELEGRAM_TOKEN_ENV
            )));
        }

        let chat_id = chat_id.parse::<i64>().map_err(|e| {
            AppError::InvalidCredentials(format!("error parsing {}: {}", TELEGRAM_CHAT_ID_ENV, e))
        })?;

        Ok(Self {
            bot_token: bot_token.to_string(),
            chat_id,
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    pub is_bot: bool,
    pub username: Option<String>,
}

pub struct TelegramNotifier {
    client: Client,
    api_base_url: String,
    credentials: TelegramCredentials,
}

impl TelegramNotifier {
    pub fn new(credentials: TelegramCredentials, api_base_url: &str) -> Self {
        TelegramNotifier {
            client: Client::new(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn from_config(config: &TelegramConfig) -> Result<Self, AppError> {
        let credentials = TelegramCredentials::from_config(config)?;
        Ok(Self::new(credentials, &config.api_base_url))
    }

    pub fn chat_id(&self) -> i64 {
        self.credentials.chat_id
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.credentials.bot_token, method)
    }

    /// Send a Bot API request and unwrap its `{ok, result}` envelope.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        // The request URL embeds the token, so it is stripped from every error
        let response = request.send().await.map_err(|e| AppError::Http(e.without_url()))?;
        let status = response.status();

        let body: ApiResponse<T> = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(AppError::Notification(format!(
                    "Telegram API returned HTTP {}",
                    status.as_u16()
                )));
            }
            Err(e) => return Err(AppError::Http(e.without_url())),
        };

        if !body.ok {
            return Err(AppError::Notification(format!(
                "Telegram API error {}: {}",
                body.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                body.description.unwrap_or_else(|| "no description".to_string())
            )));
        }

        body.result.ok_or_else(|| {
            AppError::Notification("Telegram API response had no result".to_string())
        })
    }

    pub async fn get_me(&self) -> Result<BotUser, AppError> {
        self.call(self.client.get(self.method_url("getMe"))).await
    }
}

#[async_trait]
impl NotifierPlugin for TelegramNotifier {
    fn name(&self) -> &str {
        "Telegram Notifier"
    }

    fn plugin_type(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, message: &NotificationMessage) -> Result<NotificationResult, AppError> {
        let payload = SendMessageRequest {
            chat_id: self.credentials.chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.as_api_str(),
            disable_web_page_preview: message.disable_link_preview,
        };

        let sent: SentMessage = self
            .call(self.client.post(self.method_url("sendMessage")).json(&payload))
            .await?;

        Ok(NotificationResult {
            success: true,
            message_id: Some(format!("telegram-{}", sent.message_id)),
            error: None,
        })
    }

    async fn test_connection(&self) -> Result<bool, AppError> {
        let bot = self.get_me().await?;
        tracing::debug!(
            "Telegram bot {} ({}) authorized",
            bot.username.as_deref().unwrap_or("<unnamed>"),
            bot.id
        );
        Ok(bot.is_bot)
    }
}
