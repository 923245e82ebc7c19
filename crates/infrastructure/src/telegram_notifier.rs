use std::time::Duration;

use async_trait::async_trait;
use kube_ns_gc_application::Notifier;
use kube_ns_gc_core::{AppError, AppResult};
use serde::Serialize;

/// Public Telegram Bot API endpoint.
pub const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Telegram Bot API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    /// Base URL of the Bot API, without trailing slash.
    pub api_base_url: String,
    /// Bot token issued by BotFather.
    pub bot_token: String,
    /// Destination chat.
    pub chat_id: String,
    /// Message parse mode, omitted from requests when empty.
    pub parse_mode: String,
}

impl TelegramConfig {
    /// Creates settings for the public Bot API.
    #[must_use]
    pub fn new(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        parse_mode: impl Into<String>,
    ) -> Self {
        Self {
            api_base_url: TELEGRAM_API_BASE_URL.to_owned(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            parse_mode: parse_mode.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    parse_mode: &'a str,
}

/// Notifier that posts messages to a Telegram chat.
pub struct TelegramNotifier {
    http_client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    /// Creates a notifier with its own HTTP client.
    pub fn new(config: TelegramConfig) -> AppResult<Self> {
        if config.bot_token.trim().is_empty() || config.chat_id.trim().is_empty() {
            return Err(AppError::Validation(
                "telegram notifier requires a bot token and a chat id".to_owned(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.bot_token
        )
    }

    fn request_body<'a>(&'a self, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id: self.config.chat_id.as_str(),
            text,
            parse_mode: self.config.parse_mode.as_str(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.send_message_url())
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|error| {
                // reqwest errors embed the request URL, which carries the bot token.
                AppError::External(format!("telegram request failed: {}", error.without_url()))
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        Err(AppError::Internal(format!(
            "telegram API returned status {status}: {body}"
        )))
    }
}
