//! Telegram Bot API transport: long polling in, `sendMessage` out.

use super::commands::{Dispatcher, Incoming};
use crate::config::BotConfig;
use crate::store::UserProfile;
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Pause after a failed poll before trying again.
const POLL_BACKOFF: Duration = Duration::from_secs(5);

/// Bot API rejection (`ok: false`), with the HTTP status it came with.
#[derive(Debug, thiserror::Error)]
#[error("telegram {method} ({status}): {description}")]
pub struct ApiError {
    pub method: String,
    pub status: StatusCode,
    pub description: String,
}

/// Telegram answers 400 when it cannot parse the Markdown entities.
fn is_bad_request(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(|e| e.status == StatusCode::BAD_REQUEST)
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<Sender>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Update {
    /// Text messages with a sender; everything else is ignored.
    pub fn into_incoming(self) -> Option<Incoming> {
        let message = self.message?;
        let from = message.from?;
        let text = message.text?;
        Some(Incoming {
            chat_id: message.chat.id,
            user: UserProfile {
                platform_id: from.id,
                username: from.username,
                first_name: from.first_name,
                last_name: from.last_name,
            },
            text,
        })
    }
}

pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout_s: u64,
}

impl TelegramClient {
    pub fn new(token: &str, config: &BotConfig) -> Result<Self> {
        // The HTTP timeout must outlast the long-poll window.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_s + 10))
            .build()
            .context("failed to build telegram HTTP client")?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_base.trim_end_matches('/'), token),
            poll_timeout_s: config.poll_timeout_s,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let resp = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("telegram {method} request failed"))?;

        let status = resp.status();
        let parsed: ApiResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("failed to parse telegram {method} response ({status})"))?;

        if !parsed.ok {
            return Err(ApiError {
                method: method.to_string(),
                status,
                description: parsed.description.unwrap_or_default(),
            }
            .into());
        }
        parsed
            .result
            .with_context(|| format!("telegram {method} returned no result"))
    }

    pub async fn get_updates(&self, offset: Option<i64>, timeout_s: u64) -> Result<Vec<Update>> {
        let mut body = json!({ "timeout": timeout_s, "allowed_updates": ["message"] });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", body).await
    }

    /// Acknowledge everything queued while the bot was down. Returns the
    /// offset to poll from next.
    pub async fn drop_pending(&self) -> Result<Option<i64>> {
        let last = self.get_updates(Some(-1), 0).await?;
        Ok(last.last().map(|u| u.update_id + 1))
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = json!({ "chat_id": chat_id, "text": text, "parse_mode": "Markdown" });
        match self.call::<serde_json::Value>("sendMessage", body).await {
            Ok(_) => Ok(()),
            // Names with stray `_` or `*` break Markdown; send unformatted instead.
            Err(e) if is_bad_request(&e) => {
                debug!(chat_id, error = %e, "markdown rejected, resending as plain text");
                let body = json!({ "chat_id": chat_id, "text": text });
                self.call::<serde_json::Value>("sendMessage", body).await.map(|_| ())
            }
            Err(e) => Err(e),
        }
    }
}

/// Poll until `shutdown` flips to `true`. Updates are handled one at a time.
pub async fn run(client: &TelegramClient, dispatcher: &Dispatcher, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let mut offset = match client.drop_pending().await {
        Ok(next) => next,
        Err(e) => {
            warn!(error = %e, "could not drop pending updates");
            None
        }
    };
    info!("polling for updates");

    loop {
        let updates = tokio::select! {
            res = client.get_updates(offset, client.poll_timeout_s) => res,
            _ = shutdown.changed() => {
                info!("shutdown requested");
                return Ok(());
            }
        };

        let updates = match updates {
            Ok(u) => u,
            Err(e) => {
                error!(error = %e, "getUpdates failed");
                tokio::time::sleep(POLL_BACKOFF).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let Some(incoming) = update.into_incoming() else {
                continue;
            };
            let Some(reply) = dispatcher.handle(&incoming).await else {
                continue;
            };
            if let Err(e) = client.send_message(incoming.chat_id, &reply).await {
                error!(chat_id = incoming.chat_id, error = %e, "sendMessage failed");
            }
        }

        if *shutdown.borrow() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_to_incoming() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 1,
                    "chat": { "id": -99, "type": "group" },
                    "from": { "id": 42, "is_bot": false, "first_name": "Ada", "username": "ada" },
                    "text": "/predict Inter Milan"
                }
            }"#,
        )
        .unwrap();
        let incoming = update.into_incoming().unwrap();
        assert_eq!(incoming.chat_id, -99);
        assert_eq!(incoming.user.platform_id, 42);
        assert_eq!(incoming.user.first_name.as_deref(), Some("Ada"));
        assert_eq!(incoming.user.last_name, None);
        assert_eq!(incoming.text, "/predict Inter Milan");
    }

    #[test]
    fn test_non_text_updates_ignored() {
        let update: Update = serde_json::from_str(
            r#"{ "update_id": 11, "message": { "chat": { "id": 1 }, "from": { "id": 2 } } }"#,
        )
        .unwrap();
        assert!(update.into_incoming().is_none());

        let update: Update = serde_json::from_str(r#"{ "update_id": 12, "edited_message": {} }"#).unwrap();
        assert!(update.into_incoming().is_none());
    }

    fn rejection(status: StatusCode, description: &str) -> anyhow::Error {
        ApiError {
            method: "sendMessage".into(),
            status,
            description: description.into(),
        }
        .into()
    }

    #[test]
    fn test_markdown_fallback_only_on_bad_request() {
        assert!(is_bad_request(&rejection(
            StatusCode::BAD_REQUEST,
            "Bad Request: can't parse entities"
        )));
        // "400" in the text alone is not a bad request.
        assert!(!is_bad_request(&rejection(StatusCode::FORBIDDEN, "blocked after 400 messages")));
        assert!(!is_bad_request(&anyhow::anyhow!("telegram sendMessage (400 Bad Request)")));
        assert!(!is_bad_request(&rejection(StatusCode::TOO_MANY_REQUESTS, "retry after 400")));

        // Context added on the way up does not hide the status.
        let wrapped = rejection(StatusCode::BAD_REQUEST, "bad").context("sending reply");
        assert!(is_bad_request(&wrapped));
    }

    #[test]
    fn test_error_response_shape() {
        let resp: ApiResponse<Vec<Update>> =
            serde_json::from_str(r#"{ "ok": false, "error_code": 401, "description": "Unauthorized" }"#).unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.description.as_deref(), Some("Unauthorized"));
    }
}
