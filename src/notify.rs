use serde::Serialize;
use tokio::runtime::Handle;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Fire-and-forget admin messages through the Telegram `sendMessage` endpoint.
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    target: Option<(String, String)>,
    base_url: String,
}

impl Notifier {
    pub fn new(client: reqwest::Client, token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            client,
            target: token.zip(chat_id),
            base_url: TELEGRAM_API.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Spawns the send and returns whether it was dispatched; failures are only logged.
    ///
    /// Outside a tokio runtime the message is dropped.
    pub fn notify(&self, text: impl Into<String>) -> bool {
        let Some((token, chat_id)) = self.target.clone() else {
            tracing::debug!("Notifier disabled, dropping message");
            return false;
        };
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("No async runtime, dropping admin notification");
            return false;
        };
        let client = self.client.clone();
        let url = format!("{}/bot{}/sendMessage", self.base_url, token);
        let text = text.into();

        handle.spawn(async move {
            let result = client
                .post(&url)
                .json(&SendMessage {
                    chat_id: &chat_id,
                    text: &text,
                })
                .send()
                .await
                .and_then(|response| response.error_for_status());
            if let Err(e) = result {
                tracing::warn!("Failed to send admin notification: {}", e);
            }
        });
        true
    }
}
