//! Messaging-channel API client.
//!
//! Thin wrapper over the gateway's REST surface: resolve a channel name to
//! its id once at startup, then post text messages and base64-encoded
//! images to it. Authentication is a bearer token; every call is
//! fire-and-forget from the pipeline's point of view.

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{SinkError, SinkResult};

/// Production gateway base URL.
pub const DEFAULT_API_BASE: &str = "https://gate.whapi.cloud";

/// Opaque channel id, resolved once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
struct NewsletterList {
    newsletters: Vec<Newsletter>,
}

#[derive(Debug, Deserialize)]
struct Newsletter {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    typing_time: u32,
    to: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct ImageMessage<'a> {
    to: &'a str,
    media: String,
}

/// Client for the messaging-channel gateway.
pub struct ChannelClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ChannelClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Resolve a channel name to its id.
    ///
    /// [`SinkError::ChannelNotFound`] when the gateway knows no channel by
    /// that name; the binary treats that as a fatal startup condition.
    pub async fn resolve_channel(&self, name: &str) -> SinkResult<ChannelId> {
        let response = self
            .http
            .get(format!("{}/newsletters", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check_status(response).await?;
        let list: NewsletterList = response.json().await?;

        list.newsletters
            .into_iter()
            .find(|n| n.name == name)
            .map(|n| ChannelId(n.id))
            .ok_or_else(|| SinkError::ChannelNotFound(name.to_string()))
    }

    /// Post one text message to the channel.
    pub async fn send_text(&self, to: &ChannelId, body: &str) -> SinkResult<()> {
        let response = self
            .http
            .post(format!("{}/messages/text", self.base_url))
            .bearer_auth(&self.token)
            .json(&TextMessage {
                typing_time: 0,
                to: to.as_str(),
                body,
            })
            .send()
            .await?;
        check_status(response).await?;
        debug!(to = %to, chars = body.chars().count(), "text message sent");
        Ok(())
    }

    /// Post one image to the channel as a base64 data-URI.
    pub async fn send_image(
        &self,
        to: &ChannelId,
        file_name: &str,
        mime: &str,
        bytes: &[u8],
    ) -> SinkResult<()> {
        let media = format!(
            "data:{};name={};base64,{}",
            mime,
            file_name,
            BASE64.encode(bytes)
        );
        let response = self
            .http
            .post(format!("{}/messages/image", self.base_url))
            .bearer_auth(&self.token)
            .json(&ImageMessage {
                to: to.as_str(),
                media,
            })
            .send()
            .await?;
        check_status(response).await?;
        debug!(to = %to, file_name, mime, "image sent");
        Ok(())
    }
}

/// Pick the MIME type for an image path from its extension,
/// case-insensitive, defaulting to PNG.
pub fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

async fn check_status(response: reqwest::Response) -> SinkResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(SinkError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
