//! Gmail REST API client.
//!
//! Each call is one HTTP request run on the blocking pool; errors come back
//! as [`RemoteError`] so the caller decides about retries.

mod parts;
mod types;

pub use parts::{attachments_of, decode_body_data, AttachmentMeta};
pub use types::{AttachmentBody, Header, Message, MessagePage, MessagePart, MessageRef, PartBody};

use url::Url;

use crate::collect::MailSource;
use crate::config::GmailConfig;
use crate::http;
use crate::retry::RemoteError;

#[derive(Debug, Clone)]
pub struct GmailClient {
    api_base: String,
    user_id: String,
    access_token: String,
}

impl GmailClient {
    pub fn new(
        api_base: impl Into<String>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_config(cfg: &GmailConfig, access_token: impl Into<String>) -> Self {
        Self::new(cfg.api_base.clone(), cfg.user_id.clone(), access_token)
    }

    /// `<api_base>/users/<user>/messages/<segments...>?<query>`, with every
    /// segment percent-encoded.
    fn messages_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<String, RemoteError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| RemoteError::other(format!("invalid api_base {:?}: {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::other(format!("api_base {:?} cannot be a base", self.api_base)))?
            .pop_if_empty()
            .extend(["users", self.user_id.as_str(), "messages"])
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.into())
    }

    /// One page of message ids matching a Gmail search query.
    pub async fn list_messages(
        &self,
        query: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<MessagePage, RemoteError> {
        let max_results = page_size.to_string();
        let mut params = vec![("q", query), ("maxResults", max_results.as_str())];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        let url = self.messages_url(&[], &params)?;
        tracing::debug!(%url, "list messages");
        http::get_json(url, Some(self.access_token.clone())).await
    }

    /// Full message, including the MIME part tree.
    pub async fn get_message(&self, id: &str) -> Result<Message, RemoteError> {
        let url = self.messages_url(&[id], &[("format", "full")])?;
        http::get_json(url, Some(self.access_token.clone())).await
    }

    /// Raw attachment bytes.
    pub async fn get_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        let url = self.messages_url(&[message_id, "attachments", attachment_id], &[])?;
        let body: AttachmentBody = http::get_json(url, Some(self.access_token.clone())).await?;
        decode_body_data(&body.data)
            .map_err(|e| RemoteError::other(format!("attachment data is not base64url: {e}")))
    }
}

impl MailSource for GmailClient {
    async fn list_messages(
        &self,
        query: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<MessagePage, RemoteError> {
        GmailClient::list_messages(self, query, page_token, page_size).await
    }

    async fn get_message(&self, id: &str) -> Result<Message, RemoteError> {
        GmailClient::get_message(self, id).await
    }

    async fn get_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        GmailClient::get_attachment(self, message_id, attachment_id).await
    }
}
