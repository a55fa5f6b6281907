//! Where messages come from.

use crate::gmail::{Message, MessagePage};
use crate::retry::RemoteError;

/// The three remote operations the collector needs. Implemented by
/// [`GmailClient`](crate::gmail::GmailClient); tests use in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait MailSource {
    async fn list_messages(
        &self,
        query: &str,
        page_token: Option<&str>,
        page_size: u32,
    ) -> Result<MessagePage, RemoteError>;

    async fn get_message(&self, id: &str) -> Result<Message, RemoteError>;

    async fn get_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<Vec<u8>, RemoteError>;
}
