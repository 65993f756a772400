use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{InlineKeyboard, MenuKeyboard, MessagingCapabilities},
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the shape is designed so another
/// chat transport can fit behind the same interface with capability flags.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Send a value rendered monospace (tap-to-copy on Telegram).
    async fn send_code(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()>;
    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    /// Send a monospace value with attached buttons (number listings).
    async fn send_code_with_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    /// Send text and replace the user's persistent menu keyboard.
    async fn send_menu(&self, chat_id: ChatId, text: &str, menu: MenuKeyboard)
        -> Result<MessageRef>;

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()>;
}
