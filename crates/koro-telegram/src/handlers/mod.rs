//! Telegram update handlers.
//!
//! Each handler maps a raw update to a dispatcher entry point under the
//! chat's lock, so one chat never has two events in flight at once.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod commands;
mod text;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(raw) = msg.text() else {
        // Non-text updates (photos, stickers) are outside the bot's surface.
        return Ok(());
    };

    let chat_id = msg.chat.id.0;
    let _guard = state.chat_locks.lock_chat(chat_id).await;

    if raw.starts_with('/') {
        return commands::handle_command(msg, state).await;
    }
    text::handle_text(msg, state).await
}
