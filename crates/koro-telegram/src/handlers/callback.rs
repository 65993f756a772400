use std::sync::Arc;

use teloxide::prelude::*;

use koro_core::domain::{ChatId, MessageId, MessageRef, UserId};

use crate::router::AppState;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();

    // Without an attached message there is nowhere to reply; acknowledge
    // the press so the client stops its spinner.
    let Some(message) = q.message.as_ref() else {
        let _ = bot.answer_callback_query(cb_id).await;
        return Ok(());
    };
    if data.is_empty() {
        let _ = bot.answer_callback_query(cb_id).await;
        return Ok(());
    }

    let user_id = UserId(q.from.id.0 as i64);
    let handle = q.from.username.as_deref();
    let chat = ChatId(message.chat.id.0);
    let pressed = Some(MessageRef {
        chat_id: chat,
        message_id: MessageId(message.id.0),
    });

    let _guard = state.chat_locks.lock_chat(message.chat.id.0).await;

    if let Err(err) = state
        .dispatcher
        .on_callback(user_id, handle, chat, &cb_id, &data, pressed)
        .await
    {
        tracing::warn!(user = user_id.0, data = %data, error = %err, "callback handling failed");
    }
    Ok(())
}
