use std::sync::Arc;

use teloxide::prelude::*;

use koro_core::domain::{ChatId, UserId};

use crate::router::AppState;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let handle = user.username.as_deref();
    let chat = ChatId(msg.chat.id.0);

    if let Err(err) = state.dispatcher.on_text(user_id, handle, chat, text).await {
        tracing::warn!(user = user_id.0, error = %err, "text handling failed");
    }
    Ok(())
}
