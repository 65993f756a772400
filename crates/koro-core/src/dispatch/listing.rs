//! Number-listing & refresh flow.
//!
//! Renders a batch of candidate numbers with per-item Buy buttons and a
//! trailing refresh prompt. Only one live batch exists per user: tracked
//! prompt handles from the previous batch are swapped out under the store
//! lock and then deleted best-effort before anything new is sent.

use crate::{
    callback::CallbackAction,
    dispatch::Dispatcher,
    domain::{AreaCode, ChatId, MessageRef, PhoneNumber, UserId},
    messaging::types::InlineKeyboard,
    Result,
};

pub(crate) async fn render_batch(
    d: &Dispatcher,
    user: UserId,
    chat: ChatId,
    area: &AreaCode,
    candidates: &[PhoneNumber],
) -> Result<()> {
    retire_previous(d, user).await;

    let loading = d.messenger().send_text(chat, "📱").await?;

    for number in candidates.iter().take(d.cfg.search_limit) {
        let keyboard = InlineKeyboard::single("💳 Buy", &CallbackAction::Buy(number.clone()));
        d.messenger()
            .send_code_with_keyboard(chat, &number.0, keyboard)
            .await?;
        if !d.cfg.listing_send_spacing.is_zero() {
            tokio::time::sleep(d.cfg.listing_send_spacing).await;
        }
    }

    let _ = d.messenger().delete_message(loading).await;

    let refresh = d
        .messenger()
        .send_inline_keyboard(
            chat,
            "🔄 Need more numbers?",
            InlineKeyboard::single("🔄 Refresh", &CallbackAction::Refresh(area.clone())),
        )
        .await?;
    d.refresh.track(user, refresh).await;

    tracing::info!(
        user = user.0,
        area = %area,
        count = candidates.len().min(d.cfg.search_limit),
        "rendered number batch"
    );
    Ok(())
}

/// A press on `refresh_<area>`: re-fetch and replace the whole batch.
pub(crate) async fn handle_refresh(
    d: &Dispatcher,
    user: UserId,
    chat: ChatId,
    area: AreaCode,
    pressed: Option<MessageRef>,
) -> Result<()> {
    let Some(session) = d.sessions.get(user).await else {
        d.messenger().send_text(chat, "❌ Please login first!").await?;
        return Ok(());
    };

    if let Some(msg) = pressed {
        let _ = d.messenger().edit_text(msg, "🔄 Getting new numbers...").await;
    }

    let found = match session
        .account
        .search_local(&area, &d.cfg.default_country)
        .await
    {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(user = user.0, area = %area, error = %err, "refresh search failed");
            if let Some(msg) = pressed {
                let _ = d
                    .messenger()
                    .edit_text(msg, "❌ Number search failed. Try again in a moment.")
                    .await;
            }
            return no_numbers_prompt(d, user, chat, &area).await;
        }
    };

    if found.is_empty() {
        if let Some(msg) = pressed {
            let _ = d
                .messenger()
                .edit_text(
                    msg,
                    &format!("❌ No new numbers found for area code {area}."),
                )
                .await;
        }
        // Never a dead end: offer a fresh refresh affordance.
        return no_numbers_prompt(d, user, chat, &area).await;
    }

    render_batch(d, user, chat, &area, &found).await
}

async fn retire_previous(d: &Dispatcher, user: UserId) {
    for msg in d.refresh.take_all(user).await {
        if let Err(err) = d.messenger().delete_message(msg).await {
            tracing::debug!(user = user.0, error = %err, "stale refresh prompt already gone");
        }
    }
}

async fn no_numbers_prompt(
    d: &Dispatcher,
    user: UserId,
    chat: ChatId,
    area: &AreaCode,
) -> Result<()> {
    let prompt = d
        .messenger()
        .send_inline_keyboard(
            chat,
            "🔄 Try refresh again?",
            InlineKeyboard::single("🔄 Refresh", &CallbackAction::Refresh(area.clone())),
        )
        .await?;
    d.refresh.track(user, prompt).await;
    Ok(())
}
