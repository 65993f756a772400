//! Purchase / delete flow.

use crate::{
    callback::CallbackAction,
    dispatch::Dispatcher,
    domain::{ChatId, MessageRef, NumberSid, PhoneNumber, UserId},
    messaging::types::{InlineButton, InlineKeyboard},
    state::Session,
    Result,
};

/// A press on `buy_<number>`.
///
/// The number value travels inside the callback tag, so a concurrent refresh
/// replacing the listing cannot redirect the purchase.
pub(crate) async fn handle_buy(
    d: &Dispatcher,
    user: UserId,
    chat: ChatId,
    number: PhoneNumber,
    pressed: Option<MessageRef>,
) -> Result<()> {
    let Some(session) = d.sessions.get(user).await else {
        d.messenger().send_text(chat, "❌ Please login first!").await?;
        return Ok(());
    };

    let progress = match pressed {
        Some(msg) => {
            let _ = d.messenger().edit_text(msg, "🔄 Purchasing number...").await;
            msg
        }
        None => d.messenger().send_text(chat, "🔄 Purchasing number...").await?,
    };

    match session.account.purchase(&number).await {
        Ok(sid) => {
            d.numbers.record(user, number.clone(), sid.clone()).await;
            tracing::info!(user = user.0, number = %number, sid = %sid, "number purchased");

            let _ = d.messenger().delete_message(progress).await;

            let keyboard = InlineKeyboard::new(vec![
                InlineButton::new(
                    format!("📱 {number}"),
                    &CallbackAction::Copy(number.digits().to_string()),
                ),
                InlineButton::new("🗑️ Delete Number", &CallbackAction::Delete(sid)),
            ]);
            d.messenger()
                .send_inline_keyboard(
                    chat,
                    &format!(
                        "✅ Purchase Successful!\n\n📱 {number}\n\n⚠️ Note: webhooks are not \
                         configured, SMS will not be received automatically."
                    ),
                    keyboard,
                )
                .await?;
        }
        Err(err) => {
            tracing::warn!(user = user.0, number = %number, error = %err, "purchase failed");
            let _ = d
                .messenger()
                .edit_text(progress, &format!("❌ Purchase Failed!\n\n{err}"))
                .await;
        }
    }
    Ok(())
}

/// A press on `delete_<sid>`.
///
/// Requires an ownership record for (user, sid); without one the backend is
/// never called. The record is removed only after the backend confirms.
pub(crate) async fn handle_delete(
    d: &Dispatcher,
    user: UserId,
    chat: ChatId,
    sid: NumberSid,
    pressed: Option<MessageRef>,
) -> Result<()> {
    let Some(session) = d.sessions.get(user).await else {
        d.messenger().send_text(chat, "❌ Please login first!").await?;
        return Ok(());
    };

    if !d.numbers.owns(user, &sid).await {
        reply(d, chat, pressed, "❌ This number is not yours to delete.").await?;
        return Ok(());
    }

    match session.account.release(&sid).await {
        Ok(()) => {
            d.numbers.remove(user, &sid).await;
            tracing::info!(user = user.0, sid = %sid, "number deleted");
            reply(d, chat, pressed, "✅ Number deleted successfully!").await?;
        }
        Err(err) => {
            tracing::warn!(user = user.0, sid = %sid, error = %err, "number deletion failed");
            reply(d, chat, pressed, &format!("❌ Number deletion failed!\n\n{err}")).await?;
        }
    }
    Ok(())
}

/// The Delete Number menu action: list the account's owned numbers, each
/// with its delete button.
///
/// Ownership records are refreshed from the backend listing so that delete
/// presses pass the ownership check even for numbers bought outside this
/// process lifetime.
pub(crate) async fn list_deletable(d: &Dispatcher, session: &Session, chat: ChatId) -> Result<()> {
    let owned = match session.account.list_owned().await {
        Ok(owned) => owned,
        Err(err) => {
            tracing::warn!(user = session.user.0, error = %err, "owned-number listing failed");
            d.messenger()
                .send_text(chat, "❌ Could not fetch your numbers. Try again in a moment.")
                .await?;
            return Ok(());
        }
    };

    if owned.is_empty() {
        d.messenger().send_text(chat, "No purchased numbers.").await?;
        return Ok(());
    }

    for item in owned {
        d.numbers
            .record(session.user, item.number.clone(), item.sid.clone())
            .await;

        let keyboard =
            InlineKeyboard::single("🗑️ Delete", &CallbackAction::Delete(item.sid));
        d.messenger()
            .send_inline_keyboard(chat, &format!("Number: {}", item.number), keyboard)
            .await?;
    }
    Ok(())
}

async fn reply(
    d: &Dispatcher,
    chat: ChatId,
    pressed: Option<MessageRef>,
    text: &str,
) -> Result<()> {
    match pressed {
        Some(msg) => {
            if d.messenger().edit_text(msg, text).await.is_err() {
                d.messenger().send_text(chat, text).await?;
            }
        }
        None => {
            d.messenger().send_text(chat, text).await?;
        }
    }
    Ok(())
}
