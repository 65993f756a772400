//! Admin control flow: broadcast, ban/unban, directory reports.
//!
//! Owns every administrator input while AdminMode is on (the Leave Admin
//! label is intercepted one rule earlier). Pending sub-states live in the
//! shared WorkflowStore, so leaving admin mode discards them for free.

use crate::{
    dispatch::{menu, menu::AdminAction, Dispatcher},
    domain::{ChatId, UserId},
    formatting::split_chunks,
    state::WorkflowState,
    Result,
};

pub(crate) async fn render_panel(d: &Dispatcher, chat: ChatId) -> Result<()> {
    let total = d.directory.len().await;
    let banned = d.bans.len().await;
    d.messenger()
        .send_menu(
            chat,
            &format!(
                "🔧 Admin Control Panel\n\n📊 Total Users: {total}\n🚫 Banned Users: {banned}\n\n👇 Select an option:"
            ),
            menu::admin_menu(),
        )
        .await?;
    Ok(())
}

pub(crate) async fn handle_input(
    d: &Dispatcher,
    admin: UserId,
    chat: ChatId,
    text: &str,
) -> Result<()> {
    // A pending admin sub-state consumes the input. Non-admin workflow
    // variants (a stale AwaitingAreaCode) are left alone.
    match d.workflows.get(admin).await {
        Some(WorkflowState::AwaitingBroadcastText) => {
            d.workflows.clear(admin).await;
            return broadcast(d, chat, text).await;
        }
        Some(WorkflowState::AwaitingBanId) => {
            d.workflows.clear(admin).await;
            return ban(d, admin, chat, text).await;
        }
        Some(WorkflowState::AwaitingUnbanId) => {
            d.workflows.clear(admin).await;
            return unban(d, chat, text).await;
        }
        _ => {}
    }

    match AdminAction::from_label(text) {
        Some(AdminAction::UserList) => user_list(d, chat).await,
        Some(AdminAction::BannedList) => banned_list(d, chat).await,
        Some(AdminAction::Broadcast) => {
            d.workflows
                .set(admin, WorkflowState::AwaitingBroadcastText)
                .await;
            d.messenger()
                .send_text(chat, "📝 Broadcast Message:\n\n👇 Type your message:")
                .await?;
            Ok(())
        }
        Some(AdminAction::BanUser) => {
            d.workflows.set(admin, WorkflowState::AwaitingBanId).await;
            d.messenger()
                .send_text(chat, "🚫 Ban User\n\n👇 Send the user id to ban:")
                .await?;
            Ok(())
        }
        Some(AdminAction::UnbanUser) => {
            d.workflows.set(admin, WorkflowState::AwaitingUnbanId).await;
            d.messenger()
                .send_text(chat, "✅ Unban User\n\n👇 Send the user id to unban:")
                .await?;
            Ok(())
        }
        // Anything else while in admin mode is ignored, same as the
        // ordinary dispatcher's unmatched-text branch.
        None => Ok(()),
    }
}

/// Send `text` to every directory user not in the ban set. Individual send
/// failures are counted, never fatal to the pass.
async fn broadcast(d: &Dispatcher, chat: ChatId, text: &str) -> Result<()> {
    let message = format!("📢 Notification:\n\n{text}");
    let recipients = d.directory.snapshot().await;

    let mut sent = 0u32;
    let mut failed = 0u32;
    for entry in recipients {
        if d.bans.contains(entry.user).await {
            continue;
        }
        match d
            .messenger()
            .send_text(ChatId(entry.user.0), &message)
            .await
        {
            Ok(_) => sent += 1,
            Err(err) => {
                failed += 1;
                tracing::warn!(user = entry.user.0, error = %err, "broadcast send failed");
            }
        }
    }

    d.messenger()
        .send_text(
            chat,
            &format!("✅ Broadcast Completed!\n\n📤 Sent: {sent}\n❌ Failed: {failed}"),
        )
        .await?;
    Ok(())
}

async fn ban(d: &Dispatcher, admin: UserId, chat: ChatId, text: &str) -> Result<()> {
    let Ok(target) = text.trim().parse::<i64>() else {
        d.messenger()
            .send_text(chat, "❌ Invalid user ID! Please enter a numeric ID.")
            .await?;
        return Ok(());
    };
    let target = UserId(target);

    if target == admin || d.is_admin(target) {
        d.messenger().send_text(chat, "❌ Cannot ban admin!").await?;
        return Ok(());
    }
    if d.bans.contains(target).await {
        d.messenger().send_text(chat, "❌ User is already banned!").await?;
        return Ok(());
    }
    if !d.directory.contains(target).await {
        d.messenger()
            .send_text(chat, "❌ User ID not found in directory!")
            .await?;
        return Ok(());
    }

    d.bans.ban(target).await;
    let handle = d.directory.handle_of(target).await;
    tracing::info!(user = target.0, handle = %handle, "user banned");

    d.messenger()
        .send_text(
            chat,
            &format!("✅ User @{handle} (ID: {}) has been banned!", target.0),
        )
        .await?;

    // Best-effort notification; the ban stands either way.
    let _ = d
        .messenger()
        .send_text(ChatId(target.0), "🚫 You have been banned from using this bot.")
        .await;
    Ok(())
}

async fn unban(d: &Dispatcher, chat: ChatId, text: &str) -> Result<()> {
    let Ok(target) = text.trim().parse::<i64>() else {
        d.messenger()
            .send_text(chat, "❌ Invalid user ID! Please enter a numeric ID.")
            .await?;
        return Ok(());
    };
    let target = UserId(target);

    if !d.bans.unban(target).await {
        d.messenger().send_text(chat, "❌ User is not banned!").await?;
        return Ok(());
    }

    let handle = d.directory.handle_of(target).await;
    tracing::info!(user = target.0, handle = %handle, "user unbanned");

    d.messenger()
        .send_text(
            chat,
            &format!("✅ User @{handle} (ID: {}) has been unbanned!", target.0),
        )
        .await?;

    let _ = d
        .messenger()
        .send_text(
            ChatId(target.0),
            "✅ You have been unbanned! You can now use the bot again.",
        )
        .await;
    Ok(())
}

async fn user_list(d: &Dispatcher, chat: ChatId) -> Result<()> {
    let entries = d.directory.snapshot().await;
    if entries.is_empty() {
        d.messenger().send_text(chat, "❌ No users found!").await?;
        return Ok(());
    }

    let mut out = String::from("👥 User List:\n\n");
    for entry in &entries {
        out.push_str(&format!("🆔 ID: {}\n", entry.user.0));
        out.push_str(&format!("👤 Username: @{}\n", entry.handle));
        out.push_str(&format!(
            "📅 Joined: {}\n",
            entry.first_seen.format("%d/%m/%Y %H:%M")
        ));
        out.push_str("─────────────────\n");
    }
    out.push_str(&format!("\n📊 Total Users: {}", entries.len()));

    send_chunked(d, chat, &out).await
}

async fn banned_list(d: &Dispatcher, chat: ChatId) -> Result<()> {
    let banned = d.bans.snapshot().await;
    if banned.is_empty() {
        d.messenger().send_text(chat, "✅ No banned users!").await?;
        return Ok(());
    }

    let mut out = String::from("🚫 Banned Users:\n\n");
    for user in &banned {
        out.push_str(&format!("🆔 ID: {}\n", user.0));
        out.push_str(&format!("👤 Username: @{}\n", d.directory.handle_of(*user).await));
        out.push_str("─────────────────\n");
    }
    out.push_str(&format!("\n📊 Total Banned: {}", banned.len()));

    send_chunked(d, chat, &out).await
}

async fn send_chunked(d: &Dispatcher, chat: ChatId, text: &str) -> Result<()> {
    for chunk in split_chunks(text, d.cfg.safe_limit) {
        d.messenger().send_text(chat, &chunk).await?;
    }
    Ok(())
}
