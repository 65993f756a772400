use std::sync::Arc;

use teloxide::prelude::*;

use koro_core::domain::{ChatId, UserId};

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let handle = user.username.as_deref();
    let chat = ChatId(msg.chat.id.0);
    let d = &state.dispatcher;

    let (cmd, _rest) = parse_command(text);
    let result = match cmd.as_str() {
        "start" => d.on_start(user_id, handle, chat).await,
        "login" => d.on_login_command(user_id, handle, chat).await,
        "area" => d.on_area_command(user_id, handle, chat).await,
        "admincontrol" => d.on_admin_control(user_id, handle, chat).await,
        // Unknown commands are silently ignored, like any unmatched text.
        _ => Ok(()),
    };

    if let Err(err) = result {
        tracing::warn!(user = user_id.0, command = %cmd, error = %err, "command failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_bot_suffix_and_args() {
        assert_eq!(parse_command("/start"), ("start".into(), "".into()));
        assert_eq!(
            parse_command("/admincontrol@koro_bot"),
            ("admincontrol".into(), "".into())
        );
        assert_eq!(
            parse_command("/area 416 647"),
            ("area".into(), "416 647".into())
        );
    }
}
