use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Typed configuration, loaded from the environment (with optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub admin_user_id: i64,

    // Number search
    pub default_country: String,
    pub search_limit: usize,

    // Telegram limits
    pub message_limit: usize,
    pub safe_limit: usize,

    /// Spacing between consecutive listing messages (flood-control courtesy).
    pub listing_send_spacing: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("BOT_TOKEN")
            .and_then(non_empty)
            .ok_or_else(|| Error::Config("BOT_TOKEN environment variable is required".into()))?;

        let admin_user_id = env_str("ADMIN_USER_ID")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("ADMIN_USER_ID environment variable is required".into())
            })?
            .parse::<i64>()
            .map_err(|_| Error::Config("ADMIN_USER_ID must be a numeric user id".into()))?;

        let default_country = env_str("NUMBER_COUNTRY")
            .and_then(non_empty)
            .unwrap_or_else(|| "CA".to_string());

        let search_limit = env_usize("NUMBER_SEARCH_LIMIT").unwrap_or(50);

        let message_limit = env_usize("TELEGRAM_MESSAGE_LIMIT").unwrap_or(4096);
        let safe_limit = env_usize("TELEGRAM_SAFE_LIMIT").unwrap_or(4000);

        let listing_send_spacing =
            Duration::from_millis(env_u64("LISTING_SEND_SPACING_MS").unwrap_or(100));

        Ok(Self {
            telegram_bot_token,
            admin_user_id,
            default_country,
            search_limit,
            message_limit,
            safe_limit,
            listing_send_spacing,
        })
    }

    /// A config with test-friendly defaults (no env access).
    pub fn for_tests(admin_user_id: i64) -> Self {
        Self {
            telegram_bot_token: "test-token".to_string(),
            admin_user_id,
            default_country: "CA".to_string(),
            search_limit: 50,
            message_limit: 4096,
            safe_limit: 4000,
            listing_send_spacing: Duration::from_millis(0),
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key)?.trim().parse().ok()
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key)?.trim().parse().ok()
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim().to_string();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim();
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = &val[1..val.len() - 1];
        }

        env::set_var(key, val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_filters() {
        assert_eq!(non_empty("  x ".into()), Some("x".to_string()));
        assert_eq!(non_empty("   ".into()), None);
    }
}
