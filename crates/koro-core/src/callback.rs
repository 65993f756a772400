//! Callback-tag codec.
//!
//! Button affordances carry opaque string tags that must round-trip exactly
//! through the transport: `buy_<e164>`, `delete_<sid>`, `refresh_<area>`,
//! `copy_<digits>`.

use crate::domain::{AreaCode, NumberSid, PhoneNumber};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    Buy(PhoneNumber),
    Delete(NumberSid),
    Refresh(AreaCode),
    Copy(String),
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Buy(n) => format!("buy_{n}"),
            CallbackAction::Delete(sid) => format!("delete_{sid}"),
            CallbackAction::Refresh(area) => format!("refresh_{area}"),
            CallbackAction::Copy(digits) => format!("copy_{digits}"),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        if let Some(rest) = data.strip_prefix("buy_") {
            return Some(CallbackAction::Buy(PhoneNumber(rest.to_string())));
        }
        if let Some(rest) = data.strip_prefix("delete_") {
            return Some(CallbackAction::Delete(NumberSid(rest.to_string())));
        }
        if let Some(rest) = data.strip_prefix("refresh_") {
            return Some(CallbackAction::Refresh(AreaCode(rest.to_string())));
        }
        if let Some(rest) = data.strip_prefix("copy_") {
            return Some(CallbackAction::Copy(rest.to_string()));
        }
        None
    }
}
