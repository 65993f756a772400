//! Menu-button labels and keyboards.
//!
//! Labels double as the wire format: a reply-keyboard press arrives as plain
//! text equal to the label, so these constants are matched verbatim by the
//! classifier.

use crate::messaging::types::MenuKeyboard;

pub const LOGIN: &str = "🔐 Login";
pub const BUY_NUMBER: &str = "🛒 Buy Number";
pub const CHECK_BALANCE: &str = "💰 Check Balance";
pub const DELETE_NUMBER: &str = "🗑️ Delete Number";
pub const LOGOUT: &str = "🚪 Logout";
pub const MAIL: &str = "📧 Mail";

pub const USER_LIST: &str = "👥 User List";
pub const BROADCAST: &str = "📢 Broadcast";
pub const BAN_USER: &str = "🚫 Ban User";
pub const UNBAN_USER: &str = "✅ Unban User";
pub const BANNED_LIST: &str = "📋 Banned List";
pub const LEAVE_ADMIN: &str = "🚪 Leave Admin";

/// Ordinary (non-admin) menu actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Login,
    BuyNumber,
    CheckBalance,
    DeleteNumber,
    Logout,
    Mail,
}

impl MenuAction {
    pub fn from_label(text: &str) -> Option<Self> {
        match text {
            LOGIN => Some(Self::Login),
            BUY_NUMBER => Some(Self::BuyNumber),
            CHECK_BALANCE => Some(Self::CheckBalance),
            DELETE_NUMBER => Some(Self::DeleteNumber),
            LOGOUT => Some(Self::Logout),
            MAIL => Some(Self::Mail),
            _ => None,
        }
    }
}

/// Admin-panel menu actions (meaningful only while AdminMode is on).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminAction {
    UserList,
    Broadcast,
    BanUser,
    UnbanUser,
    BannedList,
}

impl AdminAction {
    pub fn from_label(text: &str) -> Option<Self> {
        match text {
            USER_LIST => Some(Self::UserList),
            BROADCAST => Some(Self::Broadcast),
            BAN_USER => Some(Self::BanUser),
            UNBAN_USER => Some(Self::UnbanUser),
            BANNED_LIST => Some(Self::BannedList),
            _ => None,
        }
    }
}

pub fn logged_in_menu() -> MenuKeyboard {
    MenuKeyboard::new(vec![
        vec![BUY_NUMBER, MAIL],
        vec![CHECK_BALANCE, DELETE_NUMBER],
        vec![LOGOUT],
    ])
}

pub fn logged_out_menu() -> MenuKeyboard {
    MenuKeyboard::new(vec![vec![LOGIN, MAIL]])
}

pub fn admin_menu() -> MenuKeyboard {
    MenuKeyboard::new(vec![
        vec![USER_LIST, BROADCAST],
        vec![BAN_USER, UNBAN_USER],
        vec![BANNED_LIST, LEAVE_ADMIN],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_menu_label_maps_back_to_its_action() {
        assert_eq!(MenuAction::from_label(LOGIN), Some(MenuAction::Login));
        assert_eq!(MenuAction::from_label(BUY_NUMBER), Some(MenuAction::BuyNumber));
        assert_eq!(MenuAction::from_label(LOGOUT), Some(MenuAction::Logout));
        assert_eq!(MenuAction::from_label("free text"), None);

        assert_eq!(AdminAction::from_label(BROADCAST), Some(AdminAction::Broadcast));
        assert_eq!(AdminAction::from_label(LEAVE_ADMIN), None);
    }
}
