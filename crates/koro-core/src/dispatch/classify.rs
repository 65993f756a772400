//! Event classification.
//!
//! The dispatch priority order is a first-class artifact: `classify` is a
//! pure function over the message text and a snapshot of the sender's state,
//! and the first matching branch wins. Handlers never recurse back into
//! classification for the same event.

use crate::{
    dispatch::menu::{self, MenuAction},
    domain::{AreaCode, PhoneNumber},
    phone,
    state::workflow::WorkflowState,
};

/// Everything the classifier needs to know about the sender, captured before
/// any branch runs.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub is_admin: bool,
    pub admin_mode: bool,
    pub is_banned: bool,
    pub logged_in: bool,
    pub workflow: Option<WorkflowState>,
}

/// The single branch an inbound text event resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Branch {
    /// Banned sender (and not the administrator): reply and stop.
    Banned,
    /// Administrator leaves admin mode, interrupting any admin sub-flow.
    LeaveAdmin,
    /// Administrator input while AdminMode is on: the admin flow owns it.
    AdminInput,
    Menu(MenuAction),
    /// Two-line free text from a logged-out sender: credential attempt.
    Credentials {
        account_sid: String,
        auth_token: String,
    },
    /// Free text containing an extractable phone number.
    DetectedNumber(PhoneNumber),
    /// Three-digit follow-up to an AwaitingAreaCode workflow.
    AreaCode(AreaCode),
    /// No rule matched: deliberate no-op.
    Ignore,
}

pub fn classify(text: &str, snap: &Snapshot) -> Branch {
    if snap.is_banned && !snap.is_admin {
        return Branch::Banned;
    }

    if snap.is_admin && snap.admin_mode {
        if text == menu::LEAVE_ADMIN {
            return Branch::LeaveAdmin;
        }
        return Branch::AdminInput;
    }

    if let Some(action) = MenuAction::from_label(text) {
        return Branch::Menu(action);
    }

    if !snap.logged_in && text.contains('\n') {
        let mut lines = text.trim().lines().map(str::trim);
        if let (Some(sid), Some(token)) = (lines.next(), lines.next()) {
            if !sid.is_empty() && !token.is_empty() {
                return Branch::Credentials {
                    account_sid: sid.to_string(),
                    auth_token: token.to_string(),
                };
            }
        }
        // Multi-line text without two usable lines is ignored, same as any
        // other unmatched input.
        return Branch::Ignore;
    }

    if let Some(number) = phone::extract_number(text) {
        return Branch::DetectedNumber(number);
    }

    if snap.logged_in && snap.workflow == Some(WorkflowState::AwaitingAreaCode) {
        if let Some(area) = phone::parse_area_code(text) {
            return Branch::AreaCode(area);
        }
    }

    Branch::Ignore
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap() -> Snapshot {
        Snapshot::default()
    }

    #[test]
    fn banned_wins_over_everything() {
        let s = Snapshot {
            is_banned: true,
            logged_in: true,
            workflow: Some(WorkflowState::AwaitingAreaCode),
            ..snap()
        };
        assert_eq!(classify(menu::BUY_NUMBER, &s), Branch::Banned);
        assert_eq!(classify("416", &s), Branch::Banned);
    }

    #[test]
    fn banned_admin_is_not_rejected() {
        let s = Snapshot {
            is_banned: true,
            is_admin: true,
            ..snap()
        };
        assert_ne!(classify(menu::BUY_NUMBER, &s), Branch::Banned);
    }

    #[test]
    fn leave_admin_beats_admin_input() {
        let s = Snapshot {
            is_admin: true,
            admin_mode: true,
            ..snap()
        };
        assert_eq!(classify(menu::LEAVE_ADMIN, &s), Branch::LeaveAdmin);
        assert_eq!(classify("anything else", &s), Branch::AdminInput);
        assert_eq!(classify(menu::BUY_NUMBER, &s), Branch::AdminInput);
    }

    #[test]
    fn admin_outside_admin_mode_is_ordinary() {
        let s = Snapshot {
            is_admin: true,
            ..snap()
        };
        assert_eq!(
            classify(menu::BUY_NUMBER, &s),
            Branch::Menu(MenuAction::BuyNumber)
        );
    }

    #[test]
    fn two_line_text_is_credentials_only_when_logged_out() {
        let text = "AC93383ff\nf6ecddee";
        let logged_out = snap();
        assert_eq!(
            classify(text, &logged_out),
            Branch::Credentials {
                account_sid: "AC93383ff".into(),
                auth_token: "f6ecddee".into(),
            }
        );

        let logged_in = Snapshot {
            logged_in: true,
            ..snap()
        };
        assert_eq!(classify(text, &logged_in), Branch::Ignore);
    }

    #[test]
    fn credentials_take_priority_over_detected_numbers() {
        let text = "+14165551234\nsome-token";
        assert_eq!(
            classify(text, &snap()),
            Branch::Credentials {
                account_sid: "+14165551234".into(),
                auth_token: "some-token".into(),
            }
        );
    }

    #[test]
    fn detected_number_regardless_of_login() {
        let expected = Branch::DetectedNumber(PhoneNumber("+14165551234".into()));
        assert_eq!(classify("Call me at 4165551234", &snap()), expected.clone());

        let logged_in = Snapshot {
            logged_in: true,
            ..snap()
        };
        assert_eq!(classify("Call me at 4165551234", &logged_in), expected);
    }

    #[test]
    fn area_code_requires_login_and_pending_workflow() {
        let ready = Snapshot {
            logged_in: true,
            workflow: Some(WorkflowState::AwaitingAreaCode),
            ..snap()
        };
        assert_eq!(classify("416", &ready), Branch::AreaCode(AreaCode("416".into())));
        assert_eq!(classify("41", &ready), Branch::Ignore);
        assert_eq!(classify("4167", &ready), Branch::Ignore);

        let no_workflow = Snapshot {
            logged_in: true,
            ..snap()
        };
        assert_eq!(classify("416", &no_workflow), Branch::Ignore);

        let logged_out = Snapshot {
            workflow: Some(WorkflowState::AwaitingAreaCode),
            ..snap()
        };
        assert_eq!(classify("416", &logged_out), Branch::Ignore);
    }

    #[test]
    fn unmatched_text_is_a_no_op() {
        assert_eq!(classify("hello there", &snap()), Branch::Ignore);
        assert_eq!(classify("", &snap()), Branch::Ignore);
    }
}
