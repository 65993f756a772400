use crate::callback::CallbackAction;

/// Inline keyboard (buttons attached to a message), one button per row.
#[derive(Clone, Debug)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, action: &CallbackAction) -> Self {
        Self {
            label: label.into(),
            callback_data: action.encode(),
        }
    }
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }

    pub fn single(label: impl Into<String>, action: &CallbackAction) -> Self {
        Self {
            buttons: vec![InlineButton::new(label, action)],
        }
    }
}

/// Persistent reply keyboard (the bottom menu); rows of plain labels.
#[derive(Clone, Debug)]
pub struct MenuKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl MenuKeyboard {
    pub fn new(rows: Vec<Vec<&str>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_html: bool,
    pub supports_edit: bool,
    pub supports_inline_keyboards: bool,
    pub supports_menu_keyboards: bool,
    pub max_message_len: usize,
}
