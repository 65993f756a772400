//! The message router / dispatcher.
//!
//! Every inbound event enters here, resolves to exactly one branch
//! (`classify`), and produces its replies and state mutations before the
//! next event for the same user is admitted (the transport router holds a
//! per-chat lock around each call).

pub mod admin;
pub mod classify;
pub mod listing;
pub mod menu;
pub mod purchase;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    callback::CallbackAction,
    config::Config,
    domain::{AreaCode, ChatId, MessageRef, PhoneNumber, UserId},
    messaging::{port::MessagingPort, types::InlineKeyboard},
    provisioning::{
        error::{AccountStatus, AuthError},
        port::ProvisioningBackend,
    },
    state::{
        BanSet, NumberRegistry, RefreshBatches, Session, SessionRegistry, UserDirectory,
        WorkflowState, WorkflowStore,
    },
    Result,
};

use self::classify::{classify, Branch, Snapshot};
use self::menu::MenuAction;

const BANNED_REPLY: &str = "🚫 You are banned from using this bot.";
const LOGIN_REQUIRED: &str = "❌ Please login first!";
const CREDENTIALS_PROMPT: &str =
    "🔐 Send your account SID and auth token on two lines:\n\nFormat:\nAC93383ffxxx\nf6ecddeexxx";

/// Canadian area codes rendered by `/area`.
const CANADA_AREA_CODES: &[u16] = &[
    416, 647, 437, 905, 289, 365, 519, 548, 613, 343, 705, 249, 807, // Ontario
    514, 438, 450, 579, 418, 581, 819, 873, // Quebec
    604, 778, 236, 250, 672, // British Columbia
    403, 587, 825, 780, 368, // Alberta
    204, 431, 306, 639, 902, 782, 506, 709, 879, 867, // other provinces
];

pub struct Dispatcher {
    pub cfg: Arc<Config>,
    backend: Arc<dyn ProvisioningBackend>,
    messenger: Arc<dyn MessagingPort>,

    pub sessions: SessionRegistry,
    pub workflows: WorkflowStore,
    pub refresh: RefreshBatches,
    pub directory: UserDirectory,
    pub bans: BanSet,
    pub numbers: NumberRegistry,

    admin_mode: AtomicBool,
}

impl Dispatcher {
    pub fn new(
        cfg: Arc<Config>,
        backend: Arc<dyn ProvisioningBackend>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            cfg,
            backend,
            messenger,
            sessions: SessionRegistry::default(),
            workflows: WorkflowStore::default(),
            refresh: RefreshBatches::default(),
            directory: UserDirectory::default(),
            bans: BanSet::default(),
            numbers: NumberRegistry::default(),
            admin_mode: AtomicBool::new(false),
        }
    }

    pub fn messenger(&self) -> &dyn MessagingPort {
        self.messenger.as_ref()
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        user.0 == self.cfg.admin_user_id
    }

    pub fn admin_mode(&self) -> bool {
        self.admin_mode.load(Ordering::SeqCst)
    }

    fn set_admin_mode(&self, on: bool) {
        self.admin_mode.store(on, Ordering::SeqCst);
    }

    async fn snapshot(&self, user: UserId) -> Snapshot {
        Snapshot {
            is_admin: self.is_admin(user),
            admin_mode: self.admin_mode(),
            is_banned: self.bans.contains(user).await,
            logged_in: self.sessions.contains(user).await,
            workflow: self.workflows.get(user).await,
        }
    }

    /// Rule 1: banned senders (other than the administrator) get a single
    /// rejection reply on any event kind.
    async fn reject_if_banned(&self, user: UserId, chat: ChatId) -> Result<bool> {
        if self.bans.contains(user).await && !self.is_admin(user) {
            self.messenger.send_text(chat, BANNED_REPLY).await?;
            return Ok(true);
        }
        Ok(false)
    }

    // ---------- command entry points ----------

    pub async fn on_start(&self, user: UserId, handle: Option<&str>, chat: ChatId) -> Result<()> {
        let handle = self.directory.observe(user, handle).await;
        tracing::info!(user = user.0, handle = %handle, "user started the bot");

        if self.reject_if_banned(user, chat).await? {
            return Ok(());
        }

        if self.is_admin(user) && self.admin_mode() {
            return admin::render_panel(self, chat).await;
        }

        if let Some(session) = self.sessions.get(user).await {
            let summary = account_summary(&session).await;
            self.messenger
                .send_menu(
                    chat,
                    &format!("✅ You are already logged in!\n{summary}"),
                    menu::logged_in_menu(),
                )
                .await?;
        } else {
            self.messenger
                .send_menu(
                    chat,
                    "🎉 Welcome!\n\n👇 Tap Login below to connect your account",
                    menu::logged_out_menu(),
                )
                .await?;
        }
        Ok(())
    }

    pub async fn on_login_command(
        &self,
        user: UserId,
        handle: Option<&str>,
        chat: ChatId,
    ) -> Result<()> {
        self.directory.observe(user, handle).await;
        if self.reject_if_banned(user, chat).await? {
            return Ok(());
        }

        if let Some(session) = self.sessions.get(user).await {
            let summary = account_summary(&session).await;
            self.messenger
                .send_menu(
                    chat,
                    &format!("✅ You are already logged in!\n{summary}"),
                    menu::logged_in_menu(),
                )
                .await?;
        } else {
            self.messenger.send_text(chat, CREDENTIALS_PROMPT).await?;
        }
        Ok(())
    }

    pub async fn on_area_command(
        &self,
        user: UserId,
        handle: Option<&str>,
        chat: ChatId,
    ) -> Result<()> {
        self.directory.observe(user, handle).await;
        if self.reject_if_banned(user, chat).await? {
            return Ok(());
        }

        let mut text = String::from("🇨🇦 Canada Area Codes:\n\n");
        for code in CANADA_AREA_CODES {
            text.push_str(&format!("{code} "));
        }
        self.messenger.send_text(chat, text.trim_end()).await?;
        Ok(())
    }

    pub async fn on_admin_control(
        &self,
        user: UserId,
        handle: Option<&str>,
        chat: ChatId,
    ) -> Result<()> {
        self.directory.observe(user, handle).await;

        if !self.is_admin(user) {
            self.messenger
                .send_text(chat, "❌ You are not authorized to use this command.")
                .await?;
            return Ok(());
        }

        self.set_admin_mode(true);
        tracing::info!(user = user.0, "admin control mode enabled");
        admin::render_panel(self, chat).await
    }

    // ---------- free-text entry point ----------

    pub async fn on_text(
        &self,
        user: UserId,
        handle: Option<&str>,
        chat: ChatId,
        text: &str,
    ) -> Result<()> {
        self.directory.observe(user, handle).await;

        let snap = self.snapshot(user).await;
        match classify(text, &snap) {
            Branch::Banned => {
                self.messenger.send_text(chat, BANNED_REPLY).await?;
                Ok(())
            }
            Branch::LeaveAdmin => self.leave_admin(user, chat).await,
            Branch::AdminInput => admin::handle_input(self, user, chat, text).await,
            Branch::Menu(action) => self.handle_menu(user, chat, action, snap.logged_in).await,
            Branch::Credentials {
                account_sid,
                auth_token,
            } => self.handle_credentials(user, chat, &account_sid, &auth_token).await,
            Branch::DetectedNumber(number) => {
                self.handle_detected_number(chat, number, snap.logged_in).await
            }
            Branch::AreaCode(area) => self.handle_area_code(user, chat, area).await,
            Branch::Ignore => Ok(()),
        }
    }

    // ---------- callback entry point ----------

    pub async fn on_callback(
        &self,
        user: UserId,
        handle: Option<&str>,
        chat: ChatId,
        callback_id: &str,
        data: &str,
        pressed: Option<MessageRef>,
    ) -> Result<()> {
        self.directory.observe(user, handle).await;

        if self.bans.contains(user).await && !self.is_admin(user) {
            self.messenger
                .answer_callback(callback_id, Some(BANNED_REPLY), false)
                .await?;
            return Ok(());
        }

        let Some(action) = CallbackAction::parse(data) else {
            self.messenger.answer_callback(callback_id, None, false).await?;
            return Ok(());
        };

        match action {
            CallbackAction::Copy(digits) => {
                self.messenger
                    .answer_callback(
                        callback_id,
                        Some(&format!("📋 Number copied: +{digits}")),
                        true,
                    )
                    .await?;
                Ok(())
            }
            CallbackAction::Buy(number) => {
                self.messenger.answer_callback(callback_id, None, false).await?;
                purchase::handle_buy(self, user, chat, number, pressed).await
            }
            CallbackAction::Delete(sid) => {
                self.messenger.answer_callback(callback_id, None, false).await?;
                purchase::handle_delete(self, user, chat, sid, pressed).await
            }
            CallbackAction::Refresh(area) => {
                self.messenger.answer_callback(callback_id, None, false).await?;
                listing::handle_refresh(self, user, chat, area, pressed).await
            }
        }
    }

    // ---------- branch handlers ----------

    async fn leave_admin(&self, user: UserId, chat: ChatId) -> Result<()> {
        self.set_admin_mode(false);
        // Any pending admin sub-state dies with the mode.
        self.workflows.clear(user).await;
        tracing::info!(user = user.0, "admin control mode disabled");

        let keyboard = if self.sessions.contains(user).await {
            menu::logged_in_menu()
        } else {
            menu::logged_out_menu()
        };
        self.messenger
            .send_menu(chat, "✅ Left admin control!", keyboard)
            .await?;
        Ok(())
    }

    async fn handle_menu(
        &self,
        user: UserId,
        chat: ChatId,
        action: MenuAction,
        logged_in: bool,
    ) -> Result<()> {
        match action {
            MenuAction::Login => {
                self.messenger.send_text(chat, CREDENTIALS_PROMPT).await?;
            }
            MenuAction::BuyNumber => {
                if !logged_in {
                    self.messenger.send_text(chat, LOGIN_REQUIRED).await?;
                    return Ok(());
                }
                self.workflows.set(user, WorkflowState::AwaitingAreaCode).await;
                self.messenger
                    .send_text(chat, "🇨🇦 Send a Canadian area code. Example: 416, 647, 905")
                    .await?;
            }
            MenuAction::CheckBalance => {
                let Some(session) = self.sessions.get(user).await else {
                    self.messenger.send_text(chat, LOGIN_REQUIRED).await?;
                    return Ok(());
                };
                let loading = self.messenger.send_text(chat, "🔄 Checking balance...").await?;
                let summary = account_summary(&session).await;
                let _ = self.messenger.delete_message(loading).await;
                self.messenger.send_text(chat, &summary).await?;
            }
            MenuAction::DeleteNumber => {
                let Some(session) = self.sessions.get(user).await else {
                    self.messenger.send_text(chat, LOGIN_REQUIRED).await?;
                    return Ok(());
                };
                purchase::list_deletable(self, &session, chat).await?;
            }
            MenuAction::Logout => {
                if !logged_in {
                    self.messenger.send_text(chat, LOGIN_REQUIRED).await?;
                    return Ok(());
                }
                self.logout(user).await;
                self.messenger
                    .send_menu(chat, "✅ Successfully logged out!", menu::logged_out_menu())
                    .await?;
            }
            MenuAction::Mail => {
                if !logged_in {
                    self.messenger.send_text(chat, LOGIN_REQUIRED).await?;
                    return Ok(());
                }
                self.messenger.send_text(chat, "📧 Mail feature coming soon!").await?;
            }
        }
        Ok(())
    }

    /// Logout invalidates every in-progress flow for the user.
    async fn logout(&self, user: UserId) {
        self.sessions.remove(user).await;
        self.workflows.forget_user(user).await;
        self.refresh.clear(user).await;
        tracing::info!(user = user.0, "logged out");
    }

    async fn handle_credentials(
        &self,
        user: UserId,
        chat: ChatId,
        account_sid: &str,
        auth_token: &str,
    ) -> Result<()> {
        match self.backend.connect(account_sid, auth_token).await {
            Ok(account) => {
                let session = Session {
                    user,
                    account_sid: account_sid.to_string(),
                    account,
                };
                let summary = account_summary(&session).await;
                self.sessions.insert(session).await;
                tracing::info!(user = user.0, "login verified");

                self.messenger
                    .send_menu(
                        chat,
                        &format!("✅ Login successful!\n{summary}"),
                        menu::logged_in_menu(),
                    )
                    .await?;
            }
            Err(err) => {
                tracing::warn!(user = user.0, error = %err, "login rejected");
                let reply = match err {
                    AuthError::InvalidCredentials => "❌ Wrong SID or Auth Token",
                    AuthError::Suspended => "❌ Your key is suspended",
                    AuthError::Connection(_) => "❌ Connection failed. Check your credentials",
                };
                self.messenger.send_text(chat, reply).await?;
            }
        }
        Ok(())
    }

    async fn handle_detected_number(
        &self,
        chat: ChatId,
        number: PhoneNumber,
        logged_in: bool,
    ) -> Result<()> {
        if !logged_in {
            self.messenger
                .send_text(chat, "❌ Please login first to buy a number!")
                .await?;
            return Ok(());
        }

        let keyboard =
            InlineKeyboard::single("💳 Buy", &CallbackAction::Buy(number.clone()));
        self.messenger
            .send_code_with_keyboard(chat, &number.0, keyboard)
            .await?;
        Ok(())
    }

    async fn handle_area_code(&self, user: UserId, chat: ChatId, area: AreaCode) -> Result<()> {
        // Consume the workflow state exactly once, before any suspension
        // point; a repeat of the same input lands in the no-op branch.
        if self.workflows.take(user).await != Some(WorkflowState::AwaitingAreaCode) {
            return Ok(());
        }
        let Some(session) = self.sessions.get(user).await else {
            return Ok(());
        };

        self.workflows.remember_area(user, area.clone()).await;

        let found = match session
            .account
            .search_local(&area, &self.cfg.default_country)
            .await
        {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(user = user.0, area = %area, error = %err, "number search failed");
                self.messenger
                    .send_text(chat, "❌ Number search failed. Try again in a moment.")
                    .await?;
                return Ok(());
            }
        };
        if found.is_empty() {
            self.messenger
                .send_text(
                    chat,
                    &format!("❌ No Canadian numbers found for area code {area}."),
                )
                .await?;
            return Ok(());
        }

        listing::render_batch(self, user, chat, &area, &found).await
    }
}

/// Balance + account status summary used by login and balance checks.
///
/// Lookup failures degrade to placeholders; the session itself stays valid.
async fn account_summary(session: &Session) -> String {
    let balance = session
        .account
        .balance()
        .await
        .unwrap_or_else(|_| "unavailable".to_string());
    let status = session
        .account
        .account_status()
        .await
        .unwrap_or_else(|_| AccountStatus::Other("unknown".to_string()));
    format!("💰 Balance: ${balance}\n{status}")
}
