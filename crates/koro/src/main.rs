use std::sync::Arc;

use teloxide::Bot;

use koro_core::{
    config::Config, dispatch::Dispatcher, messaging::port::MessagingPort,
    provisioning::port::ProvisioningBackend,
};
use koro_telegram::TelegramMessenger;
use koro_twilio::TwilioBackend;

#[tokio::main]
async fn main() -> Result<(), koro_core::Error> {
    koro_core::logging::init("koro");

    let cfg = Arc::new(Config::load()?);

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let backend: Arc<dyn ProvisioningBackend> = Arc::new(TwilioBackend::new());

    let dispatcher = Arc::new(Dispatcher::new(cfg, backend, messenger));

    koro_telegram::router::run_polling(bot, dispatcher)
        .await
        .map_err(|e| koro_core::Error::Transport(format!("telegram bot failed: {e}")))?;

    Ok(())
}
