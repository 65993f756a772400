use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};

use koro_core::dispatch;

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<dispatch::Dispatcher>,
    pub chat_locks: Arc<ChatLocks>,
}

/// Per-chat mutexes: events from the same chat are handled strictly in
/// arrival order, while different chats proceed concurrently.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run_polling(bot: Bot, dispatcher: Arc<dispatch::Dispatcher>) -> anyhow::Result<()> {
    match bot.get_me().await {
        Ok(me) => tracing::info!(bot = %me.username(), "bot started"),
        Err(e) => tracing::warn!(error = %e, "get_me failed at startup"),
    }

    let state = Arc::new(AppState {
        dispatcher,
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
