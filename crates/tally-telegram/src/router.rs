use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tally_core::{
    config::{RosterConfig, SignupConfig},
    messaging::port::{ChatDirectory, MessagingPort},
    roster::RosterService,
    signup::SignupBoard,
    store::MembershipStore,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct SignupState {
    pub board: Arc<SignupBoard>,
    /// Own username, for telling apart `/cmd@other_bot`.
    pub bot_username: Option<String>,
}

#[derive(Clone)]
pub struct RosterState {
    pub roster: Arc<RosterService>,
    pub bot_username: Option<String>,
}

pub async fn run_signup_bot(cfg: Arc<SignupConfig>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let bot_username = identify(&bot).await;

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(SignupState {
        board: Arc::new(SignupBoard::new(messenger)),
        bot_username,
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_signup_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

pub async fn run_roster_bot(cfg: Arc<RosterConfig>) -> anyhow::Result<()> {
    let store = MembershipStore::open(&cfg.db_path)?;
    tracing::info!("Membership store: {}", store.path().display());

    let bot = Bot::new(cfg.telegram_bot_token.clone());
    let bot_username = identify(&bot).await;

    let telegram = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = telegram.clone();
    let directory: Arc<dyn ChatDirectory> = telegram;
    let state = Arc::new(RosterState {
        roster: Arc::new(RosterService::new(store, messenger, directory)),
        bot_username,
    });

    // Chat-member updates are only delivered when requested; the dispatcher
    // derives allowed_updates from these filters.
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_roster_message))
        .branch(Update::filter_chat_member().endpoint(handlers::handle_chat_member))
        .branch(Update::filter_my_chat_member().endpoint(handlers::handle_my_chat_member));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Log who we are and return the bot's username. Without it only
/// unaddressed commands are answered.
async fn identify(bot: &Bot) -> Option<String> {
    match bot.get_me().await {
        Ok(me) => {
            let username = me.user.username.clone();
            tracing::info!("Bot started: @{}", username.as_deref().unwrap_or("?"));
            username
        }
        Err(e) => {
            tracing::warn!("get_me failed: {e}");
            None
        }
    }
}
