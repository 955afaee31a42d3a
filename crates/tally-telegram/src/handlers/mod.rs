//! Telegram update handlers.
//!
//! Each handler is a small adapter that converts the teloxide update into
//! `tally-core` types and calls the matching service. Service errors are
//! logged here and never stop the dispatcher.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{ChatMemberUpdated, Message},
};

use tally_core::messaging::types::ChatMemberNotice;

use crate::router::{RosterState, SignupState};

mod commands;
mod members;
mod signup;

/// What kind of message arrived, judged from its text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Route {
    Command,
    Text,
    /// Media, stickers, service messages.
    Other,
}

impl Route {
    fn of(text: Option<&str>) -> Self {
        match text {
            Some(t) if t.starts_with('/') => Route::Command,
            Some(_) => Route::Text,
            None => Route::Other,
        }
    }

    /// Commands never count as activity, known or not.
    fn refreshes_presence(self) -> bool {
        self != Route::Command
    }

    fn may_join_list(self) -> bool {
        self == Route::Text
    }
}

pub async fn handle_signup_message(msg: Message, state: Arc<SignupState>) -> ResponseResult<()> {
    let route = Route::of(msg.text());
    if route == Route::Command {
        return commands::handle_signup_command(msg, state).await;
    }

    if route.may_join_list() {
        return signup::handle_reply(msg, state).await;
    }

    Ok(())
}

pub async fn handle_roster_message(msg: Message, state: Arc<RosterState>) -> ResponseResult<()> {
    let route = Route::of(msg.text());
    if route.refreshes_presence() {
        return members::record_sender(msg, state).await;
    }

    commands::handle_roster_command(msg, state).await
}

pub async fn handle_chat_member(
    update: ChatMemberUpdated,
    state: Arc<RosterState>,
) -> ResponseResult<()> {
    match crate::convert::change_from(&update) {
        Ok(change) => members::apply_notice(ChatMemberNotice::Member(change), state).await,
        Err(e) => {
            tracing::warn!(chat_id = update.chat.id.0, "skipping membership update: {e}");
            Ok(())
        }
    }
}

pub async fn handle_my_chat_member(
    update: ChatMemberUpdated,
    state: Arc<RosterState>,
) -> ResponseResult<()> {
    match crate::convert::change_from(&update) {
        Ok(change) => members::apply_notice(ChatMemberNotice::OwnMembership(change), state).await,
        Err(e) => {
            tracing::warn!(chat_id = update.chat.id.0, "skipping own membership update: {e}");
            Ok(())
        }
    }
}
