use std::sync::Arc;

use teloxide::prelude::*;

use tally_core::{
    domain::{MessageRef, UserProfile},
    messaging::types::Command,
};

use crate::convert::{message_ref, profile_from};
use crate::router::{RosterState, SignupState};

#[derive(Debug, PartialEq, Eq)]
struct ParsedCommand {
    name: String,
    addressee: Option<String>,
}

impl ParsedCommand {
    fn into_command(self, message: MessageRef, from: UserProfile) -> Command {
        Command {
            message,
            from,
            name: self.name,
            addressee: self.addressee,
        }
    }
}

fn parse_command(text: &str) -> ParsedCommand {
    // Telegram may send `/cmd@botname arg1 ...`
    let first = text
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_start_matches('/');

    let (name, addressee) = match first.split_once('@') {
        Some((name, to)) => (name, Some(to).filter(|t| !t.is_empty())),
        None => (first, None),
    };

    ParsedCommand {
        name: name.to_lowercase(),
        addressee: addressee.map(str::to_string),
    }
}

/// The command in `msg`, if it is one and it is meant for this bot.
fn own_command(msg: &Message, bot_username: Option<&str>) -> Option<Command> {
    let text = msg.text()?;
    let from = msg.from()?;
    let parsed = parse_command(text);
    if parsed.name.is_empty() {
        return None;
    }

    let from = match profile_from(from) {
        Ok(from) => from,
        Err(e) => {
            tracing::warn!(chat_id = msg.chat.id.0, "ignoring command: {e}");
            return None;
        }
    };

    let cmd = parsed.into_command(message_ref(msg), from);
    if !cmd.is_for(bot_username) {
        tracing::debug!(
            chat_id = cmd.chat_id().0,
            addressee = cmd.addressee.as_deref(),
            "/{} is for another bot",
            cmd.name
        );
        return None;
    }
    Some(cmd)
}

fn log_command(cmd: &Command) {
    tracing::info!(
        chat_id = cmd.chat_id().0,
        user_id = cmd.from.id.0,
        "/{}",
        cmd.name
    );
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RosterCommand {
    Start,
    Everyone,
    Prune,
}

impl RosterCommand {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "everyone" => Some(Self::Everyone),
            "prune" => Some(Self::Prune),
            _ => None,
        }
    }
}

pub async fn handle_signup_command(msg: Message, state: Arc<SignupState>) -> ResponseResult<()> {
    let Some(cmd) = own_command(&msg, state.bot_username.as_deref()) else {
        return Ok(());
    };

    if cmd.name == "start" {
        log_command(&cmd);
        if let Err(e) = state.board.start(&cmd).await {
            tracing::error!(chat_id = cmd.chat_id().0, "/start failed: {e}");
        }
    }

    Ok(())
}

pub async fn handle_roster_command(msg: Message, state: Arc<RosterState>) -> ResponseResult<()> {
    let Some(cmd) = own_command(&msg, state.bot_username.as_deref()) else {
        return Ok(());
    };
    let Some(kind) = RosterCommand::parse(&cmd.name) else {
        return Ok(());
    };

    log_command(&cmd);
    let roster = &state.roster;
    let result = match kind {
        RosterCommand::Start => roster.start(&cmd).await,
        RosterCommand::Everyone => roster.everyone(&cmd).await,
        RosterCommand::Prune => roster.prune(&cmd).await.map(|_| ()),
    };

    if let Err(e) = result {
        tracing::error!(chat_id = cmd.chat_id().0, "/{} failed: {e}", cmd.name);
    }

    Ok(())
}
