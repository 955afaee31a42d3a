use std::sync::Arc;

use teloxide::prelude::*;

use tally_core::{domain::ChatId, messaging::types::ChatMemberNotice};

use crate::convert::profile_from;
use crate::router::RosterState;

/// Any non-command message refreshes the sender's last-seen time.
pub async fn record_sender(msg: Message, state: Arc<RosterState>) -> ResponseResult<()> {
    let chat_id = ChatId(msg.chat.id.0);
    let sender = match msg.from().map(profile_from).transpose() {
        Ok(sender) => sender,
        Err(e) => {
            tracing::warn!(chat_id = chat_id.0, "skipping sender: {e}");
            return Ok(());
        }
    };

    if let Err(e) = state.roster.record_sender(chat_id, sender.as_ref()).await {
        tracing::error!(chat_id = chat_id.0, "failed to record sender: {e}");
    }
    Ok(())
}

pub async fn apply_notice(notice: ChatMemberNotice, state: Arc<RosterState>) -> ResponseResult<()> {
    let change = notice.clone().into_change();
    match state.roster.apply_member_notice(notice).await {
        Ok(action) => tracing::debug!(
            chat_id = change.chat_id.0,
            user_id = change.user.id.0,
            status = ?change.status,
            ?action,
            "membership update"
        ),
        Err(e) => tracing::error!(
            chat_id = change.chat_id.0,
            user_id = change.user.id.0,
            "failed to apply membership update: {e}"
        ),
    }
    Ok(())
}
