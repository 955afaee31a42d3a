use std::sync::Arc;

use teloxide::prelude::*;

use crate::convert::text_message;
use crate::router::SignupState;

pub async fn handle_reply(msg: Message, state: Arc<SignupState>) -> ResponseResult<()> {
    let text = match text_message(&msg) {
        Ok(Some(text)) => text,
        Ok(None) => return Ok(()),
        Err(e) => {
            tracing::warn!(chat_id = msg.chat.id.0, "skipping reply: {e}");
            return Ok(());
        }
    };

    match state.board.handle_reply(&text).await {
        Ok(true) => tracing::info!(
            chat_id = text.message.chat_id.0,
            user_id = text.from.as_ref().map(|u| u.id.0),
            "added to list"
        ),
        Ok(false) => {}
        Err(e) => tracing::error!(chat_id = text.message.chat_id.0, "reply handling failed: {e}"),
    }
    Ok(())
}
