//! Telegram HTML helpers (escaping, user mentions, batching).

use crate::domain::UserId;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Link that notifies a user by numeric id, whatever their current name is.
pub fn mention_html(user_id: UserId, name: &str) -> String {
    format!(
        r#"<a href="tg://user?id={}">{}</a>"#,
        user_id.0,
        escape_html(name)
    )
}

/// Group mentions into messages of at most `batch_size` mentions each,
/// space-separated, preserving order.
pub fn join_batches(mentions: &[String], batch_size: usize) -> Vec<String> {
    mentions
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}
