/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Identity of a user as reported by the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl UserProfile {
    /// First and last name joined by a space, skipping empty parts.
    pub fn full_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => String::new(),
        }
    }

    /// Name stored in the roster: full name, else username, else `user<id>`.
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if !full.is_empty() {
            return full;
        }
        self.username()
            .map(str::to_string)
            .unwrap_or_else(|| synthetic_name(self.id))
    }

    /// Name shown on the sign-up list: username, else full name, else `user<id>`.
    pub fn list_label(&self) -> String {
        if let Some(u) = self.username() {
            return u.to_string();
        }
        let full = self.full_name();
        if !full.is_empty() {
            return full;
        }
        synthetic_name(self.id)
    }

    /// Username with blank values treated as absent.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.trim().is_empty())
    }
}

pub fn synthetic_name(id: UserId) -> String {
    format!("user{}", id.0)
}

/// A user's status in a chat, as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Statuses that mean the user currently belongs to the chat.
    pub fn is_present(self) -> bool {
        matches!(
            self,
            MemberStatus::Member | MemberStatus::Creator | MemberStatus::Administrator
        )
    }

    /// Statuses that mean the user is no longer in the chat.
    pub fn is_gone(self) -> bool {
        matches!(self, MemberStatus::Left | MemberStatus::Kicked)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, MemberStatus::Creator | MemberStatus::Administrator)
    }
}
