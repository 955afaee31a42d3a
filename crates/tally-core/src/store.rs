//! SQLite membership store for the roster bot.
//!
//! Tracks which users have been seen in which chats (`membership`) and the
//! last known identity of each user (`users`). Every operation opens its own
//! connection and drops it before returning, so nothing is held between
//! calls; separate operations are separate commits.

use std::{fs, path::PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::{
    domain::{ChatId, UserId, UserProfile},
    Result,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Current unix time in seconds.
pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

/// Identity row as stored.
#[cfg(test)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: UserId,
    pub name: String,
    /// Empty when the user has no username.
    pub username: String,
    pub updated_at: i64,
}

/// A membership joined with the member's identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRow {
    pub user_id: UserId,
    pub name: String,
    pub username: String,
    pub first_seen: i64,
    pub last_seen: i64,
}

impl MemberRow {
    /// Name used when mentioning this member: stored name, else username,
    /// else `user<id>`.
    pub fn mention_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        if !self.username.trim().is_empty() {
            return self.username.clone();
        }
        crate::domain::synthetic_name(self.user_id)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub memberships_removed: usize,
    pub users_removed: usize,
}

#[derive(Clone, Debug)]
pub struct MembershipStore {
    path: PathBuf,
}

impl MembershipStore {
    /// Open (creating if needed) the database at `path` and ensure the schema.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let store = Self { path };
        store.create_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(conn)
    }

    fn create_schema(&self) -> Result<()> {
        self.connect()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                user_id    INTEGER PRIMARY KEY,
                name       TEXT,
                username   TEXT,
                updated_at INTEGER
            );

            CREATE TABLE IF NOT EXISTS membership (
                chat_id    INTEGER,
                user_id    INTEGER,
                first_seen INTEGER,
                last_seen  INTEGER,
                PRIMARY KEY(chat_id, user_id),
                FOREIGN KEY(user_id) REFERENCES users(user_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_membership_chat ON membership(chat_id);
            ",
        )?;
        Ok(())
    }

    pub fn upsert_user(&self, user: &UserProfile) -> Result<()> {
        self.upsert_user_at(user, now_ts())
    }

    pub fn upsert_user_at(&self, user: &UserProfile, now: i64) -> Result<()> {
        self.connect()?.execute(
            "INSERT INTO users(user_id, name, username, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                username = excluded.username,
                updated_at = excluded.updated_at",
            params![
                user.id.0,
                user.display_name(),
                user.username().unwrap_or(""),
                now
            ],
        )?;
        Ok(())
    }

    /// Mark `user` as present in `chat_id`.
    ///
    /// first_seen is only written on insert; later calls move last_seen.
    pub fn upsert_membership(&self, chat_id: ChatId, user: &UserProfile) -> Result<()> {
        self.upsert_membership_at(chat_id, user, now_ts())
    }

    pub fn upsert_membership_at(
        &self,
        chat_id: ChatId,
        user: &UserProfile,
        now: i64,
    ) -> Result<()> {
        self.upsert_user_at(user, now)?;
        self.connect()?.execute(
            "INSERT INTO membership(chat_id, user_id, first_seen, last_seen)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(chat_id, user_id) DO UPDATE SET
                last_seen = excluded.last_seen",
            params![chat_id.0, user.id.0, now],
        )?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn remove_membership(&self, chat_id: ChatId, user_id: UserId) -> Result<bool> {
        let removed = self.connect()?.execute(
            "DELETE FROM membership WHERE chat_id = ?1 AND user_id = ?2",
            params![chat_id.0, user_id.0],
        )?;
        Ok(removed > 0)
    }

    /// Members of `chat_id`, most recently seen first.
    pub fn get_members_by_chat(&self, chat_id: ChatId) -> Result<Vec<MemberRow>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT m.user_id, u.name, u.username, m.first_seen, m.last_seen
             FROM membership m
             JOIN users u ON u.user_id = m.user_id
             WHERE m.chat_id = ?1
             ORDER BY m.last_seen DESC, m.user_id ASC",
        )?;
        let rows = stmt
            .query_map(params![chat_id.0], |row| {
                Ok(MemberRow {
                    user_id: UserId(row.get(0)?),
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    username: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    first_seen: row.get(3)?,
                    last_seen: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    #[cfg(test)]
    pub(crate) fn get_user(&self, user_id: UserId) -> Result<Option<UserRow>> {
        use rusqlite::OptionalExtension;

        let row = self
            .connect()?
            .query_row(
                "SELECT user_id, name, username, updated_at FROM users WHERE user_id = ?1",
                params![user_id.0],
                |row| {
                    Ok(UserRow {
                        user_id: UserId(row.get(0)?),
                        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        username: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Remove memberships not seen for `threshold_days`, then users that no
    /// longer belong to any chat.
    pub fn prune_stale(&self, threshold_days: u32) -> Result<PruneReport> {
        self.prune_stale_at(threshold_days, now_ts())
    }

    pub fn prune_stale_at(&self, threshold_days: u32, now: i64) -> Result<PruneReport> {
        let cutoff = now - i64::from(threshold_days) * SECONDS_PER_DAY;
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let memberships_removed =
            tx.execute("DELETE FROM membership WHERE last_seen < ?1", params![cutoff])?;
        let users_removed = tx.execute(
            "DELETE FROM users WHERE user_id NOT IN (SELECT DISTINCT user_id FROM membership)",
            [],
        )?;
        tx.commit()?;
        Ok(PruneReport {
            memberships_removed,
            users_removed,
        })
    }
}
