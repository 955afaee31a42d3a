//! Membership roster: presence tracking and the admin-only `/everyone` and
//! `/prune` commands.

use std::sync::Arc;

use tokio::time::sleep;

use crate::{
    config::{BATCH_DELAY, BATCH_SIZE, STALE_DAYS},
    domain::{ChatId, MessageRef, UserProfile},
    errors::{BestEffort, Error},
    formatting::{join_batches, mention_html},
    messaging::{
        port::{ChatDirectory, MessagingPort},
        types::{ChatMemberNotice, Command, OutgoingMessage},
    },
    security::{check_admin, AdminCheck},
    store::{MembershipStore, PruneReport},
    Result,
};

pub const START_TEXT: &str =
    "I will record users who send messages or trigger membership changes. Admins can use /everyone.";
pub const EVERYONE_DENIED: &str = "Only group admins can use /everyone.";
pub const PRUNE_DENIED: &str = "Only group admins can run /prune.";
pub const NO_MEMBERS: &str = "No known members. The bot hasn't seen anyone yet.";

/// What a membership notice did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipAction {
    Upserted,
    Removed,
    Ignored,
}

pub struct RosterService {
    store: MembershipStore,
    messenger: Arc<dyn MessagingPort>,
    directory: Arc<dyn ChatDirectory>,
}

impl RosterService {
    pub fn new(
        store: MembershipStore,
        messenger: Arc<dyn MessagingPort>,
        directory: Arc<dyn ChatDirectory>,
    ) -> Self {
        Self {
            store,
            messenger,
            directory,
        }
    }

    pub fn store(&self) -> &MembershipStore {
        &self.store
    }

    /// Run a store operation on the blocking pool.
    async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&MembershipStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| Error::External(format!("store task failed: {e}")))?
    }

    // ============== Ingest ==============

    /// Refresh the sender's presence. Messages without a sender are skipped.
    pub async fn record_sender(
        &self,
        chat_id: ChatId,
        sender: Option<&UserProfile>,
    ) -> Result<bool> {
        let Some(sender) = sender.cloned() else {
            return Ok(false);
        };
        self.with_store(move |s| s.upsert_membership(chat_id, &sender))
            .await?;
        Ok(true)
    }

    pub async fn apply_member_notice(&self, notice: ChatMemberNotice) -> Result<MembershipAction> {
        let change = notice.into_change();
        let chat_id = change.chat_id;

        if change.status.is_present() {
            let user = change.user;
            self.with_store(move |s| s.upsert_membership(chat_id, &user))
                .await?;
            return Ok(MembershipAction::Upserted);
        }

        if change.status.is_gone() {
            let user_id = change.user.id;
            self.with_store(move |s| s.remove_membership(chat_id, user_id))
                .await?;
            return Ok(MembershipAction::Removed);
        }

        Ok(MembershipAction::Ignored)
    }

    // ============== Commands ==============

    pub async fn start(&self, cmd: &Command) -> Result<()> {
        self.reply(cmd, START_TEXT).await?;
        Ok(())
    }

    /// Mention every known member of the chat, in paced batches.
    pub async fn everyone(&self, cmd: &Command) -> Result<()> {
        if !self.authorize(cmd, EVERYONE_DENIED).await? {
            return Ok(());
        }

        let chat_id = cmd.chat_id();
        if let BestEffort::Skipped(e) = self.sync_admins(chat_id).await {
            tracing::debug!(chat_id = chat_id.0, "admin list refresh skipped: {e}");
        }

        let members = self
            .with_store(move |s| s.get_members_by_chat(chat_id))
            .await?;
        if members.is_empty() {
            self.reply(cmd, NO_MEMBERS).await?;
            return Ok(());
        }

        let mentions: Vec<String> = members
            .iter()
            .map(|m| mention_html(m.user_id, &m.mention_name()))
            .collect();
        let batches = join_batches(&mentions, BATCH_SIZE);
        tracing::info!(
            chat_id = chat_id.0,
            members = members.len(),
            batches = batches.len(),
            "broadcasting mentions"
        );

        for (i, batch) in batches.into_iter().enumerate() {
            if i > 0 {
                sleep(BATCH_DELAY).await;
            }
            let msg = OutgoingMessage::html(batch)
                .reply_to(cmd.message.message_id)
                .without_link_preview();
            self.messenger.send(chat_id, msg).await?;
        }
        Ok(())
    }

    pub async fn prune(&self, cmd: &Command) -> Result<Option<PruneReport>> {
        if !self.authorize(cmd, PRUNE_DENIED).await? {
            return Ok(None);
        }

        let report = self.with_store(|s| s.prune_stale(STALE_DAYS)).await?;
        tracing::info!(
            chat_id = cmd.chat_id().0,
            memberships = report.memberships_removed,
            users = report.users_removed,
            "pruned stale entries"
        );
        self.reply(cmd, &format!("Pruned entries older than {STALE_DAYS} days."))
            .await?;
        Ok(Some(report))
    }

    /// Returns `true` when the invoker may proceed. A failed role lookup
    /// stops without any reply; an insufficient role gets `rejection`.
    async fn authorize(&self, cmd: &Command, rejection: &str) -> Result<bool> {
        let chat_id = cmd.chat_id();
        match check_admin(self.directory.as_ref(), chat_id, cmd.from.id).await {
            AdminCheck::Allowed => Ok(true),
            AdminCheck::Denied => {
                tracing::info!(
                    chat_id = chat_id.0,
                    user_id = cmd.from.id.0,
                    command = %cmd.name,
                    "rejected non-admin"
                );
                self.reply(cmd, rejection).await?;
                Ok(false)
            }
            AdminCheck::Unavailable => Ok(false),
        }
    }

    /// Make sure current admins are mentionable even if they never spoke.
    async fn sync_admins(&self, chat_id: ChatId) -> BestEffort<usize> {
        let result: Result<usize> = async {
            let admins = self.directory.administrators(chat_id).await?;
            let count = admins.len();
            self.with_store(move |s| {
                for admin in &admins {
                    s.upsert_membership(chat_id, admin)?;
                }
                Ok(())
            })
            .await?;
            Ok(count)
        }
        .await;
        result.into()
    }

    async fn reply(&self, cmd: &Command, text: &str) -> Result<MessageRef> {
        self.messenger
            .send(
                cmd.chat_id(),
                OutgoingMessage::plain(text).reply_to(cmd.message.message_id),
            )
            .await
    }
}
