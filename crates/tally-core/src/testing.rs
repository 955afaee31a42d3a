//! In-memory fakes of the messaging ports for unit tests.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{
    domain::{ChatId, MemberStatus, MessageId, MessageRef, UserId, UserProfile},
    errors::Error,
    messaging::{
        port::{ChatDirectory, MessagingPort},
        types::OutgoingMessage,
    },
    Result,
};

/// Unique SQLite file path under the system temp dir.
pub fn temp_db_path(prefix: &str) -> PathBuf {
    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let pid = std::process::id();
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let seq = SEQ.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("tally-{prefix}-{pid}-{ts}-{seq}.db"))
}

pub fn user(id: i64, first_name: &str) -> UserProfile {
    UserProfile {
        id: UserId(id),
        first_name: first_name.to_string(),
        last_name: None,
        username: None,
    }
}

#[derive(Clone, Debug)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub msg: OutgoingMessage,
    pub at: Instant,
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    sends: Mutex<Vec<SentMessage>>,
    edits: Mutex<Vec<(MessageRef, String)>>,
    pins: Mutex<Vec<MessageRef>>,
    fail_pin: AtomicBool,
    fail_edit: AtomicBool,
}

impl FakeMessenger {
    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(*guard),
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sends.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.msg.text).collect()
    }

    pub fn edits(&self) -> Vec<(MessageRef, String)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn pins(&self) -> Vec<MessageRef> {
        self.pins.lock().unwrap().clone()
    }

    pub fn fail_pin(&self) {
        self.fail_pin.store(true, Ordering::SeqCst);
    }

    pub fn fail_edit(&self) {
        self.fail_edit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send(&self, chat_id: ChatId, msg: OutgoingMessage) -> Result<MessageRef> {
        let sent = self.alloc(chat_id);
        self.sends.lock().unwrap().push(SentMessage {
            chat_id,
            msg,
            at: Instant::now(),
        });
        Ok(sent)
    }

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()> {
        if self.fail_edit.load(Ordering::SeqCst) {
            return Err(Error::External("message can't be edited".to_string()));
        }
        self.edits.lock().unwrap().push((msg, text.to_string()));
        Ok(())
    }

    async fn pin(&self, msg: MessageRef) -> Result<()> {
        if self.fail_pin.load(Ordering::SeqCst) {
            return Err(Error::External("not enough rights to pin".to_string()));
        }
        self.pins.lock().unwrap().push(msg);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    statuses: Mutex<HashMap<UserId, MemberStatus>>,
    admins: Mutex<Vec<UserProfile>>,
    fail_status: AtomicBool,
    fail_admins: AtomicBool,
}

impl FakeDirectory {
    pub fn set_status(&self, user_id: UserId, status: MemberStatus) {
        self.statuses.lock().unwrap().insert(user_id, status);
    }

    pub fn set_admins(&self, admins: Vec<UserProfile>) {
        *self.admins.lock().unwrap() = admins;
    }

    pub fn fail_status_lookup(&self) {
        self.fail_status.store(true, Ordering::SeqCst);
    }

    pub fn fail_admin_lookup(&self) {
        self.fail_admins.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatDirectory for FakeDirectory {
    async fn member_status(&self, _chat_id: ChatId, user_id: UserId) -> Result<MemberStatus> {
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(Error::External("chat not found".to_string()));
        }
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or(MemberStatus::Member))
    }

    async fn administrators(&self, _chat_id: ChatId) -> Result<Vec<UserProfile>> {
        if self.fail_admins.load(Ordering::SeqCst) {
            return Err(Error::External("chat not found".to_string()));
        }
        Ok(self.admins.lock().unwrap().clone())
    }
}
