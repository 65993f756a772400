use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{AreaCode, MessageRef, UserId};

/// Which multi-turn flow is awaiting this user's next input.
///
/// Absence of an entry means no active flow. At most one variant is active
/// per user; setting a new one supersedes the old.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    AwaitingAreaCode,
    AwaitingBroadcastText,
    AwaitingBanId,
    AwaitingUnbanId,
}

/// Per-user transient flow state plus "last used area code" memory.
#[derive(Default)]
pub struct WorkflowStore {
    states: Mutex<HashMap<UserId, WorkflowState>>,
    last_area: Mutex<HashMap<UserId, AreaCode>>,
}

impl WorkflowStore {
    pub async fn set(&self, user: UserId, state: WorkflowState) {
        self.states.lock().await.insert(user, state);
    }

    pub async fn get(&self, user: UserId) -> Option<WorkflowState> {
        self.states.lock().await.get(&user).cloned()
    }

    /// Consume the pending state: the follow-up input is processed exactly
    /// once, whatever its outcome.
    pub async fn take(&self, user: UserId) -> Option<WorkflowState> {
        self.states.lock().await.remove(&user)
    }

    pub async fn clear(&self, user: UserId) {
        self.states.lock().await.remove(&user);
    }

    pub async fn remember_area(&self, user: UserId, area: AreaCode) {
        self.last_area.lock().await.insert(user, area);
    }

    pub async fn last_area(&self, user: UserId) -> Option<AreaCode> {
        self.last_area.lock().await.get(&user).cloned()
    }

    pub async fn forget_user(&self, user: UserId) {
        self.states.lock().await.remove(&user);
        self.last_area.lock().await.remove(&user);
    }
}

/// Live "need more numbers?" prompt handles, per user.
///
/// Invariant: before a new listing batch renders, all previously tracked
/// handles are swapped out (and deleted best-effort by the caller), so only
/// one live batch exists per user at a time.
#[derive(Default)]
pub struct RefreshBatches {
    inner: Mutex<HashMap<UserId, Vec<MessageRef>>>,
}

impl RefreshBatches {
    /// Atomically take every tracked handle for this user.
    pub async fn take_all(&self, user: UserId) -> Vec<MessageRef> {
        self.inner.lock().await.remove(&user).unwrap_or_default()
    }

    pub async fn track(&self, user: UserId, msg: MessageRef) {
        self.inner.lock().await.entry(user).or_default().push(msg);
    }

    pub async fn clear(&self, user: UserId) {
        self.inner.lock().await.remove(&user);
    }

    /// Snapshot of the currently tracked handles (reporting/tests).
    pub async fn tracked(&self, user: UserId) -> Vec<MessageRef> {
        self.inner.lock().await.get(&user).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, MessageId};

    fn msg(id: i32) -> MessageRef {
        MessageRef {
            chat_id: ChatId(10),
            message_id: MessageId(id),
        }
    }

    #[tokio::test]
    async fn take_consumes_exactly_once() {
        let store = WorkflowStore::default();
        store.set(UserId(1), WorkflowState::AwaitingAreaCode).await;

        assert_eq!(
            store.take(UserId(1)).await,
            Some(WorkflowState::AwaitingAreaCode)
        );
        assert_eq!(store.take(UserId(1)).await, None);
    }

    #[tokio::test]
    async fn newer_state_supersedes() {
        let store = WorkflowStore::default();
        store.set(UserId(1), WorkflowState::AwaitingAreaCode).await;
        store.set(UserId(1), WorkflowState::AwaitingBanId).await;
        assert_eq!(
            store.get(UserId(1)).await,
            Some(WorkflowState::AwaitingBanId)
        );
    }

    #[tokio::test]
    async fn forget_user_drops_state_and_area_memory() {
        let store = WorkflowStore::default();
        store.set(UserId(1), WorkflowState::AwaitingAreaCode).await;
        store.remember_area(UserId(1), AreaCode("416".into())).await;

        store.forget_user(UserId(1)).await;

        assert_eq!(store.get(UserId(1)).await, None);
        assert_eq!(store.last_area(UserId(1)).await, None);
    }

    #[tokio::test]
    async fn take_all_empties_the_batch() {
        let batches = RefreshBatches::default();
        batches.track(UserId(1), msg(1)).await;
        batches.track(UserId(1), msg(2)).await;

        let taken = batches.take_all(UserId(1)).await;
        assert_eq!(taken.len(), 2);
        assert!(batches.take_all(UserId(1)).await.is_empty());
    }
}
