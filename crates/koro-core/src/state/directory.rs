use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::UserId;

/// One user the bot has ever seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub user: UserId,
    pub handle: String,
    pub first_seen: DateTime<Utc>,
}

/// Append-only-by-first-sight registry of every user who has interacted.
///
/// The first observation wins the `first_seen` timestamp; later observations
/// only refresh the handle (users rename themselves).
#[derive(Default)]
pub struct UserDirectory {
    // BTreeMap keeps admin listings in stable id order.
    inner: Mutex<BTreeMap<UserId, DirectoryEntry>>,
}

/// Derive the synthetic handle for users without one.
pub fn synthetic_handle(user: UserId) -> String {
    format!("user{}", user.0)
}

impl UserDirectory {
    /// Record an observation of `user`. Returns the entry's handle.
    pub async fn observe(&self, user: UserId, handle: Option<&str>) -> String {
        let mut map = self.inner.lock().await;
        match map.get_mut(&user) {
            Some(entry) => {
                if let Some(h) = handle {
                    entry.handle = h.to_string();
                }
                entry.handle.clone()
            }
            None => {
                let handle = handle
                    .map(str::to_string)
                    .unwrap_or_else(|| synthetic_handle(user));
                map.insert(
                    user,
                    DirectoryEntry {
                        user,
                        handle: handle.clone(),
                        first_seen: Utc::now(),
                    },
                );
                handle
            }
        }
    }

    pub async fn contains(&self, user: UserId) -> bool {
        self.inner.lock().await.contains_key(&user)
    }

    pub async fn handle_of(&self, user: UserId) -> String {
        self.inner
            .lock()
            .await
            .get(&user)
            .map(|e| e.handle.clone())
            .unwrap_or_else(|| synthetic_handle(user))
    }

    pub async fn snapshot(&self) -> Vec<DirectoryEntry> {
        self.inner.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Mutable set of banned user ids.
///
/// The administrator id is un-bannable; that rule lives in the admin flow,
/// which is the only writer.
#[derive(Default)]
pub struct BanSet {
    inner: Mutex<HashSet<UserId>>,
}

impl BanSet {
    /// Returns false if the user was already banned.
    pub async fn ban(&self, user: UserId) -> bool {
        self.inner.lock().await.insert(user)
    }

    /// Returns false if the user was not banned.
    pub async fn unban(&self, user: UserId) -> bool {
        self.inner.lock().await.remove(&user)
    }

    pub async fn contains(&self, user: UserId) -> bool {
        self.inner.lock().await.contains(&user)
    }

    pub async fn snapshot(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.inner.lock().await.iter().copied().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_observation_wins_first_seen() {
        let dir = UserDirectory::default();
        dir.observe(UserId(1), Some("alice")).await;
        let before = dir.snapshot().await[0].first_seen;

        dir.observe(UserId(1), Some("alice_renamed")).await;
        let after = dir.snapshot().await;

        assert_eq!(after.len(), 1);
        assert_eq!(after[0].first_seen, before);
        assert_eq!(after[0].handle, "alice_renamed");
    }

    #[tokio::test]
    async fn missing_handle_gets_synthetic_one() {
        let dir = UserDirectory::default();
        let handle = dir.observe(UserId(42), None).await;
        assert_eq!(handle, "user42");
    }

    #[tokio::test]
    async fn ban_and_unban_report_prior_membership() {
        let bans = BanSet::default();
        assert!(bans.ban(UserId(1)).await);
        assert!(!bans.ban(UserId(1)).await);
        assert!(bans.contains(UserId(1)).await);
        assert!(bans.unban(UserId(1)).await);
        assert!(!bans.unban(UserId(1)).await);
    }
}
