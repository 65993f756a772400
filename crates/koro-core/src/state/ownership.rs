use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{NumberSid, PhoneNumber, UserId};

#[derive(Default)]
struct OwnershipMaps {
    by_user: HashMap<UserId, Vec<(PhoneNumber, NumberSid)>>,
    owner_by_number: HashMap<PhoneNumber, UserId>,
}

/// Purchased-number ownership: a number maps to at most one owner at a time.
///
/// Records are created on successful purchase (or when the backend reports a
/// number as owned, via the delete listing) and removed only after the
/// backend confirms deletion.
#[derive(Default)]
pub struct NumberRegistry {
    inner: Mutex<OwnershipMaps>,
}

impl NumberRegistry {
    pub async fn record(&self, user: UserId, number: PhoneNumber, sid: NumberSid) {
        let mut maps = self.inner.lock().await;
        let owned = maps.by_user.entry(user).or_default();
        if !owned.iter().any(|(_, s)| *s == sid) {
            owned.push((number.clone(), sid));
        }
        maps.owner_by_number.insert(number, user);
    }

    pub async fn owner_of(&self, number: &PhoneNumber) -> Option<UserId> {
        self.inner.lock().await.owner_by_number.get(number).copied()
    }

    /// Does `user` hold an ownership record for `sid`?
    pub async fn owns(&self, user: UserId, sid: &NumberSid) -> bool {
        self.inner
            .lock()
            .await
            .by_user
            .get(&user)
            .map(|owned| owned.iter().any(|(_, s)| s == sid))
            .unwrap_or(false)
    }

    /// Remove the record for `(user, sid)`; returns the released number.
    pub async fn remove(&self, user: UserId, sid: &NumberSid) -> Option<PhoneNumber> {
        let mut maps = self.inner.lock().await;
        let owned = maps.by_user.get_mut(&user)?;
        let idx = owned.iter().position(|(_, s)| s == sid)?;
        let (number, _) = owned.remove(idx);
        maps.owner_by_number.remove(&number);
        Some(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> PhoneNumber {
        PhoneNumber(s.to_string())
    }

    #[tokio::test]
    async fn purchase_then_delete_round_trip() {
        let reg = NumberRegistry::default();
        let sid = NumberSid("PN1".into());
        reg.record(UserId(1), num("+14165551234"), sid.clone()).await;

        assert!(reg.owns(UserId(1), &sid).await);
        assert_eq!(reg.owner_of(&num("+14165551234")).await, Some(UserId(1)));

        let released = reg.remove(UserId(1), &sid).await;
        assert_eq!(released, Some(num("+14165551234")));
        assert!(!reg.owns(UserId(1), &sid).await);
        assert_eq!(reg.owner_of(&num("+14165551234")).await, None);
    }

    #[tokio::test]
    async fn other_users_records_are_invisible() {
        let reg = NumberRegistry::default();
        let sid = NumberSid("PN1".into());
        reg.record(UserId(1), num("+14165551234"), sid.clone()).await;

        assert!(!reg.owns(UserId(2), &sid).await);
        assert_eq!(reg.remove(UserId(2), &sid).await, None);
        assert!(reg.owns(UserId(1), &sid).await);
    }

    #[tokio::test]
    async fn recording_twice_does_not_duplicate() {
        let reg = NumberRegistry::default();
        let sid = NumberSid("PN1".into());
        reg.record(UserId(1), num("+14165551234"), sid.clone()).await;
        reg.record(UserId(1), num("+14165551234"), sid.clone()).await;

        assert_eq!(reg.remove(UserId(1), &sid).await, Some(num("+14165551234")));
        assert!(!reg.owns(UserId(1), &sid).await);
    }
}
