use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{domain::UserId, provisioning::port::ProvisioningAccount};

/// One authenticated provisioning session.
#[derive(Clone)]
pub struct Session {
    pub user: UserId,
    pub account_sid: String,
    pub account: Arc<dyn ProvisioningAccount>,
}

/// Single source of truth for "is this user logged in".
///
/// At most one session per user; a later insert replaces the earlier one
/// (last write wins). Credential verification happens before `insert` is
/// called, at the dispatcher's login branch.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<UserId, Session>>,
}

impl SessionRegistry {
    pub async fn insert(&self, session: Session) {
        self.inner.lock().await.insert(session.user, session);
    }

    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.inner.lock().await.get(&user).cloned()
    }

    pub async fn remove(&self, user: UserId) -> Option<Session> {
        self.inner.lock().await.remove(&user)
    }

    pub async fn contains(&self, user: UserId) -> bool {
        self.inner.lock().await.contains_key(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{AreaCode, NumberSid, PhoneNumber},
        provisioning::error::{AccountStatus, ProvisionError},
        provisioning::port::OwnedNumber,
        Result,
    };
    use async_trait::async_trait;

    struct NullAccount;

    #[async_trait]
    impl ProvisioningAccount for NullAccount {
        async fn balance(&self) -> Result<String> {
            Ok("0.00".into())
        }
        async fn account_status(&self) -> Result<AccountStatus> {
            Ok(AccountStatus::Active)
        }
        async fn search_local(
            &self,
            _area_code: &AreaCode,
            _country: &str,
        ) -> Result<Vec<PhoneNumber>> {
            Ok(vec![])
        }
        async fn purchase(
            &self,
            _number: &PhoneNumber,
        ) -> std::result::Result<NumberSid, ProvisionError> {
            Err(ProvisionError::NumberUnavailable)
        }
        async fn release(&self, _sid: &NumberSid) -> std::result::Result<(), ProvisionError> {
            Ok(())
        }
        async fn list_owned(&self) -> Result<Vec<OwnedNumber>> {
            Ok(vec![])
        }
    }

    fn session(user: i64, sid: &str) -> Session {
        Session {
            user: UserId(user),
            account_sid: sid.to_string(),
            account: Arc::new(NullAccount),
        }
    }

    #[tokio::test]
    async fn at_most_one_session_per_user() {
        let reg = SessionRegistry::default();
        reg.insert(session(1, "AC-first")).await;
        reg.insert(session(1, "AC-second")).await;

        let got = reg.get(UserId(1)).await.unwrap();
        assert_eq!(got.account_sid, "AC-second");
    }

    #[tokio::test]
    async fn remove_then_get_is_absent() {
        let reg = SessionRegistry::default();
        reg.insert(session(1, "AC")).await;
        assert!(reg.remove(UserId(1)).await.is_some());
        assert!(reg.get(UserId(1)).await.is_none());
        assert!(!reg.contains(UserId(1)).await);
    }

    #[tokio::test]
    async fn users_do_not_interfere() {
        let reg = SessionRegistry::default();
        reg.insert(session(1, "AC-one")).await;
        reg.insert(session(2, "AC-two")).await;
        reg.remove(UserId(1)).await;
        assert!(reg.get(UserId(2)).await.is_some());
    }
}
