use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{AreaCode, NumberSid, PhoneNumber},
    provisioning::error::{AccountStatus, AuthError, ProvisionError},
    Result,
};

/// A number currently owned by the provisioning account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedNumber {
    pub number: PhoneNumber,
    pub sid: NumberSid,
}

/// Entry point for the provisioning backend: turn credentials into an
/// account handle, verifying them in the process.
#[async_trait]
pub trait ProvisioningBackend: Send + Sync {
    async fn connect(
        &self,
        account_sid: &str,
        auth_token: &str,
    ) -> std::result::Result<Arc<dyn ProvisioningAccount>, AuthError>;
}

/// Operations on one authenticated provisioning account.
///
/// Every method is a suspension point; callers must not hold registry locks
/// across these awaits.
#[async_trait]
pub trait ProvisioningAccount: Send + Sync {
    /// Current balance, formatted by the backend (e.g. `"12.34"`).
    async fn balance(&self) -> Result<String>;

    async fn account_status(&self) -> Result<AccountStatus>;

    async fn search_local(&self, area_code: &AreaCode, country: &str)
        -> Result<Vec<PhoneNumber>>;

    async fn purchase(
        &self,
        number: &PhoneNumber,
    ) -> std::result::Result<NumberSid, ProvisionError>;

    async fn release(&self, sid: &NumberSid) -> std::result::Result<(), ProvisionError>;

    async fn list_owned(&self) -> Result<Vec<OwnedNumber>>;
}
