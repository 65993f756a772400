//! Error taxonomy for the provisioning backend.
//!
//! Every variant is recoverable: it is reported to the user and no core
//! state is mutated on its behalf.

/// Credential verification failure (login path).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("wrong SID or auth token")]
    InvalidCredentials,

    #[error("account is suspended")]
    Suspended,

    #[error("connection failed: {0}")]
    Connection(String),
}

/// Classified purchase/release failure.
///
/// The `Display` strings are user-facing; handlers send them verbatim.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    #[error("this number is no longer available, try another one")]
    NumberUnavailable,

    #[error("too many requests, wait a minute and try again")]
    RateLimited,

    #[error("insufficient account balance")]
    InsufficientBalance,

    #[error("account is suspended")]
    AccountSuspended,

    #[error("invalid number format")]
    InvalidNumber,

    #[error("trial accounts cannot purchase numbers")]
    TrialAccount,

    #[error("no geographic permission for this country")]
    GeographicRestriction,

    #[error("this number type is not supported")]
    UnsupportedType,

    #[error("account is not verified")]
    AccountNotVerified,

    #[error("authentication failed, log out and log in again")]
    Auth,

    #[error("{0}")]
    Other(String),
}

/// Provisioning-account lifecycle status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Suspended,
    Closed,
    Other(String),
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => f.write_str("✅ Account Status: Active"),
            AccountStatus::Suspended => f.write_str("⚠️ Account Status: Suspended"),
            AccountStatus::Closed => f.write_str("❌ Account Status: Closed"),
            AccountStatus::Other(s) => write!(f, "ℹ️ Account Status: {s}"),
        }
    }
}
