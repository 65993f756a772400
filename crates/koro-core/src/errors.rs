use crate::provisioning::error::{AuthError, ProvisionError};

/// Core error type.
///
/// Adapter crates map their specific failures into this type so the
/// dispatcher can handle every branch consistently (user-facing reply vs
/// swallowed best-effort send). Nothing here is fatal; every variant is
/// resolved within the processing of a single inbound event.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid input: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, Error>;
