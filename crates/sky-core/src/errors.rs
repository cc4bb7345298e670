use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// Bad input detected before any remote call was made.
    #[error("{0}")]
    LocalValidation(String),
    #[error("{operation} failed: {status} - {body}")]
    Remote {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("vault ID not found in API response")]
    VaultIdMissing,
    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
}

impl ProvisionError {
    pub fn local(message: impl Into<String>) -> Self {
        Self::LocalValidation(message.into())
    }

    pub fn remote(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Remote {
            operation,
            status,
            body: body.into(),
        }
    }

    pub fn transport(operation: &'static str, message: impl ToString) -> Self {
        Self::Transport {
            operation,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::LocalValidation(_))
    }
}
