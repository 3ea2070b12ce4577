use thiserror::Error;

/// Error type for every wallet engine operation.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Malformed private key on import.
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Amount is zero, negative or not a number.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Recipient address is empty or malformed.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// No wallet is loaded in the store.
    #[error("No active wallet")]
    NoActiveWallet,

    /// Network failure, timeout, non-2xx status or malformed body.
    #[error("Node unavailable: {0}")]
    NodeUnavailable(String),

    /// The node does not expose block scanning.
    #[error("Node does not expose block listing")]
    BlocksUnsupported,

    /// The node answered with a structured rejection; carries its message verbatim.
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    /// Internal cryptographic failure.
    #[error("Signing failed: {0}")]
    SigningFailure(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl WalletError {
    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::NodeUnavailable(_))
    }

    /// Whether the error stems from user input that can be corrected and resubmitted.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            WalletError::InvalidKeyFormat(_)
                | WalletError::InvalidAmount(_)
                | WalletError::InvalidRecipient(_)
        )
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        WalletError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WalletError::NodeUnavailable(format!("request timed out: {}", err))
        } else {
            WalletError::NodeUnavailable(err.to_string())
        }
    }
}

impl From<toml::de::Error> for WalletError {
    fn from(err: toml::de::Error) -> Self {
        WalletError::ConfigError(err.to_string())
    }
}
