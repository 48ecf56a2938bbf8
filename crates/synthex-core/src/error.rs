use thiserror::Error;

/// Protocol-wide error types for the Synthex protocol.
///
/// Every variant aborts the operation that produced it; no operation leaves
/// partial state behind when it returns an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// A required price has not been refreshed within the staleness period.
    #[error("Stale rate: {0}")]
    StaleRate(String),

    /// The currency was never registered or has been removed.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Requested issuance exceeds the remaining issuable capacity.
    #[error("Insufficient issuable: {0}")]
    InsufficientIssuable(String),

    /// Requested burn exceeds what the caller owes.
    #[error("Insufficient debt: {0}")]
    InsufficientDebt(String),

    /// Requested debit exceeds what the caller holds.
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// The operation would round to a zero effect on the debt ledger.
    #[error("Zero effect: {0}")]
    ZeroEffect(String),

    /// A currency or a global switch is turned off.
    #[error("Disabled: {0}")]
    Disabled(String),

    /// The declared priority fee is above the configured ceiling.
    #[error("Priority fee exceeded: {0}")]
    PriorityFeeExceeded(String),

    /// The caller lacks the role required for the action.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Registration or removal conflicts with existing registry state.
    #[error("Duplicate or conflicting: {0}")]
    DuplicateOrConflicting(String),

    /// An oracle submission was malformed, replayed, or out of order.
    #[error("Invalid rate update: {0}")]
    InvalidRateUpdate(String),

    /// A configuration value or argument is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Fixed-point arithmetic left the representable range.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SynthError {
    fn from(e: serde_json::Error) -> Self {
        SynthError::Serialization(e.to_string())
    }
}
