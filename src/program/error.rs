//! Error types for the field authority program module.

use thiserror::Error;

/// SDK-specific errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// RPC client error
    #[cfg(feature = "solana-rpc")]
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    /// Malformed or truncated bytes
    #[error("Decode error at byte {offset}: {reason}")]
    Decode { offset: usize, reason: String },

    /// An expected region, record, or account is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Field variant tag outside the known set
    #[error("Unknown field tag {tag} at byte {offset}")]
    UnknownFieldTag { tag: u8, offset: usize },

    /// Instruction data carries an unknown discriminator
    #[error("Unknown instruction discriminator: {discriminator}")]
    UnknownInstruction { discriminator: String },

    /// Invalid data length
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidDataLength { expected: usize, actual: usize },

    /// Derivation seed exceeds the per-seed limit
    #[error(
        "Seed \"{seed}\" is {len} bytes (max {max})",
        max = crate::program::constants::MAX_SEED_LEN
    )]
    SeedTooLong { seed: String, len: usize },

    /// Bump search exhausted without an off-curve address
    #[error("Unable to find a viable program address bump seed")]
    NoViableBump,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Length does not fit the target length field
    #[error("Arithmetic overflow")]
    Overflow,

    /// Rejected by the external program at execution time.
    ///
    /// The builders never produce this. Callers that submit the built
    /// instructions wrap the program's rejection in it.
    #[error("Execution rejected: {0}")]
    ExecutionRejected(String),

    /// Invalid configuration input
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SdkError {
    /// Shift the byte offset of positional errors by `base`.
    ///
    /// Used when a payload is decoded from a sub-slice of a larger buffer.
    pub fn at_offset(self, base: usize) -> Self {
        match self {
            SdkError::Decode { offset, reason } => SdkError::Decode {
                offset: offset + base,
                reason,
            },
            SdkError::UnknownFieldTag { tag, offset } => SdkError::UnknownFieldTag {
                tag,
                offset: offset + base,
            },
            other => other,
        }
    }

    /// Whether this is an absent-state error rather than corruption.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::NotFound(_))
    }
}

/// Result type alias for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;
