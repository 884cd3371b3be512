/// Unified error types for did:nft resolution
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main error type for the resolver
///
/// `Config` is only ever surfaced at resolver construction; every other
/// variant is caught at the dispatch boundary and converted into the
/// resolution-result error envelope.
#[derive(Error, Debug)]
pub enum NftError {
    /// Invalid resolver configuration (fatal at construction)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Identifier does not match the did:nft grammar
    #[error("Malformed did:nft identifier: {0}")]
    MalformedIdentifier(String),

    /// Identifier references a chain absent from configuration
    #[error("Chain {0} is not configured")]
    ChainNotConfigured(String),

    /// Requested historical time predates the chain's known history
    #[error("No block found at or before {0}")]
    NoBlockBeforeTimestamp(DateTime<Utc>),

    /// No current or historical owner for the asset
    #[error("No owner found for token {token_id} on contract {contract}")]
    OwnerNotFound { contract: String, token_id: String },

    /// The underlying indexer call failed or returned a malformed payload
    #[error("Indexer transport error: {0}")]
    Transport(String),

    /// Requested content type cannot be produced
    #[error("Representation not supported: {0}")]
    RepresentationNotSupported(String),
}

impl From<reqwest::Error> for NftError {
    fn from(err: reqwest::Error) -> Self {
        NftError::Transport(err.to_string())
    }
}

/// Result type alias for resolver operations
pub type NftResult<T> = Result<T, NftError>;
