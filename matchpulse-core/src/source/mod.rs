//! Where snapshots come from.
//!
//! The poller only sees the [`SnapshotSource`] trait. The agent wires an
//! [`HttpSnapshotSource`] wrapped in a [`CachedSource`]; tests script their
//! own implementations.

mod cached;
mod http;

pub use cached::CachedSource;
pub use http::HttpSnapshotSource;

use async_trait::async_trait;
use matchpulse_sdk::client::ClientError;
use matchpulse_sdk::objects::Snapshot;
use thiserror::Error;

/// Whether a fetch may be answered from a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Cached,
    /// Bypass local caches and ask intermediaries to revalidate.
    Force,
}

#[derive(Debug, Error)]
pub enum SourceError {
    /// Upstream asked us to slow down. Not counted as a failure.
    #[error("Rate limit")]
    RateLimited,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed snapshot: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SourceError::RateLimited)
    }
}

impl From<ClientError> for SourceError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::RateLimited => SourceError::RateLimited,
            ClientError::Api { status, body } => SourceError::Status {
                status: status.as_u16(),
                body,
            },
            ClientError::Json(e) => SourceError::Decode(e.to_string()),
            ClientError::Http(e) if e.is_decode() => SourceError::Decode(e.to_string()),
            ClientError::Http(e) => SourceError::Transport(e.to_string()),
            ClientError::Url(e) => SourceError::Transport(e.to_string()),
        }
    }
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, mode: FetchMode) -> Result<Snapshot, SourceError>;
}
