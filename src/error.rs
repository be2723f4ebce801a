//! Error taxonomy.
//!
//! Everything here is recoverable.  Gateway failures are caught where the
//! request completes and turned into a [`FeedError`] that lands in the
//! view's notice queue; nothing in the core can end the session.

use std::fmt;

use thiserror::Error;

/// Failure of a single gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway answered with status {status}")]
    Status { status: u16 },

    /// The post is gone, usually deleted by someone else.
    #[error("post not found")]
    NotFound,
}

/// Create was asked for with a missing field.  Caught before any request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("enter a name before posting")]
    MissingAuthor,

    #[error("enter a message before posting")]
    MissingBody,
}

/// Which user-level operation a request belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    Create,
    Delete,
    Like,
    Upload,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Refresh => "refresh",
            Operation::Create => "post",
            Operation::Delete => "delete",
            Operation::Like => "like",
            Operation::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// A recoverable problem surfaced to the rendering layer.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{op} failed: {source}")]
    Request {
        op: Operation,
        #[source]
        source: GatewayError,
    },

    #[error("image upload failed, post was not sent")]
    PostNotSent,

    #[error("could not read {path}: {source}")]
    ImageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FeedError {
    pub fn request(op: Operation, source: GatewayError) -> Self {
        FeedError::Request { op, source }
    }
}
