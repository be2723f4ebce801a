//! Remote feed gateway abstraction.
//!
//! This module defines the [`FeedGateway`] trait and the [`Post`] type.  The
//! HTTP implementation lives in [`http`]; tests use the scripted gateway in
//! `scripted`, which holds every call open until the test answers it.
//!
//! ## For contributors: talking to a different backend
//!
//! 1. Create a new file in this directory (e.g. `grpc.rs`).
//! 2. Define a struct holding the client/config and implement
//!    [`FeedGateway`] for it.
//! 3. Add `mod grpc;` below and re-export the struct.
//! 4. Construct it in `main.rs` instead of [`HttpGateway`].
//!
//! The sync core only ever sees `Arc<dyn FeedGateway>`.

mod http;
mod post;
#[cfg(test)]
pub mod scripted;

pub use http::HttpGateway;
pub use post::{ImagePayload, NewPost, Post, PostId};

use async_trait::async_trait;

use crate::error::GatewayError;

/// The six operations the client can ask of the remote feed.
///
/// Calls are independent: the core may have any number of them outstanding
/// at once and relies on nothing about their completion order.
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// Full snapshot of the feed.
    async fn list(&self) -> Result<Vec<Post>, GatewayError>;

    /// Snapshot filtered by `query`.
    async fn search(&self, query: &str) -> Result<Vec<Post>, GatewayError>;

    async fn create(&self, post: &NewPost) -> Result<(), GatewayError>;

    /// Deleting an already-deleted post is not an error on the gateway side,
    /// though it may answer [`GatewayError::NotFound`].
    async fn delete(&self, id: PostId) -> Result<(), GatewayError>;

    /// Increment the like counter and return the authoritative new count.
    async fn like(&self, id: PostId) -> Result<u64, GatewayError>;

    /// Store an image and return the reference to pass to [`create`](Self::create).
    async fn upload(&self, image: &ImagePayload) -> Result<String, GatewayError>;
}
