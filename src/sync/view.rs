//! The renderable feed state.
//!
//! [`FeedView`] is what the rendering layer reads: the live snapshot, the
//! loading flag, the query text, the pending upload slot and the queue of
//! recoverable notices.  Only the session mutates it, and only from the
//! event loop, so no part of it is ever observed half-updated.

use std::collections::VecDeque;

use crate::error::FeedError;
use crate::gateway::{Post, PostId};

use super::coordinator::Generation;

/// Notices kept for the rendering layer; older ones fall off.
const MAX_NOTICES: usize = 16;

/// The single image slot between upload and post creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingUpload {
    #[default]
    Empty,
    /// An upload is in flight; the generation is its token.
    Uploading {
        token: Generation,
        file_name: String,
    },
    /// The gateway stored the image; the reference waits for the next post.
    Ready { path: String },
}

#[derive(Debug, Default)]
pub struct FeedView {
    posts: Vec<Post>,
    loading: bool,
    query: String,
    pending_upload: PendingUpload,
    notices: VecDeque<FeedError>,
}

impl FeedView {
    pub fn new() -> Self {
        Self::default()
    }

    // -- read side -----------------------------------------------------------

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn pending_upload(&self) -> &PendingUpload {
        &self.pending_upload
    }

    #[cfg(test)]
    pub fn notices(&self) -> impl Iterator<Item = &FeedError> {
        self.notices.iter()
    }

    /// Hand all queued notices to the caller.
    pub fn take_notices(&mut self) -> Vec<FeedError> {
        self.notices.drain(..).collect()
    }

    // -- mutation surface ----------------------------------------------------

    /// Replace the whole snapshot.  Only called with a response that passed
    /// the generation check.
    pub fn replace_snapshot(&mut self, posts: Vec<Post>) {
        self.posts = posts;
    }

    /// Set one post's like count to the gateway's value.
    ///
    /// Returns `false`, without error, when the post is no longer shown.
    pub fn apply_like_delta(&mut self, id: PostId, new_count: u64) -> bool {
        match self.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.likes = new_count;
                true
            }
            None => false,
        }
    }

    /// Remove a post.  Removing an absent post is a no-op.
    pub fn remove_post(&mut self, id: PostId) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        self.posts.len() != before
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Returns whether the text actually changed.
    pub fn set_query(&mut self, query: &str) -> bool {
        if self.query == query {
            return false;
        }
        self.query = query.to_string();
        true
    }

    pub fn set_pending_upload(&mut self, pending: PendingUpload) {
        self.pending_upload = pending;
    }

    /// Take a resolved image reference out of the slot, leaving it empty.
    /// An in-flight upload is left alone.
    pub fn take_ready_image(&mut self) -> Option<String> {
        match std::mem::take(&mut self.pending_upload) {
            PendingUpload::Ready { path } => Some(path),
            other => {
                self.pending_upload = other;
                None
            }
        }
    }

    pub fn push_notice(&mut self, notice: FeedError) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
