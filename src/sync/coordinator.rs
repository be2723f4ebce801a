//! Request coordination.
//!
//! Every gateway call is issued on a [`Stream`] and tagged with a
//! [`Generation`].  The call runs as its own task and reports back over a
//! channel; when its [`Completion`] is received, [`Coordinator::accept`]
//! decides whether it is still the newest request on its stream.  Anything
//! older is stale and gets dropped, no matter when it arrives.
//!
//! Generations come from a single counter, so they are unique for the whole
//! session and strictly increasing on every stream.  That lets keyed streams
//! (one per post) be forgotten once they settle: a straggler from a
//! forgotten stream finds no current generation and is discarded too.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::{Post, PostId};

/// A channel of related requests whose results are ordered by issue, not
/// by arrival.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stream {
    /// List and search share one stream: whatever was asked last wins.
    Feed,
    /// Each create is its own stream, so creates never supersede each other.
    Create(u64),
    Delete(PostId),
    Like(PostId),
    Upload,
}

impl Stream {
    /// Keyed streams are dropped from the table once their current request
    /// settles.
    fn is_keyed(&self) -> bool {
        matches!(self, Stream::Create(_) | Stream::Delete(_) | Stream::Like(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub(super) u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The typed result of one gateway call.
#[derive(Debug)]
pub enum Outcome {
    Feed(Result<Vec<Post>, GatewayError>),
    /// A create result, carrying the image reference it was sent with so a
    /// failure can hand it back.
    Created {
        image: Option<String>,
        result: Result<(), GatewayError>,
    },
    Deleted {
        id: PostId,
        result: Result<(), GatewayError>,
    },
    Liked {
        id: PostId,
        result: Result<u64, GatewayError>,
    },
    Uploaded(Result<String, GatewayError>),
}

/// A finished request, as delivered to the session.
#[derive(Debug)]
pub struct Completion {
    pub stream: Stream,
    pub generation: Generation,
    pub outcome: Outcome,
}

pub struct Coordinator {
    next: u64,
    current: HashMap<Stream, Generation>,
    tasks: JoinSet<()>,
    tx: mpsc::UnboundedSender<Completion>,
}

impl Coordinator {
    /// Create a coordinator and the receiving end of its completion channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            next: 0,
            current: HashMap::new(),
            tasks: JoinSet::new(),
            tx,
        };
        (coordinator, rx)
    }

    /// Start `request` on `stream` and return its generation immediately.
    ///
    /// Any request already outstanding on the stream keeps running but is
    /// superseded: its completion will be discarded by [`accept`](Self::accept).
    pub fn issue<F>(&mut self, stream: Stream, request: F) -> Generation
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        // Reap finished tasks so the set does not grow for the whole session.
        while self.tasks.try_join_next().is_some() {}

        let generation = self.supersede(stream.clone());
        let tx = self.tx.clone();
        debug!(?stream, %generation, "issuing request");

        self.tasks.spawn(async move {
            let outcome = request.await;
            // A closed channel means the session is gone.
            let _ = tx.send(Completion {
                stream,
                generation,
                outcome,
            });
        });
        generation
    }

    /// Bump `stream` to a fresh generation without issuing anything, which
    /// makes every outstanding request on it stale.
    pub fn supersede(&mut self, stream: Stream) -> Generation {
        self.next += 1;
        let generation = Generation(self.next);
        self.current.insert(stream, generation);
        generation
    }

    pub fn current(&self, stream: &Stream) -> Option<Generation> {
        self.current.get(stream).copied()
    }

    /// Is `generation` the newest request issued on `stream`?
    pub fn is_current(&self, stream: &Stream, generation: Generation) -> bool {
        self.current(stream) == Some(generation)
    }

    /// Decide whether a completion may be applied.
    ///
    /// Returns `true` for the current generation of its stream; a settled
    /// keyed stream is forgotten at that point.  Returns `false` for stale
    /// completions, which the caller must drop without side effects.
    pub fn accept(&mut self, completion: &Completion) -> bool {
        let Completion {
            stream, generation, ..
        } = completion;
        if !self.is_current(stream, *generation) {
            debug!(?stream, %generation, "discarding stale response");
            return false;
        }
        if stream.is_keyed() {
            self.current.remove(stream);
        }
        true
    }

    /// Abort every outstanding request.  Used on teardown only.
    pub fn shutdown(&mut self) {
        self.tasks.abort_all();
        self.current.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
