//! A gateway whose answers are handed out by the test.
//!
//! Every call is recorded and then parked on a oneshot channel until the
//! test resolves it, so tests decide the order in which responses arrive.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use super::{FeedGateway, ImagePayload, NewPost, Post, PostId};
use crate::error::GatewayError;

/// A call as the gateway received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Search(String),
    Create(NewPost),
    Delete(PostId),
    Like(PostId),
    Upload(String),
}

/// The answer a test hands to a parked call.
#[derive(Debug)]
pub enum Reply {
    Posts(Result<Vec<Post>, GatewayError>),
    Done(Result<(), GatewayError>),
    Count(Result<u64, GatewayError>),
    Path(Result<String, GatewayError>),
}

struct Parked {
    call: Call,
    reply: oneshot::Sender<Reply>,
}

#[derive(Default)]
pub struct ScriptedGateway {
    history: Mutex<Vec<Call>>,
    parked: Mutex<Vec<Parked>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<Call> {
        self.history.lock().unwrap().clone()
    }

    /// Number of calls still waiting for an answer.
    pub fn parked(&self) -> usize {
        self.parked.lock().unwrap().len()
    }

    /// Answer the oldest parked call equal to `call`.
    ///
    /// Panics when no such call is parked, which in a test means the request
    /// was never issued.
    pub fn resolve(&self, call: &Call, reply: Reply) {
        self.answer(call, reply, false);
    }

    /// Answer the newest parked call equal to `call`.
    pub fn resolve_latest(&self, call: &Call, reply: Reply) {
        self.answer(call, reply, true);
    }

    fn answer(&self, call: &Call, reply: Reply, newest: bool) {
        let parked = {
            let mut parked = self.parked.lock().unwrap();
            let mut matching = parked.iter().enumerate().filter(|(_, p)| &p.call == call);
            let found = if newest { matching.last() } else { matching.next() };
            let index = found
                .map(|(i, _)| i)
                .unwrap_or_else(|| panic!("no parked call {call:?}"));
            parked.remove(index)
        };
        // The request task may already be aborted; that is fine.
        let _ = parked.reply.send(reply);
    }

    async fn park(&self, call: Call) -> Reply {
        let (tx, rx) = oneshot::channel();
        self.history.lock().unwrap().push(call.clone());
        self.parked.lock().unwrap().push(Parked { call, reply: tx });
        rx.await.expect("scripted gateway dropped a parked call")
    }
}

#[async_trait]
impl FeedGateway for ScriptedGateway {
    async fn list(&self) -> Result<Vec<Post>, GatewayError> {
        match self.park(Call::List).await {
            Reply::Posts(result) => result,
            other => panic!("list answered with {other:?}"),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, GatewayError> {
        match self.park(Call::Search(query.to_string())).await {
            Reply::Posts(result) => result,
            other => panic!("search answered with {other:?}"),
        }
    }

    async fn create(&self, post: &NewPost) -> Result<(), GatewayError> {
        match self.park(Call::Create(post.clone())).await {
            Reply::Done(result) => result,
            other => panic!("create answered with {other:?}"),
        }
    }

    async fn delete(&self, id: PostId) -> Result<(), GatewayError> {
        match self.park(Call::Delete(id)).await {
            Reply::Done(result) => result,
            other => panic!("delete answered with {other:?}"),
        }
    }

    async fn like(&self, id: PostId) -> Result<u64, GatewayError> {
        match self.park(Call::Like(id)).await {
            Reply::Count(result) => result,
            other => panic!("like answered with {other:?}"),
        }
    }

    async fn upload(&self, image: &ImagePayload) -> Result<String, GatewayError> {
        match self.park(Call::Upload(image.file_name.clone())).await {
            Reply::Path(result) => result,
            other => panic!("upload answered with {other:?}"),
        }
    }
}

/// Shorthand post constructor for tests.
pub fn post(id: i64, author: &str, body: &str, likes: u64) -> Post {
    Post {
        id: PostId(id),
        author: author.to_string(),
        body: body.to_string(),
        image: None,
        created_at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(id)),
        likes,
    }
}

/// Shorthand image payload for tests.
pub fn image(name: &str) -> ImagePayload {
    ImagePayload {
        file_name: name.to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}
