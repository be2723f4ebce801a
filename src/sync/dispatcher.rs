//! The feed session: user intents in, reconciled state out.
//!
//! [`FeedSession`] owns the whole core.  The rendering layer calls its entry
//! points (`query_changed`, `create_requested`, `delete_requested`,
//! `like_requested`, `file_selected`, `clear_attachment`) and drives
//! [`step`](FeedSession::step) from its event loop; everything else happens
//! in here:
//!
//! * intents become requests on the [`Coordinator`],
//! * completions are checked against their stream's generation and folded
//!   into the [`FeedView`],
//! * scheduler triggers re-issue the feed request with the current query.
//!
//! All state changes run on the event loop between suspension points, so
//! nothing here needs a lock.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{FeedError, GatewayError, Operation, ValidationError};
use crate::gateway::{FeedGateway, ImagePayload, NewPost, PostId};

use super::coordinator::{Completion, Coordinator, Generation, Outcome, Stream};
use super::scheduler::{RefreshScheduler, RefreshTrigger};
use super::view::{FeedView, PendingUpload};

/// A delete the user has already confirmed.
///
/// The rendering layer builds one only after its own confirmation prompt;
/// the session never asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedDelete(PostId);

impl ConfirmedDelete {
    pub fn new(id: PostId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> PostId {
        self.0
    }
}

/// What happened to a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateDisposition {
    /// Author or body was empty; nothing was sent.
    Rejected(ValidationError),
    /// Parked until the image upload in flight settles.
    Deferred,
    Sent(Generation),
}

/// The result of one [`FeedSession::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The scheduler fired and the feed request went out again.
    Refreshed(RefreshTrigger),
    /// A current completion was folded into the view.
    Applied(Stream),
    /// The gateway accepted a new post; drafts can be cleared.
    PostCreated,
    /// A superseded completion was dropped.
    Discarded(Stream),
    /// Nothing more will happen: the completion channel is closed.
    Closed,
}

#[derive(Debug, Clone)]
struct Draft {
    author: String,
    body: String,
}

pub struct FeedSession {
    gateway: Arc<dyn FeedGateway>,
    coordinator: Coordinator,
    completions: mpsc::UnboundedReceiver<Completion>,
    scheduler: RefreshScheduler,
    view: FeedView,
    deferred: Option<Draft>,
    next_draft: u64,
}

impl FeedSession {
    /// Start a session and issue the initial, unfiltered load.
    pub fn mount(gateway: Arc<dyn FeedGateway>, scheduler: RefreshScheduler) -> Self {
        let (coordinator, completions) = Coordinator::new();
        let mut session = Self {
            gateway,
            coordinator,
            completions,
            scheduler,
            view: FeedView::new(),
            deferred: None,
            next_draft: 0,
        };
        session.refresh(RefreshTrigger::Mount);
        session
    }

    pub fn view(&self) -> &FeedView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut FeedView {
        &mut self.view
    }

    /// Is a post parked waiting for its image?
    pub fn has_deferred_post(&self) -> bool {
        self.deferred.is_some()
    }

    // -- driving -------------------------------------------------------------

    /// Wait for the next completion or scheduler trigger and handle it.
    pub async fn step(&mut self) -> Step {
        tokio::select! {
            completion = self.completions.recv() => match completion {
                Some(completion) => self.handle(completion),
                None => Step::Closed,
            },
            trigger = self.scheduler.next_trigger() => {
                self.refresh(trigger);
                Step::Refreshed(trigger)
            }
        }
    }

    /// Re-issue the feed request with the current query.
    pub fn refresh(&mut self, trigger: RefreshTrigger) -> Generation {
        let query = self.view.query().to_string();
        let gateway = Arc::clone(&self.gateway);
        debug!(?trigger, %query, "refreshing feed");
        self.view.set_loading(true);
        self.coordinator.issue(Stream::Feed, async move {
            let result = if query.is_empty() {
                gateway.list().await
            } else {
                gateway.search(&query).await
            };
            Outcome::Feed(result)
        })
    }

    /// Stop timers and abandon outstanding requests.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
        self.coordinator.shutdown();
        info!("feed session closed");
    }

    // -- entry points --------------------------------------------------------

    /// The search text changed.
    pub fn query_changed(&mut self, text: &str) {
        if !self.view.set_query(text) {
            return;
        }
        if let Some(trigger) = self.scheduler.query_changed() {
            self.refresh(trigger);
        }
    }

    /// Post a message, attaching the uploaded image if there is one.
    ///
    /// With an upload still in flight the post is deferred until that upload
    /// settles; it is then sent with the image, or abandoned with
    /// [`FeedError::PostNotSent`] if the upload fails.
    pub fn create_requested(&mut self, author: &str, body: &str) -> CreateDisposition {
        let draft = match validate(author, body) {
            Ok(draft) => draft,
            Err(err) => {
                self.view.push_notice(err.into());
                return CreateDisposition::Rejected(err);
            }
        };

        if matches!(self.view.pending_upload(), PendingUpload::Uploading { .. }) {
            debug!("upload in flight, deferring post");
            self.deferred = Some(draft);
            return CreateDisposition::Deferred;
        }

        let image = self.view.take_ready_image();
        CreateDisposition::Sent(self.send_create(draft, image))
    }

    pub fn delete_requested(&mut self, intent: ConfirmedDelete) -> Generation {
        let id = intent.id();
        let gateway = Arc::clone(&self.gateway);
        self.coordinator.issue(Stream::Delete(id), async move {
            Outcome::Deleted {
                id,
                result: gateway.delete(id).await,
            }
        })
    }

    pub fn like_requested(&mut self, id: PostId) -> Generation {
        let gateway = Arc::clone(&self.gateway);
        self.coordinator.issue(Stream::Like(id), async move {
            Outcome::Liked {
                id,
                result: gateway.like(id).await,
            }
        })
    }

    /// Upload a newly selected image.  Any upload still in flight is
    /// superseded and its result will never be attached.
    pub fn file_selected(&mut self, image: ImagePayload) -> Generation {
        let file_name = image.file_name.clone();
        let gateway = Arc::clone(&self.gateway);
        let token = self.coordinator.issue(Stream::Upload, async move {
            Outcome::Uploaded(gateway.upload(&image).await)
        });
        self.view
            .set_pending_upload(PendingUpload::Uploading { token, file_name });
        token
    }

    /// Drop the selected image.  A parked post is released without it.
    pub fn clear_attachment(&mut self) {
        if matches!(self.view.pending_upload(), PendingUpload::Uploading { .. }) {
            self.coordinator.supersede(Stream::Upload);
        }
        self.view.set_pending_upload(PendingUpload::Empty);
        if let Some(draft) = self.deferred.take() {
            info!("attachment cleared, sending parked post without image");
            self.send_create(draft, None);
        }
    }

    // -- completion handling -------------------------------------------------

    fn handle(&mut self, completion: Completion) -> Step {
        if !self.coordinator.accept(&completion) {
            return Step::Discarded(completion.stream);
        }
        let Completion {
            stream, outcome, ..
        } = completion;

        match outcome {
            Outcome::Feed(result) => {
                self.view.set_loading(false);
                match result {
                    Ok(posts) => {
                        debug!(count = posts.len(), "snapshot replaced");
                        self.view.replace_snapshot(posts);
                    }
                    Err(err) => self.fail(Operation::Refresh, err),
                }
            }
            Outcome::Created { image, result } => match result {
                Ok(()) => {
                    info!("post created");
                    self.refresh(RefreshTrigger::AfterMutation);
                    return Step::PostCreated;
                }
                Err(err) => {
                    if let Some(path) = image {
                        if self.view.pending_upload() == &PendingUpload::Empty {
                            self.view.set_pending_upload(PendingUpload::Ready { path });
                        }
                    }
                    self.fail(Operation::Create, err);
                }
            },
            Outcome::Deleted { id, result } => match result {
                // Someone else got there first; the post is gone either way.
                Ok(()) | Err(GatewayError::NotFound) => {
                    info!(post_id = %id, "post deleted");
                    self.view.remove_post(id);
                    self.refresh(RefreshTrigger::AfterMutation);
                }
                Err(err) => self.fail(Operation::Delete, err),
            },
            Outcome::Liked { id, result } => match result {
                Ok(count) => {
                    if self.view.apply_like_delta(id, count) {
                        info!(post_id = %id, count, "like applied");
                    }
                    self.refresh(RefreshTrigger::AfterMutation);
                }
                Err(GatewayError::NotFound) => {
                    debug!(post_id = %id, "liked post is gone");
                }
                Err(err) => self.fail(Operation::Like, err),
            },
            Outcome::Uploaded(result) => match result {
                Ok(path) => {
                    info!(%path, "image uploaded");
                    match self.deferred.take() {
                        Some(draft) => {
                            self.view.set_pending_upload(PendingUpload::Empty);
                            self.send_create(draft, Some(path));
                        }
                        None => self.view.set_pending_upload(PendingUpload::Ready { path }),
                    }
                }
                Err(err) => {
                    self.view.set_pending_upload(PendingUpload::Empty);
                    self.fail(Operation::Upload, err);
                    if self.deferred.take().is_some() {
                        self.view.push_notice(FeedError::PostNotSent);
                    }
                }
            },
        }
        Step::Applied(stream)
    }

    fn send_create(&mut self, draft: Draft, image: Option<String>) -> Generation {
        self.next_draft += 1;
        let post = NewPost {
            author: draft.author,
            body: draft.body,
            image,
        };
        let gateway = Arc::clone(&self.gateway);
        self.coordinator
            .issue(Stream::Create(self.next_draft), async move {
                let result = gateway.create(&post).await;
                Outcome::Created {
                    image: post.image,
                    result,
                }
            })
    }

    fn fail(&mut self, op: Operation, err: GatewayError) {
        warn!(%op, error = %err, "request failed");
        self.view.push_notice(FeedError::request(op, err));
    }
}

fn validate(author: &str, body: &str) -> Result<Draft, ValidationError> {
    let author = author.trim();
    let body = body.trim();
    if author.is_empty() {
        return Err(ValidationError::MissingAuthor);
    }
    if body.is_empty() {
        return Err(ValidationError::MissingBody);
    }
    Ok(Draft {
        author: author.to_string(),
        body: body.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
