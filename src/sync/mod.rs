//! Feed synchronization core.
//!
//! * [`coordinator`]: streams, generations and the completion channel.
//! * [`view`]: the reconciled snapshot the UI reads.
//! * [`dispatcher`]: the [`FeedSession`]: user intents in, state out.
//! * [`scheduler`]: periodic and search-driven refresh triggers.

pub mod coordinator;
pub mod dispatcher;
pub mod scheduler;
pub mod view;

pub use dispatcher::{ConfirmedDelete, CreateDisposition, FeedSession, Step};
pub use scheduler::RefreshScheduler;
pub use view::PendingUpload;
