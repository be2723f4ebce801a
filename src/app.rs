use std::path::Path;

use ratatui::widgets::ListState;

use crate::gateway::{ImagePayload, Post, PostId};
use crate::sync::coordinator::Stream;
use crate::sync::{ConfirmedDelete, CreateDisposition, FeedSession, PendingUpload, Step};

/// Which compose field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Author,
    Body,
}

/// What the keyboard is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
    Compose(Field),
    /// Typing the path of an image to attach.
    Attach,
    /// Waiting for y/N on deleting this post.
    ConfirmDelete(PostId),
}

pub struct App {
    /// The feed core; the only source of posts.
    pub session: FeedSession,
    /// List selection state for scrolling.
    pub list_state: ListState,
    pub mode: Mode,
    pub author: String,
    pub body: String,
    pub attach_path: String,
    /// Latest notice or progress message.
    pub status: String,
    /// Set once the mount-time feed request has settled.
    initial_load_done: bool,
    /// Whether the user has requested to quit.
    pub quit: bool,
}

impl App {
    pub fn new(session: FeedSession) -> Self {
        Self {
            session,
            list_state: ListState::default(),
            mode: Mode::Browse,
            author: String::new(),
            body: String::new(),
            attach_path: String::new(),
            status: "Loading…".into(),
            initial_load_done: false,
            quit: false,
        }
    }

    pub fn posts(&self) -> &[Post] {
        self.session.view().posts()
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.list_state.selected().and_then(|i| self.posts().get(i))
    }

    /// Fold the outcome of one session step into the UI state.
    pub fn apply_step(&mut self, step: Step) {
        match step {
            Step::PostCreated => {
                self.author.clear();
                self.body.clear();
                if matches!(self.mode, Mode::Compose(_)) {
                    self.mode = Mode::Browse;
                }
                self.status = "Posted".into();
            }
            Step::Applied(Stream::Feed) if !self.initial_load_done && !self.session.view().is_loading() => {
                self.initial_load_done = true;
                self.status = format!("{} posts", self.posts().len());
            }
            _ => {}
        }
        self.clamp_selection();
        self.absorb_notices();
    }

    /// Show the newest notice in the status bar.
    pub fn absorb_notices(&mut self) {
        if let Some(latest) = self.session.view_mut().take_notices().pop() {
            self.status = latest.to_string();
        }
    }

    /// Keep the selection inside the (possibly shrunken) snapshot.
    fn clamp_selection(&mut self) {
        let len = self.posts().len();
        match self.list_state.selected() {
            Some(_) if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
        if let Mode::ConfirmDelete(id) = self.mode {
            if self.session.view().post(id).is_none() {
                self.mode = Mode::Browse;
            }
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.posts().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.posts().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.posts().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.posts().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    // -- search --------------------------------------------------------------

    /// Apply an edit to the search text; every edit is a query change.
    pub fn edit_query(&mut self, edit: impl FnOnce(&mut String)) {
        let mut query = self.session.view().query().to_string();
        edit(&mut query);
        self.session.query_changed(&query);
    }

    // -- compose -------------------------------------------------------------

    pub fn focused_draft(&mut self) -> Option<&mut String> {
        match self.mode {
            Mode::Compose(Field::Author) => Some(&mut self.author),
            Mode::Compose(Field::Body) => Some(&mut self.body),
            Mode::Attach => Some(&mut self.attach_path),
            _ => None,
        }
    }

    pub fn toggle_field(&mut self) {
        if let Mode::Compose(field) = self.mode {
            self.mode = Mode::Compose(match field {
                Field::Author => Field::Body,
                Field::Body => Field::Author,
            });
        }
    }

    pub fn submit_post(&mut self) {
        match self.session.create_requested(&self.author, &self.body) {
            CreateDisposition::Sent(_) => self.status = "Posting…".into(),
            CreateDisposition::Deferred => self.status = "Post waits for the image upload…".into(),
            CreateDisposition::Rejected(_) => self.absorb_notices(),
        }
    }

    // -- attachments ---------------------------------------------------------

    pub fn submit_attachment(&mut self) {
        let path = self.attach_path.trim().to_string();
        self.mode = Mode::Browse;
        if path.is_empty() {
            return;
        }
        match ImagePayload::read(Path::new(&path)) {
            Ok(image) => {
                self.status = format!("Uploading {}…", image.file_name);
                self.session.file_selected(image);
                self.attach_path.clear();
            }
            Err(err) => {
                self.session.view_mut().push_notice(err);
                self.absorb_notices();
            }
        }
    }

    pub fn clear_attachment(&mut self) {
        if self.session.view().pending_upload() != &PendingUpload::Empty {
            self.session.clear_attachment();
            self.status = "Attachment removed".into();
        }
    }

    // -- reactions -----------------------------------------------------------

    pub fn like_selected(&mut self) {
        if let Some(id) = self.selected_post().map(|p| p.id) {
            self.session.like_requested(id);
        }
    }

    /// Ask for confirmation before deleting the selected post.
    pub fn request_delete_selected(&mut self) {
        if let Some(id) = self.selected_post().map(|p| p.id) {
            self.mode = Mode::ConfirmDelete(id);
        }
    }

    pub fn answer_delete(&mut self, confirmed: bool) {
        if let Mode::ConfirmDelete(id) = self.mode {
            if confirmed {
                self.session.delete_requested(ConfirmedDelete::new(id));
                self.status = "Deleting…".into();
            }
            self.mode = Mode::Browse;
        }
    }
}
