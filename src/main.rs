//! livescroll-feed: a live-updating terminal client for a tiny social feed.
//!
//! ## Architecture overview
//!
//! ```text
//!                        Completion    ┌─────────────┐  draw()  ┌──────────┐
//! ┌──────────┐ request   (channel)     │  sync/      │ ───────► │  ui.rs   │
//! │ gateway/ │ ◄──────── tasks ──────► │ FeedSession │          │ (render) │
//! └──────────┘                         └─────────────┘          └──────────┘
//!                                            ▲
//!                                            │ intents
//!                                       ┌──────────┐  key events  ┌──────────────┐
//!                                       │ input.rs │ ◄─────────── │ input thread │
//!                                       └──────────┘              └──────────────┘
//! ```
//!
//! * **`gateway/`**: the `FeedGateway` trait, the `Post` model and the HTTP
//!   implementation.
//! * **`sync/`**: the feed core: request coordinator, view model, refresh
//!   scheduler and the session that dispatches user intents.
//! * **`app`**: UI state (drafts, modes, selection) wrapped around the session.
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` actions.
//! * **`main`**: wires everything together: parse args, set up logging and
//!   the terminal, and run the event loop.

mod app;
mod config;
mod error;
mod gateway;
mod input;
mod sync;
mod telemetry;
mod ui;

use std::io;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::info;

use app::App;
use config::Config;
use gateway::{FeedGateway, HttpGateway};
use sync::{FeedSession, RefreshScheduler};

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Forward terminal events from a blocking reader thread.
///
/// The thread ends when the receiver is dropped or the terminal errors.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    return;
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "terminal input failed");
                return;
            }
        }
    });
    rx
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::parse();
    telemetry::init_tracing(&config.log_file)?;
    install_panic_hook();

    // -- gateway and feed core -----------------------------------------------
    let http = HttpGateway::new(&config.gateway_url, config.timeout())?;
    info!(
        gateway = http.base_url(),
        poll_secs = config.poll_secs,
        debounce_ms = config.debounce_ms,
        "starting feed session"
    );
    let gateway: Arc<dyn FeedGateway> = Arc::new(http);
    let scheduler = RefreshScheduler::new(config.poll_interval(), config.debounce());
    let mut app = App::new(FeedSession::mount(gateway, scheduler));

    // -- terminal setup (RAII: Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut events = spawn_input_reader();

    // -- main event loop -----------------------------------------------------
    // Each iteration renders, then waits for whichever comes first: a key
    // press, a finished request, or a scheduler trigger.
    loop {
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        tokio::select! {
            ev = events.recv() => match ev {
                Some(Event::Key(key)) => input::handle_key_event(&mut app, key),
                Some(_) => {}
                None => app.quit = true,
            },
            step = app.session.step() => app.apply_step(step),
        }

        if app.quit {
            break;
        }
    }

    app.session.shutdown();
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
