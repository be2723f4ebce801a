//! When to refresh the feed.
//!
//! The scheduler owns the periodic timer and the optional search debounce.
//! It never talks to the gateway itself: it only yields a
//! [`RefreshTrigger`], and the session re-issues the feed request with the
//! query text current at that moment.  Because every trigger goes out on the
//! same stream, a slower earlier trigger can never overwrite a later one.
//!
//! ```text
//!        issue                 current result (ok or error)
//! IDLE ─────────► REQUESTING ─────────────────────────────► IDLE
//!                  │     ▲
//!                  └─────┘ issue again: older request superseded
//! ```

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::debug;

/// Why the feed is being re-requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// First load of the session, with an empty query.
    Mount,
    /// The search text changed.
    QueryChanged,
    /// The periodic timer fired.
    Tick,
    /// A create, delete or like succeeded.
    AfterMutation,
}

pub struct RefreshScheduler {
    interval: Interval,
    debounce: Option<Duration>,
    query_deadline: Option<Instant>,
    stopped: bool,
}

impl RefreshScheduler {
    /// `period` is the polling interval; the first tick comes one period
    /// after construction, not immediately.  `debounce` delays
    /// search-as-you-type refreshes until typing pauses.
    pub fn new(period: Duration, debounce: Option<Duration>) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            debounce: debounce.filter(|d| !d.is_zero()),
            query_deadline: None,
            stopped: false,
        }
    }

    /// Note a change of the search text.
    ///
    /// Returns a trigger when the refresh should go out right away; with a
    /// debounce configured the trigger is delivered later by
    /// [`next_trigger`](Self::next_trigger).
    pub fn query_changed(&mut self) -> Option<RefreshTrigger> {
        if self.stopped {
            return None;
        }
        match self.debounce {
            None => Some(RefreshTrigger::QueryChanged),
            Some(delay) => {
                self.query_deadline = Some(Instant::now() + delay);
                None
            }
        }
    }

    /// Wait for the next timer-driven trigger.
    ///
    /// Never resolves after [`stop`](Self::stop).  Cancel-safe, so it can sit
    /// in a `select!` loop.
    pub async fn next_trigger(&mut self) -> RefreshTrigger {
        if self.stopped {
            return std::future::pending().await;
        }
        let trigger = match self.query_deadline {
            Some(deadline) => tokio::select! {
                _ = time::sleep_until(deadline) => RefreshTrigger::QueryChanged,
                _ = self.interval.tick() => RefreshTrigger::Tick,
            },
            None => {
                self.interval.tick().await;
                RefreshTrigger::Tick
            }
        };
        // Either way the refresh uses the current query, so a pending
        // debounced search is covered.
        self.query_deadline = None;
        debug!(?trigger, "refresh due");
        trigger
    }

    /// Stop all timers for good.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.query_deadline = None;
    }

    #[cfg(test)]
    pub fn has_pending_query(&self) -> bool {
        self.query_deadline.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
