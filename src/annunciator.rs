//! Master caution/warning annunciator.
//!
//! Buffers the alerts produced by the [`SafetyMonitor`](crate::safety::SafetyMonitor)
//! for presentation: one *master* alert that stays lit for the hold window,
//! and a short deduplicated history.
//!
//! ```text
//!   alert ──▶ raise() ──┬─▶ master (priority, hold window)
//!                       └─▶ history (dedup, pruned, bounded)
//! ```

use heapless::Deque;
use log::debug;

use crate::safety::Alert;

/// Number of history entries kept before the oldest is evicted.
pub const HISTORY_DEPTH: usize = 16;

pub struct Annunciator {
    hold_secs: f64,
    master: Option<Alert>,
    history: Deque<Alert, HISTORY_DEPTH>,
}

impl Annunciator {
    pub fn new(hold_secs: f64) -> Self {
        Self {
            hold_secs,
            master: None,
            history: Deque::new(),
        }
    }

    /// Feed one alert.  Returns `true` if it was recorded in the history,
    /// i.e. its message had not been seen within the hold window.
    ///
    /// The master alert is replaced by a more severe alert or by a
    /// different message of the same severity, and refreshed by a repeat
    /// of its own message.
    pub fn raise(&mut self, alert: &Alert) -> bool {
        let now = alert.timestamp;
        if let Some(current) = self.master.as_mut() {
            if alert.severity > current.severity
                || (alert.severity == current.severity && alert.message != current.message)
            {
                debug!("Master alert: {} -> {}", current.message, alert.message);
                *current = alert.clone();
            } else if alert.message == current.message {
                current.timestamp = now;
            }
        } else {
            self.master = Some(alert.clone());
        }

        let recent = self
            .history
            .iter()
            .any(|h| h.message == alert.message && now - h.timestamp < self.hold_secs);
        if recent {
            return false;
        }
        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail: a slot was freed above.
        let _ = self.history.push_back(alert.clone());
        true
    }

    /// Clear the master alert and prune history older than the hold window.
    pub fn expire(&mut self, now: f64) {
        if self
            .master
            .as_ref()
            .is_some_and(|m| now - m.timestamp >= self.hold_secs)
        {
            self.master = None;
        }
        while self
            .history
            .front()
            .is_some_and(|h| now - h.timestamp >= self.hold_secs)
        {
            self.history.pop_front();
        }
    }

    /// Forget the master alert and all history.  Used when the session
    /// clock restarts, since stored timestamps no longer compare.
    pub fn clear(&mut self) {
        self.master = None;
        self.history.clear();
    }

    pub fn master(&self) -> Option<&Alert> {
        self.master.as_ref()
    }

    /// History, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Alert> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
