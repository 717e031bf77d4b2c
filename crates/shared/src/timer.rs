//! Cancellable one-shot timers keyed by token.
//!
//! Nothing here sleeps. The host schedules a real timeout for each
//! [`TimerTicket`] it receives and hands the ticket back when it fires; a
//! ticket that was replaced in the meantime is simply rejected.

use std::collections::HashMap;
use std::hash::Hash;

/// Timers the viewer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Debounced search dispatch.
    Search,
    /// Re-run of the search after an API key update.
    KeyRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket<K> {
    pub token: K,
    pub id: u64,
    pub delay_ms: u64,
    pub deadline_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Timers<K> {
    next_id: u64,
    pending: HashMap<K, (u64, u64)>,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> Timers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `token` to fire after `delay_ms`. Any timer already armed for the
    /// same token is replaced and will never fire.
    pub fn schedule(&mut self, token: K, delay_ms: u64, now_ms: u64) -> TimerTicket<K> {
        self.next_id += 1;
        let deadline_ms = now_ms.saturating_add(delay_ms);
        self.pending.insert(token, (self.next_id, deadline_ms));
        TimerTicket {
            token,
            id: self.next_id,
            delay_ms,
            deadline_ms,
        }
    }

    /// Disarm `token`. Returns whether a timer was pending.
    pub fn cancel(&mut self, token: K) -> bool {
        self.pending.remove(&token).is_some()
    }

    pub fn is_pending(&self, token: K) -> bool {
        self.pending.contains_key(&token)
    }

    /// Consume a fired ticket. True only if it is still the armed timer for
    /// its token.
    pub fn fire(&mut self, ticket: &TimerTicket<K>) -> bool {
        match self.pending.get(&ticket.token) {
            Some(&(id, _)) if id == ticket.id => {
                self.pending.remove(&ticket.token);
                true
            }
            _ => false,
        }
    }

    /// Remove and return every timer whose deadline is at or before
    /// `now_ms`, earliest first.
    pub fn expired(&mut self, now_ms: u64) -> Vec<TimerTicket<K>> {
        let mut due: Vec<TimerTicket<K>> = self
            .pending
            .iter()
            .filter(|(_, &(_, deadline))| deadline <= now_ms)
            .map(|(&token, &(id, deadline_ms))| TimerTicket {
                token,
                id,
                delay_ms: 0,
                deadline_ms,
            })
            .collect();
        due.sort_by_key(|t| (t.deadline_ms, t.id));
        for t in &due {
            self.pending.remove(&t.token);
        }
        due
    }
}
