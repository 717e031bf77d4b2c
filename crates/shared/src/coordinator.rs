//! Search request lifecycle: debounce, dispatch, and last-query-wins
//! settlement.

use crate::models::SearchOutcome;
use crate::query::SearchQuery;
use crate::timer::{Timer, TimerTicket, Timers};

/// Quiet period after the last submitted query before it is dispatched.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Identifies the query a request was built from. Tags increase
/// monotonically, so the newest submission always has the largest tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTag(u64);

impl RequestTag {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A search ready to go on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub tag: RequestTag,
    pub query: SearchQuery,
}

#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    debounce_ms: u64,
    next_tag: u64,
    latest: Option<RequestTag>,
    last_query: Option<SearchQuery>,
    pending: Option<SearchRequest>,
    in_flight: Option<RequestTag>,
    loading: bool,
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl SearchCoordinator {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            next_tag: 0,
            latest: None,
            last_query: None,
            pending: None,
            in_flight: None,
            loading: false,
        }
    }

    /// True while the most recent dispatched request has not settled.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_query(&self) -> Option<&SearchQuery> {
        self.last_query.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn next_tag(&mut self) -> RequestTag {
        self.next_tag += 1;
        RequestTag(self.next_tag)
    }

    /// Queue `query` behind the debounce window. A query identical to the
    /// last one submitted issues nothing. Any query still waiting in the
    /// window is superseded and will never be dispatched.
    pub fn submit(
        &mut self,
        query: SearchQuery,
        timers: &mut Timers<Timer>,
        now_ms: u64,
    ) -> Option<TimerTicket<Timer>> {
        if self.last_query == Some(query) {
            tracing::debug!("search query unchanged, not resubmitting");
            return None;
        }
        let tag = self.next_tag();
        if let Some(prev) = self.pending.replace(SearchRequest { tag, query }) {
            tracing::debug!(superseded = prev.tag.0, by = tag.0, "pending search superseded");
        }
        self.latest = Some(tag);
        self.last_query = Some(query);
        Some(timers.schedule(Timer::Search, self.debounce_ms, now_ms))
    }

    /// The debounce timer fired: hand out the pending request, if any.
    pub fn on_debounce_elapsed(&mut self) -> Option<SearchRequest> {
        let request = self.pending.take()?;
        tracing::debug!(tag = request.tag.0, "dispatching search");
        self.in_flight = Some(request.tag);
        self.loading = true;
        Some(request)
    }

    /// Dispatch `query` immediately, bypassing and cancelling the debounce.
    pub fn dispatch_now(&mut self, query: SearchQuery, timers: &mut Timers<Timer>) -> SearchRequest {
        timers.cancel(Timer::Search);
        self.pending = None;
        let tag = self.next_tag();
        self.latest = Some(tag);
        self.last_query = Some(query);
        self.in_flight = Some(tag);
        self.loading = true;
        tracing::debug!(tag = tag.0, "dispatching search without debounce");
        SearchRequest { tag, query }
    }

    /// Re-run the last submitted query right away.
    pub fn retry(&mut self, timers: &mut Timers<Timer>) -> Option<SearchRequest> {
        let query = self.last_query?;
        Some(self.dispatch_now(query, timers))
    }

    /// A response arrived. Returns the outcome to apply, or `None` when the
    /// request has been superseded by a newer query; stale responses leave
    /// every piece of state, `loading` included, untouched.
    pub fn settle(&mut self, tag: RequestTag, outcome: SearchOutcome) -> Option<SearchOutcome> {
        if self.latest != Some(tag) || self.in_flight != Some(tag) {
            tracing::debug!(tag = tag.0, latest = ?self.latest.map(|t| t.0), "discarding stale search response");
            return None;
        }
        self.in_flight = None;
        self.loading = false;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchFailure;
    use crate::query::GroupBy;

    fn query(lat: f64) -> SearchQuery {
        SearchQuery {
            lat,
            lng: -120.0,
            zoom: 12,
            group_by: GroupBy::Date,
        }
    }

    fn ok() -> SearchOutcome {
        SearchOutcome::Success(vec![])
    }

    fn drain(coord: &mut SearchCoordinator, timers: &mut Timers<Timer>, now: u64) -> Vec<SearchRequest> {
        timers
            .expired(now)
            .into_iter()
            .filter(|t| t.token == Timer::Search)
            .filter_map(|_| coord.on_debounce_elapsed())
            .collect()
    }

    #[test]
    fn test_only_last_query_in_window_dispatches() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        coord.submit(query(1.0), &mut timers, 0);
        coord.submit(query(2.0), &mut timers, 100);
        coord.submit(query(3.0), &mut timers, 250);
        assert!(drain(&mut coord, &mut timers, 400).is_empty());
        let sent = drain(&mut coord, &mut timers, 550);
        assert_eq!(sent.len(), 1);
        assert!((sent[0].query.lat - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_superseded_ticket_does_not_dispatch() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        let first = coord.submit(query(1.0), &mut timers, 0).unwrap();
        let second = coord.submit(query(2.0), &mut timers, 10).unwrap();
        assert!(!timers.fire(&first));
        assert!(timers.fire(&second));
        let req = coord.on_debounce_elapsed().unwrap();
        assert!((req.query.lat - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_query_is_not_resubmitted() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        assert!(coord.submit(query(1.0), &mut timers, 0).is_some());
        assert!(coord.submit(query(1.0), &mut timers, 50).is_none());
        assert!(coord.submit(query(2.0), &mut timers, 60).is_some());
    }

    #[test]
    fn test_loading_follows_latest_request() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        coord.submit(query(1.0), &mut timers, 0);
        assert!(!coord.is_loading());
        let req = drain(&mut coord, &mut timers, 300).remove(0);
        assert!(coord.is_loading());
        assert_eq!(coord.settle(req.tag, ok()), Some(ok()));
        assert!(!coord.is_loading());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        coord.submit(query(1.0), &mut timers, 0);
        let a = drain(&mut coord, &mut timers, 300).remove(0);
        coord.submit(query(2.0), &mut timers, 400);
        let b = drain(&mut coord, &mut timers, 700).remove(0);

        // B settles first, then A arrives late.
        assert!(coord.settle(b.tag, ok()).is_some());
        assert!(!coord.is_loading());
        let late = SearchOutcome::Failure(SearchFailure {
            message: "boom".into(),
            is_key_error: false,
        });
        assert!(coord.settle(a.tag, late).is_none());
        assert!(!coord.is_loading());
    }

    #[test]
    fn test_stale_response_does_not_clear_loading() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        coord.submit(query(1.0), &mut timers, 0);
        let a = drain(&mut coord, &mut timers, 300).remove(0);
        coord.submit(query(2.0), &mut timers, 400);
        let b = drain(&mut coord, &mut timers, 700).remove(0);
        assert!(coord.settle(a.tag, ok()).is_none());
        assert!(coord.is_loading());
        assert!(coord.settle(b.tag, ok()).is_some());
    }

    #[test]
    fn test_response_for_pending_superseded_query_is_stale() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        coord.submit(query(1.0), &mut timers, 0);
        let a = drain(&mut coord, &mut timers, 300).remove(0);
        // A newer query is waiting in the debounce window.
        coord.submit(query(2.0), &mut timers, 350);
        assert!(coord.settle(a.tag, ok()).is_none());
        assert!(coord.has_pending());
    }

    #[test]
    fn test_duplicate_settlement_is_ignored() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        coord.submit(query(1.0), &mut timers, 0);
        let req = drain(&mut coord, &mut timers, 300).remove(0);
        assert!(coord.settle(req.tag, ok()).is_some());
        assert!(coord.settle(req.tag, ok()).is_none());
    }

    #[test]
    fn test_retry_redispatches_last_query_immediately() {
        let mut coord = SearchCoordinator::default();
        let mut timers = Timers::new();
        assert!(coord.retry(&mut timers).is_none());
        coord.submit(query(5.0), &mut timers, 0);
        let retry = coord.retry(&mut timers).unwrap();
        assert!((retry.query.lat - 5.0).abs() < 1e-9);
        assert!(!timers.is_pending(Timer::Search));
        assert!(!coord.has_pending());
        assert!(coord.is_loading());
        assert!(coord.settle(retry.tag, ok()).is_some());
    }
}
