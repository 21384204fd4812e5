//! Query debounce and request bookkeeping for a picker session.
//!
//! [SearchState] decides when a typed query is sent for resolution, hands out request ids, and
//! owns the cancellation scope of the request in flight. Issuing a new request cancels the
//! previous scope and replaces it.

use crate::core::fm::CancelToken;

use std::time::{Duration, Instant};

#[derive(Default)]
pub struct SearchState {
    request_id: u64,
    debounce: Option<Instant>,
    last_query: Option<String>,
    cancel: Option<CancelToken>,
}

impl SearchState {
    // Getters / Accessors

    #[inline]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    #[inline]
    pub fn debounce(&self) -> Option<Instant> {
        self.debounce
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_some()
    }

    /// Cancels the request in flight, if any.
    pub fn cancel_current(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }

    /// Starts a new request: cancels the previous scope and returns the new id and scope.
    pub fn begin(&mut self) -> (u64, CancelToken) {
        self.cancel_current();
        self.request_id = self.request_id.wrapping_add(1);
        let token = CancelToken::new();
        self.cancel = Some(token.clone());
        (self.request_id, token)
    }

    /// True if `id` belongs to the most recently issued request.
    #[inline]
    pub fn is_current(&self, id: u64) -> bool {
        id == self.request_id
    }

    /// Restarts the quiescence window from now.
    pub fn set_debounce(&mut self, delay: Duration) {
        self.set_debounce_at(Instant::now(), delay);
    }

    pub fn set_debounce_at(&mut self, now: Instant, delay: Duration) {
        self.debounce = Some(now + delay);
    }

    pub fn take_query(&mut self, current_query: &str) -> Option<String> {
        self.take_query_at(current_query, Instant::now())
    }

    /// Returns the query once the window has elapsed, unless it equals the last one taken.
    pub fn take_query_at(&mut self, current_query: &str, now: Instant) -> Option<String> {
        let until = self.debounce?;
        if now < until {
            return None;
        }

        self.debounce = None;
        if self.last_query.as_deref() == Some(current_query) {
            return None;
        }

        self.last_query = Some(current_query.to_string());
        Some(current_query.to_string())
    }

    /// Records `query` as already issued, e.g. when a refresh is sent without waiting.
    pub fn mark_issued(&mut self, query: &str) {
        self.debounce = None;
        self.last_query = Some(query.to_string());
    }

    pub fn reset(&mut self) {
        self.cancel_current();
        self.debounce = None;
        self.last_query = None;
    }
}
