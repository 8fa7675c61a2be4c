//! Fetch lifecycle for one list view.
//!
//! The controller is a pure state machine: it decides *when* a fetch is
//! warranted, stamps each one with a sequence number, and applies
//! completions under a last-issued-wins rule so out-of-order network
//! responses can never regress displayed state. Transport is someone
//! else's job (`datalib-client` drives this over HTTP; tests drive it
//! directly).

use datalib_model::ListPage;

/// Where the view is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// First fetch in flight; nothing to show yet.
    Loading,
    /// Data present, nothing in flight.
    Ready,
    /// Parameters changed; previous page stays visible (dimmed) while the
    /// replacement is in flight.
    Refetching,
    /// Last fetch failed; previous page, if any, is still shown.
    Error,
}

/// A fetch the transport should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub seq: u64,
    pub endpoint: String,
    pub params: Vec<(String, String)>,
    pub cache_key: String,
}

/// Outcome of a transport attempt, as the controller sees it.
pub type FetchOutcome = Result<ListPage, String>;

/// Per-view fetch controller.
#[derive(Debug, Clone)]
pub struct ListController {
    endpoint: String,
    page: Option<ListPage>,
    error: Option<String>,
    next_seq: u64,
    issued_seq: Option<u64>,
    inflight: bool,
    applied_key: Option<String>,
}

impl ListController {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            page: None,
            error: None,
            next_seq: 0,
            issued_seq: None,
            inflight: false,
            applied_key: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The currently displayed page, which survives refetches and errors.
    pub fn page(&self) -> Option<&ListPage> {
        self.page.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> FetchPhase {
        if self.inflight {
            if self.page.is_some() {
                FetchPhase::Refetching
            } else {
                FetchPhase::Loading
            }
        } else if self.error.is_some() {
            FetchPhase::Error
        } else {
            FetchPhase::Ready
        }
    }

    /// True when the given parameter identity has not been applied yet.
    pub fn is_stale(&self, cache_key: &str) -> bool {
        self.applied_key.as_deref() != Some(cache_key)
    }

    /// Issues a fetch ticket for a parameter set, or `None` when the exact
    /// same identity is already applied (request de-duplication). `force`
    /// bypasses that short-circuit for manual refreshes.
    pub fn begin_fetch(
        &mut self,
        params: Vec<(String, String)>,
        cache_key: String,
        force: bool,
    ) -> Option<FetchTicket> {
        if !force && !self.is_stale(&cache_key) && !self.inflight {
            tracing::debug!(key = %cache_key, "fetch skipped, parameters unchanged");
            return None;
        }
        self.next_seq += 1;
        self.issued_seq = Some(self.next_seq);
        self.inflight = true;
        tracing::debug!(seq = self.next_seq, key = %cache_key, "fetch issued");
        Some(FetchTicket {
            seq: self.next_seq,
            endpoint: self.endpoint.clone(),
            params,
            cache_key,
        })
    }

    /// Applies a completed fetch.
    ///
    /// Only the most recently issued request may land; anything older is
    /// discarded regardless of arrival order. Returns true when the
    /// completion changed state.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, outcome: FetchOutcome) -> bool {
        if self.issued_seq != Some(ticket.seq) {
            tracing::debug!(
                seq = ticket.seq,
                newest = ?self.issued_seq,
                "stale fetch response discarded"
            );
            return false;
        }
        self.inflight = false;
        match outcome {
            Ok(page) => {
                self.page = Some(page);
                self.error = None;
                self.applied_key = Some(ticket.cache_key.clone());
                tracing::debug!(seq = ticket.seq, "fetch applied");
            }
            Err(message) => {
                // Prior data is deliberately retained.
                self.error = Some(message);
                tracing::debug!(seq = ticket.seq, "fetch failed");
            }
        }
        true
    }

    /// Drops the applied identity so the next `begin_fetch` always issues.
    pub fn invalidate(&mut self) {
        self.applied_key = None;
    }
}
