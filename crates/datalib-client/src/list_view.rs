//! Async list-view orchestration.
//!
//! Ties one [`QueryState`] to one [`ListController`] and a transport.
//! Events go in, the current page (or retained previous page plus an
//! error) comes out. The transport seam keeps the orchestration testable
//! without a network.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use datalib_core::{
    FetchPhase, GroupedPage, ListController, QueryEvent, QueryState, group_page,
};
use datalib_model::{ListPage, Pagination, Record};

use crate::api::ApiClient;
use crate::error::Result;

/// How list pages are actually obtained.
pub trait ListTransport: Send + Sync {
    fn fetch_page(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<ListPage>> + Send;
}

impl ListTransport for ApiClient {
    fn fetch_page(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<ListPage>> + Send {
        ApiClient::fetch_page(self, endpoint, params)
    }
}

/// One mounted list view: query state, fetch lifecycle, current page.
#[derive(Debug)]
pub struct ListView<T> {
    transport: T,
    state: QueryState,
    controller: ListController,
}

impl<T: ListTransport> ListView<T> {
    pub fn new(transport: T, endpoint: impl Into<String>, limit: u32) -> Self {
        Self {
            transport,
            state: QueryState::new(limit),
            controller: ListController::new(endpoint),
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn phase(&self) -> FetchPhase {
        self.controller.phase()
    }

    pub fn page(&self) -> Option<&ListPage> {
        self.controller.page()
    }

    pub fn pagination(&self) -> Pagination {
        self.controller
            .page()
            .map(|page| page.pagination)
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<&str> {
        self.controller.error()
    }

    /// Applies an event and fetches if the parameter identity changed.
    ///
    /// Network failures become view-local error state (previous data
    /// retained) and return `Ok`; only a missing base URL propagates as an
    /// error, since no fetch can ever succeed until it is configured.
    pub async fn dispatch(&mut self, event: QueryEvent) -> Result<()> {
        self.state.apply(event);
        self.ensure_fresh(false).await
    }

    /// Applies an event without fetching. Useful for staging several
    /// changes (view, filters, page) before a single [`ListView::init`].
    pub fn stage(&mut self, event: QueryEvent) {
        self.state.apply(event);
    }

    /// Issues the initial fetch for a freshly mounted view.
    pub async fn init(&mut self) -> Result<()> {
        self.ensure_fresh(false).await
    }

    /// Manual refresh: re-fetches even when parameters are unchanged.
    pub async fn refresh(&mut self) -> Result<()> {
        self.ensure_fresh(true).await
    }

    async fn ensure_fresh(&mut self, force: bool) -> Result<()> {
        let params = self.state.params();
        let key = self.state.cache_key(self.controller.endpoint());
        let Some(ticket) = self.controller.begin_fetch(params, key, force) else {
            return Ok(());
        };
        match self.transport.fetch_page(&ticket.endpoint, &ticket.params).await {
            Ok(page) => {
                self.controller.complete_fetch(&ticket, Ok(page));
                Ok(())
            }
            Err(error) if error.is_configuration() => Err(error),
            Err(error) => {
                self.controller.complete_fetch(&ticket, Err(error.to_string()));
                Ok(())
            }
        }
    }

    /// The current page bucketed by the state's group-by settings.
    pub fn grouped(&self) -> GroupedPage {
        let records: &[Record] = self
            .controller
            .page()
            .map(|page| page.data.as_slice())
            .unwrap_or_default();
        group_page(records, self.state.group_by.as_deref(), self.state.group_dir)
    }

    /// Hands back the selected raw record, unmodified, for a details
    /// collaborator.
    pub fn select_row(&self, index: usize) -> Option<&Record> {
        self.controller.page().and_then(|page| page.data.get(index))
    }
}

/// Periodic re-fetch for a shared view.
///
/// The interval task holds the view behind a mutex and forces a refresh on
/// every tick. Dropping the handle aborts the task, so a dismounted view
/// leaks no timer.
pub struct AutoRefresh {
    handle: JoinHandle<()>,
}

impl AutoRefresh {
    pub fn spawn<T>(view: Arc<Mutex<ListView<T>>>, every: Duration) -> Self
    where
        T: ListTransport + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately; the
            // mount fetch already covered that.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut view = view.lock().await;
                if let Err(error) = view.refresh().await {
                    tracing::warn!(%error, "auto-refresh fetch failed");
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
