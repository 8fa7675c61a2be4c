//! Orchestration tests over a scripted transport; no network involved.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use datalib_client::{AutoRefresh, ClientError, ListTransport, ListView};
use datalib_core::{FetchPhase, QueryEvent};
use datalib_model::ListPage;
use tokio::sync::Mutex;

/// Pops canned outcomes in order; repeats the last one when exhausted.
#[derive(Debug, Default)]
struct ScriptedTransport {
    script: StdMutex<VecDeque<Result<ListPage, ClientError>>>,
    last_params: StdMutex<Vec<(String, String)>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn with_script(script: Vec<Result<ListPage, ClientError>>) -> Self {
        Self {
            script: StdMutex::new(script.into_iter().collect()),
            last_params: StdMutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_params(&self) -> Vec<(String, String)> {
        self.last_params.lock().expect("params lock").clone()
    }
}

impl ListTransport for ScriptedTransport {
    async fn fetch_page(
        &self,
        _endpoint: &str,
        params: &[(String, String)],
    ) -> Result<ListPage, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().expect("params lock") = params.to_vec();
        let mut script = self.script.lock().expect("script lock");
        match script.pop_front() {
            Some(outcome) => outcome,
            None => Ok(ListPage::default()),
        }
    }
}

fn page_of(body: &str) -> ListPage {
    serde_json::from_str(body).expect("page body")
}

/// Shares a scripted transport so tests can inspect calls after the view
/// takes ownership.
#[derive(Debug)]
struct Shared(Arc<ScriptedTransport>);

impl ListTransport for Shared {
    async fn fetch_page(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<ListPage, ClientError> {
        self.0.fetch_page(endpoint, params).await
    }
}

#[tokio::test]
async fn search_dispatch_fetches_page_one() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut view = ListView::new(Shared(Arc::clone(&transport)), "/newmedialog", 25);
    view.init().await.expect("init");
    view.dispatch(QueryEvent::SetPage(3)).await.expect("page");
    view.dispatch(QueryEvent::SetSearch("report".to_string()))
        .await
        .expect("search");

    assert_eq!(view.state().page, 1);
    assert_eq!(view.phase(), FetchPhase::Ready);
    let params = transport.last_params();
    assert!(params.contains(&("page".to_string(), "1".to_string())));
    assert!(params.contains(&("search".to_string(), "report".to_string())));
}

#[tokio::test]
async fn failed_fetch_keeps_previous_page_and_reports() {
    let transport = ScriptedTransport::with_script(vec![
        Ok(page_of(
            r#"{"data":[{"title":"kept"}],"pagination":{"totalPages":9,"totalItems":220}}"#,
        )),
        Err(ClientError::Status {
            status: 502,
            reason: "bad gateway".to_string(),
        }),
    ]);
    let mut view = ListView::new(transport, "/events", 25);
    view.init().await.expect("init");
    assert_eq!(view.pagination().total_items, 220);

    view.dispatch(QueryEvent::SetPage(2)).await.expect("page 2");
    assert_eq!(view.phase(), FetchPhase::Error);
    assert_eq!(view.error(), Some("HTTP 502: bad gateway"));
    let kept = view.page().expect("retained page");
    assert_eq!(kept.data[0]["title"].render(), "kept");
}

#[tokio::test]
async fn configuration_errors_propagate_instead_of_becoming_state() {
    #[derive(Debug)]
    struct Unconfigured;
    impl ListTransport for Unconfigured {
        async fn fetch_page(
            &self,
            _endpoint: &str,
            _params: &[(String, String)],
        ) -> Result<ListPage, ClientError> {
            Err(ClientError::Configuration("no base url".to_string()))
        }
    }

    let mut view = ListView::new(Unconfigured, "/events", 25);
    let error = view.init().await.unwrap_err();
    assert!(error.is_configuration());
}

#[tokio::test]
async fn selected_row_is_the_raw_record() {
    let transport = ScriptedTransport::with_script(vec![Ok(page_of(
        r#"{"data":[{"id":7,"title":"clip","nested":{"a":1}}]}"#,
    ))]);
    let mut view = ListView::new(transport, "/newmedialog", 25);
    view.init().await.expect("init");
    let record = view.select_row(0).expect("record");
    assert_eq!(record["id"].render(), "7");
    assert!(view.select_row(3).is_none());
}

#[tokio::test]
async fn unchanged_dispatch_does_not_refetch() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut view = ListView::new(Shared(Arc::clone(&transport)), "/events", 25);
    view.init().await.expect("init");
    assert_eq!(transport.calls(), 1);

    // A no-op search and a client-side grouping change leave the
    // parameter identity alone.
    view.dispatch(QueryEvent::SetSearch(String::new()))
        .await
        .expect("noop search");
    view.dispatch(QueryEvent::SetGroupBy(Some("category".to_string())))
        .await
        .expect("group");
    assert_eq!(transport.calls(), 1);

    // A manual refresh always goes out.
    view.refresh().await.expect("refresh");
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn auto_refresh_ticks_and_stops_on_drop() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut view = ListView::new(Shared(Arc::clone(&transport)), "/events", 25);
    view.init().await.expect("init");
    assert_eq!(transport.calls(), 1);

    let shared = Arc::new(Mutex::new(view));
    let refresh = AutoRefresh::spawn(Arc::clone(&shared), Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(125)).await;
    tokio::task::yield_now().await;
    let ticked = transport.calls();
    assert!(ticked >= 2, "expected interval fetches, saw {ticked}");

    drop(refresh);
    tokio::task::yield_now().await;
    let after_drop = transport.calls();
    tokio::time::sleep(Duration::from_secs(300)).await;
    tokio::task::yield_now().await;
    assert_eq!(transport.calls(), after_drop);
}
