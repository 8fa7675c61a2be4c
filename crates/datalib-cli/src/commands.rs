//! Command implementations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::Mutex;
use tracing::{debug, info};

use datalib_client::{ApiClient, ApiConfig, AutoRefresh, ListView};
use datalib_core::{FetchPhase, QueryEvent, TimelineWindow, ViewMode, parse_flexible};
use datalib_model::{Column, ColumnCatalog, FilterGroup, FilterSet, Record, SortSpec, ViewConfig};
use datalib_report::{write_csv, write_json};

use crate::cli::{
    ColumnsArgs, ExportArgs, ExportFormatArg, FetchArgs, SummaryArgs, ViewModeArg,
};
use datalib_cli::presets::{default_views, find_view};
use datalib_cli::render::{
    catalog_table, columns_from_records, page_table, print_grouped, print_pagination,
};

pub async fn run_fetch(args: &FetchArgs, config: ApiConfig) -> Result<()> {
    let client = ApiClient::new(config).context("build API client")?;
    let mut view = ListView::new(client, &args.endpoint, args.limit);
    stage_query(&mut view, args)?;
    view.init().await.context("fetch list page")?;
    render_view(&view);

    if let Some(seconds) = args.watch {
        let every = Duration::from_secs(seconds.max(1));
        let shared = Arc::new(Mutex::new(view));
        let refresh = AutoRefresh::spawn(Arc::clone(&shared), every);
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let view = shared.lock().await;
            render_view(&view);
            debug!(running = refresh.is_running(), "watch tick");
        }
    }
    Ok(())
}

/// Translates the fetch flags into staged query events, page last so the
/// explicit `--page` survives the resets performed by filter changes.
fn stage_query(view: &mut ListView<ApiClient>, args: &FetchArgs) -> Result<()> {
    if let Some(view_config) = resolve_view(args)? {
        view.stage(QueryEvent::SetView(view_config));
    }
    if let Some(search) = &args.search {
        view.stage(QueryEvent::SetSearch(search.clone()));
    }
    if let Some(field) = &args.sort_by {
        view.stage(QueryEvent::SetSort(Some(SortSpec {
            field: field.clone(),
            direction: args.sort_dir.into(),
        })));
    }
    if let Some(json) = &args.advanced_filters {
        let groups: Vec<FilterGroup> =
            serde_json::from_str(json).context("parse --advanced-filters JSON")?;
        view.stage(QueryEvent::SetFilters(FilterSet::from_groups(groups)));
    }
    if let Some(window) = resolve_window(args)? {
        view.stage(QueryEvent::SetWindow(Some(window)));
    }
    if let Some(group_by) = &args.group_by {
        view.stage(QueryEvent::SetGroupBy(Some(group_by.clone())));
        view.stage(QueryEvent::SetGroupDirection(args.group_dir.into()));
    }
    view.stage(QueryEvent::SetPage(args.page));
    Ok(())
}

/// `--view` preset and/or ad-hoc `--filter` pairs, merged into one view.
fn resolve_view(args: &FetchArgs) -> Result<Option<ViewConfig>> {
    let mut view = match &args.view {
        Some(id) => Some(find_view(id).with_context(|| {
            let known: Vec<String> = default_views().into_iter().map(|v| v.id).collect();
            format!("unknown view '{id}' (known: {})", known.join(", "))
        })?),
        None => None,
    };
    if !args.filters.is_empty() {
        let mut config = view.take().unwrap_or_else(|| ViewConfig::new("adhoc", "Ad hoc"));
        for pair in &args.filters {
            let (field, value) = pair
                .split_once('=')
                .with_context(|| format!("--filter must be FIELD=VALUE, got '{pair}'"))?;
            config.base_filters.push((field.to_string(), value.to_string()));
        }
        view = Some(config);
    }
    Ok(view)
}

fn resolve_window(args: &FetchArgs) -> Result<Option<TimelineWindow>> {
    let Some(mode) = args.mode else {
        return Ok(None);
    };
    let anchor_input = args
        .anchor
        .as_deref()
        .context("--mode requires --anchor")?;
    let anchor = parse_flexible(anchor_input)
        .with_context(|| format!("unrecognized anchor date '{anchor_input}'"))?;
    let mode = match mode {
        ViewModeArg::Day => ViewMode::Day,
        ViewModeArg::Week => ViewMode::Week,
        ViewModeArg::Month => ViewMode::Month,
        ViewModeArg::Year => ViewMode::Year,
    };
    Ok(Some(TimelineWindow::new(mode, anchor)))
}

fn render_view(view: &ListView<ApiClient>) {
    if let Some(message) = view.error() {
        eprintln!("error: {message}");
        if view.page().is_none() {
            return;
        }
        eprintln!("(showing previously fetched data)");
    }
    let Some(page) = view.page() else {
        println!("no data");
        return;
    };
    let columns = visible_columns(view, &page.data);
    let column_refs: Vec<&Column> = columns.iter().collect();
    if view.state().group_by.is_some() {
        print_grouped(&view.grouped(), &column_refs);
    } else {
        println!("{}", page_table(&page.data, &column_refs));
    }
    print_pagination(view.state().page, view.pagination());
    if view.phase() == FetchPhase::Refetching {
        println!("(refreshing)");
    }
}

/// Synthesized columns minus whatever the state hides.
fn visible_columns(view: &ListView<ApiClient>, records: &[Record]) -> Vec<Column> {
    columns_from_records(records)
        .into_iter()
        .filter(|column| !view.state().hidden_columns.contains(&column.key))
        .collect()
}

pub async fn run_columns(args: &ColumnsArgs, config: ApiConfig) -> Result<()> {
    let client = ApiClient::new(config).context("build API client")?;
    let sample = client
        .sample_record(&args.endpoint)
        .await
        .context("sample one record")?;
    let mut catalog = ColumnCatalog::default();
    match &sample {
        Some(record) => {
            let discovered = catalog.merge_sample(record);
            info!(count = discovered.len(), "columns discovered from sample");
        }
        None => info!("endpoint returned no records to sample"),
    }
    println!("{}", catalog_table(catalog.columns()));
    Ok(())
}

pub async fn run_export(args: &ExportArgs, config: ApiConfig) -> Result<()> {
    let client = ApiClient::new(config).context("build API client")?;
    let mut view = ListView::new(client, &args.endpoint, args.limit);
    if let Some(search) = &args.search {
        view.stage(QueryEvent::SetSearch(search.clone()));
    }
    view.stage(QueryEvent::SetPage(args.page));
    view.init().await.context("fetch export page")?;
    if let Some(message) = view.error() {
        bail!("fetch failed: {message}");
    }
    let records = view
        .page()
        .map(|page| page.data.clone())
        .unwrap_or_default();

    let columns = export_columns(&records, &args.columns);
    let column_refs: Vec<&Column> = columns.iter().collect();
    let document = match args.format {
        ExportFormatArg::Csv => write_csv(&records, &column_refs)?,
        ExportFormatArg::Json => write_json(&records, &column_refs)?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("write {}", path.display()))?;
            info!(records = records.len(), path = %path.display(), "export written");
        }
        None => print!("{document}"),
    }
    Ok(())
}

fn export_columns(records: &[Record], selected: &[String]) -> Vec<Column> {
    let all = columns_from_records(records);
    if selected.is_empty() {
        return all;
    }
    // Keep the caller's order for selected keys, falling back to a plain
    // text column for keys absent from this page.
    selected
        .iter()
        .map(|key| {
            all.iter()
                .find(|column| &column.key == key)
                .cloned()
                .unwrap_or_else(|| Column::text(key.clone(), datalib_model::humanize_key(key)))
        })
        .collect()
}

pub async fn run_summary(args: &SummaryArgs, config: ApiConfig) -> Result<()> {
    let client = ApiClient::new(config).context("build API client")?;
    let summary = client
        .fetch_summary(&args.endpoint)
        .await
        .context("fetch summary")?;
    let mut table = comfy_table::Table::new();
    datalib_cli::render::apply_table_style(&mut table);
    table.set_header(vec!["Metric", "Value"]);
    for (key, value) in &summary {
        table.add_row(vec![
            datalib_model::humanize_key(key),
            value.render(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_views() -> Result<()> {
    let mut table = comfy_table::Table::new();
    datalib_cli::render::apply_table_style(&mut table);
    table.set_header(vec!["Id", "Name", "Base Filters", "Default Sort", "Group By"]);
    for view in default_views() {
        let filters = view
            .base_filters
            .iter()
            .map(|(field, value)| format!("{field}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sort = view
            .default_sort
            .as_ref()
            .map(|sort| format!("{} {}", sort.field, sort.direction))
            .unwrap_or_else(|| "none".to_string());
        table.add_row(vec![
            view.id,
            view.name,
            filters,
            sort,
            view.default_group_by.unwrap_or_else(|| "none".to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}
