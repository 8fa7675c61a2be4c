//! CLI argument definitions for the data-library client.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use datalib_cli::logging::LogFormat;
use datalib_model::SortDirection;

#[derive(Parser)]
#[command(
    name = "datalib",
    version,
    about = "Data-library dashboard client - query, group, and export list views",
    long_about = "Query a data-library REST API the way the dashboard does:\n\
                  search, advanced filters, sorting, grouping, pagination and\n\
                  timeline windows, with CSV/JSON export of the results."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Base URL of the data-library API.
    #[arg(
        long = "api-url",
        value_name = "URL",
        env = "DATALIB_API_URL",
        global = true
    )]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch and render one page of a list endpoint.
    Fetch(FetchArgs),

    /// Show the merged column catalog after sampling one live record.
    Columns(ColumnsArgs),

    /// Export a page to CSV or JSON, restricted to selected columns.
    Export(ExportArgs),

    /// Fetch a summary endpoint (a flat object of counts).
    Summary(SummaryArgs),

    /// List the built-in view presets.
    Views,
}

#[derive(Parser)]
pub struct FetchArgs {
    /// Endpoint path, e.g. /newmedialog or /events.
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 25)]
    pub limit: u32,

    /// Free-text search term.
    #[arg(long)]
    pub search: Option<String>,

    /// Sort field ("none" disables sorting).
    #[arg(long = "sort-by", value_name = "FIELD")]
    pub sort_by: Option<String>,

    #[arg(long = "sort-dir", value_enum, default_value = "asc")]
    pub sort_dir: DirectionArg,

    /// Activate a built-in view preset by id (see `datalib views`).
    #[arg(long, value_name = "VIEW_ID")]
    pub view: Option<String>,

    /// Ad-hoc base filter, repeatable: FIELD=VALUE ("all" deactivates).
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    pub filters: Vec<String>,

    /// Advanced filter groups as JSON (the `advanced_filters` payload).
    #[arg(long = "advanced-filters", value_name = "JSON")]
    pub advanced_filters: Option<String>,

    /// Group the returned page by a field ("none" disables grouping).
    #[arg(long = "group-by", value_name = "FIELD")]
    pub group_by: Option<String>,

    #[arg(long = "group-dir", value_enum, default_value = "asc")]
    pub group_dir: DirectionArg,

    /// Timeline mode; with --anchor, scopes results to a date window.
    #[arg(long, value_enum)]
    pub mode: Option<ViewModeArg>,

    /// Timeline anchor date (dd/mm/yyyy, ISO, or a serial number).
    #[arg(long, value_name = "DATE")]
    pub anchor: Option<String>,

    /// Re-fetch every N seconds until interrupted.
    #[arg(long, value_name = "SECONDS")]
    pub watch: Option<u64>,
}

#[derive(Parser)]
pub struct ColumnsArgs {
    /// Endpoint path to sample one record from.
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Endpoint path to export from.
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: ExportFormatArg,

    /// Comma-separated column keys; defaults to every fetched field.
    #[arg(long, value_name = "KEYS", value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Output file; stdout when omitted.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 100)]
    pub limit: u32,

    /// Free-text search term applied before export.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Parser)]
pub struct SummaryArgs {
    /// Summary endpoint path, e.g. /dashboard/summary.
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Asc,
    Desc,
}

impl From<DirectionArg> for SortDirection {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Asc => SortDirection::Asc,
            DirectionArg::Desc => SortDirection::Desc,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ViewModeArg {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Csv,
    Json,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
