pub mod board;
pub mod controller;
pub mod evaluate;
pub mod flexdate;
pub mod grouping;
pub mod params;
pub mod state;
pub mod timeline;

pub use board::{BoardError, ColumnBoard, ColumnLayout};
pub use controller::{FetchOutcome, FetchPhase, FetchTicket, ListController};
pub use evaluate::{filter_records, record_matches};
pub use flexdate::{parse_flexible, parse_serial, parse_value};
pub use grouping::{GroupedPage, PageGroup, UNGROUPED_LABEL, group_page};
pub use params::{ParamInputs, build_params, cache_key, canonical_query};
pub use state::{DEFAULT_PAGE_LIMIT, QueryEvent, QueryState};
pub use timeline::{DateRange, TimelineWindow, ViewMode};
