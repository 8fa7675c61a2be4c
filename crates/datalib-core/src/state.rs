//! Per-view query state and its reducer.
//!
//! Every interacting control of a list view (search, pagination, sort,
//! advanced filters, active view preset, grouping, hidden columns, the
//! timeline window) lives in one value object mutated only through
//! [`QueryState::apply`]. That keeps the pagination-reset rules and the
//! cache-key inputs auditable in one place, away from rendering.

use datalib_model::{FilterSet, SortDirection, SortSpec, ViewConfig};

use crate::params::{ParamInputs, build_params, cache_key};
use crate::timeline::TimelineWindow;

pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// The full query state of one list-view instance.
///
/// Created on view mount with defaults, destroyed on unmount. Instances
/// never share state.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub sort: Option<SortSpec>,
    pub filters: FilterSet,
    pub view: Option<ViewConfig>,
    pub group_by: Option<String>,
    pub group_dir: SortDirection,
    pub hidden_columns: Vec<String>,
    pub window: Option<TimelineWindow>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

/// A user interaction translated into a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    SetPage(u32),
    SetSearch(String),
    SetSort(Option<SortSpec>),
    /// Cycle sort on a column: none -> asc -> desc -> none.
    ToggleSort(String),
    /// Activate a view preset, applying its default sort and grouping.
    SetView(ViewConfig),
    ClearView,
    SetFilters(FilterSet),
    SetGroupBy(Option<String>),
    SetGroupDirection(SortDirection),
    SetHiddenColumns(Vec<String>),
    SetWindow(Option<TimelineWindow>),
    /// Shift the timeline window by whole units; no-op without a window.
    ShiftWindow(i32),
}

impl QueryState {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            search: String::new(),
            sort: None,
            filters: FilterSet::new(),
            view: None,
            group_by: None,
            group_dir: SortDirection::Asc,
            hidden_columns: Vec::new(),
            window: None,
        }
    }

    /// Applies one event. Search, view, filter, and window changes reset
    /// the page to 1 so a shorter filtered result set is never shown at a
    /// stale page offset.
    pub fn apply(&mut self, event: QueryEvent) {
        match event {
            QueryEvent::SetPage(page) => {
                self.page = page.max(1);
            }
            QueryEvent::SetSearch(search) => {
                if self.search != search {
                    self.search = search;
                    self.page = 1;
                }
            }
            QueryEvent::SetSort(sort) => {
                self.sort = sort;
            }
            QueryEvent::ToggleSort(field) => {
                self.sort = match self.sort.take() {
                    Some(sort) if sort.field == field => match sort.direction {
                        SortDirection::Asc => Some(SortSpec::desc(field)),
                        SortDirection::Desc => None,
                    },
                    _ => Some(SortSpec::asc(field)),
                };
            }
            QueryEvent::SetView(view) => {
                self.sort = view.default_sort.clone().or(self.sort.take());
                if let Some(group_by) = &view.default_group_by {
                    self.group_by = Some(group_by.clone());
                }
                self.view = Some(view);
                self.page = 1;
            }
            QueryEvent::ClearView => {
                if self.view.take().is_some() {
                    self.page = 1;
                }
            }
            QueryEvent::SetFilters(filters) => {
                if self.filters != filters {
                    self.filters = filters;
                    self.page = 1;
                }
            }
            QueryEvent::SetGroupBy(group_by) => {
                self.group_by = group_by.filter(|field| field != "none" && !field.is_empty());
            }
            QueryEvent::SetGroupDirection(direction) => {
                self.group_dir = direction;
            }
            QueryEvent::SetHiddenColumns(hidden) => {
                self.hidden_columns = hidden;
            }
            QueryEvent::SetWindow(window) => {
                if self.window != window {
                    self.window = window;
                    self.page = 1;
                }
            }
            QueryEvent::ShiftWindow(steps) => {
                if let Some(window) = self.window {
                    self.window = Some(window.shifted(steps));
                    self.page = 1;
                }
            }
        }
    }

    /// The transport parameter list for the current state.
    pub fn params(&self) -> Vec<(String, String)> {
        let range = self.window.map(|window| window.range());
        build_params(&ParamInputs {
            view: self.view.as_ref(),
            page: self.page,
            limit: self.limit,
            search: &self.search,
            sort: self.sort.as_ref(),
            filters: &self.filters,
            window: range.as_ref(),
        })
    }

    /// The fetch identity of the current state against an endpoint.
    pub fn cache_key(&self, endpoint: &str) -> String {
        cache_key(endpoint, &self.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use datalib_model::{Column, ColumnCatalog};

    use crate::timeline::ViewMode;

    fn catalog() -> ColumnCatalog {
        ColumnCatalog::new(vec![Column::text("title", "Title")])
    }

    #[test]
    fn search_change_resets_page() {
        let mut state = QueryState::default();
        state.apply(QueryEvent::SetPage(4));
        assert_eq!(state.page, 4);
        state.apply(QueryEvent::SetSearch("report".to_string()));
        assert_eq!(state.page, 1);
        // Re-applying the same search is not a change.
        state.apply(QueryEvent::SetPage(2));
        state.apply(QueryEvent::SetSearch("report".to_string()));
        assert_eq!(state.page, 2);
    }

    #[test]
    fn filter_change_resets_page() {
        let mut state = QueryState::default();
        state.apply(QueryEvent::SetPage(9));
        let mut filters = FilterSet::new();
        let group_id = filters.groups()[0].id.clone();
        filters.add_rule(&group_id, &catalog()).expect("rule");
        state.apply(QueryEvent::SetFilters(filters));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn view_change_resets_page_and_applies_defaults() {
        let mut state = QueryState::default();
        state.apply(QueryEvent::SetPage(3));
        let view = ViewConfig::new("recent", "Recent")
            .with_default_sort(SortSpec::desc("created_at"))
            .with_default_group_by("category");
        state.apply(QueryEvent::SetView(view));
        assert_eq!(state.page, 1);
        assert_eq!(state.sort, Some(SortSpec::desc("created_at")));
        assert_eq!(state.group_by.as_deref(), Some("category"));
    }

    #[test]
    fn sort_and_grouping_do_not_reset_page() {
        let mut state = QueryState::default();
        state.apply(QueryEvent::SetPage(5));
        state.apply(QueryEvent::ToggleSort("title".to_string()));
        state.apply(QueryEvent::SetGroupBy(Some("category".to_string())));
        assert_eq!(state.page, 5);
    }

    #[test]
    fn toggle_sort_cycles_through_directions() {
        let mut state = QueryState::default();
        state.apply(QueryEvent::ToggleSort("title".to_string()));
        assert_eq!(state.sort, Some(SortSpec::asc("title")));
        state.apply(QueryEvent::ToggleSort("title".to_string()));
        assert_eq!(state.sort, Some(SortSpec::desc("title")));
        state.apply(QueryEvent::ToggleSort("title".to_string()));
        assert_eq!(state.sort, None);
    }

    #[test]
    fn group_by_none_sentinel_clears_grouping() {
        let mut state = QueryState::default();
        state.apply(QueryEvent::SetGroupBy(Some("none".to_string())));
        assert_eq!(state.group_by, None);
    }

    #[test]
    fn window_changes_reset_page() {
        let mut state = QueryState::default();
        state.apply(QueryEvent::SetPage(7));
        let anchor = NaiveDate::from_ymd_opt(2024, 3, 7).expect("anchor");
        state.apply(QueryEvent::SetWindow(Some(TimelineWindow::new(
            ViewMode::Week,
            anchor,
        ))));
        assert_eq!(state.page, 1);
        state.apply(QueryEvent::SetPage(2));
        state.apply(QueryEvent::ShiftWindow(1));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn cache_key_changes_with_state() {
        let mut state = QueryState::default();
        let before = state.cache_key("/events");
        state.apply(QueryEvent::SetSearch("x".to_string()));
        assert_ne!(before, state.cache_key("/events"));
    }
}
