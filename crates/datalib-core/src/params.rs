//! Query parameter construction.
//!
//! Everything a list view wants from the API is flattened into one ordered
//! key/value list. The output is deterministic, byte-identical for
//! identical inputs, because its canonical rendering doubles as the fetch
//! cache key.

use sha2::Digest;

use datalib_model::{FilterSet, SortSpec, ViewConfig};

use crate::timeline::DateRange;

/// Inputs for one parameter build, borrowed from the view's query state.
#[derive(Debug, Clone, Copy)]
pub struct ParamInputs<'a> {
    pub view: Option<&'a ViewConfig>,
    pub page: u32,
    pub limit: u32,
    pub search: &'a str,
    pub sort: Option<&'a SortSpec>,
    pub filters: &'a FilterSet,
    pub window: Option<&'a DateRange>,
}

/// Builds the flat parameter list, in wire order:
/// `page`, `limit`, `search`, `sortBy`/`sortDir`, one entry per active view
/// base filter, `advanced_filters`, `start_date`/`end_date`.
///
/// Empty search, unset sort, inactive base filters (blank or `"all"`),
/// rule-less filter sets, and absent windows contribute nothing.
pub fn build_params(inputs: &ParamInputs<'_>) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::with_capacity(8);
    params.push(("page".to_string(), inputs.page.to_string()));
    params.push(("limit".to_string(), inputs.limit.to_string()));

    let search = inputs.search.trim();
    if !search.is_empty() {
        params.push(("search".to_string(), search.to_string()));
    }

    if let Some(sort) = inputs.sort {
        if !sort.field.is_empty() && sort.field != "none" {
            params.push(("sortBy".to_string(), sort.field.clone()));
            params.push(("sortDir".to_string(), sort.direction.as_str().to_string()));
        }
    }

    if let Some(view) = inputs.view {
        for (field, value) in view.active_base_filters() {
            params.push((field.to_string(), value.to_string()));
        }
    }

    if inputs.filters.has_rules() {
        params.push(("advanced_filters".to_string(), inputs.filters.to_json()));
    }

    if let Some(window) = inputs.window {
        params.push(("start_date".to_string(), window.start.format("%Y-%m-%d").to_string()));
        params.push(("end_date".to_string(), window.end.format("%Y-%m-%d").to_string()));
    }

    params
}

/// Canonical `k=v&k=v` rendering; input to the cache key and useful in logs.
pub fn canonical_query(params: &[(String, String)]) -> String {
    let mut out = String::new();
    for (index, (key, value)) in params.iter().enumerate() {
        if index > 0 {
            out.push('&');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}

/// The fetch identity for a parameter set: endpoint plus canonical query,
/// hashed. Two fetches with equal keys would return the same page.
pub fn cache_key(endpoint: &str, params: &[(String, String)]) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update([b'?']);
    hasher.update(canonical_query(params).as_bytes());
    hex::encode(hasher.finalize())
}
