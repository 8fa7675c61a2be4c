//! Terminal rendering of pages, grouped pages, and catalogs.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use datalib_core::GroupedPage;
use datalib_model::{Column, Pagination, Record};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Placeholder shown for missing values.
const EMPTY_CELL: &str = "-";

fn value_cell(record: &Record, key: &str) -> Cell {
    let rendered = record
        .get(key)
        .map(|value| value.render())
        .unwrap_or_default();
    if rendered.is_empty() {
        Cell::new(EMPTY_CELL)
    } else {
        Cell::new(rendered)
    }
}

/// One flat table of records over the given columns.
pub fn page_table(records: &[Record], columns: &[&Column]) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(
        columns
            .iter()
            .map(|column| header_cell(&column.label))
            .collect::<Vec<_>>(),
    );
    for record in records {
        table.add_row(
            columns
                .iter()
                .map(|column| value_cell(record, &column.key))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Renders a grouped page as one table per bucket, with the group label
/// and row count above each.
pub fn print_grouped(grouped: &GroupedPage, columns: &[&Column]) {
    for group in &grouped.groups {
        if let Some(label) = &group.label {
            println!("{label} ({})", group.rows.len());
        }
        println!("{}", page_table(&group.rows, columns));
    }
}

pub fn print_pagination(page: u32, pagination: Pagination) {
    println!(
        "page {page} of {} ({} items)",
        pagination.total_pages, pagination.total_items
    );
}

/// The column catalog as a table.
pub fn catalog_table(columns: &[Column]) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Label"),
        header_cell("Kind"),
        header_cell("Sortable"),
        header_cell("Filterable"),
        header_cell("Custom"),
    ]);
    for column in columns {
        table.add_row(vec![
            Cell::new(&column.key),
            Cell::new(&column.label),
            Cell::new(column.kind.as_str()),
            Cell::new(flag(column.sortable)),
            Cell::new(flag(column.filterable)),
            Cell::new(flag(column.is_custom)),
        ]);
    }
    table
}

fn flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Columns synthesized from the records themselves when no catalog is
/// available: every key seen on the page, in key order.
pub fn columns_from_records(records: &[Record]) -> Vec<Column> {
    let mut keys: Vec<&String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys.sort();
    keys.into_iter()
        .map(|key| Column::text(key.clone(), datalib_model::humanize_key(key)))
        .collect()
}
