//! HTML chart table extraction shared by the markup-scrape adapters
//!
//! Reads the first `<table>` of a page, skips its header row and takes the
//! first three `<td>` cells of each remaining row as (rank, artist, title).
//! Only the first `limit` rows after the header are read; rows among them with
//! fewer than three cells are skipped silently. A page without a
//! table yields an empty list: upstream markup changes degrade to no data,
//! which callers treat as a valid outcome.

use scraper::{ElementRef, Html, Selector};

use crate::models::RawEntry;

/// Extract chart entries from the first `limit` rows of an HTML document
pub fn parse_chart_table(html: &str, limit: usize) -> Result<Vec<RawEntry>, String> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let Some(table) = document.select(&table_selector).next() else {
        tracing::debug!("No table found in chart page");
        return Ok(Vec::new());
    };

    let entries: Vec<RawEntry> = table
        .select(&row_selector)
        .skip(1)
        .take(limit)
        .filter_map(|row| parse_row(&row, &cell_selector))
        .collect();

    tracing::debug!(rows = entries.len(), "Parsed chart table");
    Ok(entries)
}

fn parse_row(row: &ElementRef, cell_selector: &Selector) -> Option<RawEntry> {
    let cells: Vec<String> = row.select(cell_selector).take(3).map(cell_text).collect();

    match cells.as_slice() {
        [rank, artist, title] => Some(RawEntry::new(artist.clone(), title.clone()).with_rank(rank.clone())),
        _ => None,
    }
}

/// Cell text with whitespace runs collapsed
fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector '{}': {:?}", css, e))
}
