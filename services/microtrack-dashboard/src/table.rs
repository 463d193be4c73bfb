//! Table paging, sorting, and search over observation rows

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::observation::{Column, ColumnType, ObservationRow};

/// Rows shown per table page
pub const ROWS_PER_PAGE: usize = 8;

/// Number of pages needed for `total` rows
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Rows on 1-based `page`; pages outside the range are empty
pub fn page_slice<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    let Some(start) = page.checked_sub(1).and_then(|p| p.checked_mul(page_size)) else {
        return &[];
    };
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

/// One pagination button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageControl {
    pub page: usize,
    pub active: bool,
}

/// Pagination buttons for `total` rows with `current` highlighted
pub fn pagination(total: usize, current: usize) -> Vec<PageControl> {
    (1..=page_count(total, ROWS_PER_PAGE))
        .map(|page| PageControl {
            page,
            active: page == current,
        })
        .collect()
}

/// Locale-style string ordering: case-insensitive, lowercase first on ties
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Ascending order of two rows by `column`.
///
/// Numeric columns order non-numeric cells after every number.
pub fn compare_rows(a: &ObservationRow, b: &ObservationRow, column: Column) -> Ordering {
    match column.column_type() {
        ColumnType::Number => match (a.number(column), b.number(column)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        ColumnType::Text => locale_compare(&a.cell(column), &b.cell(column)),
    }
}

/// Stable in-place sort of the master rows
pub fn sort_rows(rows: &mut [ObservationRow], column: Column, ascending: bool) {
    if ascending {
        rows.sort_by(|a, b| compare_rows(a, b, column));
    } else {
        rows.sort_by(|a, b| compare_rows(b, a, column));
    }
}

/// Whether any cell contains the already-lowercased query
pub fn matches_query(row: &ObservationRow, lowered_query: &str) -> bool {
    Column::ALL
        .iter()
        .any(|&column| row.cell(column).to_lowercase().contains(lowered_query))
}

/// Case-insensitive substring search across every column
pub fn search<'a>(rows: &'a [ObservationRow], query: &str) -> Vec<&'a ObservationRow> {
    let lowered = query.to_lowercase();
    rows.iter().filter(|row| matches_query(row, &lowered)).collect()
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Column,
    pub ascending: bool,
}

impl SortState {
    /// Header arrow for the active column
    pub fn arrow(&self) -> &'static str {
        if self.ascending {
            "▼"
        } else {
            "▲"
        }
    }
}

/// Sort indicator as sent to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortIndicator {
    pub key: String,
    pub ascending: bool,
    pub arrow: String,
}

impl From<SortState> for SortIndicator {
    fn from(sort: SortState) -> Self {
        Self {
            key: sort.column.key().to_string(),
            ascending: sort.ascending,
            arrow: sort.arrow().to_string(),
        }
    }
}

/// One rendered table page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub rows: Vec<ObservationRow>,
    pub controls: Vec<PageControl>,
    pub sort: Option<SortIndicator>,
    pub query: String,
}

/// Paging, sort, and search cursors of the table view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    current_page: usize,
    sort: Option<SortState>,
    query: String,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            current_page: 1,
            sort: None,
            query: String::new(),
        }
    }
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Select a page; out-of-range pages render empty
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page;
    }

    /// Header click: same column toggles direction, a new column sorts ascending.
    ///
    /// Reorders `rows` in place and returns to page 1.
    pub fn toggle_sort(&mut self, rows: &mut [ObservationRow], column: Column) -> SortState {
        let ascending = match self.sort {
            Some(sort) if sort.column == column => !sort.ascending,
            _ => true,
        };
        let sort = SortState { column, ascending };
        sort_rows(rows, column, ascending);
        self.sort = Some(sort);
        self.current_page = 1;
        tracing::debug!(
            "Sorted {} rows by {} ({})",
            rows.len(),
            column,
            if ascending { "ascending" } else { "descending" }
        );
        sort
    }

    /// Apply a search query and return to page 1
    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
        self.current_page = 1;
    }

    /// Forget cursors after the row set is replaced
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rows matching the active query, in master order
    pub fn visible<'a>(&self, rows: &'a [ObservationRow]) -> Vec<&'a ObservationRow> {
        search(rows, &self.query)
    }

    /// Render the current page of the visible rows
    pub fn render(&self, rows: &[ObservationRow]) -> TablePage {
        let visible = self.visible(rows);
        TablePage {
            page: self.current_page,
            page_count: page_count(visible.len(), ROWS_PER_PAGE),
            total: visible.len(),
            rows: page_slice(&visible, self.current_page, ROWS_PER_PAGE)
                .iter()
                .map(|row| (*row).clone())
                .collect(),
            controls: pagination(visible.len(), self.current_page),
            sort: self.sort.map(SortIndicator::from),
            query: self.query.clone(),
        }
    }
}
