//! Shared application state for the table and analytics views

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::analytics::{aggregate, filter_options, Analytics, AnalyticsFilter, FilterOptions};
use crate::charts::ChartSet;
use crate::observation::{Column, ObservationRow};
use crate::table::{SortState, TablePage, TableState};

/// Loaded rows plus every view cursor derived from them
#[derive(Debug)]
pub struct AppState {
    rows: Vec<ObservationRow>,
    table: TableState,
    filter: AnalyticsFilter,
    analytics: Analytics,
    charts: ChartSet,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AppState {
    pub fn new(rows: Vec<ObservationRow>) -> Self {
        let mut state = Self {
            rows: Vec::new(),
            table: TableState::new(),
            filter: AnalyticsFilter::default(),
            analytics: Analytics::default(),
            charts: ChartSet::new(),
        };
        state.replace_rows(rows);
        state
    }

    /// Master rows in their current order
    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn filter(&self) -> &AnalyticsFilter {
        &self.filter
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn charts(&self) -> &ChartSet {
        &self.charts
    }

    /// Swap in a freshly loaded row set.
    ///
    /// Table cursors and filters start over, then charts are rebound.
    pub fn replace_rows(&mut self, rows: Vec<ObservationRow>) {
        self.rows = rows;
        self.table.reset();
        self.filter = AnalyticsFilter::default();
        self.refresh_analytics();
        tracing::debug!("Replaced row set with {} rows", self.rows.len());
    }

    /// Header click on `column`; charts keep their last binding
    pub fn sort_by(&mut self, column: Column) -> SortState {
        self.table.toggle_sort(&mut self.rows, column)
    }

    pub fn search(&mut self, query: &str) {
        self.table.search(query);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.table.go_to_page(page);
    }

    pub fn table_page(&self) -> TablePage {
        self.table.render(&self.rows)
    }

    /// Replace the analytics filter and rebind every chart
    pub fn set_filter(&mut self, filter: AnalyticsFilter) {
        self.filter = filter;
        self.refresh_analytics();
    }

    pub fn filter_options(&self) -> FilterOptions {
        filter_options(&self.rows)
    }

    fn refresh_analytics(&mut self) {
        self.analytics = aggregate(&self.rows, &self.filter);
        self.charts.apply(&self.analytics);
    }
}

/// Thread-safe handle to shared state
pub type StateHandle = Arc<RwLock<AppState>>;

/// Create a new shared state handle
pub fn new_state_handle(rows: Vec<ObservationRow>) -> StateHandle {
    Arc::new(RwLock::new(AppState::new(rows)))
}
