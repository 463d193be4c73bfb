//! Analytics aggregation over the (optionally filtered) observation rows

use serde::{Deserialize, Serialize};

use crate::observation::ObservationRow;

/// Observations kept in the temperature/humidity trend window
pub const TREND_WINDOW: usize = 6;

/// Equality filters chosen in the analytics dropdowns; empty means unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsFilter {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub plant: Option<String>,
}

impl AnalyticsFilter {
    fn active(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn date(&self) -> Option<&str> {
        Self::active(&self.date)
    }

    pub fn floor(&self) -> Option<&str> {
        Self::active(&self.floor)
    }

    pub fn plant(&self) -> Option<&str> {
        Self::active(&self.plant)
    }

    pub fn matches(&self, row: &ObservationRow) -> bool {
        self.date().is_none_or(|date| row.date == date)
            && self.floor().is_none_or(|floor| row.floor.loose_eq(floor))
            && self.plant().is_none_or(|plant| row.plant == plant)
    }
}

/// Rows passing every active filter, in master order
pub fn apply_filters<'a>(
    rows: &'a [ObservationRow],
    filter: &AnalyticsFilter,
) -> Vec<&'a ObservationRow> {
    rows.iter().filter(|row| filter.matches(row)).collect()
}

/// The last `TREND_WINDOW` rows by parsed timestamp, oldest first.
///
/// Rows with an unparsable timestamp order before every parsed one.
pub fn trend_window<'a>(subset: &[&'a ObservationRow]) -> Vec<&'a ObservationRow> {
    let mut sorted = subset.to_vec();
    sorted.sort_by_key(|row| row.recorded_at());
    let skip = sorted.len().saturating_sub(TREND_WINDOW);
    sorted.split_off(skip)
}

/// Plant driving the height chart: the plant filter, else the first name alphabetically.
///
/// An unnamed plant sorts first, so any unnamed row in the subset selects `""`.
/// `None` only for an empty subset.
pub fn selected_plant(subset: &[&ObservationRow], filter: &AnalyticsFilter) -> Option<String> {
    if let Some(plant) = filter.plant() {
        return Some(plant.to_string());
    }
    subset
        .iter()
        .map(|row| row.plant.as_str())
        .min()
        .map(str::to_string)
}

/// Occurrence counts per category label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCounts {
    entries: Vec<(String, u64)>,
}

impl CategoryCounts {
    pub fn increment(&mut self, label: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == label) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((label.to_string(), 1)),
        }
    }

    /// Entries in object-key order: integer-like labels ascending, then first-seen order
    pub fn entries(&self) -> Vec<(String, u64)> {
        let (mut indexed, named): (Vec<_>, Vec<_>) = self
            .entries
            .iter()
            .cloned()
            .partition(|(label, _)| array_index(label).is_some());
        indexed.sort_by_key(|(label, _)| array_index(label));
        indexed.extend(named);
        indexed
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries().into_iter().map(|(label, _)| label).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.entries()
            .into_iter()
            .map(|(_, count)| Some(count as f64))
            .collect()
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical non-negative integer label, as used for array-index object keys
fn array_index(label: &str) -> Option<u32> {
    let index: u32 = label.parse().ok()?;
    (index < u32::MAX && index.to_string() == label).then_some(index)
}

/// Labelled values for one chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn push(&mut self, label: &str, value: Option<f64>) {
        self.labels.push(label.to_string());
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The six aggregate series behind the analytics charts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub subset_len: usize,
    pub plant_counts: CategoryCounts,
    pub leaf_color_counts: CategoryCounts,
    pub growth_stage_counts: CategoryCounts,
    pub temperature_trend: Series,
    pub humidity_trend: Series,
    pub selected_plant: Option<String>,
    pub height_over_time: Series,
}

/// Filter the rows and compute every analytics series
pub fn aggregate(rows: &[ObservationRow], filter: &AnalyticsFilter) -> Analytics {
    let subset = apply_filters(rows, filter);

    let mut analytics = Analytics {
        subset_len: subset.len(),
        selected_plant: selected_plant(&subset, filter),
        ..Analytics::default()
    };

    for row in trend_window(&subset) {
        analytics
            .temperature_trend
            .push(&row.date, row.temperature.chart_value());
        analytics
            .humidity_trend
            .push(&row.date, row.humidity.chart_value());
    }

    for row in &subset {
        analytics.plant_counts.increment(&row.plant);
        analytics.leaf_color_counts.increment(&row.leaf_color);
        analytics.growth_stage_counts.increment(&row.stage.to_string());

        if analytics.selected_plant.as_deref() == Some(row.plant.as_str()) {
            analytics
                .height_over_time
                .push(&row.date, row.height.chart_value());
        }
    }

    tracing::debug!(
        "Aggregated {} of {} rows (selected plant {:?})",
        subset.len(),
        rows.len(),
        analytics.selected_plant
    );
    analytics
}

/// Distinct dropdown choices for the analytics filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub dates: Vec<String>,
    pub floors: Vec<String>,
    pub plants: Vec<String>,
}

/// Distinct date, floor, and plant values in first-seen order
pub fn filter_options(rows: &[ObservationRow]) -> FilterOptions {
    fn push_distinct(values: &mut Vec<String>, value: String) {
        if !values.contains(&value) {
            values.push(value);
        }
    }

    let mut options = FilterOptions::default();
    for row in rows {
        push_distinct(&mut options.dates, row.date.clone());
        push_distinct(&mut options.floors, row.floor.to_string());
        push_distinct(&mut options.plants, row.plant.clone());
    }
    options
}
