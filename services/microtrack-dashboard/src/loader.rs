//! Fetches plant observations and normalizes them into table rows

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::config::{ApiConfig, DisplayConfig, TimeZoneMode};
use crate::io::{fetch_records, HttpClient};
use crate::observation::{FieldValue, ObservationRow, DATE_FORMAT, NO_LEAF_COLOR, TIMESTAMP_FORMAT};

/// Loads the observation row set from the remote data API
pub struct DataLoader {
    url: String,
    time_zone: TimeZoneMode,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for DataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("url", &self.url)
            .field("time_zone", &self.time_zone)
            .finish()
    }
}

impl DataLoader {
    pub fn new(api: &ApiConfig, display: &DisplayConfig, http: Arc<dyn HttpClient>) -> Self {
        let url = api.plants_url();
        tracing::debug!("Created DataLoader for {}", url);
        Self {
            url,
            time_zone: display.time_zone,
            http,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and normalize all observations, surfacing any failure
    pub async fn fetch(&self) -> crate::Result<Vec<ObservationRow>> {
        let records = fetch_records(self.http.as_ref(), &self.url).await?;
        if let Some(first) = records.first() {
            tracing::debug!("First raw observation: {}", first);
        }

        Ok(records
            .iter()
            .map(|record| normalize(record, self.time_zone))
            .collect())
    }

    /// Fetch observations; any failure yields an empty row set
    pub async fn load(&self) -> Vec<ObservationRow> {
        match self.fetch().await {
            Ok(rows) => {
                tracing::info!("Loaded {} observations from {}", rows.len(), self.url);
                rows
            }
            Err(e) => {
                tracing::error!("Failed to load observations from {}: {}", self.url, e);
                Vec::new()
            }
        }
    }
}

/// Build a display row from one source record
pub fn normalize(record: &Value, time_zone: TimeZoneMode) -> ObservationRow {
    let get = |name: &str| field(record, name);

    ObservationRow {
        timestamp: format_timestamp(get("recorded_date"), time_zone),
        date: format_date(get("seeding_date"), time_zone),
        floor: truthy_or_empty(get("floor")),
        plant: truthy_text(get("name")),
        stage: FieldValue::from_json(get("growth_days")),
        height: FieldValue::from_json(get("height")),
        leaf_color: match truthy_text(get("leaf_color")) {
            color if color.is_empty() => NO_LEAF_COLOR.to_string(),
            color => color,
        },
        humidity: truthy_or_empty(get("humidity")),
        temperature: truthy_or_empty(get("temperature")),
        notes: truthy_text(get("description")),
    }
}

static NULL: Value = Value::Null;

fn field<'a>(record: &'a Value, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&NULL)
}

/// Display date-time of a source date value, or `""`
pub fn format_timestamp(value: &Value, time_zone: TimeZoneMode) -> String {
    source_datetime(value, time_zone)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Display calendar date of a source date value, or `""`
pub fn format_date(value: &Value, time_zone: TimeZoneMode) -> String {
    source_datetime(value, time_zone)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Parse a source date value into wall-clock time in the display zone.
///
/// Zoned strings and epoch milliseconds are converted; strings without an
/// offset are taken as already being wall-clock time.
fn source_datetime(value: &Value, time_zone: TimeZoneMode) -> Option<NaiveDateTime> {
    if !is_truthy(value) {
        return None;
    }

    let zoned: Option<DateTime<Utc>> = match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64)),
        Value::String(s) => match DateTime::parse_from_rfc3339(s.trim()) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(_) => return parse_naive(s.trim()),
        },
        _ => None,
    };

    zoned.map(|dt| match time_zone {
        TimeZoneMode::Local => dt.with_timezone(&Local).naive_local(),
        TimeZoneMode::Utc => dt.naive_utc(),
    })
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// JavaScript truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_or_empty(value: &Value) -> FieldValue {
    if is_truthy(value) {
        FieldValue::from_json(value)
    } else {
        FieldValue::Empty
    }
}

fn truthy_text(value: &Value) -> String {
    truthy_or_empty(value).to_string()
}
