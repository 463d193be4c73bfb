//! Observation rows and their field values

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Display format of `ObservationRow::timestamp`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Display format of `ObservationRow::date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sentinel shown for observations without a leaf color
pub const NO_LEAF_COLOR: &str = "-";

/// A cell that may be empty, numeric, or free text
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Convert a raw JSON value; null and `""` become `Empty`
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Empty,
            Value::Number(n) => n.as_f64().map_or(FieldValue::Empty, FieldValue::Number),
            Value::String(s) if s.is_empty() => FieldValue::Empty,
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Numeric reading of the cell: empty reads as zero, text must parse
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Empty => Some(0.0),
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse().ok()
                }
            }
        }
    }

    /// Value plotted on a chart; empty cells become gaps
    pub fn chart_value(&self) -> Option<f64> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Loose comparison against a dropdown selection.
    ///
    /// Text compares as text; numbers compare numerically with the selection
    /// parsed as a number.
    pub fn loose_eq(&self, selection: &str) -> bool {
        match self {
            FieldValue::Empty => selection.is_empty(),
            FieldValue::Text(s) => s == selection,
            FieldValue::Number(n) => {
                let trimmed = selection.trim();
                let parsed = if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok()
                };
                parsed == Some(*n)
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Number(n) if *n == 0.0 => write!(f, "0"),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::from_json(&Value::String(s.to_string()))
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Empty => serializer.serialize_str(""),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(FieldValue::from_json(&value))
    }
}

/// One normalized plant-telemetry record ready for display and aggregation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservationRow {
    pub timestamp: String,
    pub date: String,
    pub floor: FieldValue,
    pub plant: String,
    pub stage: FieldValue,
    pub height: FieldValue,
    pub leaf_color: String,
    pub humidity: FieldValue,
    pub temperature: FieldValue,
    pub notes: String,
}

impl ObservationRow {
    /// String form of one column, as shown in the table and matched by search
    pub fn cell(&self, column: Column) -> Cow<'_, str> {
        match column {
            Column::Timestamp => Cow::Borrowed(&self.timestamp),
            Column::Date => Cow::Borrowed(&self.date),
            Column::Floor => Cow::Owned(self.floor.to_string()),
            Column::Plant => Cow::Borrowed(&self.plant),
            Column::Stage => Cow::Owned(self.stage.to_string()),
            Column::Height => Cow::Owned(self.height.to_string()),
            Column::LeafColor => Cow::Borrowed(&self.leaf_color),
            Column::Humidity => Cow::Owned(self.humidity.to_string()),
            Column::Temperature => Cow::Owned(self.temperature.to_string()),
            Column::Notes => Cow::Borrowed(&self.notes),
        }
    }

    /// Numeric reading of a column, used by the numeric sort
    pub fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::Floor => self.floor.as_number(),
            Column::Stage => self.stage.as_number(),
            Column::Height => self.height.as_number(),
            Column::Humidity => self.humidity.as_number(),
            Column::Temperature => self.temperature.as_number(),
            other => FieldValue::from(&*self.cell(other)).as_number(),
        }
    }

    /// Parsed `timestamp`, if it is in a recognised format
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse a display timestamp, falling back to ISO-8601 shapes
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// How a column compares when sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Number,
    Text,
}

/// Table columns, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Timestamp,
    Date,
    Floor,
    Plant,
    Stage,
    Height,
    LeafColor,
    Humidity,
    Temperature,
    Notes,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Timestamp,
        Column::Date,
        Column::Floor,
        Column::Plant,
        Column::Stage,
        Column::Height,
        Column::LeafColor,
        Column::Humidity,
        Column::Temperature,
        Column::Notes,
    ];

    /// Key used by sortable headers and the JSON API
    pub fn key(&self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Date => "date",
            Column::Floor => "floor",
            Column::Plant => "plant",
            Column::Stage => "stage",
            Column::Height => "height",
            Column::LeafColor => "leafColor",
            Column::Humidity => "humidity",
            Column::Temperature => "temperature",
            Column::Notes => "notes",
        }
    }

    pub fn from_key(key: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Column::Timestamp => "Timestamp",
            Column::Date => "Seeding Date",
            Column::Floor => "Floor",
            Column::Plant => "Plant",
            Column::Stage => "Growth Days",
            Column::Height => "Height",
            Column::LeafColor => "Leaf Color",
            Column::Humidity => "Humidity",
            Column::Temperature => "Temperature",
            Column::Notes => "Notes",
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Stage | Column::Height | Column::Humidity | Column::Temperature => {
                ColumnType::Number
            }
            _ => ColumnType::Text,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
