//! Chart objects and the binder that pushes analytics into them

use serde::{Deserialize, Serialize};

use crate::analytics::Analytics;

/// Single color used by charts without a category palette
pub const ACCENT_COLOR: &str = "#287E8F";

/// Color for categories missing from a palette
pub const FALLBACK_COLOR: &str = "#CCCCCC";

const LEAF_COLORS: &[(&str, &str)] = &[
    ("light green", "#9FFF8C"),
    ("green", "#42B66E"),
    ("dark green", "#17693B"),
    ("yellow", "#FBFF63"),
    ("orange", "#F4A03E"),
    ("-", "#B0B0B0"),
];

const PLANT_COLORS: &[(&str, &str)] = &[
    ("Basil", "#9EFFC2"),
    ("Tarragon", "#89E8DD"),
    ("Mongoose", "#6DD0B1"),
    ("Arugula", "#24C0A7"),
    ("Beetroot Bordeaux", "#36AD68"),
];

/// How a chart is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

/// Color scheme of a chart's data points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    PlantVariety,
    LeafColor,
    Accent,
}

impl Palette {
    pub fn color_for(&self, label: &str) -> &'static str {
        let table = match self {
            Palette::PlantVariety => PLANT_COLORS,
            Palette::LeafColor => LEAF_COLORS,
            Palette::Accent => return ACCENT_COLOR,
        };
        table
            .iter()
            .find(|(key, _)| *key == label)
            .map_or(FALLBACK_COLOR, |(_, color)| color)
    }
}

/// The six analytics charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    PlantVariety,
    Temperature,
    Humidity,
    LeafColor,
    GrowthStage,
    HeightOverTime,
}

impl ChartId {
    pub const ALL: [ChartId; 6] = [
        ChartId::PlantVariety,
        ChartId::Temperature,
        ChartId::Humidity,
        ChartId::LeafColor,
        ChartId::GrowthStage,
        ChartId::HeightOverTime,
    ];

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartId::PlantVariety | ChartId::GrowthStage => ChartKind::Bar,
            ChartId::Temperature | ChartId::Humidity | ChartId::HeightOverTime => ChartKind::Line,
            ChartId::LeafColor => ChartKind::Pie,
        }
    }

    /// Palette lookup by chart category
    pub fn palette(&self) -> Palette {
        match self {
            ChartId::PlantVariety => Palette::PlantVariety,
            ChartId::LeafColor => Palette::LeafColor,
            _ => Palette::Accent,
        }
    }

    /// Mount point id in the dashboard page
    pub fn element_id(&self) -> &'static str {
        match self {
            ChartId::PlantVariety => "plantVarietyChart",
            ChartId::Temperature => "temperatureChart",
            ChartId::Humidity => "humidityChart",
            ChartId::LeafColor => "leafColorChart",
            ChartId::GrowthStage => "growthStageChart",
            ChartId::HeightOverTime => "heightOverTimeChart",
        }
    }

    pub fn initial_label(&self) -> &'static str {
        match self {
            ChartId::PlantVariety => "",
            ChartId::Temperature => "Temperature (°C)",
            ChartId::Humidity => "Humidity (%)",
            ChartId::LeafColor => "Leaf Colors",
            ChartId::GrowthStage => "Growth Stages",
            ChartId::HeightOverTime => "Height Over Time",
        }
    }
}

/// The single dataset of a chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub background_color: Vec<String>,
    pub border_color: Option<String>,
}

/// A drawable chart whose labels and data are replaced wholesale on update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub id: ChartId,
    pub element_id: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub dataset: Dataset,
    pub revision: u64,
}

impl Chart {
    pub fn new(id: ChartId) -> Self {
        let border_color = (id.kind() == ChartKind::Line).then(|| ACCENT_COLOR.to_string());
        Self {
            id,
            element_id: id.element_id().to_string(),
            kind: id.kind(),
            labels: Vec::new(),
            dataset: Dataset {
                label: id.initial_label().to_string(),
                border_color,
                ..Dataset::default()
            },
            revision: 0,
        }
    }
}

/// Replace a chart's labels, values, and label, recolor it, and redraw
pub fn bind(chart: &mut Chart, labels: Vec<String>, values: Vec<Option<f64>>, label: &str) {
    let palette = chart.id.palette();
    chart.dataset.background_color = labels
        .iter()
        .map(|l| palette.color_for(l).to_string())
        .collect();
    chart.labels = labels;
    chart.dataset.data = values;
    chart.dataset.label = label.to_string();
    chart.revision += 1;
    tracing::debug!(
        "Redrew {} with {} points (revision {})",
        chart.element_id,
        chart.labels.len(),
        chart.revision
    );
}

/// Dataset label of the height chart for the selected plant
pub fn height_label(selected_plant: Option<&str>) -> String {
    match selected_plant {
        Some(plant) => format!("Height Over Time ({})", plant),
        None => ChartId::HeightOverTime.initial_label().to_string(),
    }
}

/// All analytics charts, in page order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    charts: Vec<Chart>,
}

impl Default for ChartSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSet {
    pub fn new() -> Self {
        Self {
            charts: ChartId::ALL.into_iter().map(Chart::new).collect(),
        }
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    pub fn get(&self, id: ChartId) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }

    fn bind(&mut self, id: ChartId, labels: Vec<String>, values: Vec<Option<f64>>, label: &str) {
        if let Some(chart) = self.charts.iter_mut().find(|c| c.id == id) {
            bind(chart, labels, values, label);
        }
    }

    /// Push every analytics series into its chart
    pub fn apply(&mut self, analytics: &Analytics) {
        self.bind(
            ChartId::PlantVariety,
            analytics.plant_counts.labels(),
            analytics.plant_counts.values(),
            "Plant Variety",
        );
        self.bind(
            ChartId::Temperature,
            analytics.temperature_trend.labels.clone(),
            analytics.temperature_trend.values.clone(),
            "Temperature (°C)",
        );
        self.bind(
            ChartId::Humidity,
            analytics.humidity_trend.labels.clone(),
            analytics.humidity_trend.values.clone(),
            "Humidity (%)",
        );
        self.bind(
            ChartId::LeafColor,
            analytics.leaf_color_counts.labels(),
            analytics.leaf_color_counts.values(),
            "Leaf Colors",
        );
        self.bind(
            ChartId::GrowthStage,
            analytics.growth_stage_counts.labels(),
            analytics.growth_stage_counts.values(),
            "Growth Stages",
        );
        self.bind(
            ChartId::HeightOverTime,
            analytics.height_over_time.labels.clone(),
            analytics.height_over_time.values.clone(),
            &height_label(analytics.selected_plant.as_deref()),
        );
    }
}
