//! BDD step definitions for analytics and chart binding

use cucumber::{given, then, when};
use microtrack_dashboard::charts::{ChartId, FALLBACK_COLOR};
use microtrack_dashboard::observation::{FieldValue, ObservationRow, NO_LEAF_COLOR};

use crate::world::DashboardWorld;

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(|s| s.trim().to_string()).collect()
}

#[given(expr = "an observation of {string} dated {string} with height {float}")]
fn observation_with_height(world: &mut DashboardWorld, plant: String, date: String, height: f64) {
    world.rows.push(ObservationRow {
        plant,
        date,
        height: FieldValue::Number(height),
        leaf_color: "green".to_string(),
        ..ObservationRow::default()
    });
}

#[given(expr = "an observation of {string} on floor {string}")]
fn observation_on_floor(world: &mut DashboardWorld, plant: String, floor: String) {
    world.rows.push(ObservationRow {
        plant,
        floor: FieldValue::from(floor.as_str()),
        leaf_color: "green".to_string(),
        ..ObservationRow::default()
    });
}

#[given(expr = "an observation of {string} on numeric floor {int}")]
fn observation_on_numeric_floor(world: &mut DashboardWorld, plant: String, floor: i32) {
    world.rows.push(ObservationRow {
        plant,
        floor: FieldValue::Number(f64::from(floor)),
        leaf_color: "green".to_string(),
        ..ObservationRow::default()
    });
}

#[given(expr = "an observation of {string} without a leaf color")]
fn observation_without_leaf_color(world: &mut DashboardWorld, plant: String) {
    world.rows.push(ObservationRow {
        plant,
        leaf_color: NO_LEAF_COLOR.to_string(),
        ..ObservationRow::default()
    });
}

#[given(expr = "an observation of {string} with leaf color {string}")]
fn observation_with_leaf_color(world: &mut DashboardWorld, plant: String, color: String) {
    world.rows.push(ObservationRow {
        plant,
        leaf_color: color,
        ..ObservationRow::default()
    });
}

#[when("analytics are computed")]
fn analytics_computed(world: &mut DashboardWorld) {
    let filter = world.filter.clone();
    world.state_mut().set_filter(filter);
}

#[when(expr = "the floor filter is set to {string}")]
fn floor_filter_set(world: &mut DashboardWorld, floor: String) {
    world.filter.floor = Some(floor);
    let filter = world.filter.clone();
    world.state_mut().set_filter(filter);
}

#[then(expr = "the plant count for {string} is {int}")]
fn plant_count(world: &mut DashboardWorld, plant: String, count: u64) {
    assert_eq!(world.state_mut().analytics().plant_counts.get(&plant), Some(count));
}

#[then(expr = "the analytics cover {int} observations")]
fn analytics_cover(world: &mut DashboardWorld, count: usize) {
    assert_eq!(world.state_mut().analytics().subset_len, count);
}

#[then(expr = "the selected plant is {string}")]
fn selected_plant(world: &mut DashboardWorld, plant: String) {
    assert_eq!(
        world.state_mut().analytics().selected_plant.as_deref(),
        Some(plant.as_str())
    );
}

#[then(expr = "the height chart label is {string}")]
fn height_chart_label(world: &mut DashboardWorld, label: String) {
    let state = world.state_mut();
    let chart = state
        .charts()
        .get(ChartId::HeightOverTime)
        .expect("height chart missing");
    assert_eq!(chart.dataset.label, label);
}

#[then(expr = "the height series is {string} labelled {string}")]
fn height_series(world: &mut DashboardWorld, values: String, labels: String) {
    let state = world.state_mut();
    let chart = state
        .charts()
        .get(ChartId::HeightOverTime)
        .expect("height chart missing");
    let expected: Vec<Option<f64>> = split_list(&values)
        .iter()
        .map(|v| v.parse::<f64>().ok())
        .collect();
    assert_eq!(chart.dataset.data, expected);
    assert_eq!(chart.labels, split_list(&labels));
}

#[then(expr = "the leaf color chart colors {string} with {string}")]
fn leaf_color_chart_color(world: &mut DashboardWorld, label: String, color: String) {
    let state = world.state_mut();
    let chart = state
        .charts()
        .get(ChartId::LeafColor)
        .expect("leaf color chart missing");
    let index = chart
        .labels
        .iter()
        .position(|l| *l == label)
        .unwrap_or_else(|| panic!("label {} not charted", label));
    let expected = if color == "fallback" {
        FALLBACK_COLOR.to_string()
    } else {
        color
    };
    assert_eq!(chart.dataset.background_color[index], expected);
}

#[then("the count series all sum to the observation count")]
fn count_series_sum(world: &mut DashboardWorld) {
    let analytics = world.state_mut().analytics().clone();
    let total = analytics.subset_len as u64;
    assert_eq!(analytics.plant_counts.total(), total);
    assert_eq!(analytics.leaf_color_counts.total(), total);
    assert_eq!(analytics.growth_stage_counts.total(), total);
}

#[then(expr = "the dropdown offers floors {string}")]
fn dropdown_floors(world: &mut DashboardWorld, floors: String) {
    assert_eq!(world.state_mut().filter_options().floors, split_list(&floors));
}
