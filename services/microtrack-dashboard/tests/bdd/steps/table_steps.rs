//! BDD step definitions for the observation table

use cucumber::{given, then, when};
use microtrack_dashboard::observation::{Column, FieldValue, ObservationRow};

use crate::world::DashboardWorld;

fn split_list(list: &str) -> Vec<&str> {
    list.split(',').map(str::trim).collect()
}

fn column(key: &str) -> Column {
    Column::from_key(key).unwrap_or_else(|| panic!("Unknown column: {}", key))
}

#[given(expr = "{int} observations of plant {string}")]
fn observations_of_plant(world: &mut DashboardWorld, count: usize, plant: String) {
    world.rows = (0..count)
        .map(|i| ObservationRow {
            plant: plant.clone(),
            height: FieldValue::Number(i as f64),
            ..ObservationRow::default()
        })
        .collect();
}

#[given(expr = "observations with heights {string}")]
fn observations_with_heights(world: &mut DashboardWorld, heights: String) {
    world.rows = split_list(&heights)
        .into_iter()
        .map(|h| ObservationRow {
            height: FieldValue::from(h),
            ..ObservationRow::default()
        })
        .collect();
}

#[given(expr = "observations with notes {string}")]
fn observations_with_notes(world: &mut DashboardWorld, notes: String) {
    world.rows = split_list(&notes)
        .into_iter()
        .map(|n| ObservationRow {
            notes: n.to_string(),
            ..ObservationRow::default()
        })
        .collect();
}

#[when(expr = "page {int} is selected")]
fn page_selected(world: &mut DashboardWorld, page: usize) {
    world.state_mut().go_to_page(page);
}

#[when(expr = "the {string} column header is clicked")]
fn header_clicked(world: &mut DashboardWorld, key: String) {
    world.state_mut().sort_by(column(&key));
}

#[when(expr = "searching for {string}")]
fn searching_for(world: &mut DashboardWorld, query: String) {
    world.state_mut().search(&query);
}

#[then(expr = "the page shows {int} rows")]
fn page_shows_rows(world: &mut DashboardWorld, count: usize) {
    assert_eq!(world.state_mut().table_page().rows.len(), count);
}

#[then(expr = "the table is on page {int}")]
fn table_on_page(world: &mut DashboardWorld, page: usize) {
    assert_eq!(world.state_mut().table_page().page, page);
}

#[then(expr = "there are {int} pagination controls with page {int} active")]
fn pagination_controls(world: &mut DashboardWorld, count: usize, active: usize) {
    let controls = world.state_mut().table_page().controls;
    assert_eq!(controls.len(), count);
    let active_pages: Vec<usize> = controls
        .iter()
        .filter(|c| c.active)
        .map(|c| c.page)
        .collect();
    assert_eq!(active_pages, vec![active]);
}

#[then(expr = "the heights read {string}")]
fn heights_read(world: &mut DashboardWorld, expected: String) {
    let heights: Vec<String> = world
        .state_mut()
        .rows()
        .iter()
        .map(|r| r.height.to_string())
        .collect();
    assert_eq!(heights, split_list(&expected));
}

#[then(expr = "the {string} header shows {string}")]
fn header_shows(world: &mut DashboardWorld, key: String, arrow: String) {
    let sort = world
        .state_mut()
        .table_page()
        .sort
        .expect("no active sort");
    assert_eq!(sort.key, key);
    assert_eq!(sort.arrow, arrow);
}
