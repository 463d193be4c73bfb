//! Web dashboard with JSON API endpoints and server-rendered HTML

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsFilter;
use crate::config::SessionConfig;
use crate::loader::DataLoader;
use crate::observation::{Column, ColumnType};
use crate::state::{AppState, StateHandle};
use crate::table::{PageControl, TablePage};

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub loader: Arc<DataLoader>,
}

/// Body of `POST /api/table/page`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
}

/// Body of `POST /api/table/sort`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortRequest {
    pub column: String,
}

/// Body of `POST /api/table/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Build the dashboard axum router.
///
/// Everything except `/login` and `/health` sits behind the session guard.
pub fn build_router(state: StateHandle, loader: Arc<DataLoader>, session: SessionConfig) -> Router {
    let dashboard_state = DashboardState { state, loader };

    let guarded = Router::new()
        .route("/", get(index_handler))
        .route("/api/table", get(table_handler))
        .route("/api/table/page", post(page_handler))
        .route("/api/table/sort", post(sort_handler))
        .route("/api/table/search", post(search_handler))
        .route("/api/analytics", get(analytics_handler))
        .route("/api/analytics/filters", post(filters_handler))
        .route("/api/filters", get(filter_options_handler))
        .route("/api/reload", post(reload_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            session,
            mt_session::require_session,
        ));

    Router::new()
        .merge(guarded)
        .route("/login", get(login_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

async fn table_handler(State(dashboard): State<DashboardState>) -> Json<TablePage> {
    Json(dashboard.state.read().await.table_page())
}

async fn page_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<PageRequest>,
) -> Json<TablePage> {
    let mut state = dashboard.state.write().await;
    state.go_to_page(request.page);
    Json(state.table_page())
}

async fn sort_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<SortRequest>,
) -> Response {
    let Some(column) = Column::from_key(&request.column) else {
        tracing::warn!("Rejected sort by unknown column {:?}", request.column);
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("Unknown column: {}", request.column),
            })),
        )
            .into_response();
    };

    let mut state = dashboard.state.write().await;
    state.sort_by(column);
    Json(state.table_page()).into_response()
}

async fn search_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<SearchRequest>,
) -> Json<TablePage> {
    let mut state = dashboard.state.write().await;
    state.search(&request.query);
    Json(state.table_page())
}

fn analytics_json(state: &AppState) -> serde_json::Value {
    serde_json::json!({
        "subset_len": state.analytics().subset_len,
        "selected_plant": state.analytics().selected_plant,
        "filter": state.filter(),
        "charts": state.charts().charts(),
    })
}

async fn analytics_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Json(analytics_json(&state))
}

async fn filters_handler(
    State(dashboard): State<DashboardState>,
    Json(filter): Json<AnalyticsFilter>,
) -> impl IntoResponse {
    let mut state = dashboard.state.write().await;
    tracing::debug!("Analytics filter changed to {:?}", filter);
    state.set_filter(filter);
    Json(analytics_json(&state))
}

async fn filter_options_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    Json(dashboard.state.read().await.filter_options())
}

async fn reload_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let rows = dashboard.loader.load().await;
    let mut state = dashboard.state.write().await;
    state.replace_rows(rows);
    tracing::info!("Reloaded {} observations", state.rows().len());
    Json(serde_json::json!({ "rows": state.rows().len() }))
}

async fn login_handler() -> impl IntoResponse {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>MicroTrack Login</title>
    <style>{style}</style>
</head>
<body>
    <main class="login">
        <h1>MicroTrack</h1>
        <p>Your session is missing or has expired. Sign in again to open the dashboard.</p>
    </main>
</body>
</html>"#,
        style = DASHBOARD_STYLE,
    ))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Serialize for embedding inside a `<script>` element
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn column_type_name(column: Column) -> &'static str {
    match column.column_type() {
        ColumnType::Number => "number",
        ColumnType::Text => "string",
    }
}

fn render_headers(page: &TablePage) -> String {
    Column::ALL
        .iter()
        .map(|column| {
            let arrow = match &page.sort {
                Some(sort) if sort.key == column.key() => {
                    format!(r#" <span class="sort-arrow">{}</span>"#, sort.arrow)
                }
                _ => String::new(),
            };
            format!(
                r#"<th data-key="{key}" data-type="{kind}" data-title="{title}">{title}{arrow}</th>"#,
                key = column.key(),
                kind = column_type_name(*column),
                title = column.title(),
                arrow = arrow,
            )
        })
        .collect()
}

fn render_rows(page: &TablePage) -> String {
    page.rows
        .iter()
        .map(|row| {
            let cells: String = Column::ALL
                .iter()
                .map(|&column| format!("<td>{}</td>", escape_html(&row.cell(column))))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect()
}

fn render_pagination(controls: &[PageControl]) -> String {
    controls
        .iter()
        .map(|control| {
            format!(
                r#"<button data-page="{page}" class="{class}">{page}</button>"#,
                page = control.page,
                class = if control.active { "active" } else { "" },
            )
        })
        .collect()
}

fn render_options(values: &[String], selected: Option<&str>) -> String {
    let mut options = String::from(r#"<option value="">All</option>"#);
    for value in values.iter().filter(|v| !v.is_empty()) {
        let escaped = escape_html(value);
        let marker = if selected == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            r#"<option value="{escaped}"{marker}>{escaped}</option>"#
        ));
    }
    options
}

/// Each page load fetches the rows again and starts from page 1 with no sort,
/// query, or filter.
async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let rows = dashboard.loader.load().await;
    let mut state = dashboard.state.write().await;
    state.replace_rows(rows);
    let state = state.downgrade();
    let page = state.table_page();
    let options = state.filter_options();
    let filter = state.filter();

    let columns: Vec<serde_json::Value> = Column::ALL
        .iter()
        .map(|column| {
            serde_json::json!({
                "key": column.key(),
                "title": column.title(),
                "type": column_type_name(*column),
            })
        })
        .collect();

    let canvases: String = state
        .charts()
        .charts()
        .iter()
        .map(|chart| {
            format!(
                r#"<div class="chart-card"><canvas id="{}"></canvas></div>"#,
                chart.element_id
            )
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>MicroTrack Dashboard</title>
    <style>{style}</style>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <header>
        <h1>MicroTrack Dashboard</h1>
        <nav>
            <button id="tableBtn" class="active">Table</button>
            <button id="analyticsBtn">Analytics</button>
            <button id="reloadBtn">Reload</button>
        </nav>
    </header>
    <div id="searchContainer" class="toolbar">
        <input id="searchInput" type="text" placeholder="Search..." value="{query}">
        <button id="searchBtn">Search</button>
    </div>
    <div id="analyticsFilters" class="toolbar" style="display: none;">
        <select id="filter-date">{date_options}</select>
        <select id="filter-floor">{floor_options}</select>
        <select id="filter-plant">{plant_options}</select>
    </div>
    <section id="tableSection">
        <table>
            <thead><tr>{headers}</tr></thead>
            <tbody id="table-body">{rows}</tbody>
        </table>
        <div id="pagination">{pagination}</div>
    </section>
    <section id="analyticsSection" style="display: none;">
        <div class="chart-grid">{canvases}</div>
    </section>
    <script id="columns-data" type="application/json">{columns_json}</script>
    <script id="chart-data" type="application/json">{charts_json}</script>
    <script>{script}</script>
</body>
</html>"#,
        style = DASHBOARD_STYLE,
        query = escape_html(&page.query),
        date_options = render_options(&options.dates, filter.date()),
        floor_options = render_options(&options.floors, filter.floor()),
        plant_options = render_options(&options.plants, filter.plant()),
        headers = render_headers(&page),
        rows = render_rows(&page),
        pagination = render_pagination(&page.controls),
        canvases = canvases,
        columns_json = script_json(&columns),
        charts_json = script_json(state.charts().charts()),
        script = DASHBOARD_SCRIPT,
    );

    Html(html)
}

const DASHBOARD_STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 1200px; margin: 0 auto; padding: 1rem; color: #1d2b2f; }
header { display: flex; justify-content: space-between; align-items: center; }
nav button, .toolbar button, #pagination button { border: 1px solid #287E8F; background: #fff; color: #287E8F; padding: 0.4rem 0.8rem; border-radius: 0.25rem; cursor: pointer; }
nav button.active, #pagination button.active { background: #287E8F; color: #fff; }
.toolbar { display: flex; gap: 0.5rem; margin: 1rem 0; }
.toolbar input { flex: 1; padding: 0.4rem; }
table { width: 100%; border-collapse: collapse; }
th { cursor: pointer; text-align: left; padding: 0.5rem; border-bottom: 2px solid #dee2e6; user-select: none; }
td { padding: 0.5rem; border-bottom: 1px solid #dee2e6; }
#pagination { display: flex; gap: 0.25rem; margin-top: 1rem; }
.chart-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(360px, 1fr)); gap: 1rem; }
.chart-card { border: 1px solid #dee2e6; border-radius: 0.5rem; padding: 0.5rem; }
.login { max-width: 420px; margin: 4rem auto; text-align: center; }
"#;

const DASHBOARD_SCRIPT: &str = r#"
const columns = JSON.parse(document.getElementById('columns-data').textContent);
const charts = {};

function escapeHtml(text) {
  return text.replace(/[&<>"']/g, c => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[c]));
}

function cellText(value) {
  return value === null || value === undefined ? '' : String(value);
}

async function postJson(url, body) {
  const response = await fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  if (response.redirected) {
    window.location.href = response.url;
    return null;
  }
  if (!response.ok) {
    console.error(`${url} failed with status ${response.status}`);
    return null;
  }
  return response.json();
}

function renderTable(page) {
  if (!page) return;
  document.getElementById('table-body').innerHTML = page.rows
    .map(row => '<tr>' + columns.map(c => `<td>${escapeHtml(cellText(row[c.key]))}</td>`).join('') + '</tr>')
    .join('');
  document.getElementById('pagination').innerHTML = page.controls
    .map(c => `<button data-page="${c.page}" class="${c.active ? 'active' : ''}">${c.page}</button>`)
    .join('');
  document.querySelectorAll('th[data-key]').forEach(th => {
    const key = th.getAttribute('data-key');
    const arrow = page.sort && page.sort.key === key ? ` <span class="sort-arrow">${page.sort.arrow}</span>` : '';
    th.innerHTML = escapeHtml(th.getAttribute('data-title')) + arrow;
  });
}

function chartConfig(chart) {
  return {
    type: chart.kind,
    data: {
      labels: chart.labels,
      datasets: [{
        label: chart.dataset.label,
        data: chart.dataset.data,
        backgroundColor: chart.dataset.backgroundColor,
        borderColor: chart.dataset.borderColor || undefined,
        fill: false,
      }],
    },
    options: { responsive: true },
  };
}

function bindCharts(list) {
  list.forEach(chart => {
    const existing = charts[chart.id];
    if (existing) {
      existing.data.labels = chart.labels;
      existing.data.datasets[0].label = chart.dataset.label;
      existing.data.datasets[0].data = chart.dataset.data;
      existing.data.datasets[0].backgroundColor = chart.dataset.backgroundColor;
      existing.update();
    } else {
      charts[chart.id] = new Chart(document.getElementById(chart.element_id), chartConfig(chart));
    }
  });
}

function showTab(table) {
  document.getElementById('tableSection').style.display = table ? 'block' : 'none';
  document.getElementById('analyticsSection').style.display = table ? 'none' : 'block';
  document.getElementById('searchContainer').style.display = table ? 'flex' : 'none';
  document.getElementById('analyticsFilters').style.display = table ? 'none' : 'flex';
  document.getElementById('tableBtn').classList.toggle('active', table);
  document.getElementById('analyticsBtn').classList.toggle('active', !table);
}

document.addEventListener('click', async e => {
  const th = e.target.closest('th[data-key]');
  if (th) {
    renderTable(await postJson('/api/table/sort', { column: th.getAttribute('data-key') }));
    return;
  }
  const pageButton = e.target.closest('#pagination button');
  if (pageButton) {
    renderTable(await postJson('/api/table/page', { page: Number(pageButton.dataset.page) }));
  }
});

document.getElementById('searchBtn').addEventListener('click', async () => {
  const query = document.getElementById('searchInput').value;
  renderTable(await postJson('/api/table/search', { query }));
});

document.getElementById('searchInput').addEventListener('keypress', e => {
  if (e.key === 'Enter') document.getElementById('searchBtn').click();
});

['filter-date', 'filter-floor', 'filter-plant'].forEach(id => {
  document.getElementById(id).addEventListener('change', async () => {
    const result = await postJson('/api/analytics/filters', {
      date: document.getElementById('filter-date').value,
      floor: document.getElementById('filter-floor').value,
      plant: document.getElementById('filter-plant').value,
    });
    if (result) bindCharts(result.charts);
  });
});

document.getElementById('tableBtn').onclick = () => showTab(true);
document.getElementById('analyticsBtn').onclick = () => showTab(false);
document.getElementById('reloadBtn').onclick = async () => {
  if (await postJson('/api/reload', {})) window.location.reload();
};

bindCharts(JSON.parse(document.getElementById('chart-data').textContent));
"#;
