//! BDD test world for the MicroTrack dashboard

use cucumber::World;
use microtrack_dashboard::analytics::AnalyticsFilter;
use microtrack_dashboard::observation::ObservationRow;
use microtrack_dashboard::state::AppState;
use mt_session::{InMemoryCredentialStore, SessionVerdict};

#[derive(Debug, Default, World)]
pub struct DashboardWorld {
    // Table and analytics testing
    pub rows: Vec<ObservationRow>,
    pub filter: AnalyticsFilter,
    pub state: Option<AppState>,

    // Session guard testing
    pub store: Option<InMemoryCredentialStore>,
    pub verdict: Option<SessionVerdict>,

    // HTTP testing
    pub response_status: Option<u16>,
    pub response_location: Option<String>,
}

impl DashboardWorld {
    /// Application state built from the rows given so far
    pub fn state_mut(&mut self) -> &mut AppState {
        let rows = &self.rows;
        self.state.get_or_insert_with(|| AppState::new(rows.clone()))
    }
}
