//! BDD step definitions for the MicroTrack dashboard

pub mod analytics_steps;
pub mod session_steps;
pub mod table_steps;
