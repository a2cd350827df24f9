pub mod baseline;
pub mod chart;
pub mod dashboard;
pub mod settings;
pub mod snapshot;
pub mod stat;
pub mod state;
