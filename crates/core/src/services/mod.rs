pub mod chart_service;
pub mod refresh_scheduler;
pub mod stat_service;
