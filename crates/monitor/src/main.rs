use anyhow::{Context, Result};
use chrono::Utc;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trader_dashboard_core::models::dashboard::DashboardView;
use trader_dashboard_core::models::settings::MonitorSettings;
use trader_dashboard_core::models::state::RefreshStatus;
use trader_dashboard_core::PortfolioMonitor;

fn init_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn report(view: &DashboardView) {
    match &view.status {
        RefreshStatus::Loading => info!("Loading..."),
        RefreshStatus::Failed { message } => warn!(
            stale = view.is_stale,
            data_age_secs = ?view.data_age_secs,
            "{message}"
        ),
        RefreshStatus::Ready if view.is_empty() => {
            info!("No portfolio data available yet. Start the trading agent to begin collecting data.");
        }
        RefreshStatus::Ready => {
            if let Some(stat) = &view.stat {
                info!(
                    trend = %stat.trend(),
                    "Current value ${:.2} {}",
                    stat.total,
                    stat.change_label()
                );
            }
            let last = view.chart.points.last().map(|p| p.display_time.as_str());
            info!(
                points = view.chart.points.len(),
                domain_min = view.chart.domain.min,
                domain_max = view.chart.domain.max,
                line_color = view.chart.line_color().unwrap_or("-"),
                last = last.unwrap_or("-"),
                "Chart refreshed"
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logger();

    let settings = MonitorSettings::from_env().context("Failed to read dashboard settings")?;
    info!(
        api = %settings.api_base_url,
        baseline = %settings.baseline,
        "Starting portfolio monitor"
    );

    let monitor =
        PortfolioMonitor::with_http(&settings).context("Failed to create portfolio monitor")?;
    let mut updates = monitor.subscribe();
    monitor.start()?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                report(&monitor.render(&state, Utc::now()));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    monitor.stop();
    Ok(())
}
