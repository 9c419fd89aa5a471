// EKF SLAM simulation demo
//
// usage: ekf_slam [config.toml]
//
// Runs the closed-loop scenario from the settings file (config/default.toml
// by default), prints the final errors and optionally writes an SVG plot.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ekf_slam::settings::{Settings, DEFAULT_CONFIG_PATH};
use ekf_slam::simulation::run_scenario;
use ekf_slam::utils::SlamPlot;
use ekf_slam::SlamResult;

fn main() -> SlamResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let settings = Settings::load(&path)?;

    let outcome = match run_scenario(&settings.scenario, &settings.filter, &settings.simulation) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Scenario failed: {}", e);
            return Err(e);
        }
    };

    let pose = outcome.slam.pose();
    println!("steps:            {}", outcome.history.len().saturating_sub(1));
    println!("final estimate:   ({:.3}, {:.3}, {:.3})", pose.x, pose.y, pose.theta);
    if let Some((pos, heading)) = outcome.history.final_estimate_error() {
        println!("estimate error:   {:.3} m, {:.3} rad", pos, heading);
    }
    if let Some((pos, heading)) = outcome.history.final_dead_reckoning_error() {
        println!("dead reckoning:   {:.3} m, {:.3} rad", pos, heading);
    }
    println!(
        "landmarks:        {} estimated, {} true, {} observations skipped",
        outcome.slam.landmark_count(),
        outcome.map.len(),
        outcome.skipped
    );
    for (i, err) in outcome.landmark_errors().iter().enumerate() {
        println!("  landmark {:2}: {:.3} m", i, err);
    }

    if let Some(plot_path) = settings.scenario.plot_path.as_deref() {
        let mut plot = SlamPlot::new("EKF SLAM");
        plot.plot_run(
            &outcome.history,
            outcome.map.landmarks(),
            &outcome.slam.landmarks(),
        );
        plot.save_svg(plot_path, 800, 800)?;
        info!("Plot saved to {}", plot_path);
    }

    Ok(())
}
