// src/main.rs

mod config;
mod control;
mod features;
mod scenario;
mod ticklog;
mod types;

use anyhow::Result;
use control::mode::Mode;
use control::{Controller, TickViews};
use std::io::Write;
use std::path::Path;
use ticklog::TickLog;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.yaml".to_string());
    let config = types::Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("linecart={}", config.logging.level))
        .init();

    info!("🚗 Line-cart controller starting");
    info!(
        "Variant: pedestrian_gate={}, parking={}, cruise={:.2}",
        config.controller.pedestrian_gate, config.controller.parking, config.controller.cruise_speed
    );

    let scenario_path = Path::new(&config.scenario.input_path);
    let frames = scenario::load(scenario_path)?;
    if frames.is_empty() {
        error!("No frames in scenario {}", scenario_path.display());
        return Ok(());
    }
    info!("Loaded {} scripted frame pair(s)", frames.len());

    let stats = run_scenario(&config, &frames)?;

    info!("\n📊 Final Report:");
    info!("  Ticks: {}", stats.ticks);
    info!("  Lane-follow ticks: {}", stats.lane_follow_ticks);
    info!("  Sign-maneuver ticks: {}", stats.sign_ticks);
    info!("  Pedestrian stops: {}", stats.pedestrian_ticks);
    info!("  Parking ticks: {}", stats.parking_ticks);
    info!("  Default-cruise ticks: {}", stats.cruise_ticks);
    info!("  Final parking stage: {}", stats.final_stage);
    info!(
        "  Final command: l:{:.2}, r:{:.2}",
        stats.final_command.left, stats.final_command.right
    );

    Ok(())
}

struct RunStats {
    ticks: u64,
    lane_follow_ticks: usize,
    sign_ticks: usize,
    pedestrian_ticks: usize,
    parking_ticks: usize,
    cruise_ticks: usize,
    final_stage: &'static str,
    final_command: types::WheelCommand,
}

fn run_scenario(config: &types::Config, frames: &[scenario::ScriptedFrame]) -> Result<RunStats> {
    let mut controller = Controller::new(config.controller.clone());
    let mut log = TickLog::new(config.controller.log_capacity);

    let mut trace_file = if config.scenario.write_trace {
        std::fs::create_dir_all(&config.scenario.output_dir)?;
        let trace_path = Path::new(&config.scenario.output_dir).join("commands.jsonl");
        info!("💾 Command trace: {}", trace_path.display());
        Some(std::fs::File::create(trace_path)?)
    } else {
        None
    };

    let mut lane_follow_ticks = 0;
    let mut sign_ticks = 0;
    let mut pedestrian_ticks = 0;
    let mut parking_ticks = 0;
    let mut cruise_ticks = 0;
    let mut last_command = types::WheelCommand::STOP;

    for frame in frames {
        let (lane, forward) = frame.views();
        let extractor = frame.extractor();

        let command = controller.tick(
            TickViews {
                lane: lane.as_ref(),
                forward: forward.as_ref(),
            },
            &extractor,
            &mut log,
        );
        last_command = command;

        let mode = controller.last_mode().unwrap_or(Mode::DefaultCruise);
        match mode {
            Mode::LaneFollow => lane_follow_ticks += 1,
            Mode::SignManeuver => sign_ticks += 1,
            Mode::PedestrianStop => pedestrian_ticks += 1,
            Mode::Parking => parking_ticks += 1,
            Mode::DefaultCruise => cruise_ticks += 1,
        }

        if controller.state().tick % 50 == 0 {
            info!(
                "Tick {} | Mode: {} | l:{:.2} r:{:.2} | speed: {:.2}",
                controller.state().tick,
                mode.as_str(),
                command.left,
                command.right,
                controller.state().current_speed
            );
        }

        if let Some(ref mut file) = trace_file {
            let record = serde_json::json!({
                "tick": controller.state().tick,
                "mode": mode.as_str(),
                "left": command.left,
                "right": command.right,
                "sign": controller.state().sign.map(|s| s.as_str()),
                "light_confirmed": controller.state().light_confirmed,
                "parking_stage": controller.state().parking_stage.as_str(),
            });
            writeln!(file, "{}", serde_json::to_string(&record)?)?;
        }
    }

    for entry in log.iter() {
        debug!("ticklog: {}", entry);
    }

    Ok(RunStats {
        ticks: controller.state().tick,
        lane_follow_ticks,
        sign_ticks,
        pedestrian_ticks,
        parking_ticks,
        cruise_ticks,
        final_stage: controller.state().parking_stage.as_str(),
        final_command: last_command,
    })
}
