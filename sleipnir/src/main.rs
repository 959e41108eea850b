use std::path::PathBuf;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use clap::Parser;
use miette::{Result, miette};
use nidhogg::SensorValues;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sleipnir::config::{MotionConfig, RobotInfo};
use sleipnir::odometry::Odometry;
use sleipnir::script::{Script, ScriptPlayer};
use sleipnir::{
    ActionDispatcher, ActionRequest, ActionType, ActiveAction, BodyRequest, CYCLE_TIME,
    JointCommand, MotionPlugin,
};

/// Cycles between two status lines.
const STATUS_INTERVAL: u64 = 100;

/// Runs the motion core against a loopback robot, driven by a behaviour script.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory containing `motion.toml` and the per-robot overlays.
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    #[arg(long, env = "ROBOT_NAME", default_value = "sleipnir")]
    robot_name: String,

    /// Behaviour script to play, the robot stands when there is none.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Stop after this many cycles.
    #[arg(long)]
    ticks: Option<u64>,
}

#[derive(Resource, Debug)]
struct Cycle {
    count: u64,
    limit: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    miette::set_panic_hook();

    let args = Args::parse();
    let robot = RobotInfo::new(args.robot_name);
    let base_dir = std::env::current_dir()
        .map_err(|error| miette!("could not determine the working directory: {error}"))?;
    let config = MotionConfig::load_for_robot(&args.config_dir, &base_dir, &robot)?;
    let dispatcher = ActionDispatcher::new(&config, &robot)?;

    let player = match &args.script {
        Some(path) => {
            let script = Script::load(path)?;
            info!(
                script = %path.display(),
                ticks = script.total_ticks(),
                "playing behaviour script"
            );
            Some(ScriptPlayer::new(script))
        }
        None => None,
    };

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(CYCLE_TIME)))
        .add_plugins(MotionPlugin)
        .insert_resource(dispatcher)
        .insert_resource(config)
        .insert_resource(robot)
        .insert_resource(Cycle {
            count: 0,
            limit: args.ticks,
        })
        .add_systems(PreUpdate, (play_script, count_cycles).chain())
        .add_systems(PostUpdate, (loopback, log_status));

    match player {
        Some(player) => app.insert_resource(player),
        None => app.insert_resource(ActionRequest {
            body: BodyRequest::new(ActionType::Stand),
            ..Default::default()
        }),
    };

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(miette!("motion loop exited with code {code}")),
    }
}

fn play_script(
    player: Option<ResMut<ScriptPlayer>>,
    mut request: ResMut<ActionRequest>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(mut player) = player else {
        return;
    };

    match player.advance() {
        Some(body) => request.body = body,
        None => {
            info!("behaviour script finished");
            exit.write(AppExit::Success);
        }
    }
}

fn count_cycles(mut cycle: ResMut<Cycle>, mut exit: EventWriter<AppExit>) {
    cycle.count += 1;
    if cycle.limit.is_some_and(|limit| cycle.count > limit) {
        info!(cycles = cycle.limit, "cycle limit reached");
        exit.write(AppExit::Success);
    }
}

/// Feeds the commanded joints back as measurements, as if every joint reached its target.
fn loopback(command: Res<JointCommand>, mut sensors: ResMut<SensorValues>) {
    sensors.joints = **command;
}

fn log_status(cycle: Res<Cycle>, active: Res<ActiveAction>, odometry: Res<Odometry>) {
    if cycle.count % STATUS_INTERVAL != 0 {
        return;
    }

    let translation = odometry.translation();
    info!(
        cycle = cycle.count,
        action = %active.0,
        x = translation.x,
        y = translation.y,
        heading = odometry.heading(),
        "status"
    );
}
