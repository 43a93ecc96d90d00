use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use gps_sim::io;
use gps_sim::simulation::{SimConfig, SimWorld, DEFAULT_MAX_ACCELERATION, DEFAULT_MAX_DECELERATION};

#[derive(Parser)]
#[command(name = "gps_sim")]
#[command(about = "Simple simulator of vehicles moving on roads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate cars on a road file and write their positions
    Generate(GenerateArgs),

    /// List the road files available in the roads directory
    SourceFiles {
        /// Directory holding the source road files
        #[arg(long, default_value = "roads_data")]
        roads_dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Number of cars to generate
    count_cars: usize,

    /// Name (with .geojson extension) of the source road file
    source_file: String,

    /// Name of the result file
    result_file: String,

    /// Number of simulation ticks
    #[arg(long, default_value = "10")]
    results: u32,

    /// Minimum initial speed of vehicles (km/h)
    #[arg(long, default_value = "1")]
    min_speed: f64,

    /// Maximum initial speed of vehicles (km/h)
    #[arg(long, default_value = "50")]
    max_speed: f64,

    /// Largest speed gain per tick (km/h)
    #[arg(long, default_value_t = DEFAULT_MAX_ACCELERATION)]
    max_accel: f64,

    /// Largest speed loss per tick (km/h)
    #[arg(long, default_value_t = DEFAULT_MAX_DECELERATION)]
    max_decel: f64,

    /// Simulated seconds per tick
    #[arg(long, default_value = "1.0")]
    tick_seconds: f64,

    /// Sleep between ticks and use the measured wall time as the tick length
    #[arg(long)]
    realtime: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding the source road files
    #[arg(long, default_value = "roads_data")]
    roads_dir: PathBuf,

    /// Directory the result file is written to
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,gps_sim=info"))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::SourceFiles { roads_dir } => {
            println!("{:?}", io::list_road_files(&roads_dir)?);
            Ok(())
        }
    }
}

/// Run the simulation and write every car's track
fn run_generate(args: GenerateArgs) -> Result<()> {
    if !(args.tick_seconds.is_finite() && args.tick_seconds >= 0.0) {
        bail!("--tick-seconds must be a non-negative number");
    }

    // Fail on a bad output name before spending time simulating
    io::output_file_name(&args.result_file)?;

    let source_path = args.roads_dir.join(&args.source_file);
    if !source_path.is_file() {
        bail!("File '{}' not found in the source folder", source_path.display());
    }

    let source = io::read_road_file(&source_path)?;
    let network = source
        .into_network()
        .with_context(|| format!("Failed to build road network from {}", source_path.display()))?;

    let config = SimConfig {
        car_count: args.count_cars,
        min_speed: args.min_speed,
        max_speed: args.max_speed,
        max_acceleration: args.max_accel,
        max_deceleration: args.max_decel,
        seed: args.seed,
    };
    let mut world = SimWorld::from_config(network, &config)?;

    info!(
        "Running {} ticks with {} cars on {}",
        args.results,
        world.cars.len(),
        source_path.display()
    );

    let started_at = chrono::Local::now();
    let mut records = Vec::with_capacity(world.cars.len() * args.results as usize);
    let mut last_tick = Instant::now();

    for tick in 0..args.results {
        let elapsed = if args.realtime {
            let now = Instant::now();
            let elapsed = now.duration_since(last_tick).as_secs_f64();
            last_tick = now;
            elapsed
        } else {
            args.tick_seconds
        };

        records.extend(world.tick(elapsed));
        info!("--- After tick {} ({:.1}s simulated time) ---", tick + 1, world.time);

        if args.realtime && tick + 1 < args.results {
            std::thread::sleep(Duration::from_secs_f64(args.tick_seconds));
        }
    }

    world.print_summary();
    io::write_track_file(
        &args.results_dir,
        &args.result_file,
        &records,
        world.road_network.crs(),
        started_at,
    )?;

    Ok(())
}
