use clap::{Parser, ValueEnum};
use pnp_gcode::{
    CommandSink, Configuration, GcodeEmitter, JsonLinesEmitter, MachineConfig, Part,
    PlacementEngine, read_parts,
};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pnp-gcode",
    about = "Turn a part position list into pick'n'place G-code"
)]
struct Cli {
    /// Layout file describing the board origin and component tapes.
    layout: PathBuf,

    /// Part position list (`Ref Val Package PosX PosY Rot [Side]`). Reads stdin when omitted.
    #[arg(long)]
    parts: Option<PathBuf>,

    /// JSON file with machine geometry.
    #[arg(long)]
    machine: Option<PathBuf>,

    /// Output format written to stdout.
    #[arg(long, value_enum, default_value_t = Format::Gcode)]
    format: Format,

    /// Travel clearance above the slot height (mm).
    #[arg(long)]
    hover_height: Option<f32>,

    /// Release height relative to the slot height (mm).
    #[arg(long, allow_hyphen_values = true)]
    place_offset: Option<f32>,

    /// Rotation axis units for one full nozzle turn.
    #[arg(long)]
    angle_units_per_turn: Option<f32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Gcode,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut machine = match &cli.machine {
        Some(path) => MachineConfig::from_json_file(path)?,
        None => MachineConfig::default(),
    };
    if let Some(v) = cli.hover_height {
        machine.hover_height = v;
    }
    if let Some(v) = cli.place_offset {
        machine.place_z_offset = v;
    }
    if let Some(v) = cli.angle_units_per_turn {
        machine.angle_units_per_turn = v;
    }

    let mut config = Configuration::load(&cli.layout)?;
    let parts: Vec<Part> = match &cli.parts {
        Some(path) => read_parts(BufReader::new(File::open(path)?))?,
        None => read_parts(io::stdin().lock())?,
    };

    let engine = PlacementEngine::new(machine);
    let stdout = io::stdout().lock();
    let mut sink: Box<dyn CommandSink> = match cli.format {
        Format::Gcode => Box::new(GcodeEmitter::new(stdout)),
        Format::Json => Box::new(JsonLinesEmitter::new(stdout)),
    };
    engine.run(&mut config, &parts, sink.as_mut())?;
    Ok(())
}
