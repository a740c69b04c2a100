//! Differometor command-line interface.
//!
//! Provides the `differometor` binary, which builds one of the bundled
//! topologies (or replays a JSON setup description) and prints its Finesse
//! description or its parameter list.
//!
//! Exit codes: 0 = success, 1 = setup or parameter error,
//! 2 = serialization error, 3 = I/O error.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use differometor_core::{
    constrain_inter_grid_cell_spaces, initialize_with_config, to_finesse, BoundsTable,
    FinesseError, InitConfig, Setup, SetupError, Statement,
};
use differometor_setups::{aligo, uifo, voyager, Mode, UifoOptions};

/// Optical setup builder and Finesse exporter.
#[derive(Parser)]
#[command(name = "differometor", about = "Optical setup builder and Finesse exporter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the Finesse description of a setup.
    Finesse {
        #[command(flatten)]
        source: Source,
    },

    /// Print the parameter list as JSON.
    Parameters {
        #[command(flatten)]
        source: Source,

        /// Keep only these properties and tie inter-cell space lengths.
        #[arg(long, value_delimiter = ',')]
        constrain: Option<Vec<String>>,
    },

    /// Randomly initialize every parameter and print the Finesse description.
    Init {
        #[command(flatten)]
        source: Source,

        /// Raw draws come from [-bound, bound] before squashing.
        #[arg(long, default_value_t = 10.0)]
        uniform_bound: f64,
    },
}

/// Where the setup comes from.
#[derive(Args)]
struct Source {
    /// Bundled topology: voyager, aligo, uifo.
    #[arg(short, long, default_value = "voyager")]
    setup: String,

    /// Signal mode for voyager and aligo.
    #[arg(short, long, default_value = "space_modulation")]
    mode: String,

    /// Grid size for uifo.
    #[arg(long, default_value_t = 1)]
    size: usize,

    /// Randomize the uifo grid.
    #[arg(long)]
    random: bool,

    /// Seed for every random draw.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSON setup description to replay instead of a bundled topology.
    #[arg(short, long)]
    file: Option<PathBuf>,
}

/// Failure of a subcommand, carrying its exit code.
enum Failure {
    Setup(String),
    Finesse(FinesseError),
    Io(String),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Failure::Setup(_) => 1,
            Failure::Finesse(_) => 2,
            Failure::Io(_) => 3,
        }
    }

    fn report(&self) {
        match self {
            Failure::Setup(msg) => eprintln!("Setup error: {}", msg),
            Failure::Finesse(e) => eprintln!("Serialization error: {}", e),
            Failure::Io(msg) => eprintln!("I/O error: {}", msg),
        }
    }
}

impl From<SetupError> for Failure {
    fn from(e: SetupError) -> Self {
        Failure::Setup(e.to_string())
    }
}

impl From<FinesseError> for Failure {
    fn from(e: FinesseError) -> Self {
        Failure::Finesse(e)
    }
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Finesse { source } => run_finesse(&source),
        Commands::Parameters { source, constrain } => run_parameters(&source, constrain),
        Commands::Init {
            source,
            uniform_bound,
        } => run_init(&source, uniform_bound),
    };

    if let Err(failure) = result {
        failure.report();
        process::exit(failure.exit_code());
    }
}

/// Build the setup named by `source`.
fn build(source: &Source) -> Result<Setup, Failure> {
    if let Some(path) = &source.file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Failure::Io(format!("failed to read '{}': {}", path.display(), e)))?;
        let statements: Vec<Statement> = serde_json::from_str(&text)
            .map_err(|e| Failure::Setup(format!("invalid description '{}': {}", path.display(), e)))?;
        return Ok(Setup::from_statements(statements)?);
    }

    let setup = match source.setup.as_str() {
        "voyager" => voyager(source.mode.parse::<Mode>()?)?,
        "aligo" => aligo(source.mode.parse::<Mode>()?)?,
        "uifo" => {
            let options = UifoOptions::new(source.size).random(source.random);
            let mut rng = ChaCha8Rng::seed_from_u64(source.seed);
            uifo(&options, &mut rng)?
        }
        other => {
            return Err(Failure::Setup(format!(
                "unknown setup '{}', expected voyager/aligo/uifo",
                other
            )))
        }
    };
    tracing::info!(
        nodes = setup.node_count(),
        spaces = setup.edge_count(),
        parameters = setup.parameters().len(),
        "built setup"
    );
    Ok(setup)
}

fn run_finesse(source: &Source) -> Result<(), Failure> {
    let setup = build(source)?;
    print!("{}", to_finesse(&setup)?);
    Ok(())
}

fn run_parameters(source: &Source, constrain: Option<Vec<String>>) -> Result<(), Failure> {
    let setup = build(source)?;
    let json = match constrain {
        Some(properties) => {
            let properties: Vec<&str> = properties.iter().map(String::as_str).collect();
            let groups = constrain_inter_grid_cell_spaces(setup.parameters(), &properties);
            serde_json::to_string_pretty(&groups)
        }
        None => serde_json::to_string_pretty(setup.parameters()),
    }
    .map_err(|e| Failure::Io(format!("failed to serialize parameters: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn run_init(source: &Source, uniform_bound: f64) -> Result<(), Failure> {
    let mut setup = build(source)?;
    let parameters = setup.parameters().to_vec();
    let config = InitConfig {
        uniform_bound,
        seed: source.seed,
    };
    initialize_with_config(&mut setup, &parameters, &BoundsTable::default(), &config)
        .map_err(|e| Failure::Setup(e.to_string()))?;
    print!("{}", to_finesse(&setup)?);
    Ok(())
}
