use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use seatcast::config_file::DEFAULT_CONFIG_PATH;
use seatcast::outputs::summary_json;
use seatcast::{WorkflowOptions, init_logging, load_config, run_forecast};
use seatcast_core::ConfigOverrides;
use seatcast_core::sensitivity::DEFAULT_SENSITIVITY_DELTAS;
use seatcast_core::targeting::{DEFAULT_BENEFICIARY, DEFAULT_TRANSFER};

#[derive(Parser, Debug)]
#[command(name = "seatcast")]
#[command(about = "Monte Carlo seat forecasts under D'Hondt allocation")]
struct Cli {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run simulations and write forecast artifacts
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Path to the YAML forecast config
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Output directory for artifacts
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Number of simulated elections
    #[arg(long)]
    sims: Option<usize>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Trials per sensitivity and targeting run
    #[arg(long)]
    sensitivity_sims: Option<usize>,

    /// Dirichlet concentration
    #[arg(long)]
    concentration: Option<f64>,

    /// Standard deviation of the bloc swing
    #[arg(long, allow_negative_numbers = true)]
    swing_sd: Option<f64>,

    /// Correlation between left and right bloc swings
    #[arg(long, allow_negative_numbers = true)]
    swing_rho: Option<f64>,

    /// Skip the sensitivity sweep
    #[arg(long)]
    no_sensitivity: bool,

    /// List to write the targeting report for
    #[arg(long, default_value = DEFAULT_BENEFICIARY)]
    target: String,

    /// Share moved from each donor in the targeting report, in (0, 1)
    #[arg(
        long,
        default_value_t = DEFAULT_TRANSFER,
        value_parser = parse_transfer,
        allow_negative_numbers = true
    )]
    transfer: f64,
}

fn parse_transfer(value: &str) -> Result<f64, String> {
    let share: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !(share.is_finite() && share > 0.0 && share < 1.0) {
        return Err(format!("transfer must be a share in (0, 1), got {value}"));
    }
    Ok(share)
}

impl SimulateArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            sims: self.sims,
            seed: self.seed,
            sensitivity_sims: self.sensitivity_sims,
            concentration: self.concentration,
            swing_sd: self.swing_sd,
            swing_rho: self.swing_rho,
        }
    }

    fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            sensitivity: !self.no_sensitivity,
            deltas: DEFAULT_SENSITIVITY_DELTAS.to_vec(),
            beneficiary: self.target.clone(),
            transfer: self.transfer,
        }
    }
}

fn simulate(args: &SimulateArgs) -> color_eyre::Result<()> {
    let mut config = load_config(&args.config)?;

    let overrides = args.overrides();
    if !overrides.is_empty() {
        tracing::debug!(?overrides, "Applying command-line overrides");
        config = config
            .with_overrides(&overrides)
            .wrap_err("Invalid command-line override")?;
    }

    let run = run_forecast(&config, &args.out, &args.workflow_options())?;
    println!("{}", summary_json(&run.summary)?);
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match &cli.command {
        Command::Simulate(args) => simulate(args)?,
    }

    tracing::info!("SeatCast finished");
    Ok(())
}
