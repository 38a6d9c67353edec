mod commands;
mod dispatch;
mod helpers;

use clap::Parser;
use nuspec_core::domain::NuSpecError;
use std::path::PathBuf;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_nuspec_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            eprintln!("{}", diagnostic.fatal_exit_line());
            diagnostic.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("nuspec".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.config, cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "nuspec",
    version,
    about = "Neutrino oscillation tables and event-spectrum propagation"
)]
struct Cli {
    /// Analysis configuration JSON; relative directories resolve against its folder
    #[arg(long, global = true, value_name = "json")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Generate probability tables for all eighteen flavor pairs
    Oscvectors(commands::OscVectorsArgs),
    /// Generate probability tables for every point of a parameter sweep
    Sweep(commands::SweepArgs),
    /// Multiply a beam flux by the oscillation probabilities
    #[command(name = "flux2oscflux")]
    Flux2OscFlux(commands::StageArgs),
    /// Fold an oscillated flux block with cross sections and target count
    #[command(name = "oscflux2truespec")]
    OscFlux2TrueSpec(commands::StageArgs),
    /// Smear a true spectrum block with the detector response
    #[command(name = "truespec2recospec")]
    TrueSpec2RecoSpec(commands::StageArgs),
    /// Run all three stages from beam flux to reconstructed spectrum
    Propagate(commands::StageArgs),
    /// Convert between signed flavor indices and names
    FlavorName(commands::FlavorNameArgs),
}

fn dispatch_parsed(config: Option<PathBuf>, command: CliCommand) -> Result<i32, CliError> {
    let config = config.as_deref();
    match command {
        CliCommand::Oscvectors(args) => commands::run_oscvectors_command(config, args),
        CliCommand::Sweep(args) => commands::run_sweep_command(config, args),
        CliCommand::Flux2OscFlux(args) => dispatch_stage(config, "flux2oscflux", args),
        CliCommand::OscFlux2TrueSpec(args) => dispatch_stage(config, "oscflux2truespec", args),
        CliCommand::TrueSpec2RecoSpec(args) => dispatch_stage(config, "truespec2recospec", args),
        CliCommand::Propagate(args) => dispatch_stage(config, "propagate", args),
        CliCommand::FlavorName(args) => commands::run_flavor_name_command(args),
    }
}

fn dispatch_stage(
    config: Option<&std::path::Path>,
    command_name: &str,
    args: commands::StageArgs,
) -> Result<i32, CliError> {
    let spec = dispatch::stage_command_spec(command_name).ok_or_else(|| {
        CliError::Internal(anyhow::anyhow!(
            "stage command '{command_name}' is not registered"
        ))
    })?;
    commands::run_stage_command(config, spec, args)
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(NuSpecError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<NuSpecError> for CliError {
    fn from(error: NuSpecError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_nuspec_error(&self) -> NuSpecError {
        match self {
            Self::Usage(message) => NuSpecError::config("INPUT.CLI_USAGE", message.trim_end()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => NuSpecError::internal("RUN.CLI", format!("{error:#}")),
        }
    }
}
