use super::CliError;
use super::dispatch::{StageCommandSpec, stage_executor};
use super::helpers::*;
use nuspec_core::domain::{
    ComputeRequest, EnergyBinning, Flavor, NameStyle, OscillationParameters, ParameterSweep,
    name_of,
};
use nuspec_core::modules::oscillation::{
    DmpEngine, GenerationOutcome, GenerationStatus, OscillationTableGenerator,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(clap::Args)]
pub(super) struct BinningArgs {
    /// Number of energy bins
    #[arg(long)]
    nbins: usize,

    /// Lower edge of the first bin in GeV
    #[arg(long, default_value_t = 0.0)]
    emin: f64,

    /// Upper edge of the last bin in GeV
    #[arg(long, default_value_t = 10.0)]
    emax: f64,
}

impl BinningArgs {
    fn binning(&self) -> Result<EnergyBinning, CliError> {
        Ok(EnergyBinning::new(self.nbins, self.emin, self.emax)?)
    }
}

#[derive(clap::Args)]
pub(super) struct OscVectorsArgs {
    #[command(flatten)]
    binning: BinningArgs,

    /// Oscillation parameters JSON overriding the configured set
    #[arg(long, value_name = "json")]
    parameters: Option<PathBuf>,

    /// Newton refinement steps for the matter eigenvalues
    #[arg(long, default_value_t = 0)]
    newton: u8,
}

#[derive(clap::Args)]
pub(super) struct SweepArgs {
    #[command(flatten)]
    binning: BinningArgs,

    /// Parameter sweep JSON with one value list per mixing parameter
    #[arg(long, value_name = "json")]
    sweep: PathBuf,

    /// Newton refinement steps for the matter eigenvalues
    #[arg(long, default_value_t = 0)]
    newton: u8,
}

#[derive(clap::Args)]
pub(super) struct StageArgs {
    /// Beam flavor the input belongs to, as a signed index or a name
    #[arg(long, allow_hyphen_values = true, value_parser = parse_flavor)]
    flavor: Flavor,

    #[command(flatten)]
    binning: BinningArgs,

    /// Stage input file
    #[arg(long)]
    input: PathBuf,

    /// Stage output file
    #[arg(long)]
    output: PathBuf,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub(super) enum NameStyleArg {
    Compact,
    Underscore,
}

impl From<NameStyleArg> for NameStyle {
    fn from(style: NameStyleArg) -> Self {
        match style {
            NameStyleArg::Compact => NameStyle::Compact,
            NameStyleArg::Underscore => NameStyle::Underscore,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct FlavorNameArgs {
    /// Signed flavor index (prints its name) or flavor name (prints its index)
    #[arg(allow_hyphen_values = true)]
    flavor: String,

    /// Naming style used when printing a name
    #[arg(long, value_enum, default_value_t = NameStyleArg::Compact)]
    style: NameStyleArg,
}

pub(super) fn run_oscvectors_command(
    config_path: Option<&Path>,
    args: OscVectorsArgs,
) -> Result<i32, CliError> {
    let config = load_config(config_path)?;
    let binning = args.binning.binning()?;
    let params = match &args.parameters {
        Some(path) => load_json_input::<OscillationParameters>(path)?,
        None => config.oscillation,
    };

    let engine = DmpEngine::default().with_newton_iterations(args.newton);
    let generator = OscillationTableGenerator::new(engine, config);
    let outcomes = generator.generate_all(&params, &binning)?;
    report_generation("oscvectors", &outcomes)
}

pub(super) fn run_sweep_command(
    config_path: Option<&Path>,
    args: SweepArgs,
) -> Result<i32, CliError> {
    let config = load_config(config_path)?;
    let binning = args.binning.binning()?;
    let sweep = load_json_input::<ParameterSweep>(&args.sweep)?;

    let engine = DmpEngine::default().with_newton_iterations(args.newton);
    let generator = OscillationTableGenerator::new(engine, config);
    let outcomes = generator.generate_many(&sweep, &binning)?;
    report_generation("sweep", &outcomes)
}

fn report_generation(command: &str, outcomes: &[GenerationOutcome]) -> Result<i32, CliError> {
    let written = outcomes
        .iter()
        .filter(|outcome| outcome.status == GenerationStatus::Written)
        .count();
    print_line(&format!(
        "{command} completed: {written} tables written, {} already present.",
        outcomes.len() - written
    ))?;
    Ok(0)
}

pub(super) fn run_stage_command(
    config_path: Option<&Path>,
    spec: StageCommandSpec,
    args: StageArgs,
) -> Result<i32, CliError> {
    let config = load_config(config_path)?;
    let binning = args.binning.binning()?;
    let request = ComputeRequest::new(spec.module, args.flavor, binning, args.input, args.output);

    info!(
        "{}: reading {} from {}",
        spec.command,
        spec.input_artifact,
        request.input_path.display()
    );
    let artifacts = stage_executor(spec.module, config).execute(&request)?;
    info!(
        "{}: {} written to {}",
        spec.command,
        spec.output_artifact,
        request.output_path.display()
    );

    print_artifacts(&artifacts)?;
    Ok(0)
}

pub(super) fn run_flavor_name_command(args: FlavorNameArgs) -> Result<i32, CliError> {
    let line = match args.flavor.trim().parse::<i32>() {
        Ok(index) => name_of(index, args.style.into())?.to_string(),
        Err(_) => Flavor::from_name(&args.flavor)?.index().to_string(),
    };
    print_line(&line)?;
    Ok(0)
}
