//! Flux to reconstructed-spectrum propagation: pure stage functions, table
//! loaders driven by [`AnalysisConfig`] naming, and file-level executors.

mod stages;
mod tables;

pub use stages::{
    CrossSections, ProbabilityTables, ResponseMatrices, flux_to_oscillated_flux,
    oscillated_flux_to_true_spectrum, true_spectrum_to_reco_spectrum,
};
pub use tables::{
    block_header, load_cross_sections, load_probability_tables, load_response_matrices,
    read_block, write_block,
};

use super::ModuleExecutor;
use crate::codec::read_vector_file;
use crate::common::AnalysisConfig;
use crate::domain::{
    ComputeArtifact, ComputeModule, ComputeRequest, ComputeResult, EnergyBinning, Flavor,
    FlavorBlock, NuSpecError,
};
use std::path::{Path, PathBuf};
use tracing::info;

pub const OSCILLATED_FLUX_SUFFIX: &str = "oscflux";
pub const TRUE_SPECTRUM_SUFFIX: &str = "truespec";

/// Every intermediate of one propagation run.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagatedSpectra {
    pub oscillated_flux: FlavorBlock,
    pub true_spectrum: FlavorBlock,
    pub reco_spectrum: FlavorBlock,
}

/// Chains the three stages, loading every lookup table through `config`.
pub struct SpectrumPropagationPipeline<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> SpectrumPropagationPipeline<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn oscillate(
        &self,
        start: Flavor,
        binning: &EnergyBinning,
        flux: &[f64],
    ) -> ComputeResult<FlavorBlock> {
        let tables = load_probability_tables(self.config, start, binning)?;
        flux_to_oscillated_flux(start, binning, flux, &tables)
    }

    pub fn interact(
        &self,
        start: Flavor,
        binning: &EnergyBinning,
        oscillated_flux: &FlavorBlock,
    ) -> ComputeResult<FlavorBlock> {
        let sign = start.particle_sign();
        let cross_sections = load_cross_sections(self.config, sign, binning)?;
        oscillated_flux_to_true_spectrum(
            sign,
            binning,
            self.config.target_count,
            oscillated_flux,
            &cross_sections,
        )
    }

    pub fn reconstruct(
        &self,
        start: Flavor,
        binning: &EnergyBinning,
        true_spectrum: &FlavorBlock,
    ) -> ComputeResult<FlavorBlock> {
        let responses = load_response_matrices(self.config, start, binning)?;
        true_spectrum_to_reco_spectrum(start.particle_sign(), binning, true_spectrum, &responses)
    }

    pub fn run(
        &self,
        start: Flavor,
        binning: &EnergyBinning,
        flux: &[f64],
    ) -> ComputeResult<PropagatedSpectra> {
        self.config.check_binning(binning)?;
        let oscillated_flux = self.oscillate(start, binning, flux)?;
        let true_spectrum = self.interact(start, binning, &oscillated_flux)?;
        let reco_spectrum = self.reconstruct(start, binning, &true_spectrum)?;
        info!(
            "propagated {start} flux: {} true events, {} reconstructed",
            true_spectrum.total(),
            reco_spectrum.total()
        );
        Ok(PropagatedSpectra {
            oscillated_flux,
            true_spectrum,
            reco_spectrum,
        })
    }
}

fn validate_request_shape(
    request: &ComputeRequest,
    expected: ComputeModule,
    config: &AnalysisConfig,
) -> ComputeResult<()> {
    if request.module != expected {
        return Err(NuSpecError::config(
            "INPUT.MODULE",
            format!("{expected} executor cannot run a {} request", request.module),
        ));
    }

    if request.input_path == request.output_path {
        return Err(NuSpecError::config(
            "INPUT.OUTPUT_PATH",
            format!(
                "{expected} would overwrite its input '{}'",
                request.input_path.display()
            ),
        ));
    }

    config.check_binning(&request.binning)
}

/// `{dir}/{stem}.{suffix}.csv` next to `output`.
pub fn intermediate_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "spectrum".to_string());
    output.with_file_name(format!("{stem}.{suffix}.csv"))
}

pub struct OscillateModule {
    config: AnalysisConfig,
}

impl OscillateModule {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl ModuleExecutor for OscillateModule {
    fn execute(&self, request: &ComputeRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        validate_request_shape(request, ComputeModule::Oscillate, &self.config)?;
        let flux = read_vector_file(&request.input_path, request.binning.nbins())?;
        let block = SpectrumPropagationPipeline::new(&self.config).oscillate(
            request.flavor,
            &request.binning,
            &flux,
        )?;
        write_block(
            &request.output_path,
            &block,
            &block_header(&format!("oscillated {} flux", request.flavor), &block),
        )?;
        info!("{}: wrote {}", request.module, request.output_path.display());
        Ok(vec![ComputeArtifact::new(&request.output_path)])
    }
}

pub struct InteractModule {
    config: AnalysisConfig,
}

impl InteractModule {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl ModuleExecutor for InteractModule {
    fn execute(&self, request: &ComputeRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        validate_request_shape(request, ComputeModule::Interact, &self.config)?;
        let sign = request.flavor.particle_sign();
        let oscillated = read_block(&request.input_path, sign, &request.binning)?;
        let block = SpectrumPropagationPipeline::new(&self.config).interact(
            request.flavor,
            &request.binning,
            &oscillated,
        )?;
        write_block(
            &request.output_path,
            &block,
            &block_header(&format!("true spectrum from {} beam", request.flavor), &block),
        )?;
        info!("{}: wrote {}", request.module, request.output_path.display());
        Ok(vec![ComputeArtifact::new(&request.output_path)])
    }
}

pub struct ReconstructModule {
    config: AnalysisConfig,
}

impl ReconstructModule {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl ModuleExecutor for ReconstructModule {
    fn execute(&self, request: &ComputeRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        validate_request_shape(request, ComputeModule::Reconstruct, &self.config)?;
        let sign = request.flavor.particle_sign();
        let true_spectrum = read_block(&request.input_path, sign, &request.binning)?;
        let block = SpectrumPropagationPipeline::new(&self.config).reconstruct(
            request.flavor,
            &request.binning,
            &true_spectrum,
        )?;
        write_block(
            &request.output_path,
            &block,
            &block_header(
                &format!("reconstructed spectrum from {} beam", request.flavor),
                &block,
            ),
        )?;
        info!("{}: wrote {}", request.module, request.output_path.display());
        Ok(vec![ComputeArtifact::new(&request.output_path)])
    }
}

/// Runs all three stages and keeps both intermediates next to the output.
pub struct PropagateModule {
    config: AnalysisConfig,
}

impl PropagateModule {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl ModuleExecutor for PropagateModule {
    fn execute(&self, request: &ComputeRequest) -> ComputeResult<Vec<ComputeArtifact>> {
        validate_request_shape(request, ComputeModule::Propagate, &self.config)?;
        let flux = read_vector_file(&request.input_path, request.binning.nbins())?;
        let spectra = SpectrumPropagationPipeline::new(&self.config).run(
            request.flavor,
            &request.binning,
            &flux,
        )?;

        let oscillated_path = intermediate_path(&request.output_path, OSCILLATED_FLUX_SUFFIX);
        let true_path = intermediate_path(&request.output_path, TRUE_SPECTRUM_SUFFIX);
        let outputs = [
            (&oscillated_path, &spectra.oscillated_flux, "oscillated flux"),
            (&true_path, &spectra.true_spectrum, "true spectrum"),
            (&request.output_path, &spectra.reco_spectrum, "reconstructed spectrum"),
        ];

        let mut artifacts = Vec::with_capacity(outputs.len());
        for (path, block, what) in outputs {
            write_block(
                path,
                block,
                &block_header(&format!("{what} from {} beam", request.flavor), block),
            )?;
            artifacts.push(ComputeArtifact::new(path));
        }

        info!("{}: wrote {} artifacts", request.module, artifacts.len());
        Ok(artifacts)
    }
}
