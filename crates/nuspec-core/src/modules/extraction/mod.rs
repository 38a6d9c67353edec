//! Builds the lookup tables the propagation pipeline reads: beam fluxes,
//! cross sections, detector responses and selection efficiencies, all from
//! simulated event samples or tabulated curves.

mod histogram;
mod samples;
mod selection;

pub use histogram::{EnergyAxis, EventTableEngine, HistogramEngine};
pub use samples::{EventRecord, InMemorySampleRepository, SampleRepository};
pub use selection::{Selection, Weight};

use crate::codec::{write_mat, write_text_artifact, write_vector_file};
use crate::common::AnalysisConfig;
use crate::domain::{
    ComputeArtifact, ComputeResult, EnergyBinning, EventClass, Flavor, InteractionChannel,
    NuSpecError, SampleId,
};
use crate::numerics::{interpolate_linear, matrix_total, normalize_columns};
use faer::Mat;
use tracing::info;

/// Columns whose summed content is below this are treated as empty.
pub const EMPTY_COLUMN_THRESHOLD: f64 = 1.0e-6;

fn binning_note(binning: &EnergyBinning) -> String {
    format!(
        "{} bins over [{}, {}] GeV",
        binning.nbins(),
        binning.emin(),
        binning.emax()
    )
}

/// Unoscillated true-energy spectrum of `sample`, written to
/// `{fluxType}{nbins}.csv`.
pub fn extract_beam_flux<H: HistogramEngine + ?Sized>(
    engine: &H,
    config: &AnalysisConfig,
    sample: &SampleId,
    binning: &EnergyBinning,
) -> ComputeResult<ComputeArtifact> {
    config.check_binning(binning)?;
    let flux = engine.fill_1d(
        sample,
        EnergyAxis::True,
        binning,
        &Selection::All,
        &Weight::Unit,
    )?;

    let path = config.beam_flux_path(sample, binning.nbins());
    write_vector_file(
        &path,
        &flux,
        &[format!("{sample} true-energy flux, {}", binning_note(binning))],
    )?;
    info!("extracted beam flux {}", path.display());
    Ok(ComputeArtifact::new(path))
}

/// Tabulated total cross section, energies in GeV ascending, values in
/// units of 1e-38 cm².
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionCurve {
    source: String,
    energies: Vec<f64>,
    values: Vec<f64>,
}

impl CrossSectionCurve {
    pub fn new(
        source: impl Into<String>,
        energies: Vec<f64>,
        values: Vec<f64>,
    ) -> ComputeResult<Self> {
        if energies.len() < 2 || energies.len() != values.len() {
            return Err(NuSpecError::dimension(
                "DIM.CROSS_SECTION_CURVE",
                format!(
                    "cross-section curve needs matching energy/value columns of at least 2 points, got {} and {}",
                    energies.len(),
                    values.len()
                ),
            ));
        }

        if !energies.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(NuSpecError::format(
                "FORMAT.CROSS_SECTION_CURVE",
                "cross-section curve energies must be strictly ascending",
            ));
        }

        Ok(Self {
            source: source.into(),
            energies,
            values,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Linear interpolation, held flat past either end of the table.
    pub fn evaluate(&self, energy: f64) -> ComputeResult<f64> {
        interpolate_linear(energy, &self.energies, &self.values).ok_or_else(|| {
            NuSpecError::internal(
                "RUN.CROSS_SECTION_CURVE",
                format!("cannot interpolate cross section at {energy} GeV"),
            )
        })
    }

    pub fn sample_midpoints(&self, binning: &EnergyBinning) -> ComputeResult<Vec<f64>> {
        binning
            .midpoints()
            .into_iter()
            .map(|energy| self.evaluate(energy))
            .collect()
    }
}

pub fn extract_cross_section(
    config: &AnalysisConfig,
    curve: &CrossSectionCurve,
    binning: &EnergyBinning,
    flavor: Flavor,
    channel: InteractionChannel,
) -> ComputeResult<ComputeArtifact> {
    config.check_binning(binning)?;
    let values = curve.sample_midpoints(binning)?;
    let path = config.cross_section_path(flavor, channel, binning.nbins());
    write_vector_file(&path, &values, &[format!("Source: {}", curve.source())])?;
    info!("extracted {flavor} {channel} cross section {}", path.display());
    Ok(ComputeArtifact::new(path))
}

fn response_selection(channel: InteractionChannel, event_class: Option<EventClass>) -> Selection {
    match event_class {
        Some(class) => Selection::channel_and_class(channel, class),
        None => Selection::Channel(channel),
    }
}

/// Reco-by-true response of `sample`: rows are reconstructed bins, columns
/// are true bins, every non-empty column sums to one.
pub fn build_response_matrix<H: HistogramEngine + ?Sized>(
    engine: &H,
    sample: &SampleId,
    channel: InteractionChannel,
    event_class: Option<EventClass>,
    binning: &EnergyBinning,
) -> ComputeResult<Mat<f64>> {
    let mut matrix = engine.fill_2d(
        sample,
        (EnergyAxis::True, binning),
        (EnergyAxis::Reco, binning),
        &response_selection(channel, event_class),
        &Weight::Unit,
    )?;

    let total = matrix_total(&matrix);
    if total != 0.0 {
        for j in 0..matrix.ncols() {
            for i in 0..matrix.nrows() {
                matrix[(i, j)] /= total;
            }
        }
    }
    normalize_columns(&mut matrix, EMPTY_COLUMN_THRESHOLD);
    Ok(matrix)
}

/// Writes the response matrix of `sample`. Without an event class the file
/// carries the configured `event_class_suffix`, so the pipeline reads it back.
pub fn extract_response_matrix<H: HistogramEngine + ?Sized>(
    engine: &H,
    config: &AnalysisConfig,
    sample: &SampleId,
    channel: InteractionChannel,
    event_class: Option<EventClass>,
    binning: &EnergyBinning,
) -> ComputeResult<ComputeArtifact> {
    config.check_binning(binning)?;
    let matrix = build_response_matrix(engine, sample, channel, event_class, binning)?;
    let path = match event_class {
        Some(class) => config.class_response_matrix_path(sample, class, channel, binning.nbins()),
        None => config.response_matrix_path(sample, channel, binning.nbins()),
    };

    let content = write_mat(
        &matrix,
        &[format!(
            "{sample} {} response: rows reco, columns true, {}",
            channel.upper(),
            binning_note(binning)
        )],
    )?;
    write_text_artifact(&path, &content)?;
    info!("extracted detector response {}", path.display());
    Ok(ComputeArtifact::new(path))
}

/// Per reconstructed-energy bin, the fraction of `channel` events that land
/// in `event_class`. Bins with no `channel` events are zero.
pub fn build_efficiency<H: HistogramEngine + ?Sized>(
    engine: &H,
    sample: &SampleId,
    channel: InteractionChannel,
    event_class: EventClass,
    binning: &EnergyBinning,
) -> ComputeResult<Vec<f64>> {
    let selected = engine.fill_1d(
        sample,
        EnergyAxis::Reco,
        binning,
        &Selection::channel_and_class(channel, event_class),
        &Weight::Unit,
    )?;
    let all = engine.fill_1d(
        sample,
        EnergyAxis::Reco,
        binning,
        &Selection::Channel(channel),
        &Weight::Unit,
    )?;

    Ok(selected
        .iter()
        .zip(&all)
        .map(|(selected, all)| if *all == 0.0 { 0.0 } else { selected / all })
        .collect())
}

pub fn extract_efficiency<H: HistogramEngine + ?Sized>(
    engine: &H,
    config: &AnalysisConfig,
    sample: &SampleId,
    channel: InteractionChannel,
    event_class: EventClass,
    binning: &EnergyBinning,
) -> ComputeResult<ComputeArtifact> {
    config.check_binning(binning)?;
    let efficiency = build_efficiency(engine, sample, channel, event_class, binning)?;
    let path = config.efficiency_path(sample, event_class, channel, binning.nbins());
    write_vector_file(
        &path,
        &efficiency,
        &[format!(
            "{sample}{} efficiency among {} events, {}",
            event_class.suffix(),
            channel.upper(),
            binning_note(binning)
        )],
    )?;
    info!("extracted efficiency {}", path.display());
    Ok(ComputeArtifact::new(path))
}
