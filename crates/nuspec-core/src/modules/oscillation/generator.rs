use super::engine::{OscillationEngine, PropagationRequest};
use crate::codec::{write_text_artifact, write_vector_file};
use crate::common::AnalysisConfig;
use crate::domain::{
    ComputeResult, EnergyBinning, Flavor, NuSpecError, OscillationParameters, ParameterSweep,
    ProbabilityTable,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// P(start → end) at one energy, clamped to [0, 1]. The matter sign follows
/// `start`.
pub fn compute_probability<E: OscillationEngine + ?Sized>(
    engine: &E,
    params: &OscillationParameters,
    start: Flavor,
    end: Flavor,
    energy_gev: f64,
) -> ComputeResult<f64> {
    if start.particle_sign() != end.particle_sign() {
        return Err(NuSpecError::invalid_flavor(
            "FLAVOR.SIGN_MISMATCH",
            format!("cannot oscillate {start} into {end}: particle and antiparticle never mix"),
        ));
    }

    if !energy_gev.is_finite() || energy_gev < 0.0 {
        return Err(NuSpecError::config(
            "CONFIG.ENERGY",
            format!("oscillation energy must be finite and >= 0, got {energy_gev}"),
        ));
    }

    let probability = engine.probability(params, &PropagationRequest::new(start, end, energy_gev))?;
    Ok(probability.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Written,
    Skipped,
}

/// Result of one cached table: where it lives and whether this call wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub start: Flavor,
    pub end: Flavor,
    pub ordinal: Option<usize>,
    pub path: PathBuf,
    pub status: GenerationStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SweepManifest<'a> {
    binning: &'a EnergyBinning,
    points: Vec<SweepManifestPoint<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SweepManifestPoint<'a> {
    ordinal: usize,
    parameters: &'a OscillationParameters,
}

/// Every (start, end) pair with a shared particle sign, start in ascending
/// index order and end in e, mu, tau order.
pub fn flavor_pairs() -> Vec<(Flavor, Flavor)> {
    Flavor::all()
        .into_iter()
        .flat_map(|start| start.family().into_iter().map(move |end| (start, end)))
        .collect()
}

pub struct OscillationTableGenerator<E> {
    engine: E,
    config: AnalysisConfig,
}

impl<E: OscillationEngine> OscillationTableGenerator<E> {
    pub fn new(engine: E, config: AnalysisConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn generate_table(
        &self,
        start: Flavor,
        end: Flavor,
        params: &OscillationParameters,
        binning: &EnergyBinning,
    ) -> ComputeResult<ProbabilityTable> {
        self.config.check_binning(binning)?;
        params.validate()?;

        let probabilities = binning
            .midpoints()
            .into_iter()
            .map(|energy| compute_probability(&self.engine, params, start, end, energy))
            .collect::<ComputeResult<Vec<_>>>()?;
        ProbabilityTable::new(start, end, *binning, probabilities)
    }

    /// Writes `{start}_{end}{nbins}.csv` for all eighteen flavor pairs,
    /// leaving existing files untouched.
    pub fn generate_all(
        &self,
        params: &OscillationParameters,
        binning: &EnergyBinning,
    ) -> ComputeResult<Vec<GenerationOutcome>> {
        self.config.check_binning(binning)?;
        params.validate()?;

        flavor_pairs()
            .into_iter()
            .map(|(start, end)| {
                let path = self
                    .config
                    .probability_table_path(start, end, binning.nbins());
                self.generate_cached(start, end, None, params, binning, path)
            })
            .collect()
    }

    /// Expands `sweep` and writes `p{ordinal}_{start}_{end}{nbins}.csv` per
    /// point and pair, plus a manifest mapping ordinals to parameters.
    pub fn generate_many(
        &self,
        sweep: &ParameterSweep,
        binning: &EnergyBinning,
    ) -> ComputeResult<Vec<GenerationOutcome>> {
        self.config.check_binning(binning)?;
        let points = sweep.points()?;
        info!(
            "sweeping {} parameter points into {}",
            points.len(),
            self.config.sweep_dir.display()
        );

        let mut outcomes = Vec::with_capacity(points.len() * flavor_pairs().len());
        for (ordinal, params) in points.iter().enumerate() {
            for (start, end) in flavor_pairs() {
                let path = self
                    .config
                    .sweep_table_path(ordinal, start, end, binning.nbins());
                outcomes.push(self.generate_cached(
                    start,
                    end,
                    Some(ordinal),
                    params,
                    binning,
                    path,
                )?);
            }
        }

        self.write_manifest(&points, binning)?;
        Ok(outcomes)
    }

    fn generate_cached(
        &self,
        start: Flavor,
        end: Flavor,
        ordinal: Option<usize>,
        params: &OscillationParameters,
        binning: &EnergyBinning,
        path: PathBuf,
    ) -> ComputeResult<GenerationOutcome> {
        if path.exists() {
            info!("{} already exists, skipping", path.display());
            return Ok(GenerationOutcome {
                start,
                end,
                ordinal,
                path,
                status: GenerationStatus::Skipped,
            });
        }

        let table = self.generate_table(start, end, params, binning)?;
        write_vector_file(&path, &table.probabilities, &table_header(&table, params))?;
        debug!("generated P({start} -> {end}) into {}", path.display());

        Ok(GenerationOutcome {
            start,
            end,
            ordinal,
            path,
            status: GenerationStatus::Written,
        })
    }

    fn write_manifest(
        &self,
        points: &[OscillationParameters],
        binning: &EnergyBinning,
    ) -> ComputeResult<()> {
        let manifest = SweepManifest {
            binning,
            points: points
                .iter()
                .enumerate()
                .map(|(ordinal, parameters)| SweepManifestPoint {
                    ordinal,
                    parameters,
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&manifest).map_err(|source| {
            NuSpecError::internal(
                "RUN.SWEEP_MANIFEST",
                format!("failed to serialize sweep manifest: {source}"),
            )
        })?;
        write_manifest_file(&self.config.sweep_manifest_path(), &json)
    }
}

fn write_manifest_file(path: &Path, json: &str) -> ComputeResult<()> {
    write_text_artifact(path, json)?;
    info!("wrote sweep manifest {}", path.display());
    Ok(())
}

fn table_header(table: &ProbabilityTable, params: &OscillationParameters) -> Vec<String> {
    let mut header = vec![format!(
        "P({} -> {}) at {} bin midpoints over [{}, {}] GeV",
        table.start,
        table.end,
        table.binning.nbins(),
        table.binning.emin(),
        table.binning.emax()
    )];
    header.extend(params.header_lines());
    header
}
