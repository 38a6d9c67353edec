//! Analysis configuration: lookup-table directories, file-naming knobs and
//! physics defaults, loaded from JSON and passed explicitly to every stage.

use super::constants::{ARGON_40KT_TARGETS, DEFAULT_MAX_BINS};
use crate::domain::{
    BeamMode, ComputeResult, EnergyBinning, EventClass, Flavor, FlavorKind, InteractionChannel,
    NameStyle, NuSpecError, OscillationParameters, ProbabilityTable, SampleId,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SWEEP_MANIFEST_FILE: &str = "sweep-manifest.json";

/// Which simulated sample supplies the detector response for a flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseSelection {
    /// The true flavor's own sample: its unoscillated beam component, or the
    /// muon-beam appearance sample for tau.
    #[default]
    OwnFlavor,
    /// Always the muon-neutrino beam sample of the same sign, whatever the
    /// start flavor. Reproduces the historical event-rate tables.
    MuonDisappearanceChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub flux_dir: PathBuf,
    pub oscillation_dir: PathBuf,
    pub sweep_dir: PathBuf,
    pub cross_section_dir: PathBuf,
    pub response_dir: PathBuf,
    pub efficiency_dir: PathBuf,
    pub output_dir: PathBuf,
    pub cross_section_target: String,
    pub max_bins: usize,
    pub channel: InteractionChannel,
    pub beam_mode: BeamMode,
    pub response_selection: ResponseSelection,
    pub event_class_suffix: String,
    pub target_count: f64,
    pub oscillation: OscillationParameters,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            flux_dir: PathBuf::from("flux"),
            oscillation_dir: PathBuf::from("oscillation"),
            sweep_dir: PathBuf::from("oscillation/sweep"),
            cross_section_dir: PathBuf::from("cross-section"),
            response_dir: PathBuf::from("detector-response"),
            efficiency_dir: PathBuf::from("efficiency"),
            output_dir: PathBuf::from("output"),
            cross_section_target: "Ar40".to_string(),
            max_bins: DEFAULT_MAX_BINS,
            channel: InteractionChannel::Cc,
            beam_mode: BeamMode::Neutrino,
            response_selection: ResponseSelection::OwnFlavor,
            event_class_suffix: String::new(),
            target_count: ARGON_40KT_TARGETS,
            oscillation: OscillationParameters::nufit_2014_normal(),
        }
    }
}

impl AnalysisConfig {
    /// Rebases every relative directory onto `root`.
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        for dir in [
            &mut self.flux_dir,
            &mut self.oscillation_dir,
            &mut self.sweep_dir,
            &mut self.cross_section_dir,
            &mut self.response_dir,
            &mut self.efficiency_dir,
            &mut self.output_dir,
        ] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
        self
    }

    pub fn validate(&self) -> ComputeResult<()> {
        if self.max_bins == 0 {
            return Err(NuSpecError::config(
                "CONFIG.MAX_BINS",
                "maxBins must be at least 1",
            ));
        }

        if !self.target_count.is_finite() || self.target_count <= 0.0 {
            return Err(NuSpecError::config(
                "CONFIG.TARGET_COUNT",
                format!("targetCount must be finite and > 0, got {}", self.target_count),
            ));
        }

        if self.cross_section_target.trim().is_empty() {
            return Err(NuSpecError::config(
                "CONFIG.CROSS_SECTION_TARGET",
                "crossSectionTarget must not be empty",
            ));
        }

        self.oscillation.validate()
    }

    pub fn check_binning(&self, binning: &EnergyBinning) -> ComputeResult<()> {
        if binning.nbins() > self.max_bins {
            return Err(NuSpecError::config(
                "CONFIG.MAX_BINS",
                format!(
                    "{} bins exceed the configured ceiling of {}",
                    binning.nbins(),
                    self.max_bins
                ),
            ));
        }
        Ok(())
    }

    pub fn probability_table_path(&self, start: Flavor, end: Flavor, nbins: usize) -> PathBuf {
        self.oscillation_dir
            .join(ProbabilityTable::file_name(start, end, nbins))
    }

    pub fn sweep_table_path(
        &self,
        ordinal: usize,
        start: Flavor,
        end: Flavor,
        nbins: usize,
    ) -> PathBuf {
        self.sweep_dir.join(format!(
            "p{ordinal}_{}",
            ProbabilityTable::file_name(start, end, nbins)
        ))
    }

    pub fn sweep_manifest_path(&self) -> PathBuf {
        self.sweep_dir.join(SWEEP_MANIFEST_FILE)
    }

    /// `{flavor}_{target}__tot_{cc|nc}{nbins}.csv` with the underscore
    /// flavor name, e.g. `nu_mu_bar_Ar40__tot_cc120.csv`.
    pub fn cross_section_path(
        &self,
        flavor: Flavor,
        channel: InteractionChannel,
        nbins: usize,
    ) -> PathBuf {
        self.cross_section_dir.join(format!(
            "{}_{}__tot_{}{}.csv",
            flavor.name(NameStyle::Underscore),
            self.cross_section_target,
            channel.as_str(),
            nbins
        ))
    }

    /// Response matrix the pipeline reads, tagged with `event_class_suffix`.
    pub fn response_matrix_path(
        &self,
        sample: &SampleId,
        channel: InteractionChannel,
        nbins: usize,
    ) -> PathBuf {
        self.response_file(sample, &self.event_class_suffix, channel, nbins)
    }

    /// Response matrix restricted to one reconstructed event class.
    pub fn class_response_matrix_path(
        &self,
        sample: &SampleId,
        event_class: EventClass,
        channel: InteractionChannel,
        nbins: usize,
    ) -> PathBuf {
        self.response_file(sample, event_class.suffix(), channel, nbins)
    }

    fn response_file(
        &self,
        sample: &SampleId,
        suffix: &str,
        channel: InteractionChannel,
        nbins: usize,
    ) -> PathBuf {
        self.response_dir.join(format!(
            "{}{}_true{}{}.csv",
            sample.flux_type_name(),
            suffix,
            channel.upper(),
            nbins
        ))
    }

    pub fn efficiency_path(
        &self,
        sample: &SampleId,
        event_class: EventClass,
        channel: InteractionChannel,
        nbins: usize,
    ) -> PathBuf {
        self.efficiency_dir.join(format!(
            "{}{}_true{}{}.csv",
            sample.flux_type_name(),
            event_class.suffix(),
            channel.upper(),
            nbins
        ))
    }

    pub fn beam_flux_path(&self, sample: &SampleId, nbins: usize) -> PathBuf {
        self.flux_dir
            .join(format!("{}{}.csv", sample.flux_type_name(), nbins))
    }

    /// Sample whose response matrix smears the `end` row of a spectrum that
    /// started as `start`.
    pub fn response_sample(&self, start: Flavor, end: Flavor) -> SampleId {
        let beam_flavor = match self.response_selection {
            // No tau component in the beam: tau samples are muon-beam appearance.
            ResponseSelection::OwnFlavor if end.kind() == FlavorKind::Tau => {
                end.with_kind(FlavorKind::Muon)
            }
            ResponseSelection::OwnFlavor => end,
            ResponseSelection::MuonDisappearanceChannel => start.with_kind(FlavorKind::Muon),
        };
        SampleId {
            beam_mode: self.beam_mode,
            beam_flavor,
            true_flavor: end,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<ConfigLoadError> for NuSpecError {
    fn from(error: ConfigLoadError) -> Self {
        match &error {
            ConfigLoadError::Read { .. } => NuSpecError::io("IO.CONFIG_READ", error.to_string()),
            ConfigLoadError::Parse { .. } => {
                NuSpecError::config("CONFIG.PARSE", error.to_string())
            }
        }
    }
}

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigLoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_analysis_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigLoadError> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::{AnalysisConfig, ConfigLoadError, ResponseSelection, load_analysis_config};
    use crate::domain::{
        BeamMode, EnergyBinning, EventClass, Flavor, InteractionChannel, NuSpecError,
        NuSpecErrorCategory, SampleId,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn file_names_follow_lookup_conventions() {
        let config = AnalysisConfig::default().with_root("/data");
        assert_eq!(
            config.probability_table_path(Flavor::NUMU, Flavor::NUE, 120),
            Path::new("/data/oscillation/numu_nue120.csv")
        );
        assert_eq!(
            config.sweep_table_path(7, Flavor::NUEBAR, Flavor::NUTAUBAR, 40),
            Path::new("/data/oscillation/sweep/p7_nuebar_nutaubar40.csv")
        );
        assert_eq!(
            config.cross_section_path(Flavor::NUMUBAR, InteractionChannel::Cc, 120),
            Path::new("/data/cross-section/nu_mu_bar_Ar40__tot_cc120.csv")
        );

        let sample = SampleId::new(BeamMode::Neutrino, Flavor::NUMU, Flavor::NUE).expect("sample");
        assert_eq!(
            config.response_matrix_path(&sample, InteractionChannel::Nc, 120),
            Path::new("/data/detector-response/nuflux_numuflux_nue_trueNC120.csv")
        );
        assert_eq!(
            config.efficiency_path(&sample, EventClass::NueCcLike, InteractionChannel::Cc, 120),
            Path::new("/data/efficiency/nuflux_numuflux_nue_nueCC-like_trueCC120.csv")
        );
        assert_eq!(
            config.beam_flux_path(&sample, 120),
            Path::new("/data/flux/nuflux_numuflux_nue120.csv")
        );
    }

    #[test]
    fn response_selection_picks_the_beam_sample() {
        let mut config = AnalysisConfig::default();
        let own = |start, end| config.response_sample(start, end).flux_type_name();
        assert_eq!(own(Flavor::NUMU, Flavor::NUMU), "nuflux_numuflux_numu");
        assert_eq!(own(Flavor::NUMU, Flavor::NUE), "nuflux_nueflux_nue");
        assert_eq!(own(Flavor::NUE, Flavor::NUMU), "nuflux_numuflux_numu");
        assert_eq!(own(Flavor::NUE, Flavor::NUTAU), "nuflux_numuflux_nutau");

        config.response_selection = ResponseSelection::MuonDisappearanceChannel;
        config.beam_mode = BeamMode::Antineutrino;
        let legacy = config.response_sample(Flavor::NUEBAR, Flavor::NUTAUBAR);
        assert_eq!(legacy.flux_type_name(), "anuflux_numubarflux_nutaubar");
    }

    #[test]
    fn bin_ceiling_is_a_config_error() {
        let config = AnalysisConfig {
            max_bins: 10,
            ..AnalysisConfig::default()
        };
        let binning = EnergyBinning::new(11, 0.0, 1.0).expect("binning");
        let error = config.check_binning(&binning).expect_err("over the ceiling");
        assert_eq!(error.category(), NuSpecErrorCategory::ConfigError);
    }

    #[test]
    fn config_round_trips_through_json_with_defaults() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("analysis.json");
        fs::write(
            &path,
            r#"{ "responseDir": "responses", "channel": "nc", "responseSelection": "muonDisappearanceChannel" }"#,
        )
        .expect("config should be written");

        let config = load_analysis_config(&path).expect("config should load");
        assert_eq!(config.response_dir, Path::new("responses"));
        assert_eq!(config.channel, InteractionChannel::Nc);
        assert_eq!(
            config.response_selection,
            ResponseSelection::MuonDisappearanceChannel
        );
        assert_eq!(config.max_bins, 1000);
        assert_eq!(config.cross_section_target, "Ar40");

        let json = serde_json::to_string(&config).expect("serialize");
        let reparsed: AnalysisConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(reparsed, config);
    }

    #[test]
    fn load_errors_map_to_categories() {
        let temp = TempDir::new().expect("tempdir should be created");
        let missing = load_analysis_config(temp.path().join("missing.json"))
            .expect_err("missing file");
        assert!(matches!(missing, ConfigLoadError::Read { .. }));
        assert_eq!(
            NuSpecError::from(missing).category(),
            NuSpecErrorCategory::IoError
        );

        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").expect("file should be written");
        let broken = load_analysis_config(&path).expect_err("broken json");
        assert_eq!(
            NuSpecError::from(broken).category(),
            NuSpecErrorCategory::ConfigError
        );
    }
}
