use super::{ComputeResult, Flavor, NameStyle, NuSpecError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionChannel {
    #[serde(alias = "CC")]
    Cc,
    #[serde(alias = "NC")]
    Nc,
}

impl InteractionChannel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cc => "cc",
            Self::Nc => "nc",
        }
    }

    pub const fn upper(self) -> &'static str {
        match self {
            Self::Cc => "CC",
            Self::Nc => "NC",
        }
    }
}

impl Display for InteractionChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionChannel {
    type Err = NuSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cc" => Ok(Self::Cc),
            "nc" => Ok(Self::Nc),
            other => Err(NuSpecError::config(
                "CONFIG.INTERACTION_CHANNEL",
                format!("unknown interaction channel '{other}', expected cc or nc"),
            )),
        }
    }
}

/// Horn polarity of the simulated beam: forward (neutrino) or reverse
/// (antineutrino) horn current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamMode {
    #[serde(alias = "nuflux")]
    Neutrino,
    #[serde(alias = "anuflux")]
    Antineutrino,
}

impl BeamMode {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Neutrino => "nuflux",
            Self::Antineutrino => "anuflux",
        }
    }
}

/// Reconstructed event classification of the fast Monte Carlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventClass {
    NumuCcLike,
    NueCcLike,
    NcLike,
}

impl EventClass {
    pub const ALL: [EventClass; 3] = [Self::NumuCcLike, Self::NueCcLike, Self::NcLike];

    pub const fn code(self) -> i32 {
        match self {
            Self::NumuCcLike => 0,
            Self::NueCcLike => 1,
            Self::NcLike => 2,
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::NumuCcLike => "_numuCC-like",
            Self::NueCcLike => "_nueCC-like",
            Self::NcLike => "_NC-like",
        }
    }
}

/// Logical identity of one simulated sample: horn polarity, the flavor the
/// beam produced and the flavor that interacted in the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId {
    pub beam_mode: BeamMode,
    pub beam_flavor: Flavor,
    pub true_flavor: Flavor,
}

impl SampleId {
    pub fn new(
        beam_mode: BeamMode,
        beam_flavor: Flavor,
        true_flavor: Flavor,
    ) -> ComputeResult<Self> {
        if beam_flavor.particle_sign() != true_flavor.particle_sign() {
            return Err(NuSpecError::invalid_flavor(
                "FLAVOR.SAMPLE_SIGN",
                format!(
                    "sample beam flavor {beam_flavor} and true flavor {true_flavor} differ in sign"
                ),
            ));
        }

        Ok(Self {
            beam_mode,
            beam_flavor,
            true_flavor,
        })
    }

    /// `{mode}_{beam}flux_{true}`, e.g. `nuflux_numuflux_nue`.
    pub fn flux_type_name(&self) -> String {
        format!(
            "{}_{}flux_{}",
            self.beam_mode.prefix(),
            self.beam_flavor.name(NameStyle::Compact),
            self.true_flavor.name(NameStyle::Compact)
        )
    }

    /// The sixteen samples produced for each horn polarity: the four
    /// unoscillated beam components plus the appearance channels.
    pub fn standard_set() -> Vec<SampleId> {
        const PAIRS: [(Flavor, Flavor); 8] = [
            (Flavor::NUMU, Flavor::NUMU),
            (Flavor::NUE, Flavor::NUE),
            (Flavor::NUMUBAR, Flavor::NUMUBAR),
            (Flavor::NUEBAR, Flavor::NUEBAR),
            (Flavor::NUMU, Flavor::NUE),
            (Flavor::NUMUBAR, Flavor::NUEBAR),
            (Flavor::NUMU, Flavor::NUTAU),
            (Flavor::NUMUBAR, Flavor::NUTAUBAR),
        ];

        [BeamMode::Neutrino, BeamMode::Antineutrino]
            .into_iter()
            .flat_map(|beam_mode| {
                PAIRS.into_iter().map(move |(beam_flavor, true_flavor)| SampleId {
                    beam_mode,
                    beam_flavor,
                    true_flavor,
                })
            })
            .collect()
    }
}

impl Display for SampleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.flux_type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::{BeamMode, EventClass, InteractionChannel, SampleId};
    use crate::domain::{Flavor, NuSpecErrorCategory};

    #[test]
    fn flux_type_name_matches_sample_file_convention() {
        let sample = SampleId::new(BeamMode::Antineutrino, Flavor::NUMUBAR, Flavor::NUTAUBAR)
            .expect("valid");
        assert_eq!(sample.flux_type_name(), "anuflux_numubarflux_nutaubar");
    }

    #[test]
    fn standard_set_covers_both_polarities() {
        let samples = SampleId::standard_set();
        assert_eq!(samples.len(), 16);
        assert_eq!(samples[0].flux_type_name(), "nuflux_numuflux_numu");
        assert_eq!(samples[15].flux_type_name(), "anuflux_numubarflux_nutaubar");
    }

    #[test]
    fn mixed_sign_samples_are_rejected() {
        let error = SampleId::new(BeamMode::Neutrino, Flavor::NUMU, Flavor::NUEBAR)
            .expect_err("sign mismatch");
        assert_eq!(error.category(), NuSpecErrorCategory::InvalidFlavorError);
    }

    #[test]
    fn unknown_channel_is_a_config_error() {
        assert_eq!("CC".parse::<InteractionChannel>().expect("cc"), InteractionChannel::Cc);
        let error = "qe".parse::<InteractionChannel>().expect_err("unknown channel");
        assert_eq!(error.category(), NuSpecErrorCategory::ConfigError);
        assert_eq!(EventClass::NueCcLike.suffix(), "_nueCC-like");
    }
}
