pub mod binning;
pub mod errors;
pub mod flavor;
pub mod parameters;
pub mod sample;
pub mod spectrum;

pub use binning::EnergyBinning;
pub use errors::{
    CodecResult, ComputeResult, ExitMapping, NuSpecError, NuSpecErrorCategory, NuSpecResult,
};
pub use flavor::{FLAVOR_COUNT, Flavor, FlavorKind, NameStyle, ParticleSign, name_of};
pub use parameters::{OscillationParameters, ParameterSweep};
pub use sample::{BeamMode, EventClass, InteractionChannel, SampleId};
pub use spectrum::{
    BinnedVector, CrossSectionTable, DetectorResponseMatrix, FlavorBlock, FluxVector,
    OscillatedFluxBlock, ProbabilityTable, SpectrumBlock, SpectrumVector,
};

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// File-level pipeline stages that can be run on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputeModule {
    Oscillate,
    Interact,
    Reconstruct,
    Propagate,
}

impl ComputeModule {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oscillate => "FLUX2OSCFLUX",
            Self::Interact => "OSCFLUX2TRUESPEC",
            Self::Reconstruct => "TRUESPEC2RECOSPEC",
            Self::Propagate => "PROPAGATE",
        }
    }
}

impl Display for ComputeModule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// One stage invocation. `flavor` is the beam flavor the input was produced
/// for; its sign selects the flavor family of every lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeRequest {
    pub module: ComputeModule,
    pub flavor: Flavor,
    pub binning: EnergyBinning,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl ComputeRequest {
    pub fn new(
        module: ComputeModule,
        flavor: Flavor,
        binning: EnergyBinning,
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            module,
            flavor,
            binning,
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeArtifact {
    pub path: PathBuf,
}

impl ComputeArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
