//! Signed neutrino flavor indices and their canonical names.
//!
//! The magnitude selects the lepton family (1 = e, 2 = mu, 3 = tau) and the
//! sign selects neutrino (+) or antineutrino (-). Names come in two styles:
//! compact (`numubar`) for file keys and underscore (`nu_mu_bar`) for
//! cross-section tables.

use super::{ComputeResult, NuSpecError};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const FLAVOR_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlavorKind {
    Electron,
    Muon,
    Tau,
}

impl FlavorKind {
    pub const ALL: [FlavorKind; FLAVOR_COUNT] = [Self::Electron, Self::Muon, Self::Tau];

    pub const fn magnitude(self) -> i32 {
        match self {
            Self::Electron => 1,
            Self::Muon => 2,
            Self::Tau => 3,
        }
    }

    /// Zero-based row/column in e, mu, tau order.
    pub const fn position(self) -> usize {
        match self {
            Self::Electron => 0,
            Self::Muon => 1,
            Self::Tau => 2,
        }
    }

    pub const fn from_magnitude(magnitude: i32) -> Option<Self> {
        match magnitude {
            1 => Some(Self::Electron),
            2 => Some(Self::Muon),
            3 => Some(Self::Tau),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParticleSign {
    Neutrino,
    Antineutrino,
}

impl ParticleSign {
    pub const fn sign(self) -> i32 {
        match self {
            Self::Neutrino => 1,
            Self::Antineutrino => -1,
        }
    }

    pub const fn of(value: i32) -> Self {
        if value < 0 {
            Self::Antineutrino
        } else {
            Self::Neutrino
        }
    }

    pub fn from_sign(value: i32) -> ComputeResult<Self> {
        match value {
            1 => Ok(Self::Neutrino),
            -1 => Ok(Self::Antineutrino),
            other => Err(NuSpecError::invalid_flavor(
                "FLAVOR.INVALID_SIGN",
                format!("particle sign must be +1 or -1, got {other}"),
            )),
        }
    }

    /// The e, mu, tau flavors carrying this sign.
    pub const fn family(self) -> [Flavor; FLAVOR_COUNT] {
        [
            Flavor::new(FlavorKind::Electron, self),
            Flavor::new(FlavorKind::Muon, self),
            Flavor::new(FlavorKind::Tau, self),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameStyle {
    Compact,
    Underscore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Flavor {
    kind: FlavorKind,
    sign: ParticleSign,
}

const COMPACT_NAMES: [[&str; 2]; FLAVOR_COUNT] =
    [["nue", "nuebar"], ["numu", "numubar"], ["nutau", "nutaubar"]];
const UNDERSCORE_NAMES: [[&str; 2]; FLAVOR_COUNT] = [
    ["nu_e", "nu_e_bar"],
    ["nu_mu", "nu_mu_bar"],
    ["nu_tau", "nu_tau_bar"],
];

impl Flavor {
    pub const NUE: Flavor = Flavor::new(FlavorKind::Electron, ParticleSign::Neutrino);
    pub const NUMU: Flavor = Flavor::new(FlavorKind::Muon, ParticleSign::Neutrino);
    pub const NUTAU: Flavor = Flavor::new(FlavorKind::Tau, ParticleSign::Neutrino);
    pub const NUEBAR: Flavor = Flavor::new(FlavorKind::Electron, ParticleSign::Antineutrino);
    pub const NUMUBAR: Flavor = Flavor::new(FlavorKind::Muon, ParticleSign::Antineutrino);
    pub const NUTAUBAR: Flavor = Flavor::new(FlavorKind::Tau, ParticleSign::Antineutrino);

    pub const fn new(kind: FlavorKind, sign: ParticleSign) -> Self {
        Self { kind, sign }
    }

    pub fn from_index(index: i32) -> ComputeResult<Self> {
        let kind = FlavorKind::from_magnitude(index.abs()).ok_or_else(|| {
            NuSpecError::invalid_flavor(
                "FLAVOR.INVALID_INDEX",
                format!("invalid neutrino index: {index}"),
            )
        })?;
        Ok(Self::new(kind, ParticleSign::of(index)))
    }

    /// Every flavor in ascending index order: -3, -2, -1, 1, 2, 3.
    pub const fn all() -> [Flavor; 2 * FLAVOR_COUNT] {
        [
            Self::NUTAUBAR,
            Self::NUMUBAR,
            Self::NUEBAR,
            Self::NUE,
            Self::NUMU,
            Self::NUTAU,
        ]
    }

    pub const fn kind(self) -> FlavorKind {
        self.kind
    }

    pub const fn particle_sign(self) -> ParticleSign {
        self.sign
    }

    pub const fn is_antineutrino(self) -> bool {
        matches!(self.sign, ParticleSign::Antineutrino)
    }

    pub const fn index(self) -> i32 {
        self.kind.magnitude() * self.sign.sign()
    }

    pub const fn with_kind(self, kind: FlavorKind) -> Self {
        Self::new(kind, self.sign)
    }

    pub const fn family(self) -> [Flavor; FLAVOR_COUNT] {
        self.sign.family()
    }

    pub fn name(self, style: NameStyle) -> &'static str {
        let column = usize::from(self.is_antineutrino());
        match style {
            NameStyle::Compact => COMPACT_NAMES[self.kind.position()][column],
            NameStyle::Underscore => UNDERSCORE_NAMES[self.kind.position()][column],
        }
    }

    /// Reverse lookup accepting either naming style.
    pub fn from_name(name: &str) -> ComputeResult<Self> {
        let normalized = name.trim();
        for flavor in Self::all() {
            if flavor.name(NameStyle::Compact) == normalized
                || flavor.name(NameStyle::Underscore) == normalized
            {
                return Ok(flavor);
            }
        }

        Err(NuSpecError::invalid_flavor(
            "FLAVOR.UNKNOWN_NAME",
            format!("unknown neutrino name '{normalized}'"),
        ))
    }
}

/// Name of a raw signed index, failing for 0 and magnitudes above 3.
pub fn name_of(index: i32, style: NameStyle) -> ComputeResult<&'static str> {
    Ok(Flavor::from_index(index)?.name(style))
}

impl Display for Flavor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name(NameStyle::Compact))
    }
}

impl FromStr for Flavor {
    type Err = NuSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i32>() {
            Ok(index) => Self::from_index(index),
            Err(_) => Self::from_name(s),
        }
    }
}

impl TryFrom<i32> for Flavor {
    type Error = NuSpecError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}
