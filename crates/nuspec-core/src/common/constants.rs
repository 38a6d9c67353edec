//! Units and conversion factors shared by the generator and the pipeline.

/// Cross-section tables are stored in units of 1e-38 cm².
pub const CROSS_SECTION_UNITS_CM2: f64 = 1.0e-38;

/// Default safety ceiling on the number of energy bins.
pub const DEFAULT_MAX_BINS: usize = 1000;

pub const AVOGADRO: f64 = 6.022_140_76e23;
pub const ARGON_MOLAR_MASS_G: f64 = 39.948;
pub const FIDUCIAL_MASS_KT: f64 = 40.0;

/// Argon nuclei in a 40 kt fiducial volume.
pub const ARGON_40KT_TARGETS: f64 = FIDUCIAL_MASS_KT * 1.0e9 / ARGON_MOLAR_MASS_G * AVOGADRO;

/// Converts Δm² [eV²] · L [km] / E [GeV] into the phase Δm² L / 4E (≈ 1.267).
pub const EV_SQ_KM_TO_GEV_OVER4: f64 = 1.0e-9 / 1.973_27e-7 * 1.0e3 / 4.0;

/// Matter potential 2√2 G_F N_e E in eV² per (Ye · ρ[g/cm³] · E[GeV]).
pub const YE_RHO_E_TO_A: f64 = 1.52e-4;

pub const DEFAULT_ELECTRON_FRACTION: f64 = 0.5;
