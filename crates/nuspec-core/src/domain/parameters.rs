use super::{ComputeResult, NuSpecError};
use serde::{Deserialize, Serialize};

/// One oscillation parameter set: PMNS mixing (as sin² of the angles), mass
/// splittings in eV², CP phase in radians, baseline in km and matter density
/// in g/cm³.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OscillationParameters {
    pub sin2_theta12: f64,
    pub sin2_theta13: f64,
    pub sin2_theta23: f64,
    pub delta_m21_sq: f64,
    pub delta_m31_sq: f64,
    pub delta_cp: f64,
    pub baseline_km: f64,
    pub density_g_cm3: f64,
}

impl OscillationParameters {
    /// Nu-Fit JHEP 11 (2014) 052 best fit, normal ordering, δCP = 0, over a
    /// 1300 km baseline through 2.7 g/cm³ rock.
    pub const fn nufit_2014_normal() -> Self {
        Self {
            sin2_theta12: 0.304,
            sin2_theta13: 0.0218,
            sin2_theta23: 0.452,
            delta_m21_sq: 7.50e-5,
            delta_m31_sq: 2.457e-3,
            delta_cp: 0.0,
            baseline_km: 1300.0,
            density_g_cm3: 2.7,
        }
    }

    /// Capozzi et al. values used for the conceptual design report event
    /// rates, normal ordering, δCP = 0.
    pub const fn capozzi_cdr_normal() -> Self {
        Self {
            sin2_theta12: 0.308,
            sin2_theta13: 0.0234,
            sin2_theta23: 0.437,
            delta_m21_sq: 7.54e-5,
            delta_m31_sq: 2.43e-3,
            delta_cp: 0.0,
            baseline_km: 1300.0,
            density_g_cm3: 2.7,
        }
    }

    pub fn validate(&self) -> ComputeResult<()> {
        for (name, value) in [
            ("sin2_theta12", self.sin2_theta12),
            ("sin2_theta13", self.sin2_theta13),
            ("sin2_theta23", self.sin2_theta23),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(NuSpecError::config(
                    "CONFIG.OSCILLATION_PARAMETERS",
                    format!("{name} must lie in [0, 1], got {value}"),
                ));
            }
        }

        for (name, value) in [
            ("delta_m21_sq", self.delta_m21_sq),
            ("delta_m31_sq", self.delta_m31_sq),
            ("delta_cp", self.delta_cp),
        ] {
            if !value.is_finite() {
                return Err(NuSpecError::config(
                    "CONFIG.OSCILLATION_PARAMETERS",
                    format!("{name} must be finite, got {value}"),
                ));
            }
        }

        if !self.baseline_km.is_finite() || self.baseline_km < 0.0 {
            return Err(NuSpecError::config(
                "CONFIG.OSCILLATION_PARAMETERS",
                format!("baseline_km must be finite and >= 0, got {}", self.baseline_km),
            ));
        }

        if !self.density_g_cm3.is_finite() || self.density_g_cm3 <= 0.0 {
            return Err(NuSpecError::config(
                "CONFIG.OSCILLATION_PARAMETERS",
                format!(
                    "density_g_cm3 must be finite and > 0, got {}",
                    self.density_g_cm3
                ),
            ));
        }

        Ok(())
    }

    /// `#` header lines recording the exact values, written above every
    /// generated table.
    pub fn header_lines(&self) -> Vec<String> {
        vec![
            format!(
                "sin2_theta12 = {}, sin2_theta13 = {}, sin2_theta23 = {}",
                self.sin2_theta12, self.sin2_theta13, self.sin2_theta23
            ),
            format!(
                "delta_m21_sq = {} eV^2, delta_m31_sq = {} eV^2, delta_cp = {} rad",
                self.delta_m21_sq, self.delta_m31_sq, self.delta_cp
            ),
            format!(
                "baseline = {} km, density = {} g/cm^3",
                self.baseline_km, self.density_g_cm3
            ),
        ]
    }
}

impl Default for OscillationParameters {
    fn default() -> Self {
        Self::nufit_2014_normal()
    }
}

/// Independent value lists for a Cartesian-product parameter scan. Baseline
/// and density stay fixed across the scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSweep {
    pub sin2_theta12: Vec<f64>,
    pub sin2_theta13: Vec<f64>,
    pub sin2_theta23: Vec<f64>,
    pub delta_m21_sq: Vec<f64>,
    pub delta_m31_sq: Vec<f64>,
    pub delta_cp: Vec<f64>,
    pub baseline_km: f64,
    pub density_g_cm3: f64,
}

impl ParameterSweep {
    /// A one-point scan at `params`.
    pub fn single(params: &OscillationParameters) -> Self {
        Self {
            sin2_theta12: vec![params.sin2_theta12],
            sin2_theta13: vec![params.sin2_theta13],
            sin2_theta23: vec![params.sin2_theta23],
            delta_m21_sq: vec![params.delta_m21_sq],
            delta_m31_sq: vec![params.delta_m31_sq],
            delta_cp: vec![params.delta_cp],
            baseline_km: params.baseline_km,
            density_g_cm3: params.density_g_cm3,
        }
    }

    pub fn len(&self) -> usize {
        self.axes().iter().map(|(_, values)| values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn axes(&self) -> [(&'static str, &[f64]); 6] {
        [
            ("sin2Theta12", self.sin2_theta12.as_slice()),
            ("sin2Theta13", self.sin2_theta13.as_slice()),
            ("sin2Theta23", self.sin2_theta23.as_slice()),
            ("deltaM21Sq", self.delta_m21_sq.as_slice()),
            ("deltaM31Sq", self.delta_m31_sq.as_slice()),
            ("deltaCp", self.delta_cp.as_slice()),
        ]
    }

    /// Every point of the scan, validated, with `deltaCp` varying fastest and
    /// `sin2Theta12` slowest. The position in the returned list is the
    /// point's ordinal.
    pub fn points(&self) -> ComputeResult<Vec<OscillationParameters>> {
        for (name, values) in self.axes() {
            if values.is_empty() {
                return Err(NuSpecError::config(
                    "CONFIG.PARAMETER_SWEEP",
                    format!("parameter sweep axis '{name}' has no values"),
                ));
            }
        }

        let mut points = Vec::with_capacity(self.len());
        for &sin2_theta12 in &self.sin2_theta12 {
            for &sin2_theta13 in &self.sin2_theta13 {
                for &sin2_theta23 in &self.sin2_theta23 {
                    for &delta_m21_sq in &self.delta_m21_sq {
                        for &delta_m31_sq in &self.delta_m31_sq {
                            for &delta_cp in &self.delta_cp {
                                let point = OscillationParameters {
                                    sin2_theta12,
                                    sin2_theta13,
                                    sin2_theta23,
                                    delta_m21_sq,
                                    delta_m31_sq,
                                    delta_cp,
                                    baseline_km: self.baseline_km,
                                    density_g_cm3: self.density_g_cm3,
                                };
                                point.validate()?;
                                points.push(point);
                            }
                        }
                    }
                }
            }
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::{OscillationParameters, ParameterSweep};
    use crate::domain::NuSpecErrorCategory;

    #[test]
    fn presets_validate() {
        OscillationParameters::nufit_2014_normal()
            .validate()
            .expect("nufit preset should validate");
        OscillationParameters::capozzi_cdr_normal()
            .validate()
            .expect("cdr preset should validate");
    }

    #[test]
    fn out_of_range_mixing_is_rejected() {
        let mut params = OscillationParameters::default();
        params.sin2_theta23 = 1.2;
        let error = params.validate().expect_err("mixing out of range");
        assert_eq!(error.category(), NuSpecErrorCategory::ConfigError);
        assert!(error.message().contains("sin2_theta23"));
    }

    #[test]
    fn density_must_be_positive() {
        let params = OscillationParameters {
            density_g_cm3: 0.0,
            ..OscillationParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn parameters_round_trip_through_json() {
        let params = OscillationParameters::capozzi_cdr_normal();
        let json = serde_json::to_string(&params).expect("serialize");
        assert!(json.contains("\"sin2Theta13\":0.0234"));
        let parsed: OscillationParameters = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, params);
    }

    #[test]
    fn sweep_points_follow_a_fixed_order() {
        let mut sweep = ParameterSweep::single(&OscillationParameters::default());
        sweep.delta_cp = vec![0.0, std::f64::consts::FRAC_PI_2];
        sweep.sin2_theta23 = vec![0.45, 0.55];

        let points = sweep.points().expect("sweep should expand");
        assert_eq!(sweep.len(), 4);
        assert_eq!(points.len(), 4);
        assert_eq!(points[1].delta_cp, std::f64::consts::FRAC_PI_2);
        assert_eq!(points[1].sin2_theta23, 0.45);
        assert_eq!(points[2].sin2_theta23, 0.55);
        assert_eq!(points[3].baseline_km, 1300.0);
    }

    #[test]
    fn empty_sweep_axis_is_a_config_error() {
        let mut sweep = ParameterSweep::single(&OscillationParameters::default());
        sweep.delta_m21_sq.clear();
        assert!(sweep.is_empty());
        let error = sweep.points().expect_err("empty axis");
        assert_eq!(error.category(), NuSpecErrorCategory::ConfigError);
        assert!(error.message().contains("deltaM21Sq"));
    }
}
