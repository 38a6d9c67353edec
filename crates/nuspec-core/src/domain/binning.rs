use super::{ComputeResult, NuSpecError};
use serde::Serialize;

/// Uniform energy axis shared by every vector and matrix of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyBinning {
    nbins: usize,
    emin: f64,
    emax: f64,
}

impl EnergyBinning {
    pub fn new(nbins: usize, emin: f64, emax: f64) -> ComputeResult<Self> {
        if nbins == 0 {
            return Err(NuSpecError::config(
                "CONFIG.BINNING",
                "energy binning needs at least one bin",
            ));
        }

        if !emin.is_finite() || !emax.is_finite() || emin >= emax {
            return Err(NuSpecError::config(
                "CONFIG.BINNING",
                format!("energy binning needs finite emin < emax, got [{emin}, {emax}]"),
            ));
        }

        Ok(Self { nbins, emin, emax })
    }

    pub const fn nbins(&self) -> usize {
        self.nbins
    }

    pub const fn emin(&self) -> f64 {
        self.emin
    }

    pub const fn emax(&self) -> f64 {
        self.emax
    }

    pub fn step(&self) -> f64 {
        (self.emax - self.emin) / self.nbins as f64
    }

    pub fn lower_edge(&self, bin: usize) -> f64 {
        self.emin + bin as f64 * self.step()
    }

    pub fn upper_edge(&self, bin: usize) -> f64 {
        if bin + 1 == self.nbins {
            self.emax
        } else {
            self.lower_edge(bin + 1)
        }
    }

    pub fn midpoint(&self, bin: usize) -> f64 {
        self.emin + (bin as f64 + 0.5) * self.step()
    }

    pub fn midpoints(&self) -> Vec<f64> {
        (0..self.nbins).map(|bin| self.midpoint(bin)).collect()
    }

    /// Bin holding `energy`; values outside `[emin, emax)` fall in no bin.
    pub fn bin_index(&self, energy: f64) -> Option<usize> {
        if !energy.is_finite() || energy < self.emin || energy >= self.emax {
            return None;
        }

        let index = ((energy - self.emin) / self.step()) as usize;
        Some(index.min(self.nbins - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::EnergyBinning;
    use crate::domain::NuSpecErrorCategory;

    #[test]
    fn midpoints_sit_at_bin_centres() {
        let binning = EnergyBinning::new(4, 0.0, 4.0).expect("valid binning");
        assert_eq!(binning.step(), 1.0);
        assert_eq!(binning.midpoints(), vec![0.5, 1.5, 2.5, 3.5]);
        assert_eq!(binning.lower_edge(2), 2.0);
        assert_eq!(binning.upper_edge(3), 4.0);
    }

    #[test]
    fn bin_index_is_half_open() {
        let binning = EnergyBinning::new(10, 0.5, 8.0).expect("valid binning");
        assert_eq!(binning.bin_index(0.5), Some(0));
        assert_eq!(binning.bin_index(7.999), Some(9));
        assert_eq!(binning.bin_index(8.0), None);
        assert_eq!(binning.bin_index(0.49), None);
        assert_eq!(binning.bin_index(f64::NAN), None);
    }

    #[test]
    fn invalid_bounds_are_config_errors() {
        let cases = [
            (0, 0.0, 1.0),
            (4, 2.0, 2.0),
            (4, 3.0, 1.0),
            (4, 0.0, f64::INFINITY),
        ];
        for (nbins, emin, emax) in cases {
            let error = EnergyBinning::new(nbins, emin, emax).expect_err("binning should fail");
            assert_eq!(error.category(), NuSpecErrorCategory::ConfigError);
        }
    }
}
