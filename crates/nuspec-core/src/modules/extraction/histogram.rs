use super::samples::{EventRecord, SampleRepository};
use super::selection::{Selection, Weight};
use crate::domain::{ComputeResult, EnergyBinning, SampleId};
use faer::Mat;
use tracing::debug;

/// Event quantity a histogram axis is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyAxis {
    True,
    Reco,
}

impl EnergyAxis {
    pub fn value(self, event: &EventRecord) -> f64 {
        match self {
            Self::True => event.ev,
            Self::Reco => event.ev_reco,
        }
    }
}

/// Weighted histogram fills over one sample. Entries outside the binning
/// are dropped.
pub trait HistogramEngine {
    fn fill_1d(
        &self,
        sample: &SampleId,
        axis: EnergyAxis,
        binning: &EnergyBinning,
        selection: &Selection,
        weight: &Weight,
    ) -> ComputeResult<Vec<f64>>;

    /// Rows follow `y`, columns follow `x`.
    fn fill_2d(
        &self,
        sample: &SampleId,
        x: (EnergyAxis, &EnergyBinning),
        y: (EnergyAxis, &EnergyBinning),
        selection: &Selection,
        weight: &Weight,
    ) -> ComputeResult<Mat<f64>>;
}

/// Fills histograms by scanning the event tables of a [`SampleRepository`].
pub struct EventTableEngine<R> {
    repository: R,
}

impl<R: SampleRepository> EventTableEngine<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R: SampleRepository> HistogramEngine for EventTableEngine<R> {
    fn fill_1d(
        &self,
        sample: &SampleId,
        axis: EnergyAxis,
        binning: &EnergyBinning,
        selection: &Selection,
        weight: &Weight,
    ) -> ComputeResult<Vec<f64>> {
        let mut histogram = vec![0.0; binning.nbins()];
        let mut entries = 0usize;
        for event in self.repository.events(sample)? {
            if !selection.accepts(event) {
                continue;
            }
            if let Some(bin) = binning.bin_index(axis.value(event)) {
                histogram[bin] += weight.evaluate(event)?;
                entries += 1;
            }
        }

        debug!("{sample}: {entries} entries in {axis:?}-energy histogram");
        Ok(histogram)
    }

    fn fill_2d(
        &self,
        sample: &SampleId,
        x: (EnergyAxis, &EnergyBinning),
        y: (EnergyAxis, &EnergyBinning),
        selection: &Selection,
        weight: &Weight,
    ) -> ComputeResult<Mat<f64>> {
        let (x_axis, x_binning) = x;
        let (y_axis, y_binning) = y;
        let mut histogram = Mat::<f64>::zeros(y_binning.nbins(), x_binning.nbins());
        let mut entries = 0usize;
        for event in self.repository.events(sample)? {
            if !selection.accepts(event) {
                continue;
            }
            let column = x_binning.bin_index(x_axis.value(event));
            let row = y_binning.bin_index(y_axis.value(event));
            if let (Some(row), Some(column)) = (row, column) {
                histogram[(row, column)] += weight.evaluate(event)?;
                entries += 1;
            }
        }

        debug!("{sample}: {entries} entries in {y_axis:?}:{x_axis:?} histogram");
        Ok(histogram)
    }
}
