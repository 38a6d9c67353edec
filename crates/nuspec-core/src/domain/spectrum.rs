use super::{
    ComputeResult, EnergyBinning, FLAVOR_COUNT, Flavor, FlavorKind, InteractionChannel,
    NameStyle, NuSpecError, ParticleSign,
};
use crate::numerics::stable_sum;
use faer::Mat;

fn check_length(
    placeholder: &'static str,
    what: &str,
    actual: usize,
    binning: &EnergyBinning,
) -> ComputeResult<()> {
    if actual != binning.nbins() {
        return Err(NuSpecError::dimension(
            placeholder,
            format!(
                "{what} has {actual} values but the binning has {} bins",
                binning.nbins()
            ),
        ));
    }
    Ok(())
}

/// `nbins` values over an energy axis, tagged with the flavor they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedVector {
    flavor: Flavor,
    binning: EnergyBinning,
    values: Vec<f64>,
}

pub type FluxVector = BinnedVector;
pub type SpectrumVector = BinnedVector;

impl BinnedVector {
    pub fn new(flavor: Flavor, binning: EnergyBinning, values: Vec<f64>) -> ComputeResult<Self> {
        check_length(
            "DIM.BINNED_VECTOR",
            &format!("{flavor} vector"),
            values.len(),
            &binning,
        )?;
        Ok(Self {
            flavor,
            binning,
            values,
        })
    }

    pub fn zeros(flavor: Flavor, binning: EnergyBinning) -> Self {
        Self {
            flavor,
            binning,
            values: vec![0.0; binning.nbins()],
        }
    }

    pub const fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub const fn binning(&self) -> &EnergyBinning {
        &self.binning
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// The e, mu and tau vectors of one particle sign, stacked in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorBlock {
    sign: ParticleSign,
    binning: EnergyBinning,
    rows: [Vec<f64>; FLAVOR_COUNT],
}

pub type OscillatedFluxBlock = FlavorBlock;
pub type SpectrumBlock = FlavorBlock;

impl FlavorBlock {
    pub fn new(
        sign: ParticleSign,
        binning: EnergyBinning,
        rows: [Vec<f64>; FLAVOR_COUNT],
    ) -> ComputeResult<Self> {
        for (kind, row) in FlavorKind::ALL.into_iter().zip(&rows) {
            let flavor = Flavor::new(kind, sign);
            check_length("DIM.FLAVOR_BLOCK", &format!("{flavor} row"), row.len(), &binning)?;
        }
        Ok(Self {
            sign,
            binning,
            rows,
        })
    }

    pub fn zeros(sign: ParticleSign, binning: EnergyBinning) -> Self {
        let row = vec![0.0; binning.nbins()];
        Self {
            sign,
            binning,
            rows: [row.clone(), row.clone(), row],
        }
    }

    /// Splits `3 * nbins` values laid out e, mu, tau into a block.
    pub fn from_flat(
        sign: ParticleSign,
        binning: EnergyBinning,
        values: &[f64],
    ) -> ComputeResult<Self> {
        let nbins = binning.nbins();
        if values.len() != FLAVOR_COUNT * nbins {
            return Err(NuSpecError::dimension(
                "DIM.FLAVOR_BLOCK",
                format!(
                    "flavor block needs {} values for {nbins} bins, got {}",
                    FLAVOR_COUNT * nbins,
                    values.len()
                ),
            ));
        }

        let mut chunks = values.chunks_exact(nbins).map(<[f64]>::to_vec);
        let mut next = || chunks.next().unwrap_or_default();
        let rows = [next(), next(), next()];
        Self::new(sign, binning, rows)
    }

    pub const fn sign(&self) -> ParticleSign {
        self.sign
    }

    pub const fn binning(&self) -> &EnergyBinning {
        &self.binning
    }

    pub fn row(&self, kind: FlavorKind) -> &[f64] {
        &self.rows[kind.position()]
    }

    pub fn flavors(&self) -> [Flavor; FLAVOR_COUNT] {
        self.sign.family()
    }

    pub fn vector(&self, kind: FlavorKind) -> BinnedVector {
        BinnedVector {
            flavor: Flavor::new(kind, self.sign),
            binning: self.binning,
            values: self.rows[kind.position()].clone(),
        }
    }

    pub fn to_flat(&self) -> Vec<f64> {
        self.rows.iter().flatten().copied().collect()
    }

    pub fn total(&self) -> f64 {
        stable_sum(&self.to_flat())
    }
}

/// P(start → end) tabulated at every bin midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable {
    pub start: Flavor,
    pub end: Flavor,
    pub binning: EnergyBinning,
    pub probabilities: Vec<f64>,
}

impl ProbabilityTable {
    pub fn new(
        start: Flavor,
        end: Flavor,
        binning: EnergyBinning,
        probabilities: Vec<f64>,
    ) -> ComputeResult<Self> {
        check_length(
            "DIM.PROBABILITY_TABLE",
            &format!("probability table {start}->{end}"),
            probabilities.len(),
            &binning,
        )?;
        Ok(Self {
            start,
            end,
            binning,
            probabilities,
        })
    }

    /// Probability-table file name, e.g. `numu_nue40.csv`.
    pub fn file_name(start: Flavor, end: Flavor, nbins: usize) -> String {
        format!(
            "{}_{}{}.csv",
            start.name(NameStyle::Compact),
            end.name(NameStyle::Compact),
            nbins
        )
    }
}

/// Total cross section per flavor and channel, in units of 1e-38 cm².
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionTable {
    pub flavor: Flavor,
    pub channel: InteractionChannel,
    pub binning: EnergyBinning,
    pub values: Vec<f64>,
}

impl CrossSectionTable {
    pub fn new(
        flavor: Flavor,
        channel: InteractionChannel,
        binning: EnergyBinning,
        values: Vec<f64>,
    ) -> ComputeResult<Self> {
        check_length(
            "DIM.CROSS_SECTION",
            &format!("{flavor} {channel} cross section"),
            values.len(),
            &binning,
        )?;
        Ok(Self {
            flavor,
            channel,
            binning,
            values,
        })
    }
}

/// Smearing from true energy (columns) to reconstructed energy (rows).
#[derive(Debug, Clone)]
pub struct DetectorResponseMatrix {
    pub flavor: Flavor,
    pub channel: InteractionChannel,
    matrix: Mat<f64>,
}

impl DetectorResponseMatrix {
    pub fn new(
        flavor: Flavor,
        channel: InteractionChannel,
        matrix: Mat<f64>,
    ) -> ComputeResult<Self> {
        if matrix.nrows() != matrix.ncols() {
            return Err(NuSpecError::dimension(
                "DIM.RESPONSE_MATRIX",
                format!(
                    "response matrix for {flavor} must be square, got {}x{}",
                    matrix.nrows(),
                    matrix.ncols()
                ),
            ));
        }
        Ok(Self {
            flavor,
            channel,
            matrix,
        })
    }

    pub fn nbins(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &Mat<f64> {
        &self.matrix
    }

    pub fn ensure_matches(&self, binning: &EnergyBinning) -> ComputeResult<()> {
        if self.nbins() != binning.nbins() {
            return Err(NuSpecError::dimension(
                "DIM.RESPONSE_MATRIX",
                format!(
                    "response matrix for {} is {}x{}, binning has {} bins",
                    self.flavor,
                    self.nbins(),
                    self.nbins(),
                    binning.nbins()
                ),
            ));
        }
        Ok(())
    }
}
