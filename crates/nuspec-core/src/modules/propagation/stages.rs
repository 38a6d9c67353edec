use crate::common::constants::CROSS_SECTION_UNITS_CM2;
use crate::domain::{
    ComputeResult, CrossSectionTable, DetectorResponseMatrix, EnergyBinning, Flavor, FlavorBlock,
    NuSpecError, ParticleSign, ProbabilityTable,
};
use crate::numerics::{elementwise_product, matrix_vector_product};
use std::collections::BTreeMap;
use tracing::debug;

pub type ProbabilityTables = BTreeMap<Flavor, ProbabilityTable>;
pub type CrossSections = BTreeMap<Flavor, CrossSectionTable>;
pub type ResponseMatrices = BTreeMap<Flavor, DetectorResponseMatrix>;

fn lookup<'a, T>(
    tables: &'a BTreeMap<Flavor, T>,
    flavor: Flavor,
    what: &str,
) -> ComputeResult<&'a T> {
    tables.get(&flavor).ok_or_else(|| {
        NuSpecError::config(
            "CONFIG.MISSING_LOOKUP",
            format!("no {what} supplied for {flavor}"),
        )
    })
}

fn check_values(
    placeholder: &'static str,
    what: String,
    values: &[f64],
    binning: &EnergyBinning,
) -> ComputeResult<()> {
    if values.len() != binning.nbins() {
        return Err(NuSpecError::dimension(
            placeholder,
            format!(
                "{what} has {} values, binning has {} bins",
                values.len(),
                binning.nbins()
            ),
        ));
    }
    Ok(())
}

fn check_block(
    sign: ParticleSign,
    binning: &EnergyBinning,
    block: &FlavorBlock,
) -> ComputeResult<()> {
    if block.sign() != sign {
        return Err(NuSpecError::invalid_flavor(
            "FLAVOR.BLOCK_SIGN",
            format!(
                "expected a {:?} block, got a {:?} block",
                sign,
                block.sign()
            ),
        ));
    }
    if block.binning().nbins() != binning.nbins() {
        return Err(NuSpecError::dimension(
            "DIM.FLAVOR_BLOCK",
            format!(
                "flavor block has {} bins, binning has {}",
                block.binning().nbins(),
                binning.nbins()
            ),
        ));
    }
    Ok(())
}

fn product(lhs: &[f64], rhs: &[f64]) -> ComputeResult<Vec<f64>> {
    elementwise_product(lhs, rhs).ok_or_else(|| {
        NuSpecError::internal(
            "RUN.ELEMENTWISE_PRODUCT",
            format!("cannot multiply {} by {} values", lhs.len(), rhs.len()),
        )
    })
}

/// Splits a beam flux of flavor `start` into the e, mu, tau flux arriving
/// at the detector: `flux * P(start -> end)` bin by bin.
pub fn flux_to_oscillated_flux(
    start: Flavor,
    binning: &EnergyBinning,
    flux: &[f64],
    probability_tables: &ProbabilityTables,
) -> ComputeResult<FlavorBlock> {
    check_values("DIM.FLUX_VECTOR", format!("{start} flux"), flux, binning)?;

    let mut rows = Vec::with_capacity(3);
    for end in start.family() {
        let table = lookup(probability_tables, end, "probability table")?;
        if table.start != start || table.end != end {
            return Err(NuSpecError::config(
                "CONFIG.PROBABILITY_TABLE",
                format!(
                    "probability table for {start}->{end} holds {}->{}",
                    table.start, table.end
                ),
            ));
        }
        check_values(
            "DIM.PROBABILITY_TABLE",
            format!("probability table {start}->{end}"),
            &table.probabilities,
            binning,
        )?;
        rows.push(product(flux, &table.probabilities)?);
    }

    debug!("oscillated {start} flux over {} bins", binning.nbins());
    block_from_rows(start.particle_sign(), binning, rows)
}

/// Event rate per true-energy bin:
/// `flux * cross section * targets * 1e-38 cm²`.
pub fn oscillated_flux_to_true_spectrum(
    sign: ParticleSign,
    binning: &EnergyBinning,
    target_count: f64,
    block: &FlavorBlock,
    cross_sections: &CrossSections,
) -> ComputeResult<FlavorBlock> {
    check_block(sign, binning, block)?;
    if !target_count.is_finite() || target_count < 0.0 {
        return Err(NuSpecError::config(
            "CONFIG.TARGET_COUNT",
            format!("target count must be finite and >= 0, got {target_count}"),
        ));
    }

    let scale = target_count * CROSS_SECTION_UNITS_CM2;
    let mut rows = Vec::with_capacity(3);
    for flavor in sign.family() {
        let table = lookup(cross_sections, flavor, "cross section")?;
        check_values(
            "DIM.CROSS_SECTION",
            format!("{flavor} cross section"),
            &table.values,
            binning,
        )?;
        let row = product(block.row(flavor.kind()), &table.values)?;
        rows.push(row.into_iter().map(|value| value * scale).collect());
    }

    debug!("folded cross sections into {:?} spectrum", sign);
    block_from_rows(sign, binning, rows)
}

/// Smears each flavor's true spectrum with its detector response.
pub fn true_spectrum_to_reco_spectrum(
    sign: ParticleSign,
    binning: &EnergyBinning,
    block: &FlavorBlock,
    responses: &ResponseMatrices,
) -> ComputeResult<FlavorBlock> {
    check_block(sign, binning, block)?;

    let mut rows = Vec::with_capacity(3);
    for flavor in sign.family() {
        let response = lookup(responses, flavor, "detector response")?;
        response.ensure_matches(binning)?;
        let smeared = matrix_vector_product(response.matrix(), block.row(flavor.kind()))
            .ok_or_else(|| {
                NuSpecError::dimension(
                    "DIM.RESPONSE_MATRIX",
                    format!("response matrix for {flavor} does not match its spectrum"),
                )
            })?;
        rows.push(smeared);
    }

    debug!("reconstructed {:?} spectrum", sign);
    block_from_rows(sign, binning, rows)
}

fn block_from_rows(
    sign: ParticleSign,
    binning: &EnergyBinning,
    rows: Vec<Vec<f64>>,
) -> ComputeResult<FlavorBlock> {
    let rows: [Vec<f64>; 3] = rows.try_into().map_err(|rows: Vec<Vec<f64>>| {
        NuSpecError::internal(
            "RUN.FLAVOR_BLOCK",
            format!("expected 3 flavor rows, built {}", rows.len()),
        )
    })?;
    FlavorBlock::new(sign, *binning, rows)
}

#[cfg(test)]
mod tests {
    use super::{
        CrossSections, ProbabilityTables, ResponseMatrices, flux_to_oscillated_flux,
        oscillated_flux_to_true_spectrum, true_spectrum_to_reco_spectrum,
    };
    use crate::domain::{
        CrossSectionTable, DetectorResponseMatrix, EnergyBinning, Flavor, FlavorBlock, FlavorKind,
        InteractionChannel, NuSpecErrorCategory, ParticleSign, ProbabilityTable,
    };
    use crate::numerics::within_tolerance;
    use faer::Mat;

    fn binning() -> EnergyBinning {
        EnergyBinning::new(4, 0.0, 4.0).expect("binning")
    }

    fn probabilities(start: Flavor, rows: [[f64; 4]; 3]) -> ProbabilityTables {
        start
            .family()
            .into_iter()
            .zip(rows)
            .map(|(end, row)| {
                let table = ProbabilityTable::new(start, end, binning(), row.to_vec())
                    .expect("table");
                (end, table)
            })
            .collect()
    }

    #[test]
    fn flux_is_split_by_probability() {
        let tables = probabilities(
            Flavor::NUMU,
            [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        );
        let block =
            flux_to_oscillated_flux(Flavor::NUMU, &binning(), &[1.0, 2.0, 3.0, 4.0], &tables)
                .expect("oscillated flux");

        assert_eq!(block.row(FlavorKind::Electron), &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(block.row(FlavorKind::Muon), &[0.0, 2.0, 0.0, 0.0]);
        assert_eq!(block.row(FlavorKind::Tau), &[0.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn missing_table_is_a_config_error() {
        let mut tables = probabilities(Flavor::NUE, [[0.5; 4]; 3]);
        tables.remove(&Flavor::NUTAU);
        let error = flux_to_oscillated_flux(Flavor::NUE, &binning(), &[1.0; 4], &tables)
            .expect_err("tau table missing");
        assert_eq!(error.category(), NuSpecErrorCategory::ConfigError);
        assert_eq!(error.placeholder(), "CONFIG.MISSING_LOOKUP");
    }

    #[test]
    fn short_flux_is_a_dimension_error() {
        let tables = probabilities(Flavor::NUE, [[0.5; 4]; 3]);
        let error = flux_to_oscillated_flux(Flavor::NUE, &binning(), &[1.0; 3], &tables)
            .expect_err("short flux");
        assert_eq!(error.category(), NuSpecErrorCategory::DimensionError);
    }

    #[test]
    fn true_spectrum_scales_by_targets_and_units() {
        let block = FlavorBlock::new(
            ParticleSign::Antineutrino,
            binning(),
            [vec![1.0; 4], vec![2.0; 4], vec![0.0; 4]],
        )
        .expect("block");
        let cross_sections: CrossSections = ParticleSign::Antineutrino
            .family()
            .into_iter()
            .map(|flavor| {
                let table = CrossSectionTable::new(
                    flavor,
                    InteractionChannel::Cc,
                    binning(),
                    vec![0.5, 1.0, 1.5, 2.0],
                )
                .expect("cross section");
                (flavor, table)
            })
            .collect();

        let spectrum = oscillated_flux_to_true_spectrum(
            ParticleSign::Antineutrino,
            &binning(),
            2.0e38,
            &block,
            &cross_sections,
        )
        .expect("true spectrum");

        let expected = [[1.0, 2.0, 3.0, 4.0], [2.0, 4.0, 6.0, 8.0], [0.0; 4]];
        for (kind, expected_row) in FlavorKind::ALL.into_iter().zip(expected) {
            for (actual, expected) in spectrum.row(kind).iter().zip(expected_row) {
                assert!(
                    within_tolerance(*actual, expected, 0.0, 1.0e-12, 1.0e-12),
                    "{kind:?}: {actual} vs {expected}"
                );
            }
        }
    }

    #[test]
    fn block_sign_must_match() {
        let block = FlavorBlock::zeros(ParticleSign::Neutrino, binning());
        let error = oscillated_flux_to_true_spectrum(
            ParticleSign::Antineutrino,
            &binning(),
            1.0,
            &block,
            &CrossSections::new(),
        )
        .expect_err("sign mismatch");
        assert_eq!(error.category(), NuSpecErrorCategory::InvalidFlavorError);
    }

    #[test]
    fn reco_spectrum_applies_each_response() {
        let block = FlavorBlock::new(
            ParticleSign::Neutrino,
            binning(),
            [vec![4.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0, 8.0], vec![1.0; 4]],
        )
        .expect("block");

        let mut smear = Mat::<f64>::zeros(4, 4);
        for j in 0..4 {
            smear[(j, j)] = 0.5;
            smear[((j + 1) % 4, j)] = 0.5;
        }
        let responses: ResponseMatrices = ParticleSign::Neutrino
            .family()
            .into_iter()
            .map(|flavor| {
                let matrix = if flavor.kind() == FlavorKind::Tau {
                    let mut identity = Mat::<f64>::zeros(4, 4);
                    for j in 0..4 {
                        identity[(j, j)] = 1.0;
                    }
                    identity
                } else {
                    smear.clone()
                };
                (
                    flavor,
                    DetectorResponseMatrix::new(flavor, InteractionChannel::Cc, matrix)
                        .expect("response"),
                )
            })
            .collect();

        let reco =
            true_spectrum_to_reco_spectrum(ParticleSign::Neutrino, &binning(), &block, &responses)
                .expect("reco spectrum");
        assert_eq!(reco.row(FlavorKind::Electron), &[2.0, 2.0, 0.0, 0.0]);
        assert_eq!(reco.row(FlavorKind::Muon), &[4.0, 0.0, 0.0, 4.0]);
        assert_eq!(reco.row(FlavorKind::Tau), &[1.0; 4]);
    }

    #[test]
    fn undersized_response_is_a_dimension_error() {
        let binning = EnergyBinning::new(12, 0.0, 12.0).expect("binning");
        let block = FlavorBlock::zeros(ParticleSign::Neutrino, binning);
        let responses: ResponseMatrices = ParticleSign::Neutrino
            .family()
            .into_iter()
            .map(|flavor| {
                (
                    flavor,
                    DetectorResponseMatrix::new(flavor, InteractionChannel::Cc, Mat::zeros(10, 10))
                        .expect("response"),
                )
            })
            .collect();

        let error =
            true_spectrum_to_reco_spectrum(ParticleSign::Neutrino, &binning, &block, &responses)
                .expect_err("10 vs 12 bins");
        assert_eq!(error.category(), NuSpecErrorCategory::DimensionError);
    }
}
