use super::stages::{CrossSections, ProbabilityTables, ResponseMatrices};
use crate::codec::{read_matrix_file, read_vector_file, write_matrix_file};
use crate::common::AnalysisConfig;
use crate::domain::{
    ComputeResult, CrossSectionTable, DetectorResponseMatrix, EnergyBinning, FLAVOR_COUNT, Flavor,
    FlavorBlock, ParticleSign, ProbabilityTable,
};
use std::path::Path;

/// P(start -> end) for the three end flavors of `start`'s sign.
pub fn load_probability_tables(
    config: &AnalysisConfig,
    start: Flavor,
    binning: &EnergyBinning,
) -> ComputeResult<ProbabilityTables> {
    start
        .family()
        .into_iter()
        .map(|end| {
            let path = config.probability_table_path(start, end, binning.nbins());
            let values = read_vector_file(&path, binning.nbins())?;
            Ok((end, ProbabilityTable::new(start, end, *binning, values)?))
        })
        .collect()
}

pub fn load_cross_sections(
    config: &AnalysisConfig,
    sign: ParticleSign,
    binning: &EnergyBinning,
) -> ComputeResult<CrossSections> {
    sign.family()
        .into_iter()
        .map(|flavor| {
            let path = config.cross_section_path(flavor, config.channel, binning.nbins());
            let values = read_vector_file(&path, binning.nbins())?;
            Ok((
                flavor,
                CrossSectionTable::new(flavor, config.channel, *binning, values)?,
            ))
        })
        .collect()
}

/// Response matrices for each end flavor, picked per the configured
/// response selection.
pub fn load_response_matrices(
    config: &AnalysisConfig,
    start: Flavor,
    binning: &EnergyBinning,
) -> ComputeResult<ResponseMatrices> {
    let nbins = binning.nbins();
    start
        .family()
        .into_iter()
        .map(|end| {
            let sample = config.response_sample(start, end);
            let path = config.response_matrix_path(&sample, config.channel, nbins);
            let matrix = read_matrix_file(&path, nbins, nbins)?;
            Ok((
                end,
                DetectorResponseMatrix::new(end, config.channel, matrix)?,
            ))
        })
        .collect()
}

pub fn read_block(
    path: &Path,
    sign: ParticleSign,
    binning: &EnergyBinning,
) -> ComputeResult<FlavorBlock> {
    let values = read_vector_file(path, FLAVOR_COUNT * binning.nbins())?;
    FlavorBlock::from_flat(sign, *binning, &values)
}

/// One row per flavor, e then mu then tau.
pub fn write_block(path: &Path, block: &FlavorBlock, header_lines: &[String]) -> ComputeResult<()> {
    write_matrix_file(
        path,
        FLAVOR_COUNT,
        block.binning().nbins(),
        &block.to_flat(),
        header_lines,
    )
}

pub fn block_header(what: &str, block: &FlavorBlock) -> Vec<String> {
    let [e, mu, tau] = block.flavors();
    vec![format!(
        "{what}: rows {e}, {mu}, {tau}; {} bins over [{}, {}] GeV",
        block.binning().nbins(),
        block.binning().emin(),
        block.binning().emax()
    )]
}

#[cfg(test)]
mod tests {
    use super::{block_header, read_block, write_block};
    use crate::domain::{EnergyBinning, FlavorBlock, ParticleSign};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn block_files_hold_one_row_per_flavor() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("block.csv");
        let binning = EnergyBinning::new(2, 0.0, 2.0).expect("binning");
        let block = FlavorBlock::from_flat(
            ParticleSign::Antineutrino,
            binning,
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .expect("block");

        write_block(&path, &block, &block_header("true spectrum", &block)).expect("write");
        let text = fs::read_to_string(&path).expect("block should be readable");
        assert_eq!(
            text,
            "# true spectrum: rows nuebar, numubar, nutaubar; 2 bins over [0, 2] GeV\n1, 2\n3, 4\n5, 6\n"
        );

        let read = read_block(&path, ParticleSign::Antineutrino, &binning).expect("read");
        assert_eq!(read, block);
    }
}
