use nuspec_core::common::{AnalysisConfig, SWEEP_MANIFEST_FILE};
use nuspec_core::domain::{EnergyBinning, OscillationParameters, ParameterSweep};
use nuspec_core::modules::oscillation::{
    DmpEngine, GenerationStatus, OscillationTableGenerator, compute_probability, flavor_pairs,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn probabilities_stay_in_the_unit_interval() {
    let engine = DmpEngine::default();
    for params in [
        OscillationParameters::nufit_2014_normal(),
        OscillationParameters::capozzi_cdr_normal(),
    ] {
        for (start, end) in flavor_pairs() {
            for energy in [0.0, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 50.0] {
                let probability = compute_probability(&engine, &params, start, end, energy)
                    .expect("probability");
                assert!(
                    (0.0..=1.0).contains(&probability),
                    "P({start} -> {end}) at {energy} GeV = {probability}"
                );
            }
        }
    }
}

#[test]
fn second_generation_pass_leaves_bytes_identical() {
    let temp = TempDir::new().expect("tempdir should be created");
    let config = AnalysisConfig::default().with_root(temp.path());
    let generator = OscillationTableGenerator::new(DmpEngine::default(), config.clone());
    let binning = EnergyBinning::new(20, 0.0, 10.0).expect("binning");
    let params = OscillationParameters::default();

    let first = generator.generate_all(&params, &binning).expect("first pass");
    let snapshot = first
        .iter()
        .map(|outcome| fs::read(&outcome.path).expect("table should exist"))
        .collect::<Vec<_>>();

    let second = generator.generate_all(&params, &binning).expect("second pass");
    assert!(second.iter().all(|outcome| outcome.status == GenerationStatus::Skipped));
    for (outcome, bytes) in second.iter().zip(&snapshot) {
        assert_eq!(&fs::read(&outcome.path).expect("table should exist"), bytes);
    }

    let header = fs::read_to_string(config.probability_table_path(
        nuspec_core::domain::Flavor::NUMU,
        nuspec_core::domain::Flavor::NUE,
        20,
    ))
    .expect("numu -> nue table");
    assert!(header.contains("# sin2_theta12 = 0.304"));
}

#[test]
fn sweep_writes_one_table_set_per_point_and_a_manifest() {
    let temp = TempDir::new().expect("tempdir should be created");
    let config = AnalysisConfig::default().with_root(temp.path());
    let generator = OscillationTableGenerator::new(DmpEngine::default(), config.clone());
    let binning = EnergyBinning::new(5, 0.5, 5.5).expect("binning");

    let mut sweep = ParameterSweep::single(&OscillationParameters::default());
    sweep.delta_cp = vec![0.0, std::f64::consts::FRAC_PI_2];
    sweep.sin2_theta23 = vec![0.42, 0.58];

    let outcomes = generator.generate_many(&sweep, &binning).expect("sweep");
    assert_eq!(outcomes.len(), 4 * flavor_pairs().len());
    assert!(config.sweep_dir.join("p3_numu_nue5.csv").is_file());

    let manifest: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(config.sweep_dir.join(SWEEP_MANIFEST_FILE)).expect("manifest"),
    )
    .expect("manifest should be JSON");
    let points = manifest["points"].as_array().expect("points array");
    assert_eq!(points.len(), 4);
    assert_eq!(points[1]["parameters"]["deltaCp"], std::f64::consts::FRAC_PI_2);
    assert_eq!(points[2]["parameters"]["sin2Theta23"], 0.58);

    let p1 = fs::read_to_string(config.sweep_dir.join("p1_numu_nue5.csv")).expect("p1 table");
    assert!(p1.contains(&format!("delta_cp = {} rad", std::f64::consts::FRAC_PI_2)));
}
