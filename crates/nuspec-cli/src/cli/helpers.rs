use super::CliError;
use anyhow::Context;
use nuspec_core::common::{AnalysisConfig, load_analysis_config, load_json};
use nuspec_core::domain::{ComputeArtifact, Flavor, NuSpecError};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::Path;

/// Defaults when no file is given. A loaded config has its relative
/// directories rebased onto the folder that holds it.
pub(super) fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, CliError> {
    let config = match path {
        None => AnalysisConfig::default(),
        Some(path) => {
            let config = load_analysis_config(path).map_err(NuSpecError::from)?;
            match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                Some(parent) => config.with_root(parent),
                None => config,
            }
        }
    };

    config.validate()?;
    Ok(config)
}

pub(super) fn load_json_input<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    Ok(load_json(path).map_err(NuSpecError::from)?)
}

/// clap value parser over `Flavor::from_str`: a signed index (`-2`) or a
/// name in either style (`numubar`, `nu_mu_bar`).
pub(super) fn parse_flavor(token: &str) -> Result<Flavor, String> {
    token
        .parse::<Flavor>()
        .map_err(|error| error.message().to_string())
}

pub(super) fn print_artifacts(artifacts: &[ComputeArtifact]) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    for artifact in artifacts {
        writeln!(stdout, "{}", artifact.path.display())
            .context("failed to write artifact list to stdout")?;
    }
    Ok(())
}

pub(super) fn print_line(line: &str) -> Result<(), CliError> {
    writeln!(std::io::stdout().lock(), "{line}").context("failed to write to stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, parse_flavor};
    use nuspec_core::domain::Flavor;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn flavors_parse_from_indices_and_names() {
        assert_eq!(parse_flavor("-2"), Ok(Flavor::NUMUBAR));
        assert_eq!(parse_flavor("nu_tau"), Ok(Flavor::NUTAU));
        assert_eq!(parse_flavor("nuebar"), Ok(Flavor::NUEBAR));
        assert!(parse_flavor("0").is_err());
        assert!(parse_flavor("sterile").is_err());

        let core_error = "4".parse::<Flavor>().expect_err("index out of range");
        assert_eq!(parse_flavor("4"), Err(core_error.message().to_string()));
    }

    #[test]
    fn loaded_config_resolves_against_its_folder() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("analysis.json");
        fs::write(&path, r#"{ "fluxDir": "beam" }"#).expect("config should be written");

        let config = load_config(Some(&path)).expect("config should load");
        assert_eq!(config.flux_dir, temp.path().join("beam"));
        assert_eq!(config.oscillation_dir, temp.path().join("oscillation"));
    }
}
