use super::{read_matrix, read_vector, write_matrix, write_vector};
use crate::domain::{CodecResult, NuSpecError};
use faer::Mat;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

/// Writes `content` with canonical line endings, creating parent
/// directories first. The bytes are staged in a sibling temporary file and
/// renamed into place, so `path` is either absent or complete.
pub fn write_text_artifact(path: &Path, content: &str) -> CodecResult<()> {
    let directory = match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|source| {
                NuSpecError::io(
                    "IO.FLAT_TABLE_DIRECTORY",
                    format!(
                        "failed to create output directory '{}': {}",
                        parent.display(),
                        source
                    ),
                )
            })?;
            parent
        }
        None => Path::new("."),
    };

    let write_error = |source: std::io::Error| {
        NuSpecError::io(
            "IO.FLAT_TABLE_WRITE",
            format!("failed to write '{}': {}", path.display(), source),
        )
    };
    let mut staged = NamedTempFile::new_in(directory).map_err(write_error)?;
    staged
        .write_all(normalize_text_artifact(content).as_bytes())
        .map_err(write_error)?;
    staged
        .persist(path)
        .map_err(|persist| write_error(persist.error))?;
    Ok(())
}

fn read_source(path: &Path) -> CodecResult<String> {
    fs::read_to_string(path).map_err(|source| {
        NuSpecError::io(
            "IO.FLAT_TABLE_READ",
            format!("failed to read '{}': {}", path.display(), source),
        )
    })
}

/// Prefixes a codec error message with the file it came from.
fn with_path(error: NuSpecError, path: &Path) -> NuSpecError {
    NuSpecError::new(
        error.category(),
        error.placeholder(),
        format!("{}: {}", path.display(), error.message()),
    )
}

pub fn read_vector_file(path: &Path, expected_length: usize) -> CodecResult<Vec<f64>> {
    let source = read_source(path)?;
    let values = read_vector(&source, expected_length).map_err(|error| with_path(error, path))?;
    info!("read {} values from {}", values.len(), path.display());
    Ok(values)
}

pub fn write_vector_file(path: &Path, values: &[f64], header_lines: &[String]) -> CodecResult<()> {
    write_text_artifact(path, &write_vector(values, header_lines))?;
    debug!("wrote {} values to {}", values.len(), path.display());
    Ok(())
}

pub fn read_matrix_file(path: &Path, rows: usize, cols: usize) -> CodecResult<Mat<f64>> {
    let source = read_source(path)?;
    let matrix = read_matrix(&source, rows, cols).map_err(|error| with_path(error, path))?;
    info!("read {rows}x{cols} matrix from {}", path.display());
    Ok(matrix)
}

pub fn write_matrix_file(
    path: &Path,
    rows: usize,
    cols: usize,
    values: &[f64],
    header_lines: &[String],
) -> CodecResult<()> {
    let text = write_matrix(rows, cols, values, header_lines)?;
    write_text_artifact(path, &text)?;
    debug!("wrote {rows}x{cols} matrix to {}", path.display());
    Ok(())
}
