//! Flat numeric tables: optional `#` header lines followed by delimited
//! floats. Vectors are written on a single line, matrices one row per line;
//! readers fill values linearly and ignore line layout.

mod files;

pub use files::{
    normalize_text_artifact, read_matrix_file, read_vector_file, write_matrix_file,
    write_text_artifact, write_vector_file,
};

use crate::domain::{CodecResult, NuSpecError};
use faer::Mat;

const VALUE_SEPARATOR: &str = ", ";

fn is_delimiter(ch: char) -> bool {
    matches!(ch, ',' | ' ' | '\t' | '\n' | '\r')
}

/// Shortest representation that parses back to the same `f64`. Very small
/// and very large magnitudes switch to exponent form.
pub fn format_table_value(value: f64) -> String {
    let magnitude = value.abs();
    if value != 0.0 && value.is_finite() && !(1.0e-4..1.0e16).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

fn push_header(out: &mut String, header_lines: &[String]) {
    for line in header_lines {
        out.push_str("# ");
        out.push_str(line.trim_start_matches('#').trim_start());
        out.push('\n');
    }
}

fn push_row(out: &mut String, values: &[f64]) {
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            out.push_str(VALUE_SEPARATOR);
        }
        out.push_str(&format_table_value(*value));
    }
    out.push('\n');
}

pub fn write_vector(values: &[f64], header_lines: &[String]) -> String {
    let mut out = String::new();
    push_header(&mut out, header_lines);
    push_row(&mut out, values);
    out
}

pub fn write_matrix(
    rows: usize,
    cols: usize,
    values: &[f64],
    header_lines: &[String],
) -> CodecResult<String> {
    if values.len() != rows * cols {
        return Err(NuSpecError::dimension(
            "DIM.MATRIX_SHAPE",
            format!(
                "matrix declared {rows}x{cols} needs {} values, got {}",
                rows * cols,
                values.len()
            ),
        ));
    }

    let mut out = String::new();
    push_header(&mut out, header_lines);
    if cols == 0 {
        return Ok(out);
    }
    for row in values.chunks_exact(cols) {
        push_row(&mut out, row);
    }
    Ok(out)
}

/// Row-major serialization of a dense matrix.
pub fn write_mat(matrix: &Mat<f64>, header_lines: &[String]) -> CodecResult<String> {
    let mut values = Vec::with_capacity(matrix.nrows() * matrix.ncols());
    for i in 0..matrix.nrows() {
        for j in 0..matrix.ncols() {
            values.push(matrix[(i, j)]);
        }
    }
    write_matrix(matrix.nrows(), matrix.ncols(), &values, header_lines)
}

/// Text after the leading comment block.
fn strip_header(text: &str) -> &str {
    let mut rest = text;
    loop {
        let trimmed = rest.trim_start_matches([' ', '\t']);
        if !trimmed.starts_with('#') {
            return rest;
        }
        match trimmed.find('\n') {
            Some(end) => rest = &trimmed[end + 1..],
            None => return "",
        }
    }
}

fn trailing_newlines(body: &str) -> usize {
    body.chars()
        .rev()
        .take_while(|ch| ch.is_ascii_whitespace())
        .filter(|ch| *ch == '\n')
        .count()
}

pub fn read_vector(text: &str, expected_length: usize) -> CodecResult<Vec<f64>> {
    let body = strip_header(text);
    let mut values = Vec::with_capacity(expected_length);

    for token in body.split(is_delimiter).filter(|token| !token.is_empty()) {
        if values.len() == expected_length {
            return Err(NuSpecError::io(
                "IO.FLAT_TABLE_NOT_CONSUMED",
                format!("table holds more than the expected {expected_length} values"),
            ));
        }

        let value = token.parse::<f64>().map_err(|_| {
            NuSpecError::format(
                "FORMAT.FLAT_TABLE_TOKEN",
                format!("malformed numeric token '{token}' at entry {}", values.len()),
            )
        })?;
        if !value.is_finite() {
            return Err(NuSpecError::format(
                "FORMAT.FLAT_TABLE_TOKEN",
                format!("non-finite token '{token}' at entry {}", values.len()),
            ));
        }
        values.push(value);
    }

    if values.len() < expected_length {
        return Err(NuSpecError::format(
            "FORMAT.FLAT_TABLE_TOO_FEW",
            format!(
                "table holds {} values, expected {expected_length}",
                values.len()
            ),
        ));
    }

    if trailing_newlines(body) > 1 {
        return Err(NuSpecError::io(
            "IO.FLAT_TABLE_NOT_CONSUMED",
            "table has more than one trailing newline",
        ));
    }

    Ok(values)
}

pub fn read_matrix(text: &str, rows: usize, cols: usize) -> CodecResult<Mat<f64>> {
    let mut matrix = Mat::<f64>::zeros(rows, cols);
    read_matrix_into(text, rows, cols, &mut matrix)?;
    Ok(matrix)
}

pub fn read_matrix_into(
    text: &str,
    rows: usize,
    cols: usize,
    matrix: &mut Mat<f64>,
) -> CodecResult<()> {
    if matrix.nrows() != rows || matrix.ncols() != cols {
        return Err(NuSpecError::dimension(
            "DIM.MATRIX_SHAPE",
            format!(
                "destination matrix is {}x{}, table declared {rows}x{cols}",
                matrix.nrows(),
                matrix.ncols()
            ),
        ));
    }

    let values = read_vector(text, rows * cols)?;
    for (index, value) in values.into_iter().enumerate() {
        matrix[(index / cols, index % cols)] = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        format_table_value, read_matrix, read_matrix_into, read_vector, write_matrix, write_mat,
        write_vector,
    };
    use crate::domain::NuSpecErrorCategory;
    use faer::Mat;

    #[test]
    fn vector_is_one_comma_separated_line() {
        let text = write_vector(&[1.0, 0.25, -3.5], &["generated".to_string()]);
        assert_eq!(text, "# generated\n1, 0.25, -3.5\n");
    }

    #[test]
    fn vector_round_trips_exactly() {
        let values = vec![0.0, 1.0e-12, 0.1 + 0.2, 6.02e32, -7.25, 1.0 / 3.0];
        let text = write_vector(&values, &[]);
        assert_eq!(read_vector(&text, values.len()).expect("read back"), values);
    }

    #[test]
    fn reader_accepts_mixed_delimiters_and_crlf() {
        let values = read_vector("# a\r\n# b\r\n1,2 3\t4\r\n5", 5).expect("mixed delimiters");
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn too_few_entries_is_a_format_error() {
        let error = read_vector("1, 2, 3\n", 4).expect_err("short table");
        assert_eq!(error.category(), NuSpecErrorCategory::FormatError);
        assert_eq!(error.placeholder(), "FORMAT.FLAT_TABLE_TOO_FEW");
    }

    #[test]
    fn malformed_token_is_a_format_error() {
        let error = read_vector("1, x2, 3", 3).expect_err("bad token");
        assert_eq!(error.category(), NuSpecErrorCategory::FormatError);
        let error = read_vector("1, inf, 3", 3).expect_err("non-finite token");
        assert_eq!(error.category(), NuSpecErrorCategory::FormatError);
    }

    #[test]
    fn unconsumed_input_is_an_io_error() {
        let extra = read_vector("1, 2, 3, 4\n", 3).expect_err("extra token");
        assert_eq!(extra.category(), NuSpecErrorCategory::IoError);

        let blank_lines = read_vector("1, 2, 3\n\n", 3).expect_err("two trailing newlines");
        assert_eq!(blank_lines.category(), NuSpecErrorCategory::IoError);

        read_vector("1, 2, 3\n", 3).expect("single trailing newline is fine");
        read_vector("1, 2, 3", 3).expect("no trailing newline is fine");
    }

    #[test]
    fn matrix_reader_ignores_row_boundaries() {
        let wrapped = read_matrix("1, 2, 3\n4, 5, 6\n", 2, 3).expect("row layout");
        let single = read_matrix("1 2\n3 4\n5 6", 2, 3).expect("other layout");
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(wrapped[(i, j)], single[(i, j)]);
                assert_eq!(wrapped[(i, j)], (i * 3 + j + 1) as f64);
            }
        }
    }

    #[test]
    fn matrix_shape_mismatches_are_dimension_errors() {
        let mut destination = Mat::<f64>::zeros(10, 10);
        let error = read_matrix_into("1", 12, 12, &mut destination).expect_err("shape mismatch");
        assert_eq!(error.category(), NuSpecErrorCategory::DimensionError);

        let error = write_matrix(2, 2, &[1.0, 2.0, 3.0], &[]).expect_err("value count mismatch");
        assert_eq!(error.category(), NuSpecErrorCategory::DimensionError);
    }

    #[test]
    fn matrix_writer_emits_one_row_per_line() {
        let text = write_matrix(2, 2, &[1.0, 0.0, 0.5, 2.0], &[]).expect("write");
        assert_eq!(text, "1, 0\n0.5, 2\n");

        let mut matrix = Mat::<f64>::zeros(2, 2);
        matrix[(0, 1)] = 4.0;
        assert_eq!(write_mat(&matrix, &[]).expect("write"), "0, 4\n0, 0\n");
    }

    #[test]
    fn tiny_values_use_exponent_form() {
        assert_eq!(format_table_value(2.5e-39), "2.5e-39");
        assert_eq!(format_table_value(0.125), "0.125");
        assert_eq!(format_table_value(0.0), "0");
    }
}
