//! Small numeric kernels shared by the pipeline stages and the extraction
//! helpers.

use faer::Mat;

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

pub fn stable_weighted_sum(values: &[f64], weights: &[f64]) -> Option<f64> {
    if values.len() != weights.len() {
        return None;
    }

    let mut sum = 0.0;
    let mut correction = 0.0;
    for (&value, &weight) in values.iter().zip(weights) {
        kahan_add(&mut sum, &mut correction, value * weight);
    }

    Some(sum)
}

pub fn elementwise_product(lhs: &[f64], rhs: &[f64]) -> Option<Vec<f64>> {
    if lhs.len() != rhs.len() {
        return None;
    }

    Some(lhs.iter().zip(rhs).map(|(a, b)| a * b).collect())
}

/// `matrix * vector` with compensated row sums; `None` on a shape mismatch.
pub fn matrix_vector_product(matrix: &Mat<f64>, vector: &[f64]) -> Option<Vec<f64>> {
    if matrix.ncols() != vector.len() {
        return None;
    }

    let mut product = Vec::with_capacity(matrix.nrows());
    let mut row = vec![0.0; matrix.ncols()];
    for i in 0..matrix.nrows() {
        for (j, slot) in row.iter_mut().enumerate() {
            *slot = matrix[(i, j)];
        }
        product.push(stable_weighted_sum(&row, vector)?);
    }

    Some(product)
}

pub fn matrix_total(matrix: &Mat<f64>) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;
    for j in 0..matrix.ncols() {
        for i in 0..matrix.nrows() {
            kahan_add(&mut sum, &mut correction, matrix[(i, j)]);
        }
    }
    sum
}

/// Scales each column to unit sum. Columns whose absolute sum is below
/// `threshold` are left as they are.
pub fn normalize_columns(matrix: &mut Mat<f64>, threshold: f64) {
    for j in 0..matrix.ncols() {
        let mut sum = 0.0;
        let mut correction = 0.0;
        for i in 0..matrix.nrows() {
            kahan_add(&mut sum, &mut correction, matrix[(i, j)]);
        }

        if sum.abs() < threshold {
            continue;
        }

        for i in 0..matrix.nrows() {
            matrix[(i, j)] /= sum;
        }
    }
}

pub fn interpolate_linear(x: f64, x_grid: &[f64], y_grid: &[f64]) -> Option<f64> {
    if x_grid.len() < 2 || x_grid.len() != y_grid.len() {
        return None;
    }

    if !x_grid.windows(2).all(|window| window[0] <= window[1]) {
        return None;
    }

    if x <= x_grid[0] {
        return Some(y_grid[0]);
    }

    let last_index = x_grid.len() - 1;
    if x >= x_grid[last_index] {
        return Some(y_grid[last_index]);
    }

    let upper = x_grid
        .windows(2)
        .position(|window| x <= window[1])
        .map(|index| index + 1)?;
    let lower = upper - 1;
    let x0 = x_grid[lower];
    let x1 = x_grid[upper];
    if x == x1 || x1 == x0 {
        return Some(y_grid[upper]);
    }

    let interpolation = (x - x0) / (x1 - x0);
    Some(y_grid[lower] + interpolation * (y_grid[upper] - y_grid[lower]))
}

pub fn relative_difference(lhs: f64, rhs: f64, relative_floor: f64) -> f64 {
    let scale = lhs.abs().max(rhs.abs()).max(relative_floor);
    (lhs - rhs).abs() / scale
}

pub fn within_tolerance(
    lhs: f64,
    rhs: f64,
    abs_tol: f64,
    rel_tol: f64,
    relative_floor: f64,
) -> bool {
    let abs_diff = (lhs - rhs).abs();
    abs_diff <= abs_tol || relative_difference(lhs, rhs, relative_floor) <= rel_tol
}

#[cfg(test)]
mod tests {
    use super::{
        elementwise_product, interpolate_linear, matrix_total, matrix_vector_product,
        normalize_columns, relative_difference, stable_sum, stable_weighted_sum, within_tolerance,
    };
    use faer::Mat;

    #[test]
    fn stable_sum_reduces_order_loss_for_large_and_small_values() {
        let input = [1.0e16, 1.0, -1.0e16];
        assert_eq!(stable_sum(&input), 0.0);
    }

    #[test]
    fn stable_weighted_sum_validates_shape() {
        assert_eq!(stable_weighted_sum(&[1.0, 2.0], &[0.25]), None);
        let weighted = stable_weighted_sum(&[2.0, 4.0], &[0.5, 0.5]).expect("sum");
        assert!((weighted - 3.0).abs() < 1.0e-12);
    }

    #[test]
    fn elementwise_product_requires_equal_lengths() {
        assert_eq!(elementwise_product(&[1.0], &[1.0, 2.0]), None);
        assert_eq!(
            elementwise_product(&[1.0, 2.0, 3.0], &[0.5, 0.0, 2.0]),
            Some(vec![0.5, 0.0, 6.0])
        );
    }

    #[test]
    fn matrix_vector_product_uses_rows_as_outputs() {
        let matrix = Mat::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
        let product = matrix_vector_product(&matrix, &[1.0, 1.0, 2.0]).expect("product");
        assert_eq!(product, vec![5.0, 17.0]);
        assert_eq!(matrix_vector_product(&matrix, &[1.0, 1.0]), None);
    }

    #[test]
    fn normalize_columns_skips_empty_columns() {
        let mut matrix = Mat::from_fn(2, 3, |i, j| if j == 1 { 0.0 } else { (i + 1) as f64 });
        normalize_columns(&mut matrix, 1.0e-6);

        assert!((matrix[(0, 0)] - 1.0 / 3.0).abs() < 1.0e-12);
        assert!((matrix[(1, 0)] - 2.0 / 3.0).abs() < 1.0e-12);
        assert_eq!(matrix[(0, 1)], 0.0);
        assert_eq!(matrix[(1, 1)], 0.0);
        assert!((matrix_total(&matrix) - 2.0).abs() < 1.0e-12);
    }

    #[test]
    fn interpolate_linear_clamps_and_interpolates() {
        let x_grid = [0.0, 1.0, 2.0];
        let y_grid = [10.0, 20.0, 30.0];

        assert_eq!(interpolate_linear(-1.0, &x_grid, &y_grid), Some(10.0));
        assert_eq!(interpolate_linear(3.0, &x_grid, &y_grid), Some(30.0));
        assert_eq!(interpolate_linear(0.5, &x_grid, &y_grid), Some(15.0));
        assert_eq!(interpolate_linear(1.0, &x_grid, &y_grid), Some(20.0));
    }

    #[test]
    fn interpolate_linear_rejects_invalid_grids() {
        assert_eq!(interpolate_linear(0.5, &[0.0], &[1.0]), None);
        assert_eq!(interpolate_linear(0.5, &[0.0, 1.0], &[1.0]), None);
        assert_eq!(
            interpolate_linear(0.5, &[0.0, 2.0, 1.0], &[0.0, 2.0, 1.0]),
            None
        );
    }

    #[test]
    fn within_tolerance_accepts_abs_or_relative_match() {
        assert!(within_tolerance(10.0, 10.001, 1.0e-2, 1.0e-6, 1.0e-12));
        assert!(within_tolerance(1000.0, 1000.2, 1.0e-6, 5.0e-4, 1.0e-12));
        assert!(!within_tolerance(1.0, 1.1, 1.0e-3, 1.0e-3, 1.0e-12));
        assert!((relative_difference(0.0, 1.0e-10, 1.0e-6) - 1.0e-4).abs() < 1.0e-12);
    }
}
