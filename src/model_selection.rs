//! Train/test splitting utilities.

use crate::error::{ArrendarError, Result};
use crate::primitives::{Matrix, Vector};

/// Splits features and targets into train and test partitions.
///
/// `test_size` is the fraction of samples assigned to the test set
/// (exclusive 0..1). Passing a `random_state` makes the shuffle
/// reproducible.
///
/// # Examples
///
/// ```
/// use arrendar::model_selection::train_test_split;
/// use arrendar::primitives::{Matrix, Vector};
///
/// let x = Matrix::from_vec(10, 1, (0..10).map(|i| i as f32).collect()).unwrap();
/// let y = Vector::from_vec((0..10).map(|i| i as f32 * 2.0).collect());
///
/// let (x_train, x_test, y_train, y_test) =
///     train_test_split(&x, &y, 0.2, Some(42)).unwrap();
/// assert_eq!(x_train.n_rows(), 8);
/// assert_eq!(x_test.n_rows(), 2);
/// assert_eq!(y_train.len(), 8);
/// assert_eq!(y_test.len(), 2);
/// ```
///
/// # Errors
///
/// Returns an error if lengths mismatch, the data has fewer than two
/// samples, or `test_size` is outside (0, 1).
pub fn train_test_split(
    x: &Matrix<f32>,
    y: &Vector<f32>,
    test_size: f32,
    random_state: Option<u64>,
) -> Result<(Matrix<f32>, Matrix<f32>, Vector<f32>, Vector<f32>)> {
    let n_samples = x.n_rows();
    if n_samples != y.len() {
        return Err(ArrendarError::DimensionMismatch {
            expected: format!("{n_samples} targets"),
            actual: y.len().to_string(),
        });
    }
    if n_samples == 0 {
        return Err(ArrendarError::empty_input("train_test_split"));
    }
    if n_samples < 2 {
        return Err(ArrendarError::invalid_input(
            "n_samples",
            n_samples,
            "at least 2 samples to split",
        ));
    }
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(ArrendarError::invalid_input(
            "test_size",
            test_size,
            "a fraction in (0, 1)",
        ));
    }

    let n_test = ((n_samples as f32) * test_size).round() as usize;
    let n_test = n_test.clamp(1, n_samples - 1);
    let n_train = n_samples - n_test;

    let indices = shuffle_indices(n_samples, random_state);
    let train_indices = &indices[..n_train];
    let test_indices = &indices[n_train..];

    let x_train = x.select_rows(train_indices);
    let x_test = x.select_rows(test_indices);
    let y_train = Vector::from_vec(train_indices.iter().map(|&i| y[i]).collect::<Vec<f32>>());
    let y_test = Vector::from_vec(test_indices.iter().map(|&i| y[i]).collect::<Vec<f32>>());

    Ok((x_train, x_test, y_train, y_test))
}

/// Fisher-Yates shuffle of `0..n_samples`, seedable for reproducibility.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    let mut indices: Vec<usize> = (0..n_samples).collect();

    if let Some(seed) = random_state {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(n: usize) -> (Matrix<f32>, Vector<f32>) {
        let x = Matrix::from_vec(n, 1, (0..n).map(|i| i as f32).collect()).expect("matrix");
        let y = Vector::from_vec((0..n).map(|i| i as f32 * 2.0).collect());
        (x, y)
    }

    #[test]
    fn test_split_shapes() {
        let (x, y) = data(10);
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.2, Some(42)).expect("split should succeed");
        assert_eq!(x_train.n_rows(), 8);
        assert_eq!(x_test.n_rows(), 2);
        assert_eq!(y_train.len(), 8);
        assert_eq!(y_test.len(), 2);
    }

    #[test]
    fn test_split_partitions_without_overlap() {
        let (x, y) = data(10);
        let (x_train, x_test, _, _) =
            train_test_split(&x, &y, 0.3, Some(1)).expect("split should succeed");

        let mut seen: Vec<f32> = x_train
            .as_slice()
            .iter()
            .chain(x_test.as_slice().iter())
            .copied()
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
        let expected: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert_eq!(seen, expected, "Every sample appears exactly once");
    }

    #[test]
    fn test_split_pairs_stay_aligned() {
        let (x, y) = data(10);
        let (x_train, _, y_train, _) =
            train_test_split(&x, &y, 0.2, Some(3)).expect("split should succeed");
        for i in 0..x_train.n_rows() {
            assert!((y_train[i] - x_train.get(i, 0) * 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_split_reproducibility() {
        let (x, y) = data(12);
        let a = train_test_split(&x, &y, 0.25, Some(42)).expect("split");
        let b = train_test_split(&x, &y, 0.25, Some(42)).expect("split");
        assert_eq!(a.0.as_slice(), b.0.as_slice());
        assert_eq!(a.1.as_slice(), b.1.as_slice());
    }

    #[test]
    fn test_split_invalid_test_size() {
        let (x, y) = data(10);
        assert!(train_test_split(&x, &y, 0.0, None).is_err());
        assert!(train_test_split(&x, &y, 1.0, None).is_err());
        assert!(train_test_split(&x, &y, -0.2, None).is_err());
    }

    #[test]
    fn test_split_empty_data() {
        let x = Matrix::from_vec(0, 1, vec![]).expect("matrix");
        let y = Vector::from_vec(vec![]);
        assert!(train_test_split(&x, &y, 0.2, None).is_err());
    }

    #[test]
    fn test_split_single_sample_fails() {
        let (x, y) = data(1);
        let err = train_test_split(&x, &y, 0.2, Some(42)).expect_err("cannot split one sample");
        assert!(matches!(err, ArrendarError::InvalidInput { .. }));
    }

    #[test]
    fn test_split_tiny_dataset_keeps_both_partitions() {
        let (x, y) = data(2);
        let (x_train, x_test, _, _) =
            train_test_split(&x, &y, 0.5, Some(0)).expect("split should succeed");
        assert_eq!(x_train.n_rows(), 1);
        assert_eq!(x_test.n_rows(), 1);
    }
}
