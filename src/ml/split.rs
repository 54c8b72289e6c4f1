//! Seeded train/held-out partitioning.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Result, SlotwiseError};

/// Shuffle `0..n` with `seed` and cut it into (train, test) index lists.
///
/// The held-out side gets `ceil(n * test_fraction)` rows. Both sides must end
/// up non-empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SlotwiseError::Training(format!(
            "test_fraction must be between 0 and 1: {test_fraction}"
        )));
    }

    let n_test = (n as f64 * test_fraction).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(SlotwiseError::Training(format!(
            "{n} rows cannot be split into train/test with test_fraction {test_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);
    Ok((train, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_ceiling_rule() {
        let (train, test) = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!((train.len(), test.len()), (8, 2));

        let (train, test) = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!((train.len(), test.len()), (8, 3));
    }

    #[test]
    fn partitions_cover_every_row_once() {
        let (mut train, test) = train_test_split(25, 0.2, 42).unwrap();
        train.extend(test);
        train.sort_unstable();
        assert_eq!(train, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn seed_makes_split_reproducible() {
        assert_eq!(
            train_test_split(30, 0.2, 42).unwrap(),
            train_test_split(30, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn too_few_rows_fails() {
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(0, 0.2, 42).is_err());
        assert!(train_test_split(2, 0.2, 42).is_ok());
        assert!(train_test_split(10, 1.0, 42).is_err());
    }
}
