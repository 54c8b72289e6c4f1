//! Bagged ensemble of regression trees.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};
use crate::error::{Result, SlotwiseError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    /// Master seed; each tree draws its own seed from it.
    pub seed: u64,
    pub tree: TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            tree: TreeParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Fit `params.n_trees` trees, each on a bootstrap sample of the rows.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Result<Self> {
        if x.is_empty() {
            return Err(SlotwiseError::Training(
                "cannot fit a forest on zero rows".to_string(),
            ));
        }
        if x.len() != y.len() {
            return Err(SlotwiseError::Training(format!(
                "feature rows {} != labels {}",
                x.len(),
                y.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(SlotwiseError::Training("n_trees must be > 0".to_string()));
        }

        let n_features = x[0].len();
        if let Some(bad) = x.iter().position(|r| r.len() != n_features) {
            return Err(SlotwiseError::Training(format!(
                "row {bad} has {} features, expected {n_features}",
                x[bad].len()
            )));
        }

        let n = x.len();
        let mut master = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let mut rng = StdRng::seed_from_u64(master.gen());
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(RegressionTree::fit(x, y, &bootstrap, &params.tree, &mut rng));
        }

        Ok(Self { n_features, trees })
    }

    /// Mean of the per-tree predictions.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict_row(r)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            if tree.n_features() != self.n_features {
                return Err(format!(
                    "tree[{idx}] n_features {} != forest n_features {}",
                    tree.n_features(),
                    self.n_features
                ));
            }
            tree.validate().map_err(|e| format!("tree[{idx}]: {e}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| 2.0 * i as f64 + 1.0).collect();
        (x, y)
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = linear_data();
        let params = ForestParams {
            n_trees: 10,
            ..ForestParams::default()
        };
        let a = RandomForestRegressor::fit(&x, &y, &params).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, &params).unwrap();
        assert_eq!(a, b);

        let c = RandomForestRegressor::fit(&x, &y, &ForestParams { seed: 7, ..params }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn predictions_stay_within_label_range() {
        let (x, y) = linear_data();
        let forest = RandomForestRegressor::fit(&x, &y, &ForestParams::default()).unwrap();
        assert_eq!(forest.n_trees(), 100);
        assert!(forest.validate().is_ok());

        for row in &x {
            let p = forest.predict_row(row);
            assert!((1.0..=79.0).contains(&p), "prediction {p} out of range");
        }
        // Fitted trend is increasing.
        assert!(forest.predict_row(&[35.0, 2.0]) > forest.predict_row(&[5.0, 2.0]));
    }

    #[test]
    fn rejects_ragged_rows() {
        let x = vec![vec![1.0, 2.0], vec![3.0]];
        let y = vec![1.0, 2.0];
        let err = RandomForestRegressor::fit(&x, &y, &ForestParams::default()).unwrap_err();
        assert!(matches!(err, SlotwiseError::Training(_)));
    }

    #[test]
    fn rejects_empty_input() {
        let err = RandomForestRegressor::fit(&[], &[], &ForestParams::default()).unwrap_err();
        assert!(matches!(err, SlotwiseError::Training(_)));
    }
}
