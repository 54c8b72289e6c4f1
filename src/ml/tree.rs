//! CART regression tree.
//!
//! Splits minimise squared error. Thresholds sit halfway between adjacent
//! distinct feature values and rows with `x <= threshold` go left. Nodes live
//! in a flat arena; children always have larger indices than their parent.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Unset grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn per split. Unset examines every feature.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: u32,
        right: u32,
    },
    Leaf {
        value: f64,
        samples: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    n_features: usize,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Fit on the rows of `x` named by `samples`.
    ///
    /// `samples` may repeat indices (bootstrap draws); a repeated row counts
    /// once per occurrence. Callers guarantee `samples` is non-empty and every
    /// row of `x` has the same width.
    pub fn fit<R: Rng + ?Sized>(
        x: &[Vec<f64>],
        y: &[f64],
        samples: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);
        let mut nodes = vec![Node::Leaf {
            value: 0.0,
            samples: 0,
        }];
        let mut stack: Vec<(usize, Vec<usize>, usize)> = vec![(0, samples.to_vec(), 0)];
        let mut feature_order: Vec<usize> = (0..n_features).collect();
        let n_try = params
            .max_features
            .map(|m| m.min(n_features))
            .unwrap_or(n_features);

        while let Some((idx, rows, depth)) = stack.pop() {
            let leaf = Node::Leaf {
                value: mean(y, &rows),
                samples: rows.len() as u32,
            };

            let depth_exhausted = params.max_depth.is_some_and(|d| depth >= d);
            if depth_exhausted
                || rows.len() < params.min_samples_split
                || rows.len() < 2 * params.min_samples_leaf
                || is_pure(y, &rows)
            {
                nodes[idx] = leaf;
                continue;
            }

            feature_order.shuffle(rng);
            let Some(split) = best_split(x, y, &rows, &feature_order[..n_try], params.min_samples_leaf)
            else {
                nodes[idx] = leaf;
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&r| x[r][split.feature] <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf {
                value: 0.0,
                samples: 0,
            });
            nodes.push(Node::Leaf {
                value: 0.0,
                samples: 0,
            });
            nodes[idx] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: left as u32,
                right: right as u32,
            };

            stack.push((right, right_rows, depth + 1));
            stack.push((left, left_rows, depth + 1));
        }

        Self { n_features, nodes }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Structural check for trees read back from disk.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= self.n_features {
                        return Err(format!(
                            "node[{idx}] feature {feature} >= n_features {}",
                            self.n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node[{idx}] threshold is not finite"));
                    }
                    for child in [*left as usize, *right as usize] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node[{idx}] child {child} out of order"));
                        }
                    }
                }
                Node::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(format!("node[{idx}] leaf value is not finite"));
                    }
                }
            }
        }
        Ok(())
    }
}

fn mean(y: &[f64], rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len() as f64
}

fn is_pure(y: &[f64], rows: &[usize]) -> bool {
    let first = y[rows[0]];
    rows.iter().all(|&r| y[r] == first)
}

/// Best squared-error split over `features`, or `None` if no split reduces
/// the error.
///
/// Minimising the children's summed squared error is the same as maximising
/// `sum_l^2 / n_l + sum_r^2 / n_r`, which avoids a second pass per candidate.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    features: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let n = rows.len();
    let total: f64 = rows.iter().map(|&r| y[r]).sum();
    let parent_score = total * total / n as f64;
    let mut best: Option<SplitCandidate> = None;
    let mut order = rows.to_vec();

    for &feature in features {
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for i in 0..n - 1 {
            left_sum += y[order[i]];
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let here = x[order[i]][feature];
            let next = x[order[i + 1]][feature];
            if next <= here {
                continue;
            }

            let right_sum = total - left_sum;
            let score =
                left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
            let floor = best.map_or(parent_score, |b| b.score);
            if score > floor + 1e-12 * floor.abs().max(1.0) {
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // y jumps from 1 to 5 between x = 3 and x = 4; column 1 is noise.
        let x = (0..8).map(|i| vec![i as f64, (i % 2) as f64]).collect();
        let y = (0..8).map(|i| if i <= 3 { 1.0 } else { 5.0 }).collect();
        (x, y)
    }

    #[test]
    fn learns_a_step() {
        let (x, y) = step_data();
        let rows: Vec<usize> = (0..x.len()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let tree = RegressionTree::fit(&x, &y, &rows, &TreeParams::default(), &mut rng);

        assert!(tree.validate().is_ok());
        assert_eq!(tree.n_leaves(), 2);
        match &tree.nodes()[0] {
            Node::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, 0);
                assert!((threshold - 3.5).abs() < 1e-12);
            }
            other => panic!("expected root split, got {other:?}"),
        }
        assert_eq!(tree.predict_row(&[0.0, 1.0]), 1.0);
        assert_eq!(tree.predict_row(&[7.0, 0.0]), 5.0);
    }

    #[test]
    fn constant_target_is_a_single_leaf() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![2.5, 2.5, 2.5];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = RegressionTree::fit(&x, &y, &[0, 1, 2], &TreeParams::default(), &mut rng);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_row(&[10.0]), 2.5);
    }

    #[test]
    fn max_depth_limits_growth() {
        let x: Vec<Vec<f64>> = (0..16).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..16).map(|i| i as f64).collect();
        let rows: Vec<usize> = (0..16).collect();
        let params = TreeParams {
            max_depth: Some(2),
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let tree = RegressionTree::fit(&x, &y, &rows, &params, &mut rng);
        assert!(tree.n_leaves() <= 4);
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let (x, y) = step_data();
        let rows: Vec<usize> = (0..x.len()).collect();
        let params = TreeParams {
            min_samples_leaf: 3,
            ..TreeParams::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let tree = RegressionTree::fit(&x, &y, &rows, &params, &mut rng);
        for node in tree.nodes() {
            if let Node::Leaf { samples, .. } = node {
                assert!(*samples >= 3, "leaf with {samples} samples");
            }
        }
    }

    #[test]
    fn duplicated_rows_weight_the_leaf_mean() {
        let x = vec![vec![0.0], vec![0.0]];
        let y = vec![1.0, 4.0];
        let mut rng = StdRng::seed_from_u64(5);
        // Row 0 drawn twice, row 1 once: mean = (1 + 1 + 4) / 3.
        let tree = RegressionTree::fit(&x, &y, &[0, 0, 1], &TreeParams::default(), &mut rng);
        assert!((tree.predict_row(&[0.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_backward_children() {
        let tree = RegressionTree {
            n_features: 1,
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 0.5,
                left: 0,
                right: 0,
            }],
        };
        assert!(tree.validate().is_err());
    }
}
