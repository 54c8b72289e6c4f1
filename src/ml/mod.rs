//! Preference model: one-hot encoding + random forest regression.
//!
//! Everything here is pure CPU code over `f64` rows. There is no I/O in this
//! module; persistence lives in `crate::persistence`.

pub mod encoder;
pub mod forest;
pub mod metrics;
pub mod pipeline;
pub mod split;
pub mod tree;

pub use encoder::FeatureEncoder;
pub use forest::{ForestParams, RandomForestRegressor};
pub use metrics::{r2_score, rmse};
pub use pipeline::{Pipeline, PipelineMetadata, ARTIFACT_FORMAT};
pub use split::train_test_split;
pub use tree::{Node, RegressionTree, TreeParams};
