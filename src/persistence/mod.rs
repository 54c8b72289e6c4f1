//! Persistence for the two pieces of shared state:
//! - the preference dataset (append-only, comma-delimited)
//! - the fitted model artifact (JSON, replaced on every training run)

pub mod dataset;
pub mod model_store;

pub use dataset::DatasetStore;
pub use model_store::ModelStore;
