use std::time::Duration;

use super::trainer::MIN_TRAINING_ROWS;

/// When the feedback recorder retrains after an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrainPolicy {
    /// Retrain whenever the row count is a positive multiple of `n`.
    EveryNRows(usize),
    /// Retrain when the artifact is missing or at least this many seconds old.
    Interval(u64),
    /// Never retrain from the recorder; training is invoked explicitly.
    Manual,
}

impl Default for RetrainPolicy {
    fn default() -> Self {
        RetrainPolicy::EveryNRows(10)
    }
}

impl RetrainPolicy {
    /// `artifact_age` is `None` when no artifact exists yet.
    pub fn should_retrain(&self, row_count: usize, artifact_age: Option<Duration>) -> bool {
        match *self {
            RetrainPolicy::EveryNRows(n) => n > 0 && row_count > 0 && row_count % n == 0,
            RetrainPolicy::Interval(secs) => {
                row_count >= MIN_TRAINING_ROWS
                    && artifact_age.map_or(true, |age| age >= Duration::from_secs(secs))
            }
            RetrainPolicy::Manual => false,
        }
    }
}
