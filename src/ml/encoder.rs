//! Categorical-to-numeric transformation for meeting features.
//!
//! Output layout is the one-hot block for `meetingType` followed by the
//! numeric features unchanged:
//!
//! ```text
//! [meetingType=<c0>, meetingType=<c1>, ..., dayOfWeek, hourOfDay, duration, participantCount]
//! ```
//!
//! Categories are sorted so the layout depends only on the vocabulary, not on
//! row order. A category never seen during fitting encodes as all zeros.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::{FeatureVector, CATEGORICAL_FEATURE, NUMERIC_FEATURES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    /// Sorted, unique meeting types seen during fitting.
    categories: Vec<String>,
}

impl FeatureEncoder {
    pub fn fit<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        let categories: BTreeSet<&str> = rows
            .into_iter()
            .map(|fv| fv.meeting_type.as_str())
            .collect();

        Self {
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Width of a transformed row.
    pub fn n_outputs(&self) -> usize {
        self.categories.len() + NUMERIC_FEATURES.len()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{CATEGORICAL_FEATURE}={c}"))
            .chain(NUMERIC_FEATURES.iter().map(|n| n.to_string()))
            .collect()
    }

    pub fn transform(&self, features: &FeatureVector) -> Vec<f64> {
        let mut row = vec![0.0_f64; self.n_outputs()];
        if let Ok(idx) = self
            .categories
            .binary_search_by(|c| c.as_str().cmp(features.meeting_type.as_str()))
        {
            row[idx] = 1.0;
        }
        row[self.categories.len()..].copy_from_slice(&features.numeric());
        row
    }

    pub fn transform_batch<'a, I>(&self, rows: I) -> Vec<Vec<f64>>
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        rows.into_iter().map(|fv| self.transform(fv)).collect()
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self
            .categories
            .windows(2)
            .any(|pair| pair[0].as_str() >= pair[1].as_str())
        {
            return Err("encoder categories must be sorted and unique".to_string());
        }
        Ok(())
    }
}
