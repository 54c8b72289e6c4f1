use serde::{Deserialize, Serialize};

use super::FeatureVector;

/// Column header of the preference dataset, in canonical write order.
pub const DATASET_COLUMNS: [&str; 7] = [
    "userId",
    "dayOfWeek",
    "hourOfDay",
    "duration",
    "participantCount",
    "meetingType",
    "rating",
];

/// Label column.
pub const RATING_COLUMN: &str = "rating";

/// One rated meeting. Recorded once, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub user_id: String,
    #[serde(flatten)]
    pub features: FeatureVector,
    /// User satisfaction rating
    pub rating: f64,
}

impl Observation {
    pub fn new(user_id: impl Into<String>, features: FeatureVector, rating: f64) -> Self {
        Self {
            user_id: user_id.into(),
            features,
            rating,
        }
    }

    pub fn features(&self) -> &FeatureVector {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_preference_record() {
        let raw = json!({
            "userId": "u-17",
            "dayOfWeek": 2,
            "hourOfDay": 10,
            "duration": 45,
            "participantCount": 6,
            "meetingType": "planning",
            "rating": 4.5,
        });
        let obs: Observation = serde_json::from_value(raw).unwrap();
        assert_eq!(obs.user_id, "u-17");
        assert_eq!(obs.features.meeting_type, "planning");
        assert_eq!(obs.rating, 4.5);
    }

    #[test]
    fn missing_rating_is_rejected() {
        let raw = json!({
            "userId": "u-17",
            "dayOfWeek": 2,
            "hourOfDay": 10,
            "duration": 45,
            "participantCount": 6,
            "meetingType": "planning",
        });
        assert!(serde_json::from_value::<Observation>(raw).is_err());
    }
}
