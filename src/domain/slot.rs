use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Feature names, in the order the model consumes them.
pub const FEATURES: [&str; 5] = [
    "dayOfWeek",
    "hourOfDay",
    "duration",
    "participantCount",
    "meetingType",
];

/// Numeric features passed through to the regressor unchanged.
pub const NUMERIC_FEATURES: [&str; 4] = ["dayOfWeek", "hourOfDay", "duration", "participantCount"];

/// The single categorical feature.
pub const CATEGORICAL_FEATURE: &str = "meetingType";

/// Model input: the rated attributes of a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    /// 0-6, Sunday-Saturday
    pub day_of_week: u8,
    /// 0-23
    pub hour_of_day: u8,
    /// Minutes
    pub duration: u32,
    pub participant_count: u32,
    /// Open vocabulary (e.g. "standup", "review")
    pub meeting_type: String,
}

impl FeatureVector {
    pub fn new(
        day_of_week: u8,
        hour_of_day: u8,
        duration: u32,
        participant_count: u32,
        meeting_type: impl Into<String>,
    ) -> Self {
        Self {
            day_of_week,
            hour_of_day,
            duration,
            participant_count,
            meeting_type: meeting_type.into(),
        }
    }

    /// Numeric passthrough values in `NUMERIC_FEATURES` order.
    pub fn numeric(&self) -> [f64; 4] {
        [
            f64::from(self.day_of_week),
            f64::from(self.hour_of_day),
            f64::from(self.duration),
            f64::from(self.participant_count),
        ]
    }
}

/// A proposed meeting time a caller wants scored.
///
/// Keys beyond the features (slot ids, start timestamps, ...) are kept in
/// `extra` and written back out untouched, so a ranked slot serializes to
/// the same mapping the caller supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSlot {
    #[serde(flatten)]
    pub features: FeatureVector,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandidateSlot {
    pub fn new(features: FeatureVector) -> Self {
        Self {
            features,
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl From<FeatureVector> for CandidateSlot {
    fn from(features: FeatureVector) -> Self {
        Self::new(features)
    }
}

/// A candidate slot paired with its predicted rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSlot {
    pub slot: CandidateSlot,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn candidate_slot_keeps_unknown_keys() {
        let raw = json!({
            "dayOfWeek": 1,
            "hourOfDay": 9,
            "duration": 30,
            "participantCount": 4,
            "meetingType": "standup",
            "slotId": "mon-0900",
        });

        let slot: CandidateSlot = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(slot.features, FeatureVector::new(1, 9, 30, 4, "standup"));
        assert_eq!(slot.extra.get("slotId"), Some(&json!("mon-0900")));
        assert!(!slot.extra.contains_key("dayOfWeek"));

        assert_eq!(serde_json::to_value(&slot).unwrap(), raw);
    }

    #[test]
    fn candidate_slot_requires_every_feature() {
        let raw = json!({
            "dayOfWeek": 1,
            "hourOfDay": 9,
            "duration": 30,
            "meetingType": "standup",
        });
        assert!(serde_json::from_value::<CandidateSlot>(raw).is_err());
    }

    #[test]
    fn numeric_passthrough_order() {
        let fv = FeatureVector::new(3, 14, 60, 10, "review");
        assert_eq!(fv.numeric(), [3.0, 14.0, 60.0, 10.0]);
    }
}
