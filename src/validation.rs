/// Input validation for preference records and candidate slots
///
/// Records arrive from callers as loosely-typed JSON or CSV rows. These checks
/// run before anything touches the dataset or the model so that:
/// - Out-of-range calendar values never become training rows
/// - Ratings are always finite labels
/// - Every field survives a round trip through the comma-delimited dataset
use crate::domain::{FeatureVector, Observation};
use crate::error::{Result, SlotwiseError};

/// Validate a day-of-week value (0 = Sunday ... 6 = Saturday)
pub fn validate_day_of_week(day: u8) -> Result<()> {
    if day > 6 {
        return Err(SlotwiseError::Validation(format!(
            "dayOfWeek must be between 0 and 6: {}",
            day
        )));
    }
    Ok(())
}

/// Validate an hour-of-day value (0-23)
pub fn validate_hour_of_day(hour: u8) -> Result<()> {
    if hour > 23 {
        return Err(SlotwiseError::Validation(format!(
            "hourOfDay must be between 0 and 23: {}",
            hour
        )));
    }
    Ok(())
}

/// Validate a free-text field that ends up in a dataset cell
///
/// # Arguments
/// * `value` - Text to validate
/// * `field_name` - Name of the field for error messages
pub fn validate_text_field(value: &str, field_name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SlotwiseError::Validation(format!(
            "{} cannot be empty",
            field_name
        )));
    }

    if value.contains(['\n', '\r']) {
        return Err(SlotwiseError::Validation(format!(
            "{} cannot contain line breaks",
            field_name
        )));
    }

    Ok(())
}

/// Validate every model input of a slot or observation
pub fn validate_feature_vector(features: &FeatureVector) -> Result<()> {
    validate_day_of_week(features.day_of_week)?;
    validate_hour_of_day(features.hour_of_day)?;

    if features.duration == 0 {
        return Err(SlotwiseError::Validation(
            "duration must be positive".to_string(),
        ));
    }

    if features.participant_count == 0 {
        return Err(SlotwiseError::Validation(
            "participantCount must be positive".to_string(),
        ));
    }

    validate_text_field(&features.meeting_type, "meetingType")
}

/// Validate a rating label
pub fn validate_rating(rating: f64) -> Result<()> {
    if !rating.is_finite() {
        return Err(SlotwiseError::Validation(format!(
            "rating must be a finite number: {}",
            rating
        )));
    }
    Ok(())
}

/// Validate a full preference record before it is appended
pub fn validate_observation(observation: &Observation) -> Result<()> {
    validate_text_field(&observation.user_id, "userId")?;
    validate_feature_vector(&observation.features)?;
    validate_rating(observation.rating)
}
