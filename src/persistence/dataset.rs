//! Append-only preference dataset stored as comma-delimited text.
//!
//! The first line is a header. Columns are located by name, so files written
//! by other tools with a different column order still load. Fields that
//! contain commas or quotes are double-quoted with `""` escapes.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{FeatureVector, Observation, DATASET_COLUMNS, RATING_COLUMN};
use crate::error::{Result, SlotwiseError};
use crate::validation::{validate_feature_vector, validate_rating};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read every observation, in file order.
    pub fn load(&self) -> Result<Vec<Observation>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SlotwiseError::Dataset(format!(
                    "dataset not found: {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(SlotwiseError::Io(e)),
        };

        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let Some((_, header)) = lines.next() else {
            return Err(SlotwiseError::Dataset(format!(
                "dataset has no header: {}",
                self.path.display()
            )));
        };
        let columns = ColumnIndex::from_header(header)?;

        let mut observations = Vec::new();
        for (idx, line) in lines {
            let line_no = idx + 1;
            let fields = split_record(line)
                .map_err(|e| SlotwiseError::Dataset(format!("line {line_no}: {e}")))?;
            let observation = columns
                .observation(&fields)
                .map_err(|e| SlotwiseError::Dataset(format!("line {line_no}: {e}")))?;
            observations.push(observation);
        }

        debug!(
            "Loaded {} observations from {}",
            observations.len(),
            self.path.display()
        );
        Ok(observations)
    }

    /// Number of data rows (header and blank lines excluded). Zero if absent.
    pub fn row_count(&self) -> Result<usize> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(SlotwiseError::Io(e)),
        };
        let non_blank = content.lines().filter(|l| !l.trim().is_empty()).count();
        Ok(non_blank.saturating_sub(1))
    }

    /// Append one observation and return the resulting row count.
    ///
    /// The row follows the file's own header, so a file with reordered or
    /// extra columns stays loadable; a header lacking a required column is
    /// a `Dataset` error and nothing is written. A missing, empty or
    /// blank-only file gets the canonical header first. Existing rows are
    /// never rewritten; the new text goes out in a single write.
    pub fn append(&self, observation: &Observation) -> Result<usize> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SlotwiseError::write(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.write_err(e))?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        let mut body = String::new();
        if !content.is_empty() && !content.ends_with('\n') {
            body.push('\n');
        }

        let mut records = content.lines().filter(|l| !l.trim().is_empty());
        let rows_before = match records.next() {
            Some(header) => {
                let columns = ColumnIndex::from_header(header)?;
                body.push_str(&columns.format_record(observation));
                records.count()
            }
            None => {
                body.push_str(&DATASET_COLUMNS.join(","));
                body.push('\n');
                body.push_str(&ColumnIndex::canonical().format_record(observation));
                info!("Writing header to {}", self.path.display());
                0
            }
        };
        body.push('\n');

        file.write_all(body.as_bytes())
            .map_err(|e| self.write_err(e))?;
        Ok(rows_before + 1)
    }

    fn write_err(&self, e: std::io::Error) -> SlotwiseError {
        SlotwiseError::write(&self.path, e)
    }
}

/// Column positions resolved from the header line.
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
    width: usize,
}

impl ColumnIndex {
    fn from_header(header: &str) -> Result<Self> {
        let names = split_record(header.trim_start_matches('\u{feff}'))
            .map_err(|e| SlotwiseError::Dataset(format!("header: {e}")))?;

        let mut positions = HashMap::new();
        for column in DATASET_COLUMNS {
            let pos = names
                .iter()
                .position(|n| n.trim() == column)
                .ok_or_else(|| SlotwiseError::Dataset(format!("missing column: {column}")))?;
            positions.insert(column, pos);
        }
        Ok(Self {
            positions,
            width: names.len(),
        })
    }

    fn canonical() -> Self {
        Self {
            positions: DATASET_COLUMNS
                .iter()
                .enumerate()
                .map(|(pos, &column)| (column, pos))
                .collect(),
            width: DATASET_COLUMNS.len(),
        }
    }

    /// Lay out one row in this header's column order. Columns the
    /// observation has no value for are left empty.
    fn format_record(&self, o: &Observation) -> String {
        let mut cells = vec![String::new(); self.width];
        let values = [
            ("userId", quote_field(&o.user_id)),
            ("dayOfWeek", o.features.day_of_week.to_string()),
            ("hourOfDay", o.features.hour_of_day.to_string()),
            ("duration", o.features.duration.to_string()),
            ("participantCount", o.features.participant_count.to_string()),
            ("meetingType", quote_field(&o.features.meeting_type)),
            (RATING_COLUMN, o.rating.to_string()),
        ];
        for (column, value) in values {
            cells[self.positions[column]] = value;
        }
        cells.join(",")
    }

    fn field<'a>(&self, fields: &'a [String], column: &str) -> std::result::Result<&'a str, String> {
        let pos = self.positions[column];
        let value = fields
            .get(pos)
            .map(|f| f.trim())
            .unwrap_or_default();
        if value.is_empty() {
            return Err(format!("missing {column}"));
        }
        Ok(value)
    }

    fn observation(&self, fields: &[String]) -> std::result::Result<Observation, String> {
        let features = FeatureVector {
            day_of_week: parse_integral(self.field(fields, "dayOfWeek")?, "dayOfWeek")?,
            hour_of_day: parse_integral(self.field(fields, "hourOfDay")?, "hourOfDay")?,
            duration: parse_integral(self.field(fields, "duration")?, "duration")?,
            participant_count: parse_integral(
                self.field(fields, "participantCount")?,
                "participantCount",
            )?,
            meeting_type: self.field(fields, "meetingType")?.to_string(),
        };
        validate_feature_vector(&features).map_err(|e| e.to_string())?;

        let raw_rating = self.field(fields, RATING_COLUMN)?;
        let rating: f64 = raw_rating
            .parse()
            .map_err(|_| format!("rating is not a number: {raw_rating}"))?;
        validate_rating(rating).map_err(|e| e.to_string())?;

        Ok(Observation {
            user_id: self.field(fields, "userId")?.to_string(),
            features,
            rating,
        })
    }
}

/// Parse an integer cell, accepting `30.0` style values some tools emit.
fn parse_integral<T>(raw: &str, column: &str) -> std::result::Result<T, String>
where
    T: std::str::FromStr + TryFrom<u64>,
{
    if let Ok(v) = raw.parse::<T>() {
        return Ok(v);
    }
    let float: f64 = raw
        .parse()
        .map_err(|_| format!("{column} is not a number: {raw}"))?;
    if float.fract() != 0.0 || float < 0.0 || !float.is_finite() {
        return Err(format!("{column} must be a non-negative integer: {raw}"));
    }
    T::try_from(float as u64).map_err(|_| format!("{column} out of range: {raw}"))
}

/// Split one line into fields, honoring double quotes.
fn split_record(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(current);
    Ok(fields)
}

fn quote_field(value: &str) -> String {
    if value.contains([',', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
