use std::path::PathBuf;

/// Errors raised while loading the reference dataset.
///
/// Every variant is startup-fatal: the process must refuse to serve traffic rather than answer
/// queries from a partially loaded knowledge base.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}", path = .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported dataset format for {path} (expected .json, .yaml, .yml or .csv)", path = .path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("{file} schema mismatch at {path}: {message}")]
    Schema {
        file: &'static str,
        path: String,
        message: String,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(String),
    #[error("row {row}: expected {expected} columns, found {found}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}, column {column:?}: {value:?} is not a 0/1 value")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },
    #[error("duplicate disease identifier: {0}")]
    DuplicateDisease(String),
    #[error("disease {disease} lists symptom {symptom} more than once")]
    DuplicateAssociation { disease: String, symptom: String },
    #[error("disease {0} has no symptom associations with a positive importance")]
    UnweightedDisease(String),
    #[error("duplicate symptom identifier: {0}")]
    DuplicateSymptom(String),
    #[error("symptom name {name:?} is ambiguous between {first} and {second}")]
    AmbiguousSymptomName {
        name: String,
        first: String,
        second: String,
    },
    #[error("symptom {symptom} declares follow-up question {key} more than once")]
    DuplicateFollowUp { symptom: String, key: String },
    #[error("symptom {symptom} references undefined global follow-up question {key}")]
    UnknownGlobalFollowUp { symptom: String, key: String },
    #[error("invalid follow-up question {key}: {reason}")]
    InvalidFollowUp { key: String, reason: String },
    #[error("disease {disease} references symptom {symptom} which is not in the symptom catalog")]
    UnknownSymptom { disease: String, symptom: String },
    #[error("disease {disease}, symptom {symptom}: {reason}")]
    InvalidExpectation {
        disease: String,
        symptom: String,
        reason: String,
    },
    #[error("dataset contains no diseases")]
    Empty,
}

pub type DatasetResult<T> = std::result::Result<T, DatasetError>;

/// The caller referenced symptoms that are not in the catalog.
///
/// The whole request is rejected: scoring against evidence the engine cannot interpret would
/// produce a misleading ranking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown symptom(s): {}", .keys.join(", "))]
pub struct UnknownSymptomError {
    /// Offending input keys, sorted and de-duplicated.
    pub keys: Vec<String>,
}

/// A follow-up answer that failed validation against its question definition.
///
/// These never fail a request: the answer is dropped and the symptom is still scored on presence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidFollowUpAnswer {
    #[error("{symptom}: no follow-up question named {key:?}")]
    UnknownQuestion { symptom: String, key: String },
    #[error("{symptom}.{key}: {value:?} is not one of the allowed options")]
    NotAnOption {
        symptom: String,
        key: String,
        value: String,
    },
    #[error("{symptom}.{key}: {value:?} is not a number")]
    NotNumeric {
        symptom: String,
        key: String,
        value: String,
    },
    #[error("{symptom}.{key}: {value} is outside the allowed range {}", format_bounds(.min, .max))]
    OutOfBounds {
        symptom: String,
        key: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
}

fn format_bounds(min: &Option<f64>, max: &Option<f64>) -> String {
    match (*min, *max) {
        (Some(lo), Some(hi)) => format!("[{lo}, {hi}]"),
        (Some(lo), None) => format!(">= {lo}"),
        (None, Some(hi)) => format!("<= {hi}"),
        (None, None) => "(unbounded)".into(),
    }
}

/// Non-fatal findings collected while normalising a request's evidence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvidenceWarning {
    #[error("dropped answer: {0}")]
    InvalidAnswer(#[from] InvalidFollowUpAnswer),
    #[error("{symptom}: 'present' must be a boolean; treating the symptom as present")]
    PresentFlagNotBoolean { symptom: String },
    #[error("{symptom}: expected an object or boolean, got {found}; treated as present")]
    MalformedEntry {
        symptom: String,
        /// JSON type of the offending value (`null`, `number`, `string` or `array`).
        found: &'static str,
    },
    #[error("{symptom}: reported more than once (as {}); the last entry wins", .keys.join(", "))]
    DuplicateSymptom { symptom: String, keys: Vec<String> },
}

/// Top-level error for the query service and startup.
#[derive(Debug, thiserror::Error)]
pub enum DdxError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    UnknownSymptom(#[from] UnknownSymptomError),
    #[error("internal scoring fault: {0}")]
    Scoring(String),
}

pub type DdxResult<T> = std::result::Result<T, DdxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_symptom_error_lists_every_key() {
        let err = UnknownSymptomError {
            keys: vec!["abc".into(), "xyz_not_real".into()],
        };
        assert_eq!(err.to_string(), "unknown symptom(s): abc, xyz_not_real");
    }

    #[test]
    fn out_of_bounds_message_shows_range() {
        let err = InvalidFollowUpAnswer::OutOfBounds {
            symptom: "fever".into(),
            key: "intensity".into(),
            value: 14.0,
            min: Some(1.0),
            max: Some(10.0),
        };
        assert_eq!(
            err.to_string(),
            "fever.intensity: 14 is outside the allowed range [1, 10]"
        );
    }

    #[test]
    fn warnings_wrap_invalid_answers() {
        let warning: EvidenceWarning = InvalidFollowUpAnswer::NotAnOption {
            symptom: "cough".into(),
            key: "cough_type".into(),
            value: "barking".into(),
        }
        .into();
        assert!(warning.to_string().starts_with("dropped answer: cough.cough_type"));
    }
}
