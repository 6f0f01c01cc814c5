//! Constants used throughout the DDX core crate.
//!
//! File names, query defaults and clamping bounds live here so the REST layer, the CLI and the
//! tests all agree on them.

/// Directory searched for the reference dataset when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default filename for the disease profile dataset.
pub const DEFAULT_PROFILES_FILENAME: &str = "disease_profiles.json";

/// Default filename for the symptom library (catalog plus follow-up questions).
pub const DEFAULT_SYMPTOM_LIBRARY_FILENAME: &str = "symptom_library.json";

/// Required first column of a case-matrix CSV dataset.
pub const CASE_MATRIX_DISEASE_COLUMN: &str = "diseases";

/// Category assigned to diseases that do not declare one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Default number of diagnoses returned by a query.
pub const DEFAULT_TOP_N: usize = 10;

/// Upper bound applied to a caller-supplied `top_n`.
pub const MAX_TOP_N: usize = 50;

/// Default minimum confidence (0-100) for a diagnosis to be returned.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 5.0;

/// Default number of autocomplete suggestions returned by a symptom search.
pub const DEFAULT_SEARCH_LIMIT: usize = 8;

/// Upper bound applied to a caller-supplied search limit.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Case-matrix associations rarer than this are dropped during aggregation.
pub const CASE_MATRIX_MIN_FREQUENCY: f64 = 0.05;

/// Lowest importance a case-matrix association can be assigned.
pub const CASE_MATRIX_MIN_IMPORTANCE: f64 = 0.05;
