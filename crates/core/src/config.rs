//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the query service.
//! Environment variables are never read during request handling; binaries collect the raw values
//! and hand them to [`DdxConfig::from_env_values`], which keeps the parsing testable without
//! mutating the process environment.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_MIN_CONFIDENCE, DEFAULT_PROFILES_FILENAME,
    DEFAULT_SYMPTOM_LIBRARY_FILENAME, DEFAULT_TOP_N, MAX_TOP_N,
};
use crate::scoring::ScoringParams;
use crate::{DdxError, DdxResult};
use std::path::{Path, PathBuf};

/// Defaults applied to queries that omit `top_n` or `min_confidence`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryDefaults {
    pub top_n: usize,
    pub min_confidence: f64,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

/// Raw, unparsed configuration values as read from the environment.
///
/// Field names map onto `DDX_DATA_DIR`, `DDX_PROFILES_FILE`, `DDX_SYMPTOM_LIBRARY_FILE`,
/// `DDX_DEFAULT_TOP_N` and `DDX_DEFAULT_MIN_CONFIDENCE`.
#[derive(Clone, Debug, Default)]
pub struct EnvValues {
    pub data_dir: Option<String>,
    pub profiles_file: Option<String>,
    pub symptom_library_file: Option<String>,
    pub default_top_n: Option<String>,
    pub default_min_confidence: Option<String>,
}

impl EnvValues {
    /// Collect the recognised `DDX_*` variables from the process environment.
    pub fn from_process_env() -> Self {
        Self {
            data_dir: std::env::var("DDX_DATA_DIR").ok(),
            profiles_file: std::env::var("DDX_PROFILES_FILE").ok(),
            symptom_library_file: std::env::var("DDX_SYMPTOM_LIBRARY_FILE").ok(),
            default_top_n: std::env::var("DDX_DEFAULT_TOP_N").ok(),
            default_min_confidence: std::env::var("DDX_DEFAULT_MIN_CONFIDENCE").ok(),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct DdxConfig {
    profiles_path: PathBuf,
    symptom_library_path: Option<PathBuf>,
    query_defaults: QueryDefaults,
    scoring: ScoringParams,
}

impl DdxConfig {
    /// Create a new `DdxConfig`.
    ///
    /// # Errors
    ///
    /// Returns `DdxError::InvalidInput` if the query defaults are out of range.
    pub fn new(
        profiles_path: PathBuf,
        symptom_library_path: Option<PathBuf>,
        query_defaults: QueryDefaults,
        scoring: ScoringParams,
    ) -> DdxResult<Self> {
        if query_defaults.top_n == 0 || query_defaults.top_n > MAX_TOP_N {
            return Err(DdxError::InvalidInput(format!(
                "default top_n must be between 1 and {MAX_TOP_N}"
            )));
        }
        if !(0.0..=100.0).contains(&query_defaults.min_confidence) {
            return Err(DdxError::InvalidInput(
                "default min_confidence must be between 0 and 100".into(),
            ));
        }

        Ok(Self {
            profiles_path,
            symptom_library_path,
            query_defaults,
            scoring,
        })
    }

    /// Build a configuration from raw environment values.
    ///
    /// The profile file is resolved inside the data directory (see [`resolve_data_dir`]). The
    /// symptom library is optional: an explicit empty value or `none` disables it, otherwise the
    /// default filename is used when present. Without a library the catalog is derived from the
    /// symptoms the profiles reference.
    ///
    /// # Errors
    ///
    /// Returns `DdxError::InvalidInput` if:
    /// - no data directory containing the profile file can be located,
    /// - an explicitly named symptom library does not exist,
    /// - a numeric default does not parse or is out of range.
    pub fn from_env_values(values: EnvValues) -> DdxResult<Self> {
        let profiles_file = non_blank(values.profiles_file)
            .unwrap_or_else(|| DEFAULT_PROFILES_FILENAME.to_string());
        let data_dir =
            resolve_data_dir(non_blank(values.data_dir).map(PathBuf::from), &profiles_file)?;
        let profiles_path = data_dir.join(&profiles_file);

        let symptom_library_path = match values.symptom_library_file.map(|v| v.trim().to_string()) {
            Some(v) if v.is_empty() || v.eq_ignore_ascii_case("none") => None,
            Some(v) => {
                let path = data_dir.join(v);
                if !path.is_file() {
                    return Err(DdxError::InvalidInput(format!(
                        "symptom library does not exist: {}",
                        path.display()
                    )));
                }
                Some(path)
            }
            None => {
                let path = data_dir.join(DEFAULT_SYMPTOM_LIBRARY_FILENAME);
                path.is_file().then_some(path)
            }
        };

        let defaults = QueryDefaults::default();
        let top_n = match non_blank(values.default_top_n) {
            Some(v) => v.parse::<usize>().map_err(|_| {
                DdxError::InvalidInput(format!("DDX_DEFAULT_TOP_N is not a positive integer: {v}"))
            })?,
            None => defaults.top_n,
        };
        let min_confidence = match non_blank(values.default_min_confidence) {
            Some(v) => v.parse::<f64>().map_err(|_| {
                DdxError::InvalidInput(format!("DDX_DEFAULT_MIN_CONFIDENCE is not a number: {v}"))
            })?,
            None => defaults.min_confidence,
        };

        Self::new(
            profiles_path,
            symptom_library_path,
            QueryDefaults {
                top_n,
                min_confidence,
            },
            ScoringParams::default(),
        )
    }

    pub fn profiles_path(&self) -> &Path {
        &self.profiles_path
    }

    pub fn symptom_library_path(&self) -> Option<&Path> {
        self.symptom_library_path.as_deref()
    }

    pub fn query_defaults(&self) -> QueryDefaults {
        self.query_defaults
    }

    pub fn scoring(&self) -> &ScoringParams {
        &self.scoring
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the dataset directory without reading environment variables.
///
/// If `override_dir` is provided it must be a directory containing `profiles_file`. Otherwise this
/// looks for `data/` relative to the current working directory and then walks up from
/// `CARGO_MANIFEST_DIR`.
pub fn resolve_data_dir(override_dir: Option<PathBuf>, profiles_file: &str) -> DdxResult<PathBuf> {
    let looks_like_data_dir = |path: &Path| path.join(profiles_file).is_file();

    if let Some(data_dir) = override_dir {
        if data_dir.is_dir() && looks_like_data_dir(&data_dir) {
            return Ok(data_dir);
        }
        return Err(DdxError::InvalidInput(format!(
            "DDX_DATA_DIR override is not a valid data directory (must contain {profiles_file})"
        )));
    }

    let cwd_relative = PathBuf::from(DEFAULT_DATA_DIR);
    if cwd_relative.is_dir() && looks_like_data_dir(&cwd_relative) {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(DEFAULT_DATA_DIR);
        if candidate.is_dir() && looks_like_data_dir(&candidate) {
            return Ok(candidate);
        }
    }

    Err(DdxError::InvalidInput(format!(
        "could not locate {DEFAULT_DATA_DIR}/ directory containing {profiles_file}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn data_dir_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for name in files {
            fs::write(dir.path().join(name), "{}").expect("write fixture");
        }
        dir
    }

    fn env_for(dir: &TempDir) -> EnvValues {
        EnvValues {
            data_dir: Some(dir.path().display().to_string()),
            ..EnvValues::default()
        }
    }

    #[test]
    fn from_env_values_uses_defaults() {
        let dir = data_dir_with(&[DEFAULT_PROFILES_FILENAME, DEFAULT_SYMPTOM_LIBRARY_FILENAME]);
        let cfg = DdxConfig::from_env_values(env_for(&dir)).expect("config should resolve");

        assert_eq!(cfg.profiles_path(), dir.path().join(DEFAULT_PROFILES_FILENAME));
        assert_eq!(
            cfg.symptom_library_path(),
            Some(dir.path().join(DEFAULT_SYMPTOM_LIBRARY_FILENAME).as_path())
        );
        assert_eq!(cfg.query_defaults(), QueryDefaults::default());
    }

    #[test]
    fn symptom_library_is_optional_when_absent() {
        let dir = data_dir_with(&["cases.csv"]);
        let values = EnvValues {
            profiles_file: Some("cases.csv".into()),
            ..env_for(&dir)
        };
        let cfg = DdxConfig::from_env_values(values).expect("config should resolve");
        assert_eq!(cfg.symptom_library_path(), None);
    }

    #[test]
    fn symptom_library_can_be_disabled_explicitly() {
        let dir = data_dir_with(&[DEFAULT_PROFILES_FILENAME, DEFAULT_SYMPTOM_LIBRARY_FILENAME]);
        let values = EnvValues {
            symptom_library_file: Some("none".into()),
            ..env_for(&dir)
        };
        let cfg = DdxConfig::from_env_values(values).expect("config should resolve");
        assert_eq!(cfg.symptom_library_path(), None);
    }

    #[test]
    fn missing_named_symptom_library_is_rejected() {
        let dir = data_dir_with(&[DEFAULT_PROFILES_FILENAME]);
        let values = EnvValues {
            symptom_library_file: Some("missing.json".into()),
            ..env_for(&dir)
        };
        let err = DdxConfig::from_env_values(values).expect_err("should reject");
        assert!(matches!(err, DdxError::InvalidInput(msg) if msg.contains("missing.json")));
    }

    #[test]
    fn parses_query_defaults() {
        let dir = data_dir_with(&[DEFAULT_PROFILES_FILENAME]);
        let values = EnvValues {
            default_top_n: Some("5".into()),
            default_min_confidence: Some(" 12.5 ".into()),
            ..env_for(&dir)
        };
        let cfg = DdxConfig::from_env_values(values).expect("config should resolve");
        assert_eq!(
            cfg.query_defaults(),
            QueryDefaults {
                top_n: 5,
                min_confidence: 12.5
            }
        );
    }

    #[test]
    fn rejects_unparseable_or_out_of_range_defaults() {
        let dir = data_dir_with(&[DEFAULT_PROFILES_FILENAME]);

        let values = EnvValues {
            default_top_n: Some("ten".into()),
            ..env_for(&dir)
        };
        assert!(DdxConfig::from_env_values(values).is_err());

        let values = EnvValues {
            default_top_n: Some("0".into()),
            ..env_for(&dir)
        };
        assert!(DdxConfig::from_env_values(values).is_err());

        let values = EnvValues {
            default_min_confidence: Some("150".into()),
            ..env_for(&dir)
        };
        assert!(DdxConfig::from_env_values(values).is_err());
    }

    #[test]
    fn override_must_contain_profiles_file() {
        let dir = data_dir_with(&[]);
        let err = resolve_data_dir(Some(dir.path().to_path_buf()), DEFAULT_PROFILES_FILENAME)
            .expect_err("should reject");
        assert!(matches!(err, DdxError::InvalidInput(msg) if msg.contains("DDX_DATA_DIR")));
    }

    #[test]
    fn finds_shipped_data_dir_from_manifest() {
        let dir = resolve_data_dir(None, DEFAULT_PROFILES_FILENAME)
            .expect("workspace data/ directory should be found");
        assert!(dir.join(DEFAULT_PROFILES_FILENAME).is_file());
    }
}
