//! Dataset loading.
//!
//! A dataset is a disease profile file (JSON, YAML or a one-hot CSV case matrix) plus an optional
//! symptom library describing display names and follow-up questions. Loading either succeeds
//! completely or fails with a [`DatasetError`]; there is no partially loaded state.

mod case_matrix;
mod library;
mod profiles;

use crate::catalog::SymptomCatalog;
use crate::error::{DatasetError, DatasetResult};
use crate::knowledge::KnowledgeBase;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub use case_matrix::{parse_case_matrix, CaseMatrix};
pub use library::parse_symptom_library;
pub use profiles::parse_profiles;

/// Serialisation format of a dataset file, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    Yaml,
    Csv,
}

impl DatasetFormat {
    /// Determine the format from a file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::UnsupportedFormat` for any other extension.
    pub fn from_path(path: &Path) -> DatasetResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("csv") => Ok(Self::Csv),
            _ => Err(DatasetError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A fully loaded dataset.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub catalog: SymptomCatalog,
    pub knowledge: KnowledgeBase,
}

/// Load the disease profiles and, if given, the symptom library.
///
/// Without a library the catalog is derived from the symptoms the profiles reference, with
/// display names generated from the identifiers and no follow-up questions.
///
/// # Errors
///
/// Returns a [`DatasetError`] if either file cannot be read or parsed, or if the two files are
/// inconsistent (see [`KnowledgeBase::build`]).
pub fn load(profiles_path: &Path, library_path: Option<&Path>) -> DatasetResult<Dataset> {
    let profiles_format = DatasetFormat::from_path(profiles_path)?;
    let profiles_text = read_text(profiles_path)?;
    let (diseases, header_symptoms) = match profiles_format {
        DatasetFormat::Csv => {
            let matrix = parse_case_matrix(&profiles_text)?;
            (matrix.diseases, Some(matrix.symptoms))
        }
        format => (parse_profiles(&profiles_text, format)?, None),
    };

    let catalog = match library_path {
        Some(path) => {
            let format = DatasetFormat::from_path(path)?;
            if format == DatasetFormat::Csv {
                return Err(DatasetError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
            parse_symptom_library(&read_text(path)?, format)?
        }
        None => match &header_symptoms {
            Some(symptoms) => {
                SymptomCatalog::from_symptom_ids(symptoms.iter().map(String::as_str))?
            }
            None => SymptomCatalog::from_symptom_ids(
                diseases
                    .iter()
                    .flat_map(|d| d.associations())
                    .map(|a| a.symptom.as_str()),
            )?,
        },
    };

    let knowledge = KnowledgeBase::build(diseases, &catalog)?;

    let library =
        library_path.map_or_else(|| "<derived>".to_string(), |p| p.display().to_string());
    tracing::info!(
        profiles = %profiles_path.display(),
        library = %library,
        diseases = knowledge.len(),
        symptoms = catalog.len(),
        "dataset loaded"
    );

    Ok(Dataset { catalog, knowledge })
}

fn read_text(path: &Path) -> DatasetResult<String> {
    fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize JSON or YAML text into a wire type, reporting the failing field path.
pub(crate) fn parse_wire<T: DeserializeOwned>(
    text: &str,
    format: DatasetFormat,
    file: &'static str,
) -> DatasetResult<T> {
    let result = match format {
        DatasetFormat::Json => {
            let mut deserializer = serde_json::Deserializer::from_str(text);
            serde_path_to_error::deserialize::<_, T>(&mut deserializer)
                .map_err(|err| (err.path().to_string(), err.into_inner().to_string()))
                .and_then(|value| {
                    // only whitespace may follow the document
                    deserializer
                        .end()
                        .map(|()| value)
                        .map_err(|err| (String::new(), err.to_string()))
                })
        }
        DatasetFormat::Yaml => {
            let deserializer = serde_yaml::Deserializer::from_str(text);
            serde_path_to_error::deserialize::<_, T>(deserializer)
                .map_err(|err| (err.path().to_string(), err.into_inner().to_string()))
        }
        DatasetFormat::Csv => {
            return Err(DatasetError::Schema {
                file,
                path: "<root>".into(),
                message: "CSV is only supported for case-matrix profiles".into(),
            })
        }
    };

    result.map_err(|(path, message)| DatasetError::Schema {
        file,
        path: if path.is_empty() || path == "." {
            "<root>".into()
        } else {
            path
        },
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROFILES: &str = r#"{
        "diseases": [
            {"id": "flu", "common_name": "Influenza", "category": "Infectious", "case_count": 50,
             "symptoms": [
                {"symptom": "fever", "importance": 0.9, "frequency": 0.9,
                 "expectations": {"intensity": [6, 10]}},
                {"symptom": "cough", "importance": 0.6, "frequency": 0.8}
             ]},
            {"id": "cold", "common_name": "Common cold", "case_count": 80,
             "symptoms": [{"symptom": "cough", "importance": 0.5, "frequency": 0.7}]}
        ]
    }"#;

    const LIBRARY: &str = r#"{
        "global_follow_ups": [
            {"key": "intensity", "label": "Intensity", "type": "range", "min": 1, "max": 10}
        ],
        "symptoms": [
            {"id": "fever", "display_name": "Fever", "global_follow_ups": ["intensity"]},
            {"id": "cough", "display_name": "Cough"}
        ]
    }"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("a/b.JSON")).unwrap(),
            DatasetFormat::Json
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("b.yml")).unwrap(),
            DatasetFormat::Yaml
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("b.csv")).unwrap(),
            DatasetFormat::Csv
        );
        assert!(matches!(
            DatasetFormat::from_path(Path::new("b.txt")),
            Err(DatasetError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn loads_profiles_with_library() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let profiles = write(&dir, "profiles.json", PROFILES);
        let library = write(&dir, "library.json", LIBRARY);

        let dataset = load(&profiles, Some(library.as_path())).expect("dataset should load");
        assert_eq!(dataset.knowledge.len(), 2);
        assert_eq!(dataset.catalog.len(), 2);
        assert_eq!(dataset.knowledge.max_case_count(), 80);
        assert_eq!(dataset.knowledge.postings("cough").len(), 2);
        assert!(dataset.catalog.get("fever").unwrap().follow_up("intensity").is_some());
    }

    #[test]
    fn derives_catalog_without_library() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let profiles = write(
            &dir,
            "profiles.json",
            r#"{"diseases": [{"id": "cold", "symptoms": [
                {"symptom": "runny_nose", "importance": 0.5, "frequency": 0.7}]}]}"#,
        );

        let dataset = load(&profiles, None).expect("dataset should load");
        let symptom = dataset.catalog.get("runny_nose").expect("derived symptom");
        assert_eq!(symptom.display_name, "Runny nose");
        assert_eq!(dataset.knowledge.diseases()[0].common_name, "Cold");
    }

    #[test]
    fn library_must_cover_profile_symptoms() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let profiles = write(&dir, "profiles.json", PROFILES);
        let library = write(
            &dir,
            "library.json",
            r#"{"symptoms": [{"id": "fever", "display_name": "Fever"}]}"#,
        );

        let err =
            load(&profiles, Some(library.as_path())).expect_err("cough is not in the library");
        assert!(matches!(err, DatasetError::UnknownSymptom { symptom, .. } if symptom == "cough"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let err = load(&dir.path().join("absent.json"), None).expect_err("missing file");
        assert!(matches!(err, DatasetError::Read { .. }));
    }

    #[test]
    fn schema_errors_report_field_path() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let profiles = write(
            &dir,
            "profiles.json",
            r#"{"diseases": [{"id": "flu", "symptoms": [
                {"symptom": "fever", "importance": "high"}]}]}"#,
        );

        let err = load(&profiles, None).expect_err("importance must be numeric");
        match err {
            DatasetError::Schema { path, .. } => {
                assert_eq!(path, "diseases[0].symptoms[0].importance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_content_after_json_is_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let profiles = write(&dir, "profiles.json", &format!("{PROFILES} {{\"diseases\": []}}"));

        let err = load(&profiles, None).expect_err("trailing document must fail");
        match err {
            DatasetError::Schema { file, path, message } => {
                assert_eq!(file, "disease profiles");
                assert_eq!(path, "<root>");
                assert!(message.contains("trailing characters"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }

        let profiles = write(&dir, "padded.json", &format!("\n{PROFILES}\n\n"));
        load(&profiles, None).expect("surrounding whitespace is fine");
    }

    #[test]
    fn loads_case_matrix_with_header_catalog() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let profiles = write(
            &dir,
            "cases.csv",
            "diseases,fever,rash\nflu,1,0\nflu,1,0\nmeasles,1,1\n",
        );

        let dataset = load(&profiles, None).expect("csv dataset should load");
        assert_eq!(dataset.knowledge.len(), 2);
        assert_eq!(dataset.catalog.len(), 2);
        assert_eq!(dataset.knowledge.find("flu").unwrap().case_count, 2);
    }

    #[test]
    fn loads_yaml_profiles() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let profiles = write(
            &dir,
            "profiles.yaml",
            "diseases:\n  - id: flu\n    symptoms:\n      - symptom: fever\n        \
             importance: 0.9\n        frequency: 0.9\n",
        );

        let dataset = load(&profiles, None).expect("yaml dataset should load");
        assert_eq!(dataset.knowledge.len(), 1);
    }
}
