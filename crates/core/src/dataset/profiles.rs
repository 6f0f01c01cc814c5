//! Disease profile file (JSON or YAML).

use super::{parse_wire, DatasetFormat};
use crate::catalog::humanize;
use crate::constants::DEFAULT_CATEGORY;
use crate::error::{DatasetError, DatasetResult};
use crate::knowledge::{AssociationRole, DiseaseProfile, Expectation, SymptomAssociation};
use ddx_types::{Fraction, NonEmptyText};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Parse a disease profile document into domain profiles.
///
/// A negative `importance` is accepted as shorthand for a contraindicating association with the
/// absolute weight.
///
/// # Errors
///
/// Returns `DatasetError::Schema` if the document does not match the profile schema, including
/// weights outside `0..=1` and malformed expectation values.
pub fn parse_profiles(text: &str, format: DatasetFormat) -> DatasetResult<Vec<DiseaseProfile>> {
    let wire: ProfilesWire = parse_wire(text, format, "disease profiles")?;

    wire.diseases
        .into_iter()
        .enumerate()
        .map(|(i, disease)| disease_from_wire(i, disease))
        .collect()
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfilesWire {
    diseases: Vec<DiseaseWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DiseaseWire {
    id: NonEmptyText,
    #[serde(default)]
    common_name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    case_count: u32,
    symptoms: Vec<AssociationWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AssociationWire {
    symptom: NonEmptyText,
    importance: f64,
    #[serde(default = "full_frequency")]
    frequency: f64,
    #[serde(default)]
    role: Option<RoleWire>,
    #[serde(default)]
    expectations: BTreeMap<String, ExpectationWire>,
    #[serde(default)]
    note: Option<String>,
}

fn full_frequency() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RoleWire {
    Indicating,
    Contraindicating,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpectationWire {
    Number(f64),
    Text(String),
    List(Vec<ScalarWire>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScalarWire {
    Number(f64),
    Text(String),
}

// ============================================================================
// Wire -> domain
// ============================================================================

fn disease_from_wire(index: usize, wire: DiseaseWire) -> DatasetResult<DiseaseProfile> {
    let associations = wire
        .symptoms
        .into_iter()
        .enumerate()
        .map(|(j, association)| {
            association_from_wire(&format!("diseases[{index}].symptoms[{j}]"), association)
        })
        .collect::<DatasetResult<Vec<_>>>()?;

    let id = wire.id.into_string();
    let common_name = wire
        .common_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| humanize(&id));
    let category = wire
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    DiseaseProfile::new(id, common_name, category, wire.case_count, associations)
}

fn association_from_wire(path: &str, wire: AssociationWire) -> DatasetResult<SymptomAssociation> {
    let schema = |field: &str, message: String| DatasetError::Schema {
        file: "disease profiles",
        path: format!("{path}.{field}"),
        message,
    };

    let (importance, role) = match (wire.role, wire.importance) {
        (Some(RoleWire::Indicating), imp) if imp < 0.0 => {
            return Err(schema(
                "importance",
                "negative importance conflicts with role \"indicating\"".into(),
            ))
        }
        (Some(RoleWire::Indicating), imp) => (imp, AssociationRole::Indicating),
        (Some(RoleWire::Contraindicating), imp) => (imp.abs(), AssociationRole::Contraindicating),
        (None, imp) if imp < 0.0 => (-imp, AssociationRole::Contraindicating),
        (None, imp) => (imp, AssociationRole::Indicating),
    };

    let importance =
        Fraction::new(importance).map_err(|e| schema("importance", e.to_string()))?;
    let frequency =
        Fraction::new(wire.frequency).map_err(|e| schema("frequency", e.to_string()))?;

    let expectations = wire
        .expectations
        .into_iter()
        .map(|(key, value)| {
            let expectation = expectation_from_wire(value)
                .map_err(|message| schema(&format!("expectations.{key}"), message))?;
            Ok((key, expectation))
        })
        .collect::<DatasetResult<BTreeMap<_, _>>>()?;

    Ok(SymptomAssociation {
        symptom: wire.symptom.into_string(),
        importance,
        frequency,
        role,
        expectations,
        note: wire.note.filter(|n| !n.trim().is_empty()),
    })
}

fn expectation_from_wire(wire: ExpectationWire) -> Result<Expectation, String> {
    match wire {
        ExpectationWire::Number(v) if v.is_finite() => Ok(Expectation::Between { lo: v, hi: v }),
        ExpectationWire::Number(_) => Err("expected value must be finite".into()),
        ExpectationWire::Text(t) => Ok(Expectation::OneOf(vec![t])),
        ExpectationWire::List(items) => {
            if items.is_empty() {
                return Err("expected values cannot be empty".into());
            }
            let numbers: Vec<f64> = items
                .iter()
                .filter_map(|i| match i {
                    ScalarWire::Number(n) => Some(*n),
                    ScalarWire::Text(_) => None,
                })
                .collect();

            if numbers.is_empty() {
                let options = items
                    .into_iter()
                    .filter_map(|i| match i {
                        ScalarWire::Text(t) => Some(t),
                        ScalarWire::Number(_) => None,
                    })
                    .collect();
                return Ok(Expectation::OneOf(options));
            }

            match numbers.as_slice() {
                [lo, hi] if numbers.len() == items.len() && lo.is_finite() && hi.is_finite() => {
                    if lo > hi {
                        Err(format!("range [{lo}, {hi}] has min greater than max"))
                    } else {
                        Ok(Expectation::Between { lo: *lo, hi: *hi })
                    }
                }
                _ => Err("numeric expectations must be a single number or a [min, max] pair".into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_json(text: &str) -> DatasetResult<Vec<DiseaseProfile>> {
        parse_profiles(text, DatasetFormat::Json)
    }

    #[test]
    fn parses_expectation_shapes() {
        let diseases = parse_json(
            r#"{"diseases": [{"id": "flu", "symptoms": [
                {"symptom": "fever", "importance": 0.9, "frequency": 0.9,
                 "expectations": {"intensity": [6, 10], "onset": ["sudden"],
                                  "temperature_c": 39, "pattern": "constant"}}]}]}"#,
        )
        .expect("profiles should parse");

        let fever = diseases[0].association("fever").expect("fever association");
        assert_eq!(
            fever.expectations["intensity"],
            Expectation::Between { lo: 6.0, hi: 10.0 }
        );
        assert_eq!(
            fever.expectations["onset"],
            Expectation::OneOf(vec!["sudden".into()])
        );
        assert_eq!(
            fever.expectations["temperature_c"],
            Expectation::Between { lo: 39.0, hi: 39.0 }
        );
        assert_eq!(
            fever.expectations["pattern"],
            Expectation::OneOf(vec!["constant".into()])
        );
    }

    #[test]
    fn defaults_missing_fields() {
        let diseases = parse_json(
            r#"{"diseases": [{"id": "acute_bronchitis", "symptoms": [
                {"symptom": "cough", "importance": 0.8}]}]}"#,
        )
        .expect("profiles should parse");

        let disease = &diseases[0];
        assert_eq!(disease.common_name, "Acute bronchitis");
        assert_eq!(disease.category, DEFAULT_CATEGORY);
        assert_eq!(disease.case_count, 0);
        assert_eq!(disease.associations()[0].frequency, Fraction::ONE);
        assert_eq!(disease.associations()[0].role, AssociationRole::Indicating);
    }

    #[test]
    fn negative_importance_means_contraindicating() {
        let diseases = parse_json(
            r#"{"diseases": [{"id": "flu", "symptoms": [
                {"symptom": "fever", "importance": 0.9},
                {"symptom": "rash", "importance": -0.3, "frequency": 0.1}]}]}"#,
        )
        .expect("profiles should parse");

        let rash = diseases[0].association("rash").expect("rash association");
        assert_eq!(rash.role, AssociationRole::Contraindicating);
        assert!((rash.importance.get() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range_weights() {
        let err = parse_json(
            r#"{"diseases": [{"id": "flu", "symptoms": [
                {"symptom": "fever", "importance": 0.9, "frequency": 1.5}]}]}"#,
        )
        .expect_err("frequency above 1");
        assert!(matches!(
            err,
            DatasetError::Schema { path, .. } if path == "diseases[0].symptoms[0].frequency"
        ));
    }

    #[test]
    fn rejects_malformed_ranges() {
        let err = parse_json(
            r#"{"diseases": [{"id": "flu", "symptoms": [
                {"symptom": "fever", "importance": 0.9,
                 "expectations": {"intensity": [10, 2]}}]}]}"#,
        )
        .expect_err("inverted range");
        assert!(matches!(
            err,
            DatasetError::Schema { path, .. } if path == "diseases[0].symptoms[0].expectations.intensity"
        ));

        assert!(parse_json(
            r#"{"diseases": [{"id": "flu", "symptoms": [
                {"symptom": "fever", "importance": 0.9,
                 "expectations": {"intensity": [1, 2, 3]}}]}]}"#,
        )
        .is_err());
    }

    #[test]
    fn rejects_unknown_fields_and_blank_ids() {
        assert!(parse_json(r#"{"diseases": [{"id": "flu", "symptoms": [], "prevalence": 0.1}]}"#)
            .is_err());
        assert!(parse_json(r#"{"diseases": [{"id": "  ", "symptoms": []}]}"#).is_err());
    }
}
