//! One-hot CSV case matrix.
//!
//! Each row is one documented case: the first column names the disease and every other column is a
//! symptom flagged `0` or `1`. Rows are aggregated per disease into profiles:
//!
//! - `case_count` is the number of rows,
//! - `frequency` is the share of those rows showing the symptom,
//! - `importance` is the symptom's specificity across diseases, `1 - ln(k) / ln(N + 1)` where `k`
//!   diseases show the symptom out of `N`.

use crate::catalog::humanize;
use crate::constants::{
    CASE_MATRIX_DISEASE_COLUMN, CASE_MATRIX_MIN_FREQUENCY, CASE_MATRIX_MIN_IMPORTANCE,
    DEFAULT_CATEGORY,
};
use crate::error::{DatasetError, DatasetResult};
use crate::knowledge::{DiseaseProfile, SymptomAssociation};
use ddx_types::{lookup_key, Fraction};
use std::collections::{HashMap, HashSet};

/// Profiles aggregated from a case matrix, plus every symptom named in its header.
#[derive(Clone, Debug)]
pub struct CaseMatrix {
    pub diseases: Vec<DiseaseProfile>,
    pub symptoms: Vec<String>,
}

struct DiseaseTally {
    id: String,
    rows: u32,
    hits: Vec<u32>,
}

/// Aggregate a case matrix into disease profiles.
///
/// Diseases whose cases show no symptom often enough to keep are skipped with a warning.
///
/// # Errors
///
/// Returns a [`DatasetError`] if:
/// - the first column is not the disease column,
/// - two columns name the same symptom,
/// - a row has the wrong number of cells or a cell is not `0`/`1`,
/// - the matrix has no rows.
pub fn parse_case_matrix(text: &str) -> DatasetResult<CaseMatrix> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    match headers.get(0) {
        Some(first) if first.eq_ignore_ascii_case(CASE_MATRIX_DISEASE_COLUMN) => {}
        _ => {
            return Err(DatasetError::MissingColumn(
                CASE_MATRIX_DISEASE_COLUMN.to_string(),
            ))
        }
    }

    let mut symptoms = Vec::with_capacity(headers.len().saturating_sub(1));
    let mut seen = HashSet::new();
    for column in headers.iter().skip(1) {
        let id = snake_id(column);
        if id.is_empty() {
            return Err(DatasetError::MissingColumn(format!(
                "symptom name for column {}",
                symptoms.len() + 2
            )));
        }
        if !seen.insert(id.clone()) {
            return Err(DatasetError::DuplicateSymptom(id));
        }
        symptoms.push(id);
    }

    let mut tallies: Vec<DiseaseTally> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for record in reader.records() {
        let record = record?;
        let row = record.position().map_or(0, |p| p.line() as usize);
        if record.len() != headers.len() {
            return Err(DatasetError::RowLength {
                row,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let disease = snake_id(record.get(0).unwrap_or_default());
        if disease.is_empty() {
            return Err(DatasetError::NonNumeric {
                row,
                column: CASE_MATRIX_DISEASE_COLUMN.to_string(),
                value: String::new(),
            });
        }

        let slot = *by_id.entry(disease.clone()).or_insert_with(|| {
            tallies.push(DiseaseTally {
                id: disease,
                rows: 0,
                hits: vec![0; symptoms.len()],
            });
            tallies.len() - 1
        });
        let tally = &mut tallies[slot];
        tally.rows += 1;

        for (col, cell) in record.iter().skip(1).enumerate() {
            match cell {
                "0" => {}
                "1" => tally.hits[col] += 1,
                other => {
                    return Err(DatasetError::NonNumeric {
                        row,
                        column: symptoms[col].clone(),
                        value: other.to_string(),
                    })
                }
            }
        }
    }

    if tallies.is_empty() {
        return Err(DatasetError::Empty);
    }

    let disease_count = tallies.len() as f64;
    let importances: Vec<f64> = (0..symptoms.len())
        .map(|col| {
            let k = tallies.iter().filter(|t| t.hits[col] > 0).count() as f64;
            specificity(k, disease_count)
        })
        .collect();

    let mut profiles = Vec::with_capacity(tallies.len());
    for tally in tallies {
        let associations: Vec<SymptomAssociation> = tally
            .hits
            .iter()
            .enumerate()
            .filter_map(|(col, &hits)| {
                let frequency = f64::from(hits) / f64::from(tally.rows);
                (frequency >= CASE_MATRIX_MIN_FREQUENCY).then(|| {
                    SymptomAssociation::indicating(
                        &symptoms[col],
                        Fraction::saturating(importances[col]),
                        Fraction::saturating(frequency),
                    )
                })
            })
            .collect();

        if associations.is_empty() {
            tracing::warn!(
                disease = %tally.id,
                cases = tally.rows,
                "skipping disease with no recurring symptoms"
            );
            continue;
        }

        let common_name = humanize(&tally.id);
        profiles.push(DiseaseProfile::new(
            tally.id,
            common_name,
            DEFAULT_CATEGORY.to_string(),
            tally.rows,
            associations,
        )?);
    }

    if profiles.is_empty() {
        return Err(DatasetError::Empty);
    }

    Ok(CaseMatrix {
        diseases: profiles,
        symptoms,
    })
}

/// `1 - ln(k) / ln(n + 1)`, floored so that ubiquitous symptoms still carry some weight.
fn specificity(k: f64, n: f64) -> f64 {
    if k <= 1.0 {
        return 1.0;
    }
    (1.0 - k.ln() / (n + 1.0).ln()).max(CASE_MATRIX_MIN_IMPORTANCE)
}

/// `"Anxiety and nervousness"` -> `"anxiety_and_nervousness"`.
fn snake_id(name: &str) -> String {
    lookup_key(name).replace(' ', "_")
}
