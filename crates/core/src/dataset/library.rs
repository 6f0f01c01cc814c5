//! Symptom library file (JSON or YAML).
//!
//! Global follow-up questions are declared once at the top of the document and referenced by key
//! from each symptom; unique follow-ups are declared inline.

use super::{parse_wire, DatasetFormat};
use crate::catalog::{humanize, FollowUpQuestion, QuestionKind, SymptomCatalog, SymptomDefinition};
use crate::error::{DatasetError, DatasetResult};
use ddx_types::NonEmptyText;
use serde::Deserialize;
use std::collections::HashMap;

/// Parse a symptom library document into a [`SymptomCatalog`].
///
/// # Errors
///
/// Returns a [`DatasetError`] if the document does not match the schema, a symptom references an
/// undefined global question, or the catalog itself is inconsistent (see [`SymptomCatalog::new`]).
pub fn parse_symptom_library(text: &str, format: DatasetFormat) -> DatasetResult<SymptomCatalog> {
    let wire: LibraryWire = parse_wire(text, format, "symptom library")?;

    let mut globals = HashMap::with_capacity(wire.global_follow_ups.len());
    for question in wire.global_follow_ups {
        let question = question_from_wire(question)?;
        if globals.contains_key(&question.key) {
            return Err(DatasetError::InvalidFollowUp {
                key: question.key,
                reason: "global follow-up question is declared twice".into(),
            });
        }
        globals.insert(question.key.clone(), question);
    }

    let symptoms = wire
        .symptoms
        .into_iter()
        .map(|symptom| {
            let id = symptom.id.into_string();
            let display_name = symptom
                .display_name
                .map(NonEmptyText::into_string)
                .unwrap_or_else(|| humanize(&id));

            let global_follow_ups = symptom
                .global_follow_ups
                .into_iter()
                .map(|key| {
                    globals
                        .get(&key)
                        .cloned()
                        .ok_or_else(|| DatasetError::UnknownGlobalFollowUp {
                            symptom: id.clone(),
                            key,
                        })
                })
                .collect::<DatasetResult<Vec<_>>>()?;
            let unique_follow_ups = symptom
                .unique_follow_ups
                .into_iter()
                .map(question_from_wire)
                .collect::<DatasetResult<Vec<_>>>()?;

            SymptomDefinition::new(id, display_name, global_follow_ups, unique_follow_ups)
        })
        .collect::<DatasetResult<Vec<_>>>()?;

    SymptomCatalog::new(symptoms)
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LibraryWire {
    #[serde(default)]
    global_follow_ups: Vec<QuestionWire>,
    symptoms: Vec<SymptomWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymptomWire {
    id: NonEmptyText,
    #[serde(default)]
    display_name: Option<NonEmptyText>,
    #[serde(default)]
    global_follow_ups: Vec<String>,
    #[serde(default)]
    unique_follow_ups: Vec<QuestionWire>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct QuestionWire {
    key: NonEmptyText,
    #[serde(default)]
    label: String,
    #[serde(rename = "type")]
    kind: KindWire,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindWire {
    Enum,
    Range,
    Number,
}

fn question_from_wire(wire: QuestionWire) -> DatasetResult<FollowUpQuestion> {
    let key = wire.key.into_string();
    let kind = match wire.kind {
        KindWire::Enum => {
            if wire.min.is_some() || wire.max.is_some() {
                return Err(DatasetError::InvalidFollowUp {
                    key,
                    reason: "enum question cannot declare numeric bounds".into(),
                });
            }
            QuestionKind::Enum {
                options: wire.options.unwrap_or_default(),
            }
        }
        KindWire::Range | KindWire::Number if wire.options.is_some() => {
            return Err(DatasetError::InvalidFollowUp {
                key,
                reason: "numeric question cannot declare options".into(),
            })
        }
        KindWire::Range => QuestionKind::Range {
            min: wire.min,
            max: wire.max,
        },
        KindWire::Number => QuestionKind::Number {
            min: wire.min,
            max: wire.max,
        },
    };

    FollowUpQuestion::new(key, wire.label, kind)
}
