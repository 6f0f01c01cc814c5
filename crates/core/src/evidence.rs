//! Evidence normalisation.
//!
//! Turns the loosely-typed request mapping (symptom key -> `{present, ...answers}`) into a
//! validated [`EvidenceSet`] keyed by catalog identifier. Answers that do not fit their question
//! are dropped with a warning; unknown symptoms reject the request.

use crate::catalog::{FollowUpQuestion, QuestionKind, SymptomCatalog, SymptomDefinition};
use crate::error::{EvidenceWarning, InvalidFollowUpAnswer, UnknownSymptomError};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Key of the presence flag inside an evidence entry.
const PRESENT_KEY: &str = "present";

/// A validated follow-up answer.
#[derive(Clone, Debug, PartialEq)]
pub enum AnswerValue {
    /// Canonical option of an `enum` question.
    Choice(String),
    /// Value of a `range` or `number` question, within its declared bounds.
    Numeric(f64),
}

/// One symptom reported by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct EvidenceItem {
    pub symptom: String,
    pub present: bool,
    /// Answers keyed by follow-up question key.
    pub answers: BTreeMap<String, AnswerValue>,
}

impl EvidenceItem {
    pub fn present(symptom: &str) -> Self {
        Self {
            symptom: symptom.to_string(),
            present: true,
            answers: BTreeMap::new(),
        }
    }

    pub fn absent(symptom: &str) -> Self {
        Self {
            present: false,
            ..Self::present(symptom)
        }
    }

    pub fn with_answer(mut self, key: &str, value: AnswerValue) -> Self {
        self.answers.insert(key.to_string(), value);
        self
    }
}

/// Validated evidence for one query, keyed by catalog symptom identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvidenceSet {
    items: BTreeMap<String, EvidenceItem>,
}

impl EvidenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, replacing any earlier item for the same symptom.
    pub fn insert(&mut self, item: EvidenceItem) -> Option<EvidenceItem> {
        self.items.insert(item.symptom.clone(), item)
    }

    pub fn get(&self, symptom: &str) -> Option<&EvidenceItem> {
        self.items.get(symptom)
    }

    /// Items marked present, in symptom identifier order.
    pub fn present(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.items.values().filter(|i| i.present)
    }

    /// Items marked absent, in symptom identifier order.
    pub fn absent(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.items.values().filter(|i| !i.present)
    }

    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<EvidenceItem> for EvidenceSet {
    fn from_iter<I: IntoIterator<Item = EvidenceItem>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

/// Result of normalising a request's evidence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedEvidence {
    pub evidence: EvidenceSet,
    pub warnings: Vec<EvidenceWarning>,
    /// Canonical identifiers of every mentioned symptom, in request order.
    pub input_symptoms: Vec<String>,
}

/// Validate raw request evidence against the catalog.
///
/// Entries may be a boolean (`"fever": true`) or an object whose optional `present` flag defaults
/// to `true` and whose remaining keys are follow-up answers. `null` answers count as not supplied.
/// When two keys name the same symptom the later one wins.
///
/// # Errors
///
/// Returns [`UnknownSymptomError`] listing every key that is not in the catalog.
pub fn normalize(
    catalog: &SymptomCatalog,
    raw: &Map<String, Value>,
) -> Result<NormalizedEvidence, UnknownSymptomError> {
    let unknown: BTreeSet<&str> = raw
        .keys()
        .filter(|key| catalog.lookup(key).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(UnknownSymptomError {
            keys: unknown.into_iter().map(str::to_string).collect(),
        });
    }

    let mut out = NormalizedEvidence::default();
    let mut seen_as: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for (key, value) in raw {
        let Some(symptom) = catalog.lookup(key) else {
            continue;
        };
        let spellings = seen_as.entry(symptom.id.as_str()).or_default();
        spellings.push(key.clone());
        if spellings.len() == 1 {
            out.input_symptoms.push(symptom.id.clone());
        }

        let item = match value {
            Value::Bool(present) => EvidenceItem {
                present: *present,
                ..EvidenceItem::present(&symptom.id)
            },
            Value::Object(fields) => item_from_object(symptom, fields, &mut out.warnings),
            other => {
                out.warnings.push(EvidenceWarning::MalformedEntry {
                    symptom: symptom.id.clone(),
                    found: json_kind(other),
                });
                EvidenceItem::present(&symptom.id)
            }
        };
        out.evidence.insert(item);
    }

    for (symptom, keys) in seen_as {
        if keys.len() > 1 {
            out.warnings.push(EvidenceWarning::DuplicateSymptom {
                symptom: symptom.to_string(),
                keys,
            });
        }
    }

    for warning in &out.warnings {
        tracing::debug!(%warning, "evidence normalised with warning");
    }

    Ok(out)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn item_from_object(
    symptom: &SymptomDefinition,
    fields: &Map<String, Value>,
    warnings: &mut Vec<EvidenceWarning>,
) -> EvidenceItem {
    let present = match fields.get(PRESENT_KEY) {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            warnings.push(EvidenceWarning::PresentFlagNotBoolean {
                symptom: symptom.id.clone(),
            });
            true
        }
    };

    let mut item = EvidenceItem {
        present,
        ..EvidenceItem::present(&symptom.id)
    };

    for (key, value) in fields {
        if key == PRESENT_KEY || value.is_null() {
            continue;
        }
        let Some(question) = symptom.follow_up(key) else {
            warnings.push(
                InvalidFollowUpAnswer::UnknownQuestion {
                    symptom: symptom.id.clone(),
                    key: key.clone(),
                }
                .into(),
            );
            continue;
        };
        match validate_answer(&symptom.id, question, value) {
            Ok(answer) => {
                item.answers.insert(question.key.clone(), answer);
            }
            Err(err) => warnings.push(err.into()),
        }
    }

    item
}

/// Validate one answer against its question definition.
pub fn validate_answer(
    symptom: &str,
    question: &FollowUpQuestion,
    value: &Value,
) -> Result<AnswerValue, InvalidFollowUpAnswer> {
    let shown = || match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    match &question.kind {
        QuestionKind::Enum { .. } => {
            let text = match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            };
            text.and_then(|t| question.kind.canonical_option(&t).map(str::to_string))
                .map(AnswerValue::Choice)
                .ok_or_else(|| InvalidFollowUpAnswer::NotAnOption {
                    symptom: symptom.to_string(),
                    key: question.key.clone(),
                    value: shown(),
                })
        }
        QuestionKind::Range { min, max } | QuestionKind::Number { min, max } => {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(|| InvalidFollowUpAnswer::NotNumeric {
                symptom: symptom.to_string(),
                key: question.key.clone(),
                value: shown(),
            })?;

            let below = min.is_some_and(|lo| number < lo);
            let above = max.is_some_and(|hi| number > hi);
            if below || above {
                return Err(InvalidFollowUpAnswer::OutOfBounds {
                    symptom: symptom.to_string(),
                    key: question.key.clone(),
                    value: number,
                    min: *min,
                    max: *max,
                });
            }
            Ok(AnswerValue::Numeric(number))
        }
    }
}
