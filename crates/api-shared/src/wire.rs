//! Request and response types shared by the REST API and the CLI.
//!
//! Domain types from `ddx-core` stay free of serialisation concerns; everything that crosses a
//! process boundary is converted into one of these structs first. Weights and match qualities are
//! reported as whole percentages.

use ddx_core::{
    AssociationRole, DiagnoseOutcome, DiagnosisResult, DiagnosisSummary, DiseaseProfile,
    Expectation, FollowUpQuestion, MatchedSymptom, MissingSymptom, NegativeMatch, NegativeReason,
    QueryOptions, QuestionKind, SymptomAssociation, SymptomCatalog, SymptomDefinition,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;

// ============================================================================
// Symptoms
// ============================================================================

/// A follow-up question attached to a symptom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FollowUpQuestionRes {
    pub key: String,
    pub label: String,
    /// `enum`, `range` or `number`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl From<&FollowUpQuestion> for FollowUpQuestionRes {
    fn from(question: &FollowUpQuestion) -> Self {
        let (options, min, max) = match &question.kind {
            QuestionKind::Enum { options } => (Some(options.clone()), None, None),
            QuestionKind::Range { min, max } | QuestionKind::Number { min, max } => {
                (None, *min, *max)
            }
        };
        Self {
            key: question.key.clone(),
            label: question.label.clone(),
            kind: question.kind.name().to_string(),
            options,
            min,
            max,
        }
    }
}

/// A recognised symptom with its follow-up questions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Symptom {
    pub id: String,
    pub display_name: String,
    pub global_follow_ups: Vec<FollowUpQuestionRes>,
    pub unique_follow_ups: Vec<FollowUpQuestionRes>,
}

impl From<&SymptomDefinition> for Symptom {
    fn from(symptom: &SymptomDefinition) -> Self {
        Self {
            id: symptom.id.clone(),
            display_name: symptom.display_name.clone(),
            global_follow_ups: symptom.global_follow_ups.iter().map(Into::into).collect(),
            unique_follow_ups: symptom.unique_follow_ups.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListSymptomsRes {
    pub success: bool,
    pub count: usize,
    pub symptoms: Vec<Symptom>,
}

impl ListSymptomsRes {
    pub fn new<'a>(symptoms: impl IntoIterator<Item = &'a SymptomDefinition>) -> Self {
        let symptoms: Vec<Symptom> = symptoms.into_iter().map(Into::into).collect();
        Self {
            success: true,
            count: symptoms.len(),
            symptoms,
        }
    }
}

impl From<&SymptomCatalog> for ListSymptomsRes {
    fn from(catalog: &SymptomCatalog) -> Self {
        Self::new(catalog.list_all())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SymptomRes {
    pub success: bool,
    pub symptom: Symptom,
}

// ============================================================================
// Diseases
// ============================================================================

/// One row of the disease listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiseaseSummary {
    pub id: String,
    pub common_name: String,
    pub category: String,
    pub case_count: u32,
    pub symptom_count: usize,
    pub symptoms: Vec<String>,
}

impl From<&DiseaseProfile> for DiseaseSummary {
    fn from(disease: &DiseaseProfile) -> Self {
        Self {
            id: disease.id.clone(),
            common_name: disease.common_name.clone(),
            category: disease.category.clone(),
            case_count: disease.case_count,
            symptom_count: disease.associations().len(),
            symptoms: disease
                .associations()
                .iter()
                .map(|a| a.symptom.clone())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListDiseasesRes {
    pub success: bool,
    pub count: usize,
    /// Every category in the dataset, regardless of the filter applied.
    pub categories: Vec<String>,
    pub diseases: Vec<DiseaseSummary>,
}

/// Typical answer for one follow-up question: either a set of options or a numeric interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExpectedAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl From<&Expectation> for ExpectedAnswer {
    fn from(expectation: &Expectation) -> Self {
        match expectation {
            Expectation::OneOf(options) => Self {
                options: Some(options.clone()),
                min: None,
                max: None,
            },
            Expectation::Between { lo, hi } => Self {
                options: None,
                min: Some(*lo),
                max: Some(*hi),
            },
        }
    }
}

/// A disease's association with one symptom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssociationRes {
    pub symptom: String,
    /// Percentage, 0-100.
    pub importance: u32,
    /// Percentage, 0-100.
    pub frequency: u32,
    /// `indicating` or `contraindicating`.
    pub role: String,
    pub expectations: BTreeMap<String, ExpectedAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<&SymptomAssociation> for AssociationRes {
    fn from(association: &SymptomAssociation) -> Self {
        Self {
            symptom: association.symptom.clone(),
            importance: percent(association.importance.get()),
            frequency: percent(association.frequency.get()),
            role: role_name(association.role).to_string(),
            expectations: association
                .expectations
                .iter()
                .map(|(key, e)| (key.clone(), e.into()))
                .collect(),
            note: association.note.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Disease {
    pub id: String,
    pub common_name: String,
    pub category: String,
    pub case_count: u32,
    pub symptoms: Vec<AssociationRes>,
}

impl From<&DiseaseProfile> for Disease {
    fn from(disease: &DiseaseProfile) -> Self {
        Self {
            id: disease.id.clone(),
            common_name: disease.common_name.clone(),
            category: disease.category.clone(),
            case_count: disease.case_count,
            symptoms: disease.associations().iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiseaseRes {
    pub success: bool,
    pub disease: Disease,
}

// ============================================================================
// Diagnose
// ============================================================================

/// Query options. Numbers may arrive as integers, floats or numeric strings; anything else
/// falls back to the server default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseOptions {
    /// Maximum number of diagnoses, clamped to 1-50.
    #[serde(default, deserialize_with = "lenient_top_n")]
    pub top_n: Option<i64>,
    /// Minimum confidence (0-100) for a diagnosis to be returned.
    #[serde(default, deserialize_with = "lenient_number")]
    pub min_confidence: Option<f64>,
}

impl DiagnoseOptions {
    /// Options from raw text, as carried by a query string.
    pub fn from_text(top_n: Option<&str>, min_confidence: Option<&str>) -> Self {
        Self {
            top_n: top_n.and_then(parse_number).map(truncate_count),
            min_confidence: min_confidence.and_then(parse_number),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Whole part of a count; `as` saturates at the `i64` bounds.
fn truncate_count(value: f64) -> i64 {
    value.trunc() as i64
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_of))
}

fn lenient_top_n<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(truncate_count)),
        Some(other) => number_of(&other).map(truncate_count),
        None => None,
    })
}

impl From<DiagnoseOptions> for QueryOptions {
    fn from(options: DiagnoseOptions) -> Self {
        Self {
            top_n: options.top_n,
            min_confidence: options.min_confidence,
        }
    }
}

/// Body of `POST /api/diagnose` and `POST /api/diagnose/summary`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseReq {
    /// Symptom key -> `true`/`false`, or an object `{present, <follow-up key>: answer, ...}`.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub symptoms: Map<String, Value>,
    #[serde(default)]
    pub options: Option<DiagnoseOptions>,
}

impl DiagnoseReq {
    pub fn query_options(&self) -> QueryOptions {
        self.options.unwrap_or_default().into()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchedSymptomRes {
    pub symptom: String,
    pub display_name: String,
    /// Percentage, 0-100.
    pub match_quality: u32,
    /// Percentage, 0-100.
    pub importance: u32,
}

impl From<&MatchedSymptom> for MatchedSymptomRes {
    fn from(m: &MatchedSymptom) -> Self {
        Self {
            symptom: m.symptom.clone(),
            display_name: m.display_name.clone(),
            match_quality: percent(m.match_quality),
            importance: percent(m.importance),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MissingSymptomRes {
    pub symptom: String,
    pub display_name: String,
    /// Percentage, 0-100.
    pub importance: u32,
    /// Confidence points gained if the symptom were confirmed.
    pub potential_gain: f64,
}

impl From<&MissingSymptom> for MissingSymptomRes {
    fn from(m: &MissingSymptom) -> Self {
        Self {
            symptom: m.symptom.clone(),
            display_name: m.display_name.clone(),
            importance: percent(m.importance),
            potential_gain: m.potential_gain,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NegativeMatchRes {
    pub symptom: String,
    pub display_name: String,
    pub note: String,
    /// `contraindicating` or `discriminating`.
    pub reason: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub competitors: Vec<String>,
}

impl From<&NegativeMatch> for NegativeMatchRes {
    fn from(n: &NegativeMatch) -> Self {
        let (reason, competitors) = match &n.reason {
            NegativeReason::Contraindicating => ("contraindicating", Vec::new()),
            NegativeReason::Discriminating { competitors } => {
                ("discriminating", competitors.clone())
            }
        };
        Self {
            symptom: n.symptom.clone(),
            display_name: n.display_name.clone(),
            note: n.note.clone(),
            reason: reason.to_string(),
            competitors,
        }
    }
}

/// One ranked diagnosis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisRes {
    /// Disease identifier.
    pub disease: String,
    pub common_name: String,
    pub category: String,
    pub case_count: u32,
    /// 0-100, one decimal.
    pub confidence: f64,
    pub matched_symptoms: Vec<MatchedSymptomRes>,
    pub partially_matched: Vec<MatchedSymptomRes>,
    pub missing_symptoms: Vec<MissingSymptomRes>,
    pub negative_matches: Vec<NegativeMatchRes>,
    pub explanation: String,
}

impl From<&DiagnosisResult> for DiagnosisRes {
    fn from(d: &DiagnosisResult) -> Self {
        Self {
            disease: d.disease_id.clone(),
            common_name: d.common_name.clone(),
            category: d.category.clone(),
            case_count: d.case_count,
            confidence: d.confidence,
            matched_symptoms: d.matched.iter().map(Into::into).collect(),
            partially_matched: d.partial.iter().map(Into::into).collect(),
            missing_symptoms: d.missing.iter().map(Into::into).collect(),
            negative_matches: d.negative.iter().map(Into::into).collect(),
            explanation: d.explanation.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseRes {
    pub success: bool,
    pub input_symptoms: Vec<String>,
    pub diagnosis_count: usize,
    pub diagnoses: Vec<DiagnosisRes>,
    /// Non-fatal problems with the submitted evidence (dropped answers and the like).
    pub warnings: Vec<String>,
}

impl From<&DiagnoseOutcome> for DiagnoseRes {
    fn from(outcome: &DiagnoseOutcome) -> Self {
        Self {
            success: true,
            input_symptoms: outcome.input_symptoms.clone(),
            diagnosis_count: outcome.diagnosis_count(),
            diagnoses: outcome.diagnoses.iter().map(Into::into).collect(),
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Score-and-count projection of one diagnosis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisSummaryRes {
    /// Common name of the disease.
    pub disease: String,
    pub disease_id: String,
    pub score: f64,
    pub match_count: usize,
    pub total_symptom_count: usize,
    pub case_count: u32,
    pub match_percentage: f64,
}

impl From<DiagnosisSummary> for DiagnosisSummaryRes {
    fn from(s: DiagnosisSummary) -> Self {
        Self {
            disease: s.disease,
            disease_id: s.disease_id,
            score: s.score,
            match_count: s.match_count,
            total_symptom_count: s.total_symptom_count,
            case_count: s.case_count,
            match_percentage: s.match_percentage,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseSummaryRes {
    pub success: bool,
    pub input_symptoms: Vec<String>,
    pub diagnosis_count: usize,
    pub diagnoses: Vec<DiagnosisSummaryRes>,
    pub warnings: Vec<String>,
}

impl From<&DiagnoseOutcome> for DiagnoseSummaryRes {
    fn from(outcome: &DiagnoseOutcome) -> Self {
        Self {
            success: true,
            input_symptoms: outcome.input_symptoms.clone(),
            diagnosis_count: outcome.diagnosis_count(),
            diagnoses: outcome.summaries().into_iter().map(Into::into).collect(),
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

// ============================================================================
// Health and errors
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub status: String,
    pub message: String,
    pub diseases: usize,
    pub symptoms: usize,
    /// RFC 3339 timestamp of when the dataset was loaded.
    pub loaded_at: String,
}

/// Body of every error response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_symptoms: Vec<String>,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            unknown_symptoms: Vec::new(),
        }
    }
}

fn percent(fraction: f64) -> u32 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn role_name(role: AssociationRole) -> &'static str {
    match role {
        AssociationRole::Indicating => "indicating",
        AssociationRole::Contraindicating => "contraindicating",
    }
}
