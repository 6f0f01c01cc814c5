//! # DDX Core
//!
//! Core logic for the differential diagnosis engine.
//!
//! This crate loads the reference dataset and answers ranking queries:
//! - Dataset loading (JSON/YAML disease profiles, one-hot CSV case matrices, symptom library)
//! - Symptom catalog with lookup and autocomplete search
//! - Evidence normalisation and follow-up answer validation
//! - Candidate scoring, ranking and explanation
//!
//! **No API concerns**: HTTP servers, wire formats and CLI parsing belong in `api-rest`,
//! `api-shared` and `cli`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod evidence;
pub mod explanation;
pub mod knowledge;
pub mod scoring;
pub mod service;
pub mod validation;

pub use catalog::{FollowUpQuestion, QuestionKind, SymptomCatalog, SymptomDefinition};
pub use config::{DdxConfig, EnvValues, QueryDefaults};
pub use ddx_types::{Fraction, NonEmptyText};
pub use error::{
    DatasetError, DatasetResult, DdxError, DdxResult, EvidenceWarning, InvalidFollowUpAnswer,
    UnknownSymptomError,
};
pub use evidence::{AnswerValue, EvidenceItem, EvidenceSet, NormalizedEvidence};
pub use knowledge::{
    AssociationRole, DiseaseIdx, DiseaseProfile, Expectation, KnowledgeBase, SymptomAssociation,
};
pub use scoring::{
    DiagnosisResult, DiagnosisSummary, MatchedSymptom, MissingSymptom, NegativeMatch,
    NegativeReason, ScoringEngine, ScoringParams,
};
pub use service::{DiagnoseOutcome, DiagnosisService, QueryOptions};
