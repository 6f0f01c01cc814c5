//! Query service.
//!
//! [`DiagnosisService`] owns the loaded dataset and is the only entry point the REST layer and the
//! CLI use. It is immutable after construction and is shared across request handlers behind an
//! `Arc`.

use crate::catalog::{SymptomCatalog, SymptomDefinition};
use crate::config::{DdxConfig, QueryDefaults};
use crate::constants::DEFAULT_SEARCH_LIMIT;
use crate::dataset::{self, Dataset};
use crate::error::EvidenceWarning;
use crate::evidence::normalize;
use crate::knowledge::{DiseaseProfile, KnowledgeBase};
use crate::scoring::{DiagnosisResult, DiagnosisSummary, ScoringEngine, ScoringParams};
use crate::validation::{clamp_min_confidence, clamp_search_limit, clamp_top_n};
use crate::DdxResult;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Per-query options. Absent values fall back to the configured defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QueryOptions {
    pub top_n: Option<i64>,
    pub min_confidence: Option<f64>,
}

/// Ranked diagnoses for one query.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnoseOutcome {
    /// Canonical identifiers of every symptom the caller mentioned, in request order.
    pub input_symptoms: Vec<String>,
    pub diagnoses: Vec<DiagnosisResult>,
    pub warnings: Vec<EvidenceWarning>,
    /// Number of symptoms reported present.
    pub present_count: usize,
    /// Effective options after defaults and clamping.
    pub top_n: usize,
    pub min_confidence: f64,
}

impl DiagnoseOutcome {
    pub fn diagnosis_count(&self) -> usize {
        self.diagnoses.len()
    }

    /// Score and match-count projection of each diagnosis.
    pub fn summaries(&self) -> Vec<DiagnosisSummary> {
        self.diagnoses
            .iter()
            .map(|d| d.summary(self.present_count))
            .collect()
    }
}

/// The loaded dataset plus query defaults.
#[derive(Clone, Debug)]
pub struct DiagnosisService {
    catalog: SymptomCatalog,
    knowledge: KnowledgeBase,
    defaults: QueryDefaults,
    params: ScoringParams,
    loaded_at: DateTime<Utc>,
}

impl DiagnosisService {
    pub fn new(dataset: Dataset, defaults: QueryDefaults, params: ScoringParams) -> Self {
        Self {
            catalog: dataset.catalog,
            knowledge: dataset.knowledge,
            defaults,
            params,
            loaded_at: Utc::now(),
        }
    }

    /// Load the dataset named by `config`.
    ///
    /// # Errors
    ///
    /// Returns `DdxError::Dataset` if the dataset cannot be loaded.
    pub fn load(config: &DdxConfig) -> DdxResult<Self> {
        let dataset = dataset::load(config.profiles_path(), config.symptom_library_path())?;
        Ok(Self::new(
            dataset,
            config.query_defaults(),
            config.scoring().clone(),
        ))
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn defaults(&self) -> QueryDefaults {
        self.defaults
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Rank candidate diagnoses for raw request evidence.
    ///
    /// Empty evidence, or evidence with nothing marked present, yields an empty ranking.
    ///
    /// # Errors
    ///
    /// Returns a [`DdxError`](crate::DdxError) if:
    /// - the evidence names unknown symptoms (`DdxError::UnknownSymptom`),
    /// - a score cannot be computed (`DdxError::Scoring`).
    pub fn diagnose(
        &self,
        raw: &Map<String, Value>,
        options: QueryOptions,
    ) -> DdxResult<DiagnoseOutcome> {
        let top_n = clamp_top_n(options.top_n, self.defaults.top_n);
        let min_confidence =
            clamp_min_confidence(options.min_confidence, self.defaults.min_confidence);

        let normalized = normalize(&self.catalog, raw)?;
        let present_count = normalized.evidence.present_count();

        let diagnoses = if present_count == 0 {
            Vec::new()
        } else {
            let engine = ScoringEngine::new(&self.catalog, &self.knowledge, &self.params);
            let mut ranked = engine.rank(&normalized.evidence)?;
            ranked.retain(|d| d.confidence >= min_confidence);
            ranked.truncate(top_n);
            ranked
        };

        tracing::debug!(
            symptoms = normalized.input_symptoms.len(),
            present = present_count,
            diagnoses = diagnoses.len(),
            warnings = normalized.warnings.len(),
            "diagnose query served"
        );

        Ok(DiagnoseOutcome {
            input_symptoms: normalized.input_symptoms,
            diagnoses,
            warnings: normalized.warnings,
            present_count,
            top_n,
            min_confidence,
        })
    }

    /// Autocomplete over symptom display names.
    pub fn search_symptoms(&self, query: &str, limit: Option<usize>) -> Vec<&SymptomDefinition> {
        self.catalog
            .search(query, clamp_search_limit(limit, DEFAULT_SEARCH_LIMIT))
    }

    pub fn symptom(&self, id_or_name: &str) -> Option<&SymptomDefinition> {
        self.catalog.lookup(id_or_name)
    }

    /// Diseases ordered by common name, optionally restricted to one category (case-insensitive).
    pub fn diseases(&self, category: Option<&str>) -> Vec<&DiseaseProfile> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let mut diseases: Vec<&DiseaseProfile> = self
            .knowledge
            .diseases()
            .iter()
            .filter(|d| category.map_or(true, |c| d.category.eq_ignore_ascii_case(c)))
            .collect();
        diseases.sort_by(|a, b| {
            a.common_name
                .to_lowercase()
                .cmp(&b.common_name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        diseases
    }

    pub fn categories(&self) -> Vec<&str> {
        self.knowledge.categories().into_iter().collect()
    }

    /// Find a disease by identifier, exact first and then case-insensitive.
    pub fn disease(&self, id: &str) -> Option<&DiseaseProfile> {
        self.knowledge.find(id)
    }
}
