//! In-memory knowledge base.
//!
//! Diseases live in a flat arena and are addressed by [`DiseaseIdx`]. The inverted index maps a
//! symptom identifier to postings that carry the disease index and the association role, so a
//! query only touches diseases that share evidence with it.

use crate::catalog::SymptomCatalog;
use crate::error::{DatasetError, DatasetResult};
use ddx_types::{lookup_key, Fraction};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Index of a disease in the knowledge base arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiseaseIdx(usize);


/// How a symptom relates to a disease.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssociationRole {
    /// Presence of the symptom supports the disease.
    #[default]
    Indicating,
    /// Absence of the symptom supports the disease.
    Contraindicating,
}

/// The disease's typical presentation for one follow-up question.
#[derive(Clone, Debug, PartialEq)]
pub enum Expectation {
    /// Any of these option values is typical.
    OneOf(Vec<String>),
    /// Values in `lo..=hi` are typical. A single expected value has `lo == hi`.
    Between { lo: f64, hi: f64 },
}

/// One (disease, symptom) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct SymptomAssociation {
    pub symptom: String,
    /// How diagnostic this symptom is for the disease.
    pub importance: Fraction,
    /// Share of patients with the disease who present the symptom.
    pub frequency: Fraction,
    pub role: AssociationRole,
    /// Typical follow-up answers, keyed by follow-up question key.
    pub expectations: BTreeMap<String, Expectation>,
    /// Optional wording used when the association produces a negative match.
    pub note: Option<String>,
}

impl SymptomAssociation {
    /// An indicating association with no follow-up expectations.
    pub fn indicating(symptom: &str, importance: Fraction, frequency: Fraction) -> Self {
        Self {
            symptom: symptom.to_string(),
            importance,
            frequency,
            role: AssociationRole::Indicating,
            expectations: BTreeMap::new(),
            note: None,
        }
    }

    /// `importance × frequency`, the weight a confirmed match contributes.
    pub fn weight(&self) -> f64 {
        self.importance.get() * self.frequency.get()
    }
}

/// A disease and its symptom associations.
#[derive(Clone, Debug, PartialEq)]
pub struct DiseaseProfile {
    pub id: String,
    pub common_name: String,
    pub category: String,
    /// Number of documented cases behind this profile.
    pub case_count: u32,
    associations: Vec<SymptomAssociation>,
    slots: HashMap<String, usize>,
    max_score: f64,
}

impl DiseaseProfile {
    /// Create a disease profile.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if:
    /// - the same symptom is listed twice,
    /// - the importances sum to zero (the disease could never be scored).
    pub fn new(
        id: String,
        common_name: String,
        category: String,
        case_count: u32,
        associations: Vec<SymptomAssociation>,
    ) -> DatasetResult<Self> {
        let mut slots = HashMap::with_capacity(associations.len());
        for (slot, association) in associations.iter().enumerate() {
            if slots.insert(association.symptom.clone(), slot).is_some() {
                return Err(DatasetError::DuplicateAssociation {
                    disease: id,
                    symptom: association.symptom.clone(),
                });
            }
        }

        let max_score: f64 = associations.iter().map(|a| a.importance.get()).sum();
        if max_score <= 0.0 {
            return Err(DatasetError::UnweightedDisease(id));
        }

        Ok(Self {
            id,
            common_name,
            category,
            case_count,
            associations,
            slots,
            max_score,
        })
    }

    pub fn associations(&self) -> &[SymptomAssociation] {
        &self.associations
    }

    /// The association for `symptom`, if the disease lists it.
    pub fn association(&self, symptom: &str) -> Option<&SymptomAssociation> {
        self.slots.get(symptom).map(|&slot| &self.associations[slot])
    }

    /// Frequency of an indicating association, zero when the disease does not list the symptom.
    pub fn indicating_frequency(&self, symptom: &str) -> f64 {
        match self.association(symptom) {
            Some(a) if a.role == AssociationRole::Indicating => a.frequency.get(),
            _ => 0.0,
        }
    }

    /// Sum of importances over every association: the theoretical best score.
    pub fn max_score(&self) -> f64 {
        self.max_score
    }
}

/// A symptom's entry in the inverted index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Posting {
    pub disease: DiseaseIdx,
    pub role: AssociationRole,
}

/// Immutable disease knowledge base with an inverted symptom index.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    diseases: Vec<DiseaseProfile>,
    by_id: HashMap<String, DiseaseIdx>,
    postings: HashMap<String, Vec<Posting>>,
    max_case_count: u32,
}

impl KnowledgeBase {
    /// Build the knowledge base and its inverted index.
    ///
    /// Every association must name a symptom known to `catalog`, and every expectation must name
    /// one of that symptom's follow-up questions.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if:
    /// - `diseases` is empty,
    /// - two diseases share an identifier,
    /// - an association references an unknown symptom or follow-up question,
    /// - an expectation does not fit its question's kind.
    pub fn build(diseases: Vec<DiseaseProfile>, catalog: &SymptomCatalog) -> DatasetResult<Self> {
        if diseases.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut by_id = HashMap::with_capacity(diseases.len());
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();

        for (idx, disease) in diseases.iter().enumerate() {
            let disease_idx = DiseaseIdx(idx);
            if by_id.insert(disease.id.clone(), disease_idx).is_some() {
                return Err(DatasetError::DuplicateDisease(disease.id.clone()));
            }

            for association in &disease.associations {
                let symptom = catalog.get(&association.symptom).ok_or_else(|| {
                    DatasetError::UnknownSymptom {
                        disease: disease.id.clone(),
                        symptom: association.symptom.clone(),
                    }
                })?;

                for (key, expectation) in &association.expectations {
                    let invalid = |reason: String| DatasetError::InvalidExpectation {
                        disease: disease.id.clone(),
                        symptom: association.symptom.clone(),
                        reason,
                    };
                    let question = symptom
                        .follow_up(key)
                        .ok_or_else(|| invalid(format!("no follow-up question named {key:?}")))?;
                    match (expectation, question.kind.bounds()) {
                        (Expectation::OneOf(values), None) => {
                            if let Some(bad) = values
                                .iter()
                                .find(|v| question.kind.canonical_option(v).is_none())
                            {
                                return Err(invalid(format!(
                                    "{bad:?} is not an option of {key:?}"
                                )));
                            }
                        }
                        (Expectation::Between { .. }, Some(_)) => {}
                        _ => {
                            return Err(invalid(format!(
                                "expectation for {key:?} does not match its {} question",
                                question.kind.name()
                            )))
                        }
                    }
                }

                postings
                    .entry(association.symptom.clone())
                    .or_default()
                    .push(Posting {
                        disease: disease_idx,
                        role: association.role,
                    });
            }
        }

        let max_case_count = diseases.iter().map(|d| d.case_count).max().unwrap_or(0);

        tracing::debug!(
            diseases = diseases.len(),
            indexed_symptoms = postings.len(),
            "knowledge base index built"
        );

        Ok(Self {
            diseases,
            by_id,
            postings,
            max_case_count,
        })
    }

    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    pub fn diseases(&self) -> &[DiseaseProfile] {
        &self.diseases
    }

    pub fn disease(&self, idx: DiseaseIdx) -> &DiseaseProfile {
        &self.diseases[idx.0]
    }

    /// Find a disease by identifier (exact first, then case-insensitive).
    pub fn find(&self, id: &str) -> Option<&DiseaseProfile> {
        if let Some(&idx) = self.by_id.get(id) {
            return Some(self.disease(idx));
        }
        let wanted = lookup_key(id);
        self.diseases.iter().find(|d| lookup_key(&d.id) == wanted)
    }

    /// Postings for `symptom`; empty when no disease lists it.
    pub fn postings(&self, symptom: &str) -> &[Posting] {
        self.postings.get(symptom).map_or(&[], Vec::as_slice)
    }

    /// Largest case count of any disease, used to normalise the case-count prior.
    pub fn max_case_count(&self) -> u32 {
        self.max_case_count
    }

    /// Sorted, de-duplicated disease categories.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.diseases.iter().map(|d| d.category.as_str()).collect()
    }
}
