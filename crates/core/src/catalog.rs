//! Symptom catalog.
//!
//! The canonical list of recognised symptoms together with their follow-up question
//! definitions. Built once at startup; every lookup afterwards is read-only.

use crate::error::{DatasetError, DatasetResult};
use ddx_types::lookup_key;
use std::collections::{HashMap, HashSet};

/// Kind-specific constraints of a follow-up question.
#[derive(Clone, Debug, PartialEq)]
pub enum QuestionKind {
    /// Categorical answer drawn from an ordered set of options.
    Enum { options: Vec<String> },
    /// Bounded scale, e.g. a 1-10 intensity rating.
    Range { min: Option<f64>, max: Option<f64> },
    /// Free numeric value, e.g. a temperature or a duration in days.
    Number { min: Option<f64>, max: Option<f64> },
}

impl QuestionKind {
    /// Wire name of the kind (`enum`, `range`, `number`).
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Enum { .. } => "enum",
            QuestionKind::Range { .. } => "range",
            QuestionKind::Number { .. } => "number",
        }
    }

    /// Numeric bounds, or `None` for categorical questions.
    pub fn bounds(&self) -> Option<(Option<f64>, Option<f64>)> {
        match self {
            QuestionKind::Enum { .. } => None,
            QuestionKind::Range { min, max } | QuestionKind::Number { min, max } => {
                Some((*min, *max))
            }
        }
    }

    /// Width of the declared numeric interval when both bounds are known.
    pub fn span(&self) -> Option<f64> {
        match self.bounds() {
            Some((Some(lo), Some(hi))) if hi > lo => Some(hi - lo),
            _ => None,
        }
    }

    /// Returns the declared option matching `value` case-insensitively.
    pub fn canonical_option(&self, value: &str) -> Option<&str> {
        match self {
            QuestionKind::Enum { options } => {
                let wanted = lookup_key(value);
                options
                    .iter()
                    .find(|o| o.as_str() == value || lookup_key(o) == wanted)
                    .map(String::as_str)
            }
            _ => None,
        }
    }
}

/// A structured sub-question attached to a symptom.
#[derive(Clone, Debug, PartialEq)]
pub struct FollowUpQuestion {
    pub key: String,
    pub label: String,
    pub kind: QuestionKind,
}

impl FollowUpQuestion {
    /// Create a validated follow-up question.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::InvalidFollowUp` if:
    /// - the key is blank,
    /// - an `enum` question declares no options or repeats one,
    /// - numeric bounds are not finite or `min > max`.
    pub fn new(key: String, label: String, kind: QuestionKind) -> DatasetResult<Self> {
        let invalid = |reason: &str| DatasetError::InvalidFollowUp {
            key: key.clone(),
            reason: reason.to_string(),
        };

        if key.trim().is_empty() {
            return Err(invalid("key cannot be empty"));
        }

        match &kind {
            QuestionKind::Enum { options } => {
                if options.is_empty() {
                    return Err(invalid("enum question must declare at least one option"));
                }
                let mut seen = HashSet::new();
                for option in options {
                    if !seen.insert(lookup_key(option)) {
                        return Err(invalid(&format!("option {option:?} is declared twice")));
                    }
                }
            }
            QuestionKind::Range { min, max } | QuestionKind::Number { min, max } => {
                if min.is_some_and(|v| !v.is_finite()) || max.is_some_and(|v| !v.is_finite()) {
                    return Err(invalid("bounds must be finite numbers"));
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(invalid("min must not exceed max"));
                    }
                }
            }
        }

        let label = if label.trim().is_empty() {
            key.clone()
        } else {
            label
        };

        Ok(Self { key, label, kind })
    }
}

/// One recognised symptom and its follow-up questions.
#[derive(Clone, Debug, PartialEq)]
pub struct SymptomDefinition {
    pub id: String,
    pub display_name: String,
    /// Questions shared across symptoms (onset, intensity, ...).
    pub global_follow_ups: Vec<FollowUpQuestion>,
    /// Questions specific to this symptom.
    pub unique_follow_ups: Vec<FollowUpQuestion>,
}

impl SymptomDefinition {
    /// Create a symptom definition, checking follow-up keys are unique across both lists.
    pub fn new(
        id: String,
        display_name: String,
        global_follow_ups: Vec<FollowUpQuestion>,
        unique_follow_ups: Vec<FollowUpQuestion>,
    ) -> DatasetResult<Self> {
        let mut seen = HashSet::new();
        for question in global_follow_ups.iter().chain(&unique_follow_ups) {
            if !seen.insert(lookup_key(&question.key)) {
                return Err(DatasetError::DuplicateFollowUp {
                    symptom: id,
                    key: question.key.clone(),
                });
            }
        }

        Ok(Self {
            id,
            display_name,
            global_follow_ups,
            unique_follow_ups,
        })
    }

    /// A symptom with no follow-up questions and a display name derived from its identifier.
    pub fn plain(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: humanize(id),
            global_follow_ups: Vec::new(),
            unique_follow_ups: Vec::new(),
        }
    }

    /// All follow-up questions, global first.
    pub fn follow_ups(&self) -> impl Iterator<Item = &FollowUpQuestion> {
        self.global_follow_ups.iter().chain(&self.unique_follow_ups)
    }

    /// Find a follow-up question by key (exact first, then case-insensitive).
    pub fn follow_up(&self, key: &str) -> Option<&FollowUpQuestion> {
        self.follow_ups().find(|q| q.key == key).or_else(|| {
            let wanted = lookup_key(key);
            self.follow_ups().find(|q| lookup_key(&q.key) == wanted)
        })
    }
}

/// `"sore_throat"` -> `"Sore throat"`.
pub(crate) fn humanize(id: &str) -> String {
    let words = lookup_key(id);
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => id.to_string(),
    }
}

/// The canonical, immutable symptom catalog.
#[derive(Clone, Debug, Default)]
pub struct SymptomCatalog {
    symptoms: Vec<SymptomDefinition>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl SymptomCatalog {
    /// Build a catalog, ordering symptoms by display name.
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] if:
    /// - two symptoms share an identifier,
    /// - an identifier or display name of one symptom collides (case-insensitively) with another.
    pub fn new(mut symptoms: Vec<SymptomDefinition>) -> DatasetResult<Self> {
        symptoms.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut by_id = HashMap::with_capacity(symptoms.len());
        let mut by_name: HashMap<String, usize> = HashMap::with_capacity(symptoms.len() * 2);

        for (idx, symptom) in symptoms.iter().enumerate() {
            if by_id.insert(symptom.id.clone(), idx).is_some() {
                return Err(DatasetError::DuplicateSymptom(symptom.id.clone()));
            }
            for name in [&symptom.id, &symptom.display_name] {
                let key = lookup_key(name);
                if let Some(&other) = by_name.get(&key) {
                    if other != idx {
                        return Err(DatasetError::AmbiguousSymptomName {
                            name: name.clone(),
                            first: symptoms[other].id.clone(),
                            second: symptom.id.clone(),
                        });
                    }
                }
                by_name.insert(key, idx);
            }
        }

        Ok(Self {
            symptoms,
            by_id,
            by_name,
        })
    }

    /// Derive a catalog of plain symptoms (no follow-ups) from bare identifiers.
    pub fn from_symptom_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> DatasetResult<Self> {
        let mut seen = HashSet::new();
        let symptoms = ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .map(SymptomDefinition::plain)
            .collect();
        Self::new(symptoms)
    }

    /// Every symptom, ordered by display name then identifier.
    pub fn list_all(&self) -> &[SymptomDefinition] {
        &self.symptoms
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Exact identifier lookup.
    pub fn get(&self, id: &str) -> Option<&SymptomDefinition> {
        self.by_id.get(id).map(|&idx| &self.symptoms[idx])
    }

    /// Look a symptom up by identifier or display name.
    ///
    /// Exact identifier matches win; otherwise the match is case-insensitive and treats
    /// `_`, `-` and whitespace as equivalent.
    pub fn lookup(&self, id_or_name: &str) -> Option<&SymptomDefinition> {
        self.get(id_or_name).or_else(|| {
            self.by_name
                .get(&lookup_key(id_or_name))
                .map(|&idx| &self.symptoms[idx])
        })
    }

    /// Autocomplete search over display names.
    ///
    /// Case-insensitive substring match. Results are ordered with prefix matches first, then by
    /// earliest match position, shorter names, and finally alphabetically.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&SymptomDefinition> {
        let needle = lookup_key(query);
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<(usize, usize, String, &SymptomDefinition)> = self
            .symptoms
            .iter()
            .filter_map(|symptom| {
                let haystack = lookup_key(&symptom.display_name);
                haystack
                    .find(&needle)
                    .map(|pos| (pos, haystack.len(), haystack, symptom))
            })
            .collect();

        hits.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
                .then_with(|| a.3.id.cmp(&b.3.id))
        });

        hits.into_iter().take(limit).map(|(_, _, _, s)| s).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enum_question(key: &str, options: &[&str]) -> FollowUpQuestion {
        FollowUpQuestion::new(
            key.into(),
            key.into(),
            QuestionKind::Enum {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        )
        .expect("valid question")
    }

    fn symptom(id: &str, name: &str) -> SymptomDefinition {
        SymptomDefinition::new(id.into(), name.into(), vec![], vec![]).expect("valid symptom")
    }

    fn catalog() -> SymptomCatalog {
        SymptomCatalog::new(vec![
            symptom("headache", "Headache"),
            symptom("ear_pain", "Ear Pain"),
            symptom("abdominal_pain", "Abdominal Pain"),
            symptom("chest_pain", "Chest Pain"),
            symptom("painful_urination", "Painful Urination"),
            symptom("fever", "Fever"),
        ])
        .expect("valid catalog")
    }

    #[test]
    fn list_all_is_sorted_by_display_name() {
        let names: Vec<_> = catalog()
            .list_all()
            .iter()
            .map(|s| s.display_name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "Abdominal Pain",
                "Chest Pain",
                "Ear Pain",
                "Fever",
                "Headache",
                "Painful Urination"
            ]
        );
    }

    #[test]
    fn lookup_accepts_ids_and_display_names() {
        let catalog = catalog();
        assert_eq!(catalog.lookup("ear_pain").unwrap().id, "ear_pain");
        assert_eq!(catalog.lookup("Ear Pain").unwrap().id, "ear_pain");
        assert_eq!(catalog.lookup("EAR-PAIN").unwrap().id, "ear_pain");
        assert!(catalog.lookup("earache").is_none());
    }

    #[test]
    fn search_orders_prefix_matches_first() {
        let catalog = catalog();
        let ids: Vec<_> = catalog
            .search("pain", 8)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec!["painful_urination", "ear_pain", "chest_pain", "abdominal_pain"]
        );
    }

    #[test]
    fn search_respects_limit_and_blank_queries() {
        let catalog = catalog();
        assert_eq!(catalog.search("pain", 2).len(), 2);
        assert!(catalog.search("   ", 8).is_empty());
        assert!(catalog.search("zzz", 8).is_empty());
    }

    #[test]
    fn rejects_duplicate_ids_and_ambiguous_names() {
        let err = SymptomCatalog::new(vec![symptom("fever", "Fever"), symptom("fever", "Pyrexia")])
            .expect_err("duplicate id");
        assert!(matches!(err, DatasetError::DuplicateSymptom(id) if id == "fever"));

        let err = SymptomCatalog::new(vec![
            symptom("fever", "Fever"),
            symptom("pyrexia", "FEVER"),
        ])
        .expect_err("ambiguous name");
        assert!(matches!(err, DatasetError::AmbiguousSymptomName { .. }));
    }

    #[test]
    fn follow_up_keys_must_be_unique_across_lists() {
        let err = SymptomDefinition::new(
            "cough".into(),
            "Cough".into(),
            vec![enum_question("onset", &["sudden", "gradual"])],
            vec![enum_question("Onset", &["acute"])],
        )
        .expect_err("duplicate key");
        assert!(matches!(err, DatasetError::DuplicateFollowUp { .. }));
    }

    #[test]
    fn question_validation() {
        assert!(FollowUpQuestion::new(
            "colour".into(),
            "".into(),
            QuestionKind::Enum { options: vec![] }
        )
        .is_err());
        assert!(FollowUpQuestion::new(
            "intensity".into(),
            "Intensity".into(),
            QuestionKind::Range {
                min: Some(10.0),
                max: Some(1.0)
            }
        )
        .is_err());

        let question = FollowUpQuestion::new(
            "days".into(),
            "".into(),
            QuestionKind::Number {
                min: Some(0.0),
                max: None,
            },
        )
        .expect("valid");
        assert_eq!(question.label, "days");
        assert_eq!(question.kind.span(), None);
    }

    #[test]
    fn canonical_option_is_case_insensitive() {
        let question = enum_question("sputum_color", &["clear", "yellow_green"]);
        assert_eq!(
            question.kind.canonical_option("Yellow Green"),
            Some("yellow_green")
        );
        assert_eq!(question.kind.canonical_option("rust"), None);
    }

    #[test]
    fn derived_catalog_humanizes_ids() {
        let catalog =
            SymptomCatalog::from_symptom_ids(["sore_throat", "anxiety and nervousness", "sore_throat"])
                .expect("valid catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("sore_throat").unwrap().display_name, "Sore throat");
        assert_eq!(
            catalog.lookup("Anxiety and nervousness").unwrap().id,
            "anxiety and nervousness"
        );
    }
}
