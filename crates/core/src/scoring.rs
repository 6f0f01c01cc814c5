//! Candidate scoring and ranking.
//!
//! Scoring runs in two passes. The first pass scores every disease that shares a present symptom
//! with the evidence and sorts the candidates. The second pass looks for discriminating absences,
//! which need the ranked list to know who the strongest competitors are.

use crate::catalog::SymptomCatalog;
use crate::evidence::{AnswerValue, EvidenceItem, EvidenceSet};
use crate::explanation::explain;
use crate::knowledge::{
    AssociationRole, DiseaseIdx, DiseaseProfile, Expectation, KnowledgeBase, SymptomAssociation,
};
use crate::{DdxError, DdxResult};
use ddx_types::lookup_key;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Tunable scoring constants.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringParams {
    /// Fraction of a numeric question's scale over which credit falls from 1 to 0 outside the
    /// expected interval.
    pub numeric_falloff: f64,
    /// Match quality at or above which a symptom is a full match rather than a partial one.
    pub partial_threshold: f64,
    /// Weight of the case-count prior; the best documented disease gains this share.
    pub prior_weight: f64,
    /// A disease showing an absent symptom at most this often is not hurt by its absence.
    pub rare_frequency: f64,
    /// A competitor showing an absent symptom at least this often is hurt by its absence.
    pub common_frequency: f64,
    /// Number of top-ranked competitors considered for discriminating absences.
    pub competitor_pool: usize,
    /// Maximum number of missing symptoms reported per candidate.
    pub missing_limit: usize,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            numeric_falloff: 0.5,
            partial_threshold: 0.8,
            prior_weight: 0.1,
            rare_frequency: 0.2,
            common_frequency: 0.5,
            competitor_pool: 5,
            missing_limit: 5,
        }
    }
}

/// A present symptom that supports the candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedSymptom {
    pub symptom: String,
    pub display_name: String,
    /// How well the follow-up answers fit the disease's typical presentation, `0.0..=1.0`.
    pub match_quality: f64,
    pub importance: f64,
    pub frequency: f64,
}

/// An associated symptom the caller did not mention.
#[derive(Clone, Debug, PartialEq)]
pub struct MissingSymptom {
    pub symptom: String,
    pub display_name: String,
    pub importance: f64,
    pub frequency: f64,
    /// Confidence points the candidate would gain if the symptom were confirmed present.
    pub potential_gain: f64,
}

/// Why an absent symptom supports the candidate.
#[derive(Clone, Debug, PartialEq)]
pub enum NegativeReason {
    /// The disease profile says absence of the symptom is typical.
    Contraindicating,
    /// The symptom is rare for this disease but common for these competing candidates.
    Discriminating { competitors: Vec<String> },
}

/// An explicitly absent symptom whose absence favours the candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct NegativeMatch {
    pub symptom: String,
    pub display_name: String,
    pub note: String,
    pub reason: NegativeReason,
}

/// One ranked candidate diagnosis.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosisResult {
    pub disease_id: String,
    pub common_name: String,
    pub category: String,
    pub case_count: u32,
    /// Composite confidence, `0.0..=100.0`, rounded to one decimal.
    pub confidence: f64,
    pub matched: Vec<MatchedSymptom>,
    pub partial: Vec<MatchedSymptom>,
    pub missing: Vec<MissingSymptom>,
    pub negative: Vec<NegativeMatch>,
    pub explanation: String,
}

/// Reduced view of a [`DiagnosisResult`] for callers that only need a score and match counts.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosisSummary {
    pub disease: String,
    pub disease_id: String,
    pub score: f64,
    /// Matched plus partially matched symptoms.
    pub match_count: usize,
    /// Symptoms the caller reported present.
    pub total_symptom_count: usize,
    pub case_count: u32,
    /// `match_count / total_symptom_count` as a percentage, two decimals.
    pub match_percentage: f64,
}

impl DiagnosisResult {
    pub fn summary(&self, total_symptom_count: usize) -> DiagnosisSummary {
        let match_count = self.matched.len() + self.partial.len();
        let match_percentage = if total_symptom_count == 0 {
            0.0
        } else {
            round_to(100.0 * match_count as f64 / total_symptom_count as f64, 2)
        };
        DiagnosisSummary {
            disease: self.common_name.clone(),
            disease_id: self.disease_id.clone(),
            score: self.confidence,
            match_count,
            total_symptom_count,
            case_count: self.case_count,
            match_percentage,
        }
    }
}

/// Ranks candidate diagnoses for a validated evidence set.
///
/// Borrows the loaded dataset; a query never mutates it.
pub struct ScoringEngine<'a> {
    catalog: &'a SymptomCatalog,
    knowledge: &'a KnowledgeBase,
    params: &'a ScoringParams,
}

struct Scored {
    disease: DiseaseIdx,
    result: DiagnosisResult,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(
        catalog: &'a SymptomCatalog,
        knowledge: &'a KnowledgeBase,
        params: &'a ScoringParams,
    ) -> Self {
        Self {
            catalog,
            knowledge,
            params,
        }
    }

    /// Diseases sharing at least one present symptom with the evidence.
    pub fn candidates(&self, evidence: &EvidenceSet) -> BTreeSet<DiseaseIdx> {
        evidence
            .present()
            .flat_map(|item| self.knowledge.postings(&item.symptom))
            .filter(|posting| posting.role == AssociationRole::Indicating)
            .map(|posting| posting.disease)
            .collect()
    }

    /// Score and rank every candidate.
    ///
    /// Results are ordered by confidence (descending), then case count (descending), then disease
    /// identifier. Candidates with no matched, partial or contraindicating evidence are dropped;
    /// no confidence floor or truncation is applied here.
    ///
    /// # Errors
    ///
    /// Returns `DdxError::Scoring` if a score is not a finite number.
    pub fn rank(&self, evidence: &EvidenceSet) -> DdxResult<Vec<DiagnosisResult>> {
        let mut scored = self
            .candidates(evidence)
            .into_iter()
            .map(|idx| {
                self.score(self.knowledge.disease(idx), evidence)
                    .map(|result| Scored {
                        disease: idx,
                        result,
                    })
            })
            .collect::<DdxResult<Vec<_>>>()?;
        // A candidate whose every reported symptom contradicts its answers has nothing to show.
        scored.retain(|s| {
            !(s.result.matched.is_empty()
                && s.result.partial.is_empty()
                && s.result.negative.is_empty())
        });

        scored.sort_by(|a, b| rank_order(&a.result, &b.result));

        let negatives: Vec<Vec<NegativeMatch>> = (0..scored.len())
            .map(|pos| self.discriminating_absences(pos, &scored, evidence))
            .collect();

        Ok(scored
            .into_iter()
            .zip(negatives)
            .map(|(Scored { mut result, .. }, discriminating)| {
                result.negative.extend(discriminating);
                result.explanation = explain(&result);
                result
            })
            .collect())
    }

    /// First-pass score for one disease: confidence plus matched, partial, missing and
    /// contraindicating buckets.
    ///
    /// # Errors
    ///
    /// Returns `DdxError::Scoring` if the confidence is not finite.
    pub fn score(
        &self,
        disease: &DiseaseProfile,
        evidence: &EvidenceSet,
    ) -> DdxResult<DiagnosisResult> {
        let max_score = disease.max_score();
        if !(max_score.is_finite() && max_score > 0.0) {
            return Err(DdxError::Scoring(format!(
                "disease {} has no usable weight",
                disease.id
            )));
        }
        let prior = self.prior(disease);

        let mut total = 0.0;
        let mut matched = Vec::new();
        let mut partial = Vec::new();
        let mut unmentioned = Vec::new();
        let mut negative = Vec::new();

        for association in disease.associations() {
            let item = evidence.get(&association.symptom);
            match (association.role, item) {
                (AssociationRole::Indicating, Some(item)) if item.present => {
                    let quality = self.match_quality(association, item);
                    total += association.weight() * quality;
                    let entry = MatchedSymptom {
                        symptom: association.symptom.clone(),
                        display_name: self.display_name(&association.symptom),
                        match_quality: quality,
                        importance: association.importance.get(),
                        frequency: association.frequency.get(),
                    };
                    if quality >= self.params.partial_threshold {
                        matched.push(entry);
                    } else if quality > 0.0 {
                        partial.push(entry);
                    }
                }
                (AssociationRole::Indicating, None) => unmentioned.push(association),
                (AssociationRole::Contraindicating, Some(item)) if !item.present => {
                    total += association.importance.get();
                    let display_name = self.display_name(&association.symptom);
                    negative.push(NegativeMatch {
                        note: association.note.clone().unwrap_or_else(|| {
                            format!(
                                "Absence of {} supports this diagnosis",
                                display_name.to_lowercase()
                            )
                        }),
                        symptom: association.symptom.clone(),
                        display_name,
                        reason: NegativeReason::Contraindicating,
                    });
                }
                _ => {}
            }
        }

        let confidence = self.confidence(total, max_score, prior, &disease.id)?;

        unmentioned.sort_by(|a, b| {
            b.weight()
                .total_cmp(&a.weight())
                .then_with(|| a.symptom.cmp(&b.symptom))
        });
        let missing = unmentioned
            .into_iter()
            .take(self.params.missing_limit)
            .map(|association| {
                let confirmed =
                    self.confidence(total + association.weight(), max_score, prior, &disease.id)?;
                Ok(MissingSymptom {
                    symptom: association.symptom.clone(),
                    display_name: self.display_name(&association.symptom),
                    importance: association.importance.get(),
                    frequency: association.frequency.get(),
                    potential_gain: round_to(confirmed - confidence, 1),
                })
            })
            .collect::<DdxResult<Vec<_>>>()?;

        Ok(DiagnosisResult {
            disease_id: disease.id.clone(),
            common_name: disease.common_name.clone(),
            category: disease.category.clone(),
            case_count: disease.case_count,
            confidence,
            matched,
            partial,
            missing,
            negative,
            explanation: String::new(),
        })
    }

    /// Mean fit of the answered follow-ups against the association's expectations.
    ///
    /// A present symptom with no answered expectation counts as a perfect match.
    pub fn match_quality(&self, association: &SymptomAssociation, item: &EvidenceItem) -> f64 {
        let definition = self.catalog.get(&association.symptom);
        let mut sum = 0.0;
        let mut answered = 0usize;

        for (key, expectation) in &association.expectations {
            let question = definition.and_then(|d| d.follow_up(key));
            let answer_key = question.map_or(key.as_str(), |q| q.key.as_str());
            let Some(answer) = item.answers.get(answer_key) else {
                continue;
            };

            let fit = match (expectation, answer) {
                (Expectation::OneOf(options), AnswerValue::Choice(choice)) => {
                    let wanted = lookup_key(choice);
                    if options.iter().any(|o| lookup_key(o) == wanted) {
                        1.0
                    } else {
                        0.0
                    }
                }
                (Expectation::Between { lo, hi }, AnswerValue::Numeric(value)) => {
                    let scale = question
                        .and_then(|q| q.kind.span())
                        .unwrap_or_else(|| lo.abs().max(hi.abs()).max(1.0));
                    numeric_fit(*value, *lo, *hi, scale, self.params.numeric_falloff)
                }
                _ => continue,
            };
            sum += fit;
            answered += 1;
        }

        if answered == 0 {
            1.0
        } else {
            sum / answered as f64
        }
    }

    fn prior(&self, disease: &DiseaseProfile) -> f64 {
        match self.knowledge.max_case_count() {
            0 => 1.0,
            max => {
                1.0 + self.params.prior_weight * f64::from(disease.case_count) / f64::from(max)
            }
        }
    }

    fn confidence(&self, total: f64, max_score: f64, prior: f64, disease: &str) -> DdxResult<f64> {
        let raw = 100.0 * total / max_score * prior;
        if !raw.is_finite() {
            return Err(DdxError::Scoring(format!(
                "non-finite confidence for disease {disease}"
            )));
        }
        Ok(round_to(raw.clamp(0.0, 100.0), 1))
    }

    /// Absent symptoms that are rare for the candidate at `pos` but common for one of its top
    /// competitors.
    fn discriminating_absences(
        &self,
        pos: usize,
        ranked: &[Scored],
        evidence: &EvidenceSet,
    ) -> Vec<NegativeMatch> {
        let disease = self.knowledge.disease(ranked[pos].disease);
        let competitors: Vec<&DiseaseProfile> = ranked
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != pos)
            .take(self.params.competitor_pool)
            .map(|(_, scored)| self.knowledge.disease(scored.disease))
            .collect();

        evidence
            .absent()
            .filter(|item| {
                !matches!(
                    disease.association(&item.symptom),
                    Some(a) if a.role == AssociationRole::Contraindicating
                )
            })
            .filter(|item| {
                disease.indicating_frequency(&item.symptom) <= self.params.rare_frequency
            })
            .filter_map(|item| {
                let names: Vec<String> = competitors
                    .iter()
                    .filter(|c| {
                        c.indicating_frequency(&item.symptom) >= self.params.common_frequency
                    })
                    .map(|c| c.common_name.clone())
                    .collect();
                if names.is_empty() {
                    return None;
                }
                let display_name = self.display_name(&item.symptom);
                Some(NegativeMatch {
                    note: format!(
                        "Absence of {} argues against {}",
                        display_name.to_lowercase(),
                        names.join(", ")
                    ),
                    symptom: item.symptom.clone(),
                    display_name,
                    reason: NegativeReason::Discriminating { competitors: names },
                })
            })
            .collect()
    }

    fn display_name(&self, symptom: &str) -> String {
        self.catalog
            .get(symptom)
            .map_or_else(|| symptom.to_string(), |s| s.display_name.clone())
    }
}

/// Result ordering: confidence desc, case count desc, disease id asc.
pub fn rank_order(a: &DiagnosisResult, b: &DiagnosisResult) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.case_count.cmp(&a.case_count))
        .then_with(|| a.disease_id.cmp(&b.disease_id))
}

/// Credit for a numeric answer against an expected interval, falling linearly to zero at
/// `falloff * scale` outside it.
fn numeric_fit(value: f64, lo: f64, hi: f64, scale: f64, falloff: f64) -> f64 {
    let distance = if value < lo {
        lo - value
    } else if value > hi {
        value - hi
    } else {
        return 1.0;
    };
    let width = falloff * scale;
    if width <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / width).max(0.0)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FollowUpQuestion, QuestionKind, SymptomDefinition};
    use ddx_types::Fraction;

    fn frac(v: f64) -> Fraction {
        Fraction::new(v).unwrap()
    }

    fn catalog() -> SymptomCatalog {
        let intensity = FollowUpQuestion::new(
            "intensity".into(),
            "Intensity".into(),
            QuestionKind::Range {
                min: Some(0.0),
                max: Some(10.0),
            },
        )
        .unwrap();
        let onset = FollowUpQuestion::new(
            "onset".into(),
            "Onset".into(),
            QuestionKind::Enum {
                options: vec!["sudden".into(), "gradual".into()],
            },
        )
        .unwrap();
        SymptomCatalog::new(vec![
            SymptomDefinition::new(
                "fever".into(),
                "Fever".into(),
                vec![onset, intensity],
                vec![],
            )
            .unwrap(),
            SymptomDefinition::plain("cough"),
            SymptomDefinition::plain("rash"),
            SymptomDefinition::plain("headache"),
        ])
        .unwrap()
    }

    fn association(symptom: &str, importance: f64, frequency: f64) -> SymptomAssociation {
        SymptomAssociation::indicating(symptom, frac(importance), frac(frequency))
    }

    fn disease(id: &str, case_count: u32, associations: Vec<SymptomAssociation>) -> DiseaseProfile {
        DiseaseProfile::new(
            id.into(),
            format!("{id} disease"),
            "General".into(),
            case_count,
            associations,
        )
        .unwrap()
    }

    fn knowledge(diseases: Vec<DiseaseProfile>) -> KnowledgeBase {
        KnowledgeBase::build(diseases, &catalog()).expect("valid knowledge base")
    }

    fn no_prior() -> ScoringParams {
        ScoringParams {
            prior_weight: 0.0,
            ..ScoringParams::default()
        }
    }

    fn flu() -> DiseaseProfile {
        let mut fever = association("fever", 1.0, 1.0);
        fever
            .expectations
            .insert("intensity".into(), Expectation::Between { lo: 6.0, hi: 10.0 });
        fever
            .expectations
            .insert("onset".into(), Expectation::OneOf(vec!["sudden".into()]));
        disease("flu", 10, vec![fever, association("cough", 1.0, 0.5)])
    }

    #[test]
    fn presence_without_answers_is_a_full_match() {
        let catalog = catalog();
        let kb = knowledge(vec![flu()]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let evidence: EvidenceSet = [EvidenceItem::present("fever")].into_iter().collect();
        let results = engine.rank(&evidence).expect("scoring succeeds");

        assert_eq!(results.len(), 1);
        // fever contributes 1.0 * 1.0 of a possible 2.0.
        assert_eq!(results[0].confidence, 50.0);
        assert_eq!(results[0].matched.len(), 1);
        assert_eq!(results[0].matched[0].match_quality, 1.0);
        assert_eq!(results[0].missing.len(), 1);
        assert_eq!(results[0].missing[0].symptom, "cough");
        assert_eq!(results[0].missing[0].potential_gain, 25.0);
    }

    #[test]
    fn answers_refine_match_quality() {
        let catalog = catalog();
        let kb = knowledge(vec![flu()]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);
        let fever = kb.find("flu").unwrap().association("fever").unwrap();

        let inside = EvidenceItem::present("fever")
            .with_answer("intensity", AnswerValue::Numeric(8.0))
            .with_answer("onset", AnswerValue::Choice("sudden".into()));
        assert_eq!(engine.match_quality(fever, &inside), 1.0);

        // 2 below the interval on a 0-10 scale with falloff 0.5: 1 - 2/5 = 0.6; onset matches.
        let below = EvidenceItem::present("fever")
            .with_answer("intensity", AnswerValue::Numeric(4.0))
            .with_answer("onset", AnswerValue::Choice("sudden".into()));
        assert!((engine.match_quality(fever, &below) - 0.8).abs() < 1e-9);

        let wrong_onset = EvidenceItem::present("fever")
            .with_answer("onset", AnswerValue::Choice("gradual".into()));
        assert_eq!(engine.match_quality(fever, &wrong_onset), 0.0);
    }

    #[test]
    fn partial_and_contradicting_answers() {
        let catalog = catalog();
        let kb = knowledge(vec![flu()]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let evidence: EvidenceSet = [EvidenceItem::present("fever")
            .with_answer("intensity", AnswerValue::Numeric(3.0))]
        .into_iter()
        .collect();
        let result = &engine.rank(&evidence).expect("scoring succeeds")[0];
        // 3 below 6 -> 1 - 3/5 = 0.4, a partial match.
        assert!(result.matched.is_empty());
        assert_eq!(result.partial.len(), 1);
        assert_eq!(result.confidence, 20.0);

        let evidence: EvidenceSet = [EvidenceItem::present("fever")
            .with_answer("onset", AnswerValue::Choice("gradual".into()))]
        .into_iter()
        .collect();
        assert!(engine.rank(&evidence).expect("scoring succeeds").is_empty());
    }

    #[test]
    fn candidates_without_supporting_evidence_are_dropped() {
        let catalog = catalog();
        let kb = knowledge(vec![
            flu(),
            disease(
                "cold",
                5,
                vec![association("fever", 0.5, 0.5), association("cough", 1.0, 1.0)],
            ),
        ]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        // 0 is 6 below the flu interval; 6 / (0.5 * 10) is past the falloff, so quality is 0.
        let fever =
            EvidenceItem::present("fever").with_answer("intensity", AnswerValue::Numeric(0.0));
        let flu_fever = kb.find("flu").unwrap().association("fever").unwrap();
        assert_eq!(engine.match_quality(flu_fever, &fever), 0.0);

        let evidence: EvidenceSet = [fever].into_iter().collect();
        let results = engine.rank(&evidence).expect("scoring succeeds");
        let ids: Vec<&str> = results.iter().map(|r| r.disease_id.as_str()).collect();
        assert_eq!(ids, ["cold"]);
        assert_eq!(results[0].matched.len(), 1);
    }

    #[test]
    fn ranks_by_confidence_then_case_count_then_id() {
        let catalog = catalog();
        let kb = knowledge(vec![
            disease("b_common", 50, vec![association("cough", 1.0, 1.0)]),
            disease("a_rare", 5, vec![association("cough", 1.0, 1.0)]),
            disease("c_same", 50, vec![association("cough", 1.0, 1.0)]),
            disease(
                "weak",
                50,
                vec![association("cough", 1.0, 0.5), association("rash", 1.0, 1.0)],
            ),
        ]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let evidence: EvidenceSet = [EvidenceItem::present("cough")].into_iter().collect();
        let ids: Vec<String> = engine
            .rank(&evidence)
            .expect("scoring succeeds")
            .into_iter()
            .map(|r| r.disease_id)
            .collect();
        assert_eq!(ids, ["b_common", "c_same", "a_rare", "weak"]);
    }

    #[test]
    fn case_count_prior_boosts_documented_diseases() {
        let catalog = catalog();
        let kb = knowledge(vec![
            disease(
                "big",
                100,
                vec![association("cough", 0.5, 1.0), association("rash", 0.5, 1.0)],
            ),
            disease(
                "small",
                0,
                vec![association("cough", 0.5, 1.0), association("rash", 0.5, 1.0)],
            ),
        ]);
        let params = ScoringParams::default();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let evidence: EvidenceSet = [EvidenceItem::present("cough")].into_iter().collect();
        let results = engine.rank(&evidence).expect("scoring succeeds");
        assert_eq!(results[0].disease_id, "big");
        assert_eq!(results[0].confidence, 55.0);
        assert_eq!(results[1].confidence, 50.0);
    }

    #[test]
    fn only_present_symptoms_create_candidates() {
        let catalog = catalog();
        let kb = knowledge(vec![flu()]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let evidence: EvidenceSet = [EvidenceItem::absent("fever")].into_iter().collect();
        assert!(engine.rank(&evidence).expect("scoring succeeds").is_empty());
        assert!(engine.rank(&EvidenceSet::new()).expect("scoring succeeds").is_empty());
    }

    #[test]
    fn contraindicating_absence_earns_credit() {
        let mut rash = association("rash", 1.0, 0.1);
        rash.role = AssociationRole::Contraindicating;
        rash.note = Some("No rash fits".into());
        let catalog = catalog();
        let kb = knowledge(vec![disease("flu", 1, vec![association("fever", 1.0, 1.0), rash])]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let present_only: EvidenceSet = [EvidenceItem::present("fever")].into_iter().collect();
        assert_eq!(engine.rank(&present_only).unwrap()[0].confidence, 50.0);

        let with_absence: EvidenceSet =
            [EvidenceItem::present("fever"), EvidenceItem::absent("rash")]
                .into_iter()
                .collect();
        let result = &engine.rank(&with_absence).unwrap()[0];
        assert_eq!(result.confidence, 100.0);
        assert_eq!(result.negative.len(), 1);
        assert_eq!(result.negative[0].note, "No rash fits");
        assert_eq!(result.negative[0].reason, NegativeReason::Contraindicating);
        // contraindicated symptoms are never suggested as missing
        assert!(result.missing.is_empty());

        let with_presence: EvidenceSet =
            [EvidenceItem::present("fever"), EvidenceItem::present("rash")]
                .into_iter()
                .collect();
        let result = &engine.rank(&with_presence).unwrap()[0];
        assert_eq!(result.confidence, 50.0);
        assert!(result.negative.is_empty());
    }

    #[test]
    fn discriminating_absence_names_competitors() {
        let catalog = catalog();
        let kb = knowledge(vec![
            disease(
                "migraine",
                10,
                vec![association("headache", 1.0, 1.0), association("fever", 0.2, 0.1)],
            ),
            disease(
                "flu",
                10,
                vec![association("headache", 0.5, 0.6), association("fever", 1.0, 0.9)],
            ),
        ]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let evidence: EvidenceSet =
            [EvidenceItem::present("headache"), EvidenceItem::absent("fever")]
                .into_iter()
                .collect();
        let results = engine.rank(&evidence).expect("scoring succeeds");
        let migraine = results.iter().find(|r| r.disease_id == "migraine").unwrap();
        assert_eq!(
            migraine.negative[0].reason,
            NegativeReason::Discriminating {
                competitors: vec!["flu disease".into()]
            }
        );
        assert_eq!(
            migraine.negative[0].note,
            "Absence of fever argues against flu disease"
        );

        let flu = results.iter().find(|r| r.disease_id == "flu").unwrap();
        assert!(flu.negative.is_empty());
    }

    #[test]
    fn missing_symptoms_are_ranked_and_limited() {
        let catalog = catalog();
        let kb = knowledge(vec![disease(
            "flu",
            10,
            vec![
                association("fever", 1.0, 1.0),
                association("rash", 0.2, 0.5),
                association("cough", 0.8, 0.8),
                association("headache", 0.4, 0.5),
            ],
        )]);
        let params = ScoringParams {
            missing_limit: 2,
            ..no_prior()
        };
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let evidence: EvidenceSet =
            [EvidenceItem::present("fever"), EvidenceItem::absent("headache")]
                .into_iter()
                .collect();
        let missing: Vec<String> = engine.rank(&evidence).unwrap()[0]
            .missing
            .iter()
            .map(|m| m.symptom.clone())
            .collect();
        assert_eq!(missing, ["cough", "rash"]);
    }

    #[test]
    fn summary_projects_counts() {
        let catalog = catalog();
        let kb = knowledge(vec![flu()]);
        let params = no_prior();
        let engine = ScoringEngine::new(&catalog, &kb, &params);

        let evidence: EvidenceSet =
            [EvidenceItem::present("fever"), EvidenceItem::present("rash")]
                .into_iter()
                .collect();
        let result = &engine.rank(&evidence).unwrap()[0];
        let summary = result.summary(evidence.present_count());
        assert_eq!(summary.disease, "flu disease");
        assert_eq!(summary.score, result.confidence);
        assert_eq!(summary.match_count, 1);
        assert_eq!(summary.total_symptom_count, 2);
        assert_eq!(summary.match_percentage, 50.0);
    }

    #[test]
    fn numeric_fit_falls_off_linearly() {
        assert_eq!(numeric_fit(5.0, 4.0, 6.0, 10.0, 0.5), 1.0);
        assert!((numeric_fit(7.0, 4.0, 6.0, 10.0, 0.5) - 0.8).abs() < 1e-9);
        assert_eq!(numeric_fit(20.0, 4.0, 6.0, 10.0, 0.5), 0.0);
        assert_eq!(numeric_fit(7.0, 4.0, 6.0, 10.0, 0.0), 0.0);
    }
}
