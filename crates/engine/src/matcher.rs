//! Symptom-to-disease matching
//!
//! Scoring model:
//! - A disease's profile is the union of symptoms across its condition
//!   groups. A member's effective weight is its rule override when present
//!   (largest override wins if the symptom sits in several groups),
//!   otherwise the symptom's severity weight.
//! - confidence = matched_weight / total_weight, always in [0, 1]
//! - A fully matched condition group pulls the score toward certainty:
//!   c + boost * (1 - c). Matching the whole profile stays exactly 1.0.
//! - Diseases with no matched symptom (or a zero-weight profile) are
//!   excluded from results.
//!
//! Ordering is fully deterministic: candidates sort by descending
//! confidence with ascending disease id as the tie-breaker; suggestions
//! sort by descending frequency with ascending symptom id.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::knowledge::{DiseaseId, KnowledgeBase, SymptomId};

/// Matcher tuning knobs. The defaults match the shipped settings file.
#[derive(Debug, Clone, Copy)]
pub struct MatcherOptions {
    /// How many top candidates feed the suggestion pass.
    pub top_candidates: usize,

    /// Pull toward 1.0 when a full condition group is present, in [0, 1).
    pub group_boost: f64,

    /// Maximum number of suggested symptoms returned.
    pub suggestion_limit: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            top_candidates: 5,
            group_boost: 0.25,
            suggestion_limit: 10,
        }
    }
}

/// One scored disease.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Candidate {
    pub disease: DiseaseId,
    pub name: String,
    pub confidence: f64,
}

/// A symptom worth asking about next, with how many of the top
/// candidates' condition groups mention it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuggestedSymptom {
    pub symptom: SymptomId,
    pub name: String,
    pub frequency: u32,
}

/// Result of one diagnosis query.
#[derive(Debug, Clone, Serialize, Default)]
pub struct Diagnosis {
    pub candidates: Vec<Candidate>,
    pub suggestions: Vec<SuggestedSymptom>,

    /// Selected ids that matched no known symptom. Dropped from scoring,
    /// surfaced so the caller can warn.
    pub dropped: Vec<SymptomId>,
}

/// Score every disease against the selected symptoms.
///
/// Unknown ids are dropped (reported via `Diagnosis::dropped`); an empty
/// selection yields an empty diagnosis.
pub fn diagnose(kb: &KnowledgeBase, selected: &[SymptomId], opts: &MatcherOptions) -> Diagnosis {
    let mut known: FxHashSet<SymptomId> = FxHashSet::default();
    let mut dropped: Vec<SymptomId> = Vec::new();
    for &id in selected {
        if kb.symptom(id).is_some() {
            known.insert(id);
        } else if !dropped.contains(&id) {
            dropped.push(id);
        }
    }
    dropped.sort();

    if known.is_empty() {
        return Diagnosis { dropped, ..Default::default() };
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    for disease in kb.diseases() {
        let Some(rule) = kb.rule(disease.id) else { continue };

        // Effective weight per profile symptom: severity unless a group
        // member carries an override (largest override wins).
        let mut weights: FxHashMap<SymptomId, (f64, bool)> = FxHashMap::default();
        for group in &rule.groups {
            for m in &group.members {
                let severity = kb.symptom(m.symptom).map(|s| s.severity).unwrap_or(0.0);
                let entry = weights.entry(m.symptom).or_insert((severity, false));
                if let Some(w) = m.weight {
                    if !entry.1 || w > entry.0 {
                        *entry = (w, true);
                    }
                }
            }
        }

        let total: f64 = weights.values().map(|&(w, _)| w).sum();
        let matched: f64 = weights
            .iter()
            .filter(|(id, _)| known.contains(id))
            .map(|(_, &(w, _))| w)
            .sum();
        let matched_count = weights.keys().filter(|id| known.contains(id)).count();
        if matched_count == 0 || total <= 0.0 {
            continue;
        }

        let mut confidence = matched / total;
        let full_group = rule
            .groups
            .iter()
            .any(|g| g.members.iter().all(|m| known.contains(&m.symptom)));
        if full_group {
            confidence += opts.group_boost * (1.0 - confidence);
        }

        candidates.push(Candidate {
            disease: disease.id,
            name: disease.name.clone(),
            confidence,
        });
    }

    candidates.sort_by_key(|c| (Reverse(OrderedFloat(c.confidence)), c.disease));

    let suggestions = suggest(kb, &known, &candidates, opts);

    Diagnosis { candidates, suggestions, dropped }
}

/// Rank not-yet-selected symptoms by how often they appear in the top
/// candidates' condition groups.
fn suggest(
    kb: &KnowledgeBase,
    known: &FxHashSet<SymptomId>,
    candidates: &[Candidate],
    opts: &MatcherOptions,
) -> Vec<SuggestedSymptom> {
    let mut counts: FxHashMap<SymptomId, u32> = FxHashMap::default();
    for candidate in candidates.iter().take(opts.top_candidates) {
        let Some(rule) = kb.rule(candidate.disease) else { continue };
        for group in &rule.groups {
            for m in &group.members {
                if !known.contains(&m.symptom) {
                    *counts.entry(m.symptom).or_insert(0) += 1;
                }
            }
        }
    }

    let mut ranked: Vec<SuggestedSymptom> = counts
        .into_iter()
        .filter_map(|(id, frequency)| {
            kb.symptom(id).map(|s| SuggestedSymptom {
                symptom: id,
                name: s.name.clone(),
                frequency,
            })
        })
        .collect();
    ranked.sort_by_key(|s| (Reverse(s.frequency), s.symptom));
    ranked.truncate(opts.suggestion_limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::GroupMember;

    /// The worked example: Angina requires {chest pain: 0.6,
    /// shortness of breath: 0.4, fatigue: 0.3} in one group.
    fn angina_base() -> (KnowledgeBase, DiseaseId, SymptomId, SymptomId, SymptomId) {
        let mut kb = KnowledgeBase::new();
        let angina = kb.add_disease("Angina", None).unwrap();
        let pain = kb.add_symptom("chest pain", 6.0).unwrap();
        let breath = kb.add_symptom("shortness of breath", 5.0).unwrap();
        let fatigue = kb.add_symptom("fatigue", 3.0).unwrap();
        kb.add_rule_group(
            angina,
            vec![
                GroupMember::weighted(pain, 0.6),
                GroupMember::weighted(breath, 0.4),
                GroupMember::weighted(fatigue, 0.3),
            ],
        )
        .unwrap();
        (kb, angina, pain, breath, fatigue)
    }

    #[test]
    fn test_weighted_partial_match() {
        let (kb, _, pain, breath, _) = angina_base();
        let result = diagnose(&kb, &[pain, breath], &MatcherOptions::default());
        assert_eq!(result.candidates.len(), 1);
        // 1.0 / 1.3
        let confidence = result.candidates[0].confidence;
        assert!((confidence - 0.769230).abs() < 1e-5, "got {}", confidence);
    }

    #[test]
    fn test_full_rule_set_scores_one() {
        let (kb, _, pain, breath, fatigue) = angina_base();
        let result = diagnose(&kb, &[pain, breath, fatigue], &MatcherOptions::default());
        assert_eq!(result.candidates[0].confidence, 1.0);
    }

    #[test]
    fn test_empty_selection_yields_nothing() {
        let (kb, _, _, _, _) = angina_base();
        let result = diagnose(&kb, &[], &MatcherOptions::default());
        assert!(result.candidates.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_unknown_ids_dropped_not_fatal() {
        let (kb, _, pain, breath, _) = angina_base();
        let bogus = SymptomId(999);
        let with_bogus = diagnose(&kb, &[pain, bogus, breath], &MatcherOptions::default());
        let without = diagnose(&kb, &[pain, breath], &MatcherOptions::default());
        assert_eq!(with_bogus.candidates, without.candidates);
        assert_eq!(with_bogus.dropped, vec![bogus]);
    }

    #[test]
    fn test_all_unknown_is_empty_diagnosis() {
        let (kb, _, _, _, _) = angina_base();
        let result = diagnose(&kb, &[SymptomId(777)], &MatcherOptions::default());
        assert!(result.candidates.is_empty());
        assert_eq!(result.dropped, vec![SymptomId(777)]);
    }

    #[test]
    fn test_zero_match_diseases_excluded() {
        let (mut kb, _, pain, _, _) = angina_base();
        let flu = kb.add_disease("Influenza", None).unwrap();
        let fever = kb.add_symptom("fever", 4.0).unwrap();
        kb.add_rule_group(flu, vec![GroupMember::new(fever)]).unwrap();

        let result = diagnose(&kb, &[pain], &MatcherOptions::default());
        assert!(result.candidates.iter().all(|c| c.name != "Influenza"));
    }

    #[test]
    fn test_severity_is_default_weight() {
        let mut kb = KnowledgeBase::new();
        let flu = kb.add_disease("Influenza", None).unwrap();
        let fever = kb.add_symptom("fever", 4.0).unwrap();
        let cough = kb.add_symptom("cough", 2.0).unwrap();
        kb.add_rule_group(flu, vec![GroupMember::new(fever), GroupMember::new(cough)])
            .unwrap();

        let result = diagnose(&kb, &[fever], &MatcherOptions::default());
        // 4.0 / 6.0
        let confidence = result.candidates[0].confidence;
        assert!((confidence - 2.0 / 3.0).abs() < 1e-9, "got {}", confidence);
    }

    #[test]
    fn test_full_group_boost() {
        let mut kb = KnowledgeBase::new();
        let mi = kb.add_disease("Myocardial Infarction", None).unwrap();
        let pain = kb.add_symptom("chest pain", 6.0).unwrap();
        let sweat = kb.add_symptom("sweating", 2.0).unwrap();
        let arm = kb.add_symptom("arm numbness", 4.0).unwrap();
        // Two ORed groups: {pain} alone already indicates, {sweat, arm} adds context
        kb.add_rule_group(mi, vec![GroupMember::new(pain)]).unwrap();
        kb.add_rule_group(mi, vec![GroupMember::new(sweat), GroupMember::new(arm)])
            .unwrap();

        let opts = MatcherOptions::default();
        let result = diagnose(&kb, &[pain], &opts);
        let base = 6.0 / 12.0;
        let expected = base + opts.group_boost * (1.0 - base);
        let confidence = result.candidates[0].confidence;
        assert!((confidence - expected).abs() < 1e-9, "got {}", confidence);
        assert!(confidence <= 1.0);
    }

    #[test]
    fn test_boost_zero_leaves_ratio() {
        let mut kb = KnowledgeBase::new();
        let mi = kb.add_disease("Myocardial Infarction", None).unwrap();
        let pain = kb.add_symptom("chest pain", 6.0).unwrap();
        let sweat = kb.add_symptom("sweating", 2.0).unwrap();
        kb.add_rule_group(mi, vec![GroupMember::new(pain)]).unwrap();
        kb.add_rule_group(mi, vec![GroupMember::new(sweat)]).unwrap();

        let opts = MatcherOptions { group_boost: 0.0, ..Default::default() };
        let result = diagnose(&kb, &[pain], &opts);
        assert_eq!(result.candidates[0].confidence, 0.75);
    }

    #[test]
    fn test_candidates_sorted_desc_ties_by_id() {
        let mut kb = KnowledgeBase::new();
        // Two diseases with identical single-symptom rules score identically
        let b = kb.add_disease("Bradycardia", None).unwrap();
        let a = kb.add_disease("Arrhythmia", None).unwrap();
        let dizzy = kb.add_symptom("dizziness", 5.0).unwrap();
        let fever = kb.add_symptom("fever", 4.0).unwrap();
        kb.add_rule_group(b, vec![GroupMember::new(dizzy)]).unwrap();
        kb.add_rule_group(a, vec![GroupMember::new(dizzy)]).unwrap();
        // And one weaker match to verify descending order
        let flu = kb.add_disease("Influenza", None).unwrap();
        kb.add_rule_group(flu, vec![GroupMember::new(dizzy), GroupMember::new(fever)])
            .unwrap();

        let result = diagnose(&kb, &[dizzy], &MatcherOptions::default());
        let names: Vec<&str> = result.candidates.iter().map(|c| c.name.as_str()).collect();
        // Equal scores fall back to insertion ids: Bradycardia before Arrhythmia
        assert_eq!(names, vec!["Bradycardia", "Arrhythmia", "Influenza"]);
        for pair in result.candidates.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_confidence_in_unit_interval() {
        let (kb, _, pain, breath, fatigue) = angina_base();
        for selection in [&[pain][..], &[pain, breath][..], &[pain, breath, fatigue][..]] {
            let result = diagnose(&kb, selection, &MatcherOptions::default());
            for c in &result.candidates {
                assert!((0.0..=1.0).contains(&c.confidence), "{} out of range", c.confidence);
            }
        }
    }

    #[test]
    fn test_diagnose_is_deterministic() {
        let (kb, _, pain, breath, _) = angina_base();
        let first = diagnose(&kb, &[pain, breath], &MatcherOptions::default());
        let second = diagnose(&kb, &[pain, breath], &MatcherOptions::default());
        assert_eq!(first.candidates, second.candidates);
        assert_eq!(first.suggestions, second.suggestions);
    }

    #[test]
    fn test_suggestions_ranked_by_frequency() {
        let mut kb = KnowledgeBase::new();
        let a = kb.add_disease("Angina", None).unwrap();
        let b = kb.add_disease("Myocardial Infarction", None).unwrap();
        let pain = kb.add_symptom("chest pain", 6.0).unwrap();
        let breath = kb.add_symptom("shortness of breath", 5.0).unwrap();
        let sweat = kb.add_symptom("sweating", 2.0).unwrap();
        kb.add_rule_group(a, vec![GroupMember::new(pain), GroupMember::new(breath)])
            .unwrap();
        kb.add_rule_group(b, vec![GroupMember::new(pain), GroupMember::new(breath)])
            .unwrap();
        kb.add_rule_group(b, vec![GroupMember::new(pain), GroupMember::new(sweat)])
            .unwrap();

        let result = diagnose(&kb, &[pain], &MatcherOptions::default());
        // breath appears in 2 groups across both candidates, sweat in 1
        assert_eq!(result.suggestions[0].symptom, breath);
        assert_eq!(result.suggestions[0].frequency, 2);
        assert_eq!(result.suggestions[1].symptom, sweat);
        assert_eq!(result.suggestions[1].frequency, 1);
        // Selected symptoms never come back as suggestions
        assert!(result.suggestions.iter().all(|s| s.symptom != pain));
    }

    #[test]
    fn test_suggestion_limit_respected() {
        let mut kb = KnowledgeBase::new();
        let d = kb.add_disease("Panic Disorder", None).unwrap();
        let anchor = kb.add_symptom("palpitations", 5.0).unwrap();
        let mut members = vec![GroupMember::new(anchor)];
        for i in 0..8 {
            let s = kb.add_symptom(&format!("symptom {}", i), 1.0).unwrap();
            members.push(GroupMember::new(s));
        }
        kb.add_rule_group(d, members).unwrap();

        let opts = MatcherOptions { suggestion_limit: 3, ..Default::default() };
        let result = diagnose(&kb, &[anchor], &opts);
        assert_eq!(result.suggestions.len(), 3);
    }
}
