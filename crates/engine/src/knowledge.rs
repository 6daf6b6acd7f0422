//! Knowledge base - diseases, symptoms, and the rules linking them
//!
//! The knowledge base is the canonical in-memory form of the rule store:
//! - Diseases and symptoms are identified by stable integer ids
//! - A disease has at most one rule; a rule is a list of condition groups
//! - A condition group is a non-empty AND-set of symptoms; groups are ORed
//! - Group members may override the symptom's severity weight within the rule
//!
//! Key invariants (enforced at insert time and by `validate`):
//! - Names are unique per kind (case-sensitive, as stored)
//! - Every group member references an existing symptom
//! - Every rule and action references an existing disease
//! - No condition group is empty
//! - No two groups of the same disease share a symptom-id fingerprint

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Stable identifier for a disease. Ordering is the deterministic
/// tie-breaker everywhere scores collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiseaseId(pub i64);

/// Stable identifier for a symptom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymptomId(pub i64);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Disease {
    pub id: DiseaseId,
    pub name: String,
    pub description: Option<String>,
}

/// A symptom with its severity weight (non-negative; 0.0 = unrated).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Symptom {
    pub id: SymptomId,
    pub name: String,
    pub severity: f64,
}

/// One symptom inside a condition group, with an optional weight that
/// overrides the symptom's severity within this rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GroupMember {
    pub symptom: SymptomId,
    pub weight: Option<f64>,
}

impl GroupMember {
    pub fn new(symptom: SymptomId) -> Self {
        Self { symptom, weight: None }
    }

    pub fn weighted(symptom: SymptomId, weight: f64) -> Self {
        Self { symptom, weight: Some(weight) }
    }
}

/// A non-empty AND-set of symptoms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionGroup {
    pub members: Vec<GroupMember>,
}

impl ConditionGroup {
    /// Sorted symptom-id fingerprint used for duplicate-group detection.
    /// Two groups with the same symptoms are the same group, regardless
    /// of member order.
    pub fn fingerprint(&self) -> Vec<SymptomId> {
        let mut ids: Vec<SymptomId> = self.members.iter().map(|m| m.symptom).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// All condition groups for one disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseRule {
    pub disease: DiseaseId,
    pub groups: Vec<ConditionGroup>,
}

/// In-memory knowledge base with id and name lookup both ways.
///
/// Read-mostly at runtime: the matcher only borrows it. Mutation happens
/// during import or via the manual add/remove operations.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    diseases: Vec<Disease>,
    symptoms: Vec<Symptom>,
    rules: FxHashMap<DiseaseId, DiseaseRule>,
    actions: FxHashMap<DiseaseId, Vec<String>>,

    // Lookup indices, kept in sync with the vectors above
    disease_index: FxHashMap<DiseaseId, usize>,
    symptom_index: FxHashMap<SymptomId, usize>,
    disease_by_name: FxHashMap<String, DiseaseId>,
    symptom_by_name: FxHashMap<String, SymptomId>,

    next_disease_id: i64,
    next_symptom_id: i64,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self {
            next_disease_id: 1,
            next_symptom_id: 1,
            ..Default::default()
        }
    }

    // -------------------------------------------------------------------
    // Diseases
    // -------------------------------------------------------------------

    /// Insert a disease with an explicit id (store loader path).
    /// Rejects duplicate ids and duplicate names.
    pub fn insert_disease(&mut self, disease: Disease) -> Result<(), String> {
        if self.disease_index.contains_key(&disease.id) {
            return Err(format!("duplicate disease id {}", disease.id.0));
        }
        if self.disease_by_name.contains_key(&disease.name) {
            return Err(format!("duplicate disease name '{}'", disease.name));
        }
        self.next_disease_id = self.next_disease_id.max(disease.id.0 + 1);
        self.disease_index.insert(disease.id, self.diseases.len());
        self.disease_by_name.insert(disease.name.clone(), disease.id);
        self.diseases.push(disease);
        Ok(())
    }

    /// Add a new disease with the next free id. Errors if the name is taken.
    pub fn add_disease(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<DiseaseId, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("disease name cannot be empty".into());
        }
        if self.disease_by_name.contains_key(name) {
            return Err(format!("disease '{}' already exists", name));
        }
        let id = DiseaseId(self.next_disease_id);
        self.insert_disease(Disease {
            id,
            name: name.to_string(),
            description: description.map(|d| d.to_string()),
        })?;
        Ok(id)
    }

    /// Get-or-create by name. Import paths hit the same disease from
    /// several source files, so this is deliberately idempotent.
    pub fn upsert_disease(&mut self, name: &str) -> Result<DiseaseId, String> {
        if let Some(&id) = self.disease_by_name.get(name.trim()) {
            return Ok(id);
        }
        self.add_disease(name, None)
    }

    pub fn set_description(&mut self, id: DiseaseId, description: &str) -> Result<(), String> {
        let idx = self
            .disease_index
            .get(&id)
            .copied()
            .ok_or_else(|| format!("unknown disease id {}", id.0))?;
        self.diseases[idx].description = if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        };
        Ok(())
    }

    pub fn disease(&self, id: DiseaseId) -> Option<&Disease> {
        self.disease_index.get(&id).map(|&i| &self.diseases[i])
    }

    pub fn disease_by_name(&self, name: &str) -> Option<&Disease> {
        self.disease_by_name.get(name).and_then(|&id| self.disease(id))
    }

    /// All diseases in ascending id order.
    pub fn diseases(&self) -> impl Iterator<Item = &Disease> {
        let mut sorted: Vec<&Disease> = self.diseases.iter().collect();
        sorted.sort_by_key(|d| d.id);
        sorted.into_iter()
    }

    pub fn disease_count(&self) -> usize {
        self.diseases.len()
    }

    /// Remove a disease and everything hanging off it (rule, actions).
    pub fn remove_disease(&mut self, id: DiseaseId) -> Result<(), String> {
        let idx = self
            .disease_index
            .remove(&id)
            .ok_or_else(|| format!("unknown disease id {}", id.0))?;
        let removed = self.diseases.remove(idx);
        self.disease_by_name.remove(&removed.name);
        self.rules.remove(&id);
        self.actions.remove(&id);
        // Reindex the tail shifted by the removal
        for (i, d) in self.diseases.iter().enumerate().skip(idx) {
            self.disease_index.insert(d.id, i);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Symptoms
    // -------------------------------------------------------------------

    /// Insert a symptom with an explicit id (store loader path).
    pub fn insert_symptom(&mut self, symptom: Symptom) -> Result<(), String> {
        if self.symptom_index.contains_key(&symptom.id) {
            return Err(format!("duplicate symptom id {}", symptom.id.0));
        }
        if self.symptom_by_name.contains_key(&symptom.name) {
            return Err(format!("duplicate symptom name '{}'", symptom.name));
        }
        if !symptom.severity.is_finite() || symptom.severity < 0.0 {
            return Err(format!(
                "symptom '{}' has invalid severity {}",
                symptom.name, symptom.severity
            ));
        }
        self.next_symptom_id = self.next_symptom_id.max(symptom.id.0 + 1);
        self.symptom_index.insert(symptom.id, self.symptoms.len());
        self.symptom_by_name.insert(symptom.name.clone(), symptom.id);
        self.symptoms.push(symptom);
        Ok(())
    }

    /// Add a new symptom with the next free id. Errors if the name is taken.
    pub fn add_symptom(&mut self, name: &str, severity: f64) -> Result<SymptomId, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("symptom name cannot be empty".into());
        }
        if self.symptom_by_name.contains_key(name) {
            return Err(format!("symptom '{}' already exists", name));
        }
        let id = SymptomId(self.next_symptom_id);
        self.insert_symptom(Symptom {
            id,
            name: name.to_string(),
            severity,
        })?;
        Ok(id)
    }

    /// Get-or-create by name. A `Some` severity also updates an existing
    /// symptom's weight, mirroring how severity arrives in a separate
    /// source file from the rules that first mention the symptom.
    pub fn upsert_symptom(&mut self, name: &str, severity: Option<f64>) -> Result<SymptomId, String> {
        if let Some(&id) = self.symptom_by_name.get(name.trim()) {
            if let Some(sev) = severity {
                self.set_severity(id, sev)?;
            }
            return Ok(id);
        }
        self.add_symptom(name, severity.unwrap_or(0.0))
    }

    pub fn set_severity(&mut self, id: SymptomId, severity: f64) -> Result<(), String> {
        if !severity.is_finite() || severity < 0.0 {
            return Err(format!("invalid severity {}", severity));
        }
        let idx = self
            .symptom_index
            .get(&id)
            .copied()
            .ok_or_else(|| format!("unknown symptom id {}", id.0))?;
        self.symptoms[idx].severity = severity;
        Ok(())
    }

    pub fn symptom(&self, id: SymptomId) -> Option<&Symptom> {
        self.symptom_index.get(&id).map(|&i| &self.symptoms[i])
    }

    pub fn symptom_by_name(&self, name: &str) -> Option<&Symptom> {
        self.symptom_by_name.get(name).and_then(|&id| self.symptom(id))
    }

    /// All symptoms in ascending id order.
    pub fn symptoms(&self) -> impl Iterator<Item = &Symptom> {
        let mut sorted: Vec<&Symptom> = self.symptoms.iter().collect();
        sorted.sort_by_key(|s| s.id);
        sorted.into_iter()
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    /// Remove a symptom and strip it from every condition group.
    /// Groups emptied by the removal are dropped, and rules left with no
    /// groups disappear with them.
    pub fn remove_symptom(&mut self, id: SymptomId) -> Result<(), String> {
        let idx = self
            .symptom_index
            .remove(&id)
            .ok_or_else(|| format!("unknown symptom id {}", id.0))?;
        let removed = self.symptoms.remove(idx);
        self.symptom_by_name.remove(&removed.name);
        for (i, s) in self.symptoms.iter().enumerate().skip(idx) {
            self.symptom_index.insert(s.id, i);
        }

        let mut emptied: Vec<DiseaseId> = Vec::new();
        for rule in self.rules.values_mut() {
            for group in rule.groups.iter_mut() {
                group.members.retain(|m| m.symptom != id);
            }
            rule.groups.retain(|g| !g.members.is_empty());
            if rule.groups.is_empty() {
                emptied.push(rule.disease);
            }
        }
        for disease in emptied {
            self.rules.remove(&disease);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Rules and actions
    // -------------------------------------------------------------------

    /// Add one condition group to a disease's rule, creating the rule on
    /// first use. A symptom mentioned twice in the same group collapses to
    /// one member (first mention wins). Returns false when the group is a
    /// duplicate of one the disease already has (same symptom fingerprint).
    pub fn add_rule_group(
        &mut self,
        disease: DiseaseId,
        members: Vec<GroupMember>,
    ) -> Result<bool, String> {
        if !self.disease_index.contains_key(&disease) {
            return Err(format!("unknown disease id {}", disease.0));
        }
        if members.is_empty() {
            return Err("condition group cannot be empty".into());
        }
        for m in &members {
            if !self.symptom_index.contains_key(&m.symptom) {
                return Err(format!("unknown symptom id {}", m.symptom.0));
            }
            if let Some(w) = m.weight {
                if !w.is_finite() || w < 0.0 {
                    return Err(format!("invalid group weight {}", w));
                }
            }
        }

        let mut seen: FxHashSet<SymptomId> = FxHashSet::default();
        let mut unique = Vec::with_capacity(members.len());
        for m in members {
            if seen.insert(m.symptom) {
                unique.push(m);
            }
        }

        let group = ConditionGroup { members: unique };
        let rule = self.rules.entry(disease).or_insert_with(|| DiseaseRule {
            disease,
            groups: Vec::new(),
        });
        let fingerprint = group.fingerprint();
        if rule.groups.iter().any(|g| g.fingerprint() == fingerprint) {
            return Ok(false);
        }
        rule.groups.push(group);
        Ok(true)
    }

    pub fn rule(&self, disease: DiseaseId) -> Option<&DiseaseRule> {
        self.rules.get(&disease)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn add_action(&mut self, disease: DiseaseId, text: &str) -> Result<(), String> {
        if !self.disease_index.contains_key(&disease) {
            return Err(format!("unknown disease id {}", disease.0));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err("action text cannot be empty".into());
        }
        let actions = self.actions.entry(disease).or_default();
        // The same recommendation often appears in several source rows
        if !actions.iter().any(|a| a == text) {
            actions.push(text.to_string());
        }
        Ok(())
    }

    pub fn actions(&self, disease: DiseaseId) -> &[String] {
        self.actions.get(&disease).map(Vec::as_slice).unwrap_or(&[])
    }

    // -------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------

    /// Re-check the referential invariants. Insert paths already enforce
    /// them; this guards data arriving from a store file written by
    /// something else.
    pub fn validate(&self) -> Result<(), String> {
        for rule in self.rules.values() {
            let name = self
                .disease(rule.disease)
                .map(|d| d.name.clone())
                .ok_or_else(|| format!("rule references unknown disease id {}", rule.disease.0))?;
            if rule.groups.is_empty() {
                return Err(format!("disease '{}' has a rule with no groups", name));
            }
            let mut seen: FxHashSet<Vec<SymptomId>> = FxHashSet::default();
            for group in &rule.groups {
                if group.members.is_empty() {
                    return Err(format!("disease '{}' has an empty condition group", name));
                }
                for m in &group.members {
                    if self.symptom(m.symptom).is_none() {
                        return Err(format!(
                            "disease '{}' references unknown symptom id {}",
                            name, m.symptom.0
                        ));
                    }
                }
                if !seen.insert(group.fingerprint()) {
                    return Err(format!("disease '{}' has duplicate condition groups", name));
                }
            }
        }
        for id in self.actions.keys() {
            if self.disease(*id).is_none() {
                return Err(format!("action references unknown disease id {}", id.0));
            }
        }
        Ok(())
    }
}
