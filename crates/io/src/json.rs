// JSON interchange
//
// Two documents, matching the data the store is populated from:
//
// diseases.json:
//   { "<disease>": { "rules": [ ["symptom", ["symptom", 0.6], ...], ... ],
//                    "description": "...",
//                    "actions": ["...", ...] } }
//   A rule entry is one condition group; a member is either a plain
//   symptom name or a [name, weight] pair overriding the severity.
//
// symptoms.json:
//   { "<symptom>": <severity> }
//   Severity may also be the string "N/A" (imported as 0.0, unrated).
//
// Malformed records are skipped and reported; the rest of the import
// continues. A file that is not valid JSON at all is a hard error.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::{Map, Value};

use symdex_engine::knowledge::{GroupMember, KnowledgeBase};

/// What an import did, including one note per skipped record.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub symptoms: usize,
    pub diseases: usize,
    pub groups: usize,
    pub skipped: Vec<String>,
}

/// Build a fresh knowledge base from the two JSON documents.
pub fn import(diseases_path: &Path, symptoms_path: &Path) -> Result<(KnowledgeBase, ImportReport), String> {
    let mut kb = KnowledgeBase::new();
    let report = import_into(&mut kb, diseases_path, symptoms_path)?;
    Ok((kb, report))
}

/// Merge the two JSON documents into an existing knowledge base.
/// Existing symptoms get their severity updated; existing diseases gain
/// any new groups and actions.
pub fn import_into(
    kb: &mut KnowledgeBase,
    diseases_path: &Path,
    symptoms_path: &Path,
) -> Result<ImportReport, String> {
    let mut report = ImportReport::default();

    let symptom_doc = read_object(symptoms_path)?;
    for (name, value) in &symptom_doc {
        match parse_severity(value) {
            Ok(severity) => {
                kb.upsert_symptom(name, severity)
                    .map_err(|e| format!("symptom '{}': {}", name, e))?;
                report.symptoms += 1;
            }
            Err(reason) => report.skipped.push(format!("symptom '{}': {}", name, reason)),
        }
    }

    let disease_doc = read_object(diseases_path)?;
    for (name, value) in &disease_doc {
        let Some(entry) = value.as_object() else {
            report.skipped.push(format!("disease '{}': expected an object", name));
            continue;
        };
        let disease = match kb.upsert_disease(name) {
            Ok(id) => id,
            Err(e) => {
                report.skipped.push(format!("disease '{}': {}", name, e));
                continue;
            }
        };
        report.diseases += 1;

        if let Some(description) = entry.get("description").and_then(Value::as_str) {
            if !description.is_empty() {
                kb.set_description(disease, description)
                    .map_err(|e| format!("disease '{}': {}", name, e))?;
            }
        }

        for action in entry.get("actions").and_then(Value::as_array).into_iter().flatten() {
            match action.as_str() {
                Some(text) if !text.trim().is_empty() => {
                    kb.add_action(disease, text)
                        .map_err(|e| format!("disease '{}': {}", name, e))?;
                }
                _ => report
                    .skipped
                    .push(format!("disease '{}': action is not a string", name)),
            }
        }

        let Some(rules) = entry.get("rules").and_then(Value::as_array) else {
            report.skipped.push(format!("disease '{}': missing rules array", name));
            continue;
        };
        for (i, group) in rules.iter().enumerate() {
            match parse_group(kb, group) {
                Ok(members) if members.is_empty() => {
                    report
                        .skipped
                        .push(format!("disease '{}': rule group {} is empty", name, i));
                }
                Ok(members) => {
                    let added = kb
                        .add_rule_group(disease, members)
                        .map_err(|e| format!("disease '{}': {}", name, e))?;
                    if added {
                        report.groups += 1;
                    }
                }
                Err(reason) => {
                    report
                        .skipped
                        .push(format!("disease '{}': rule group {}: {}", name, i, reason));
                }
            }
        }
    }

    Ok(report)
}

/// Dump the knowledge base back to the two documents. Diseases without
/// rules are omitted, matching what a diagnosis can ever reach.
pub fn export(kb: &KnowledgeBase, diseases_path: &Path, symptoms_path: &Path) -> Result<(), String> {
    let mut symptom_doc = Map::new();
    for symptom in kb.symptoms() {
        symptom_doc.insert(symptom.name.clone(), json_number(symptom.severity));
    }

    let mut disease_doc = Map::new();
    for disease in kb.diseases() {
        let Some(rule) = kb.rule(disease.id) else { continue };
        let rules: Vec<Value> = rule
            .groups
            .iter()
            .map(|group| {
                group
                    .members
                    .iter()
                    .filter_map(|m| {
                        let name = kb.symptom(m.symptom).map(|s| s.name.clone())?;
                        Some(match m.weight {
                            Some(w) => Value::Array(vec![Value::String(name), json_number(w)]),
                            None => Value::String(name),
                        })
                    })
                    .collect::<Vec<Value>>()
                    .into()
            })
            .collect();

        let mut entry = Map::new();
        entry.insert("rules".into(), rules.into());
        entry.insert(
            "description".into(),
            Value::String(disease.description.clone().unwrap_or_default()),
        );
        entry.insert(
            "actions".into(),
            Value::Array(
                kb.actions(disease.id)
                    .iter()
                    .map(|a| Value::String(a.clone()))
                    .collect(),
            ),
        );
        disease_doc.insert(disease.name.clone(), Value::Object(entry));
    }

    write_pretty(diseases_path, &Value::Object(disease_doc))?;
    write_pretty(symptoms_path, &Value::Object(symptom_doc))?;
    Ok(())
}

fn read_object(path: &Path) -> Result<Map<String, Value>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| format!("{}: invalid JSON: {}", path.display(), e))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(format!("{}: expected a top-level object", path.display())),
    }
}

fn write_pretty(path: &Path, value: &Value) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(|e| e.to_string())
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn parse_severity(value: &Value) -> Result<Option<f64>, String> {
    match value {
        Value::Number(n) => {
            let severity = n.as_f64().unwrap_or(0.0);
            if severity < 0.0 {
                return Err(format!("negative severity {}", severity));
            }
            Ok(Some(severity))
        }
        // Legacy exports write "N/A" for unrated symptoms
        Value::String(s) if s.eq_ignore_ascii_case("n/a") => Ok(Some(0.0)),
        Value::String(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("severity '{}' is not a number", s)),
        other => Err(format!("unexpected severity value {}", other)),
    }
}

/// One condition group: members are symptom names or [name, weight]
/// pairs. Unknown symptoms are created unrated, the way the rule sources
/// mention symptoms the severity file never lists.
fn parse_group(kb: &mut KnowledgeBase, group: &Value) -> Result<Vec<GroupMember>, String> {
    let entries = group.as_array().ok_or("expected an array of symptoms")?;
    let mut members = Vec::with_capacity(entries.len());
    for entry in entries {
        let (name, weight) = match entry {
            Value::String(name) => (name.as_str(), None),
            Value::Array(pair) => {
                let name = pair
                    .first()
                    .and_then(Value::as_str)
                    .ok_or("weighted member must start with a symptom name")?;
                let weight = pair
                    .get(1)
                    .and_then(Value::as_f64)
                    .ok_or("weighted member must carry a numeric weight")?;
                if weight < 0.0 {
                    return Err(format!("negative weight {}", weight));
                }
                (name, Some(weight))
            }
            other => return Err(format!("unexpected group member {}", other)),
        };
        if name.trim().is_empty() {
            return Err("empty symptom name".into());
        }
        let symptom = kb.upsert_symptom(name, None)?;
        members.push(GroupMember { symptom, weight });
    }
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_docs(dir: &Path, diseases: &str, symptoms: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let d = dir.join("diseases.json");
        let s = dir.join("symptoms.json");
        fs::write(&d, diseases).unwrap();
        fs::write(&s, symptoms).unwrap();
        (d, s)
    }

    #[test]
    fn test_import_basic_documents() {
        let dir = tempdir().unwrap();
        let (d, s) = write_docs(
            dir.path(),
            r#"{
                "Angina": {
                    "rules": [[["chest pain", 0.6], ["shortness of breath", 0.4], ["fatigue", 0.3]]],
                    "description": "Reduced blood flow",
                    "actions": ["rest", "consult a cardiologist"]
                }
            }"#,
            r#"{ "chest pain": 6, "shortness of breath": 5, "fatigue": 3 }"#,
        );

        let (kb, report) = import(&d, &s).unwrap();
        assert_eq!(report.symptoms, 3);
        assert_eq!(report.diseases, 1);
        assert_eq!(report.groups, 1);
        assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);

        let angina = kb.disease_by_name("Angina").unwrap();
        assert_eq!(angina.description.as_deref(), Some("Reduced blood flow"));
        assert_eq!(kb.actions(angina.id).len(), 2);
        let rule = kb.rule(angina.id).unwrap();
        assert_eq!(rule.groups[0].members.len(), 3);
        assert_eq!(rule.groups[0].members[0].weight, Some(0.6));
    }

    #[test]
    fn test_import_skips_malformed_records() {
        let dir = tempdir().unwrap();
        let (d, s) = write_docs(
            dir.path(),
            r#"{
                "Good": { "rules": [["fever"]] },
                "NoRules": { "description": "no rules key" },
                "BadShape": 42
            }"#,
            r#"{ "fever": 4, "broken": "seven-ish", "unrated": "N/A" }"#,
        );

        let (kb, report) = import(&d, &s).unwrap();
        // fever + unrated imported, "broken" skipped
        assert_eq!(report.symptoms, 2);
        assert_eq!(kb.symptom_by_name("unrated").unwrap().severity, 0.0);
        assert!(kb.symptom_by_name("broken").is_none());

        assert!(kb.disease_by_name("Good").is_some());
        // NoRules still exists as a disease (actions-only entries are legal)
        assert!(kb.disease_by_name("NoRules").is_some());
        assert!(kb.disease_by_name("BadShape").is_none());

        assert_eq!(report.skipped.len(), 3, "skipped: {:?}", report.skipped);
        assert!(report.skipped.iter().any(|n| n.contains("broken")));
        assert!(report.skipped.iter().any(|n| n.contains("NoRules")));
        assert!(report.skipped.iter().any(|n| n.contains("BadShape")));
    }

    #[test]
    fn test_import_creates_unlisted_symptoms_unrated() {
        let dir = tempdir().unwrap();
        let (d, s) = write_docs(
            dir.path(),
            r#"{ "Influenza": { "rules": [["fever", "chills"]] } }"#,
            r#"{ "fever": 4 }"#,
        );

        let (kb, _) = import(&d, &s).unwrap();
        assert_eq!(kb.symptom_by_name("chills").unwrap().severity, 0.0);
    }

    #[test]
    fn test_import_invalid_json_is_fatal() {
        let dir = tempdir().unwrap();
        let (d, s) = write_docs(dir.path(), "{ not json", "{}");
        let err = import(&d, &s).unwrap_err();
        assert!(err.contains("invalid JSON"), "got: {}", err);
    }

    #[test]
    fn test_import_deduplicates_groups() {
        let dir = tempdir().unwrap();
        let (d, s) = write_docs(
            dir.path(),
            r#"{ "Influenza": { "rules": [["fever", "chills"], ["chills", "fever"]] } }"#,
            r#"{}"#,
        );

        let (kb, report) = import(&d, &s).unwrap();
        assert_eq!(report.groups, 1);
        let flu = kb.disease_by_name("Influenza").unwrap();
        assert_eq!(kb.rule(flu.id).unwrap().groups.len(), 1);
    }

    #[test]
    fn test_export_roundtrip_and_ruleless_filter() {
        let dir = tempdir().unwrap();

        let mut kb = KnowledgeBase::new();
        let angina = kb.add_disease("Angina", Some("desc")).unwrap();
        let orphan = kb.add_disease("Orphan", None).unwrap();
        let pain = kb.add_symptom("chest pain", 6.0).unwrap();
        let breath = kb.add_symptom("shortness of breath", 5.0).unwrap();
        kb.add_rule_group(
            angina,
            vec![
                symdex_engine::knowledge::GroupMember::weighted(pain, 0.6),
                symdex_engine::knowledge::GroupMember::new(breath),
            ],
        )
        .unwrap();
        kb.add_action(angina, "rest").unwrap();
        let _ = orphan;

        let d = dir.path().join("out_diseases.json");
        let s = dir.path().join("out_symptoms.json");
        export(&kb, &d, &s).unwrap();

        // Rule-less disease filtered from the disease document
        let doc: Value = serde_json::from_str(&fs::read_to_string(&d).unwrap()).unwrap();
        assert!(doc.get("Angina").is_some());
        assert!(doc.get("Orphan").is_none());

        // And the export loads back equivalent
        let (loaded, report) = import(&d, &s).unwrap();
        assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
        let back = loaded.disease_by_name("Angina").unwrap();
        let rule = loaded.rule(back.id).unwrap();
        assert_eq!(rule.groups.len(), 1);
        let pain_back = loaded.symptom_by_name("chest pain").unwrap();
        assert_eq!(pain_back.severity, 6.0);
        let member = rule.groups[0]
            .members
            .iter()
            .find(|m| m.symptom == pain_back.id)
            .unwrap();
        assert_eq!(member.weight, Some(0.6));
    }
}
