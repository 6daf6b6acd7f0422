// CSV import
//
// Five source formats feed the knowledge base:
// - rules:        Disease,Symptom1,Symptom2,...   one AND-group per row
// - associations: header Disease,SymA,SymB,...    data rows of 1/0 flags
// - descriptions: Disease,Description
// - actions:      Disease,Action1,Action2,...
// - severity:     Symptom,Weight
//
// Rows that cannot be applied are skipped with a note; the import
// continues. Diseases and symptoms are created on first mention.

use std::path::Path;

use symdex_engine::knowledge::{GroupMember, KnowledgeBase};

/// What a CSV import did, including one note per skipped row.
#[derive(Debug, Default)]
pub struct CsvReport {
    pub rows: usize,
    pub groups: usize,
    pub skipped: Vec<String>,
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, String> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

/// True when a leading row is just the column labels, not data.
fn is_header(first_field: &str, label: &str) -> bool {
    first_field.trim().eq_ignore_ascii_case(label)
}

/// Rules CSV: each row is one condition group for the named disease.
/// Rows for the same disease are ORed; duplicate groups are dropped.
pub fn import_rules(kb: &mut KnowledgeBase, path: &Path) -> Result<CsvReport, String> {
    let mut reader = open_reader(path)?;
    let mut report = CsvReport::default();

    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if line == 0 && record.get(0).map(|f| is_header(f, "disease")).unwrap_or(false) {
            continue;
        }
        let Some(disease_name) = record.get(0).map(str::trim).filter(|f| !f.is_empty()) else {
            report.skipped.push(format!("row {}: missing disease name", line + 1));
            continue;
        };
        let symptoms: Vec<&str> = record
            .iter()
            .skip(1)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if symptoms.is_empty() {
            report
                .skipped
                .push(format!("row {}: no symptoms for '{}'", line + 1, disease_name));
            continue;
        }

        let disease = kb.upsert_disease(disease_name)?;
        let mut members = Vec::with_capacity(symptoms.len());
        for name in symptoms {
            members.push(GroupMember::new(kb.upsert_symptom(name, None)?));
        }
        if kb.add_rule_group(disease, members)? {
            report.groups += 1;
        }
        report.rows += 1;
    }

    Ok(report)
}

/// Association matrix CSV: the header names the symptoms, each data row
/// marks with 1/true which of them form one condition group.
pub fn import_associations(kb: &mut KnowledgeBase, path: &Path) -> Result<CsvReport, String> {
    let mut reader = open_reader(path)?;
    let mut report = CsvReport::default();

    let mut records = reader.records();
    let header = match records.next() {
        Some(result) => result.map_err(|e| e.to_string())?,
        None => return Err(format!("{}: empty file", path.display())),
    };
    let symptom_names: Vec<String> = header
        .iter()
        .skip(1)
        .map(|f| f.trim().to_string())
        .collect();
    if symptom_names.iter().all(|name| name.is_empty()) {
        return Err(format!("{}: no symptom columns in header", path.display()));
    }

    for (line, result) in records.enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        let Some(disease_name) = record.get(0).map(str::trim).filter(|f| !f.is_empty()) else {
            report.skipped.push(format!("row {}: missing disease name", line + 2));
            continue;
        };

        let mut present: Vec<&str> = Vec::new();
        for (i, name) in symptom_names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let cell = record.get(i + 1).map(str::trim).unwrap_or("");
            if cell == "1" || cell.eq_ignore_ascii_case("true") {
                present.push(name);
            }
        }
        if present.is_empty() {
            report
                .skipped
                .push(format!("row {}: no symptoms marked for '{}'", line + 2, disease_name));
            continue;
        }

        let disease = kb.upsert_disease(disease_name)?;
        let mut members = Vec::with_capacity(present.len());
        for name in present {
            members.push(GroupMember::new(kb.upsert_symptom(name, None)?));
        }
        if kb.add_rule_group(disease, members)? {
            report.groups += 1;
        }
        report.rows += 1;
    }

    Ok(report)
}

/// Descriptions CSV: Disease,Description.
pub fn import_descriptions(kb: &mut KnowledgeBase, path: &Path) -> Result<CsvReport, String> {
    let mut reader = open_reader(path)?;
    let mut report = CsvReport::default();

    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if line == 0 && record.get(0).map(|f| is_header(f, "disease")).unwrap_or(false) {
            continue;
        }
        let Some(disease_name) = record.get(0).map(str::trim).filter(|f| !f.is_empty()) else {
            report.skipped.push(format!("row {}: missing disease name", line + 1));
            continue;
        };
        let description = record.get(1).map(str::trim).unwrap_or("");

        let disease = kb.upsert_disease(disease_name)?;
        kb.set_description(disease, description)?;
        report.rows += 1;
    }

    Ok(report)
}

/// Actions CSV: Disease,Action1,Action2,... (all non-empty columns).
pub fn import_actions(kb: &mut KnowledgeBase, path: &Path) -> Result<CsvReport, String> {
    let mut reader = open_reader(path)?;
    let mut report = CsvReport::default();

    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if line == 0 && record.get(0).map(|f| is_header(f, "disease")).unwrap_or(false) {
            continue;
        }
        let Some(disease_name) = record.get(0).map(str::trim).filter(|f| !f.is_empty()) else {
            report.skipped.push(format!("row {}: missing disease name", line + 1));
            continue;
        };
        let actions: Vec<&str> = record
            .iter()
            .skip(1)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if actions.is_empty() {
            report
                .skipped
                .push(format!("row {}: no actions for '{}'", line + 1, disease_name));
            continue;
        }

        let disease = kb.upsert_disease(disease_name)?;
        for action in actions {
            kb.add_action(disease, action)?;
        }
        report.rows += 1;
    }

    Ok(report)
}

/// Severity CSV: Symptom,Weight. Unparseable weights skip the row.
pub fn import_severity(kb: &mut KnowledgeBase, path: &Path) -> Result<CsvReport, String> {
    let mut reader = open_reader(path)?;
    let mut report = CsvReport::default();

    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if line == 0 && record.get(0).map(|f| is_header(f, "symptom")).unwrap_or(false) {
            continue;
        }
        let Some(symptom_name) = record.get(0).map(str::trim).filter(|f| !f.is_empty()) else {
            report.skipped.push(format!("row {}: missing symptom name", line + 1));
            continue;
        };
        let raw = record.get(1).map(str::trim).unwrap_or("");
        let severity: f64 = match raw.parse() {
            Ok(v) if v >= 0.0 => v,
            _ => {
                report.skipped.push(format!(
                    "row {}: severity '{}' for '{}' is not a non-negative number",
                    line + 1,
                    raw,
                    symptom_name
                ));
                continue;
            }
        };

        kb.upsert_symptom(symptom_name, Some(severity))?;
        report.rows += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_rules_import_with_dedup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.csv");
        fs::write(
            &path,
            "Disease,Symptom1,Symptom2\n\
             Angina,chest pain,shortness of breath\n\
             Angina,shortness of breath,chest pain\n\
             Angina,fatigue\n",
        )
        .unwrap();

        let mut kb = KnowledgeBase::new();
        let report = import_rules(&mut kb, &path).unwrap();
        assert_eq!(report.rows, 3);
        assert_eq!(report.groups, 2, "reordered duplicate must not count");

        let angina = kb.disease_by_name("Angina").unwrap();
        assert_eq!(kb.rule(angina.id).unwrap().groups.len(), 2);
        assert!(kb.symptom_by_name("chest pain").is_some());
    }

    #[test]
    fn test_rules_import_skips_bad_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.csv");
        fs::write(&path, "Angina,chest pain\n,orphan symptom\nEmptyRow\n").unwrap();

        let mut kb = KnowledgeBase::new();
        let report = import_rules(&mut kb, &path).unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(report.skipped.len(), 2, "skipped: {:?}", report.skipped);
    }

    #[test]
    fn test_associations_matrix() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assoc.csv");
        fs::write(
            &path,
            "Disease,fever,cough,headache\n\
             Influenza,1,1,0\n\
             Migraine,0,0,TRUE\n\
             Nothing,0,0,0\n",
        )
        .unwrap();

        let mut kb = KnowledgeBase::new();
        let report = import_associations(&mut kb, &path).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.groups, 2);
        assert_eq!(report.skipped.len(), 1);

        let flu = kb.disease_by_name("Influenza").unwrap();
        let group = &kb.rule(flu.id).unwrap().groups[0];
        assert_eq!(group.members.len(), 2);
        let migraine = kb.disease_by_name("Migraine").unwrap();
        assert_eq!(kb.rule(migraine.id).unwrap().groups[0].members.len(), 1);
        // All-zero row creates no rule
        let nothing = kb.disease_by_name("Nothing").unwrap();
        assert!(kb.rule(nothing.id).is_none());
    }

    #[test]
    fn test_associations_rejects_headerless_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("assoc.csv");
        fs::write(&path, "Disease\nInfluenza\n").unwrap();

        let mut kb = KnowledgeBase::new();
        assert!(import_associations(&mut kb, &path).is_err());
    }

    #[test]
    fn test_severity_import_reports_bad_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("severity.csv");
        fs::write(
            &path,
            "Symptom,Severity\nfever,4\nchills,not-a-number\nfatigue,3.5\n",
        )
        .unwrap();

        let mut kb = KnowledgeBase::new();
        let report = import_severity(&mut kb, &path).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].contains("chills"));
        assert_eq!(kb.symptom_by_name("fatigue").unwrap().severity, 3.5);
        assert!(kb.symptom_by_name("chills").is_none());
    }

    #[test]
    fn test_descriptions_and_actions() {
        let dir = tempdir().unwrap();
        let desc = dir.path().join("descriptions.csv");
        let acts = dir.path().join("actions.csv");
        fs::write(&desc, "Disease,Description\nAngina,Reduced blood flow\n").unwrap();
        fs::write(&acts, "Disease,Action1,Action2\nAngina,rest,consult a cardiologist\n").unwrap();

        let mut kb = KnowledgeBase::new();
        import_descriptions(&mut kb, &desc).unwrap();
        import_actions(&mut kb, &acts).unwrap();

        let angina = kb.disease_by_name("Angina").unwrap();
        assert_eq!(angina.description.as_deref(), Some("Reduced blood flow"));
        assert_eq!(kb.actions(angina.id), &["rest", "consult a cardiologist"]);
    }
}
