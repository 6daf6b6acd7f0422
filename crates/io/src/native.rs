// Native knowledge store format using SQLite

use std::path::Path;

use rusqlite::{params, Connection};

use symdex_engine::knowledge::{
    Disease, DiseaseId, GroupMember, KnowledgeBase, Symptom, SymptomId,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS diseases (
    disease_id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS symptoms (
    symptom_id INTEGER PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    severity REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS rules (
    rule_id INTEGER PRIMARY KEY,
    disease_id INTEGER NOT NULL,
    FOREIGN KEY (disease_id) REFERENCES diseases(disease_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS condition_groups (
    group_id INTEGER PRIMARY KEY,
    rule_id INTEGER NOT NULL,
    FOREIGN KEY (rule_id) REFERENCES rules(rule_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS condition_group_symptoms (
    group_id INTEGER NOT NULL,
    symptom_id INTEGER NOT NULL,
    weight REAL,                     -- NULL = use the symptom's severity
    PRIMARY KEY (group_id, symptom_id),
    FOREIGN KEY (group_id) REFERENCES condition_groups(group_id) ON DELETE CASCADE,
    FOREIGN KEY (symptom_id) REFERENCES symptoms(symptom_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS disease_actions (
    action_id INTEGER PRIMARY KEY AUTOINCREMENT,
    disease_id INTEGER NOT NULL,
    action_text TEXT NOT NULL,
    FOREIGN KEY (disease_id) REFERENCES diseases(disease_id) ON DELETE CASCADE
);
"#;

/// Write the whole knowledge base to a fresh store file.
pub fn save(kb: &KnowledgeBase, path: &Path) -> Result<(), String> {
    // Delete existing file if present (SQLite will create fresh)
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| e.to_string())?;
    }

    let conn = Connection::open(path).map_err(|e| e.to_string())?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(|e| e.to_string())?;
    conn.execute_batch(SCHEMA).map_err(|e| e.to_string())?;

    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)",
        params!["format_version", crate::NATIVE_FORMAT_VERSION.to_string()],
    )
    .map_err(|e| e.to_string())?;

    conn.execute("BEGIN TRANSACTION", []).map_err(|e| e.to_string())?;

    {
        let mut stmt = conn
            .prepare("INSERT INTO symptoms (symptom_id, name, severity) VALUES (?1, ?2, ?3)")
            .map_err(|e| e.to_string())?;
        for symptom in kb.symptoms() {
            stmt.execute(params![symptom.id.0, &symptom.name, symptom.severity])
                .map_err(|e| e.to_string())?;
        }
    }

    {
        let mut stmt = conn
            .prepare("INSERT INTO diseases (disease_id, name, description) VALUES (?1, ?2, ?3)")
            .map_err(|e| e.to_string())?;
        for disease in kb.diseases() {
            stmt.execute(params![disease.id.0, &disease.name, disease.description.as_deref()])
                .map_err(|e| e.to_string())?;
        }
    }

    {
        let mut rule_stmt = conn
            .prepare("INSERT INTO rules (disease_id) VALUES (?1)")
            .map_err(|e| e.to_string())?;
        let mut group_stmt = conn
            .prepare("INSERT INTO condition_groups (rule_id) VALUES (?1)")
            .map_err(|e| e.to_string())?;
        let mut member_stmt = conn
            .prepare(
                "INSERT INTO condition_group_symptoms (group_id, symptom_id, weight) VALUES (?1, ?2, ?3)",
            )
            .map_err(|e| e.to_string())?;
        let mut action_stmt = conn
            .prepare("INSERT INTO disease_actions (disease_id, action_text) VALUES (?1, ?2)")
            .map_err(|e| e.to_string())?;

        for disease in kb.diseases() {
            if let Some(rule) = kb.rule(disease.id) {
                rule_stmt
                    .execute(params![disease.id.0])
                    .map_err(|e| e.to_string())?;
                let rule_id = conn.last_insert_rowid();
                for group in &rule.groups {
                    group_stmt.execute(params![rule_id]).map_err(|e| e.to_string())?;
                    let group_id = conn.last_insert_rowid();
                    for member in &group.members {
                        member_stmt
                            .execute(params![group_id, member.symptom.0, member.weight])
                            .map_err(|e| e.to_string())?;
                    }
                }
            }
            for action in kb.actions(disease.id) {
                action_stmt
                    .execute(params![disease.id.0, action])
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    conn.execute("COMMIT", []).map_err(|e| e.to_string())?;

    Ok(())
}

/// Load a store file into memory. Fails fast with a clear message when
/// the file is missing or is not a knowledge store.
pub fn load(path: &Path) -> Result<KnowledgeBase, String> {
    if !path.exists() {
        return Err(format!("knowledge store not found: {}", path.display()));
    }

    let conn = Connection::open(path).map_err(|e| e.to_string())?;

    // A garbage file surfaces here as "file is not a database"; a foreign
    // SQLite file surfaces as a missing meta table.
    let version: String = conn
        .query_row("SELECT value FROM meta WHERE key = 'format_version'", [], |row| {
            row.get(0)
        })
        .map_err(|e| format!("{} is not a knowledge store: {}", path.display(), e))?;
    let version: u32 = version
        .parse()
        .map_err(|_| format!("{}: bad format_version '{}'", path.display(), version))?;
    if version > crate::NATIVE_FORMAT_VERSION {
        return Err(format!(
            "{}: format version {} is newer than supported ({})",
            path.display(),
            version,
            crate::NATIVE_FORMAT_VERSION
        ));
    }

    let mut kb = KnowledgeBase::new();

    {
        let mut stmt = conn
            .prepare("SELECT symptom_id, name, severity FROM symptoms ORDER BY symptom_id")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Symptom {
                    id: SymptomId(row.get(0)?),
                    name: row.get(1)?,
                    severity: row.get(2)?,
                })
            })
            .map_err(|e| e.to_string())?;
        for symptom in rows {
            let symptom = symptom.map_err(|e| e.to_string())?;
            kb.insert_symptom(symptom)?;
        }
    }

    {
        let mut stmt = conn
            .prepare("SELECT disease_id, name, description FROM diseases ORDER BY disease_id")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Disease {
                    id: DiseaseId(row.get(0)?),
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            })
            .map_err(|e| e.to_string())?;
        for disease in rows {
            let disease = disease.map_err(|e| e.to_string())?;
            kb.insert_disease(disease)?;
        }
    }

    {
        let mut stmt = conn
            .prepare(
                "SELECT r.disease_id, cg.group_id, cgs.symptom_id, cgs.weight
                 FROM rules r
                 JOIN condition_groups cg ON r.rule_id = cg.rule_id
                 JOIN condition_group_symptoms cgs ON cg.group_id = cgs.group_id
                 ORDER BY r.disease_id, cg.group_id, cgs.symptom_id",
            )
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                let disease: i64 = row.get(0)?;
                let group: i64 = row.get(1)?;
                let symptom: i64 = row.get(2)?;
                let weight: Option<f64> = row.get(3)?;
                Ok((disease, group, symptom, weight))
            })
            .map_err(|e| e.to_string())?;

        // Reconstruct groups from the flat join on group_id boundaries
        let mut current: Option<(DiseaseId, i64)> = None;
        let mut members: Vec<GroupMember> = Vec::new();
        for row in rows {
            let (disease, group, symptom, weight) = row.map_err(|e| e.to_string())?;
            let disease = DiseaseId(disease);
            if current != Some((disease, group)) {
                if let Some((d, _)) = current.take() {
                    kb.add_rule_group(d, std::mem::take(&mut members))?;
                }
                current = Some((disease, group));
            }
            members.push(GroupMember {
                symptom: SymptomId(symptom),
                weight,
            });
        }
        if let Some((d, _)) = current {
            kb.add_rule_group(d, members)?;
        }
    }

    {
        let mut stmt = conn
            .prepare("SELECT disease_id, action_text FROM disease_actions ORDER BY action_id")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                let disease: i64 = row.get(0)?;
                let text: String = row.get(1)?;
                Ok((disease, text))
            })
            .map_err(|e| e.to_string())?;
        for row in rows {
            let (disease, text) = row.map_err(|e| e.to_string())?;
            kb.add_action(DiseaseId(disease), &text)?;
        }
    }

    kb.validate()?;

    Ok(kb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        let angina = kb
            .add_disease("Angina", Some("Reduced blood flow to the heart"))
            .unwrap();
        let mi = kb.add_disease("Myocardial Infarction", None).unwrap();
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
        kb.add_rule_group(mi, vec![GroupMember::new(pain), GroupMember::new(breath)])
            .unwrap();
        kb.add_rule_group(mi, vec![GroupMember::new(fatigue)]).unwrap();
        kb.add_action(angina, "rest and monitor").unwrap();
        kb.add_action(angina, "consult a cardiologist").unwrap();
        kb
    }

    #[test]
    fn test_store_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kb.symdex");

        let kb = sample_kb();
        save(&kb, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.disease_count(), 2);
        assert_eq!(loaded.symptom_count(), 3);

        let angina = loaded.disease_by_name("Angina").unwrap();
        assert_eq!(
            angina.description.as_deref(),
            Some("Reduced blood flow to the heart")
        );
        assert_eq!(
            loaded.actions(angina.id),
            &["rest and monitor", "consult a cardiologist"]
        );

        // Rule weights and group structure survive
        let rule = loaded.rule(angina.id).unwrap();
        assert_eq!(rule.groups.len(), 1);
        let pain = loaded.symptom_by_name("chest pain").unwrap();
        let member = rule.groups[0]
            .members
            .iter()
            .find(|m| m.symptom == pain.id)
            .unwrap();
        assert_eq!(member.weight, Some(0.6));

        let mi = loaded.disease_by_name("Myocardial Infarction").unwrap();
        assert_eq!(loaded.rule(mi.id).unwrap().groups.len(), 2);
    }

    #[test]
    fn test_ids_preserved_across_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kb.symdex");

        let kb = sample_kb();
        save(&kb, &path).unwrap();
        let loaded = load(&path).unwrap();

        for disease in kb.diseases() {
            assert_eq!(
                loaded.disease_by_name(&disease.name).map(|d| d.id),
                Some(disease.id)
            );
        }
        for symptom in kb.symptoms() {
            assert_eq!(
                loaded.symptom_by_name(&symptom.name).map(|s| s.id),
                Some(symptom.id)
            );
        }
    }

    #[test]
    fn test_load_missing_file_fails_fast() {
        let err = load(Path::new("/nonexistent/kb.symdex")).unwrap_err();
        assert!(err.contains("not found"), "got: {}", err);
    }

    #[test]
    fn test_load_garbage_file_fails_fast() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.symdex");
        std::fs::write(&path, "this is not a database").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.contains("not a knowledge store"), "got: {}", err);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kb.symdex");

        save(&sample_kb(), &path).unwrap();

        let mut small = KnowledgeBase::new();
        small.add_disease("Pericarditis", None).unwrap();
        save(&small, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.disease_count(), 1);
        assert!(loaded.disease_by_name("Angina").is_none());
    }
}
