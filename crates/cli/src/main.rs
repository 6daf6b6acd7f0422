// Symdex CLI - headless diagnosis and knowledge store operations

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use symdex_config::Settings;
use symdex_engine::knowledge::{GroupMember, KnowledgeBase};
use symdex_engine::matcher::{diagnose, MatcherOptions};
use symdex_engine::severity::SeverityBand;
use symdex_io::{csv as csv_import, json as json_doc, native};

use exit_codes::{EXIT_ERROR, EXIT_IMPORT, EXIT_STORE, EXIT_SUCCESS, EXIT_UNKNOWN_NAME, EXIT_USAGE};

type CommandError = (u8, String);

#[derive(Parser)]
#[command(name = "symdex")]
#[command(about = "Rule-based symptom-to-diagnosis matcher (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArg {
    /// Knowledge store file (falls back to store.path in settings)
    #[arg(long, short = 'S', env = "SYMDEX_STORE", value_name = "FILE")]
    store: Option<PathBuf>,
}

impl StoreArg {
    fn resolve(&self, settings: &Settings) -> Result<PathBuf, CommandError> {
        self.store
            .clone()
            .or_else(|| settings.store_path.clone())
            .ok_or_else(|| {
                (
                    EXIT_USAGE,
                    "no knowledge store given (use --store, SYMDEX_STORE, or store.path in settings)"
                        .to_string(),
                )
            })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score diseases against a set of selected symptoms
    #[command(after_help = "\
Examples:
  symdex diagnose -S heart.symdex -s 'chest pain' -s 'shortness of breath'
  symdex diagnose -S heart.symdex -s fatigue --json | jq '.candidates[0]'
  SYMDEX_STORE=heart.symdex symdex diagnose -s 'chest pain' --top 3")]
    Diagnose {
        #[command(flatten)]
        store: StoreArg,

        /// Symptom to include (repeatable)
        #[arg(long = "symptom", short = 's', value_name = "NAME")]
        symptoms: Vec<String>,

        /// How many top candidates feed the suggestion pass
        #[arg(long)]
        top: Option<usize>,

        /// Condition-group boost toward certainty, in [0,1)
        #[arg(long)]
        boost: Option<f64>,

        /// Maximum number of suggested symptoms
        #[arg(long)]
        suggest: Option<usize>,

        /// Machine-readable JSON on stdout
        #[arg(long)]
        json: bool,

        /// Suppress stderr notes (e.g. ignored unknown symptoms)
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Populate the store from JSON or CSV sources
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },

    /// Dump the store to the disease and symptom JSON documents
    #[command(after_help = "\
Examples:
  symdex export -S heart.symdex --diseases diseases.json --symptoms symptoms.json")]
    Export {
        #[command(flatten)]
        store: StoreArg,

        /// Output path for the disease document
        #[arg(long, value_name = "FILE")]
        diseases: PathBuf,

        /// Output path for the symptom severity document
        #[arg(long, value_name = "FILE")]
        symptoms: PathBuf,
    },

    /// List store contents
    List {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Show one disease: description, actions, rule groups
    Show {
        #[command(flatten)]
        store: StoreArg,

        /// Disease name
        name: String,

        /// Machine-readable JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Add a disease, symptom, or rule group
    Add {
        #[command(subcommand)]
        command: AddCommands,
    },

    /// Remove a disease or symptom (cascades through rules)
    Remove {
        #[command(subcommand)]
        command: RemoveCommands,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import the disease and symptom JSON documents
    #[command(after_help = "\
Replaces the store by default. Malformed records are skipped and noted
on stderr; a file that is not JSON at all fails the import.

Examples:
  symdex import json -S heart.symdex --diseases diseases.json --symptoms symptoms.json
  symdex import json -S heart.symdex --diseases more.json --symptoms more_severity.json --merge")]
    Json {
        #[command(flatten)]
        store: StoreArg,

        /// Disease document (rules, descriptions, actions)
        #[arg(long, value_name = "FILE")]
        diseases: PathBuf,

        /// Symptom severity document
        #[arg(long, value_name = "FILE")]
        symptoms: PathBuf,

        /// Merge into the existing store instead of replacing it
        #[arg(long)]
        merge: bool,

        /// Suppress stderr notes
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Import one or more CSV sources
    #[command(after_help = "\
Merges into the existing store (if any) unless --replace is given.

Examples:
  symdex import csv -S heart.symdex --rules rules.csv --severity severity.csv
  symdex import csv -S heart.symdex --associations dataset.csv --replace
  symdex import csv -S heart.symdex --descriptions desc.csv --actions actions.csv")]
    Csv {
        #[command(flatten)]
        store: StoreArg,

        /// Rules CSV: Disease,Symptom1,Symptom2,...
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Association matrix CSV with a symptom header row
        #[arg(long, value_name = "FILE")]
        associations: Option<PathBuf>,

        /// Descriptions CSV: Disease,Description
        #[arg(long, value_name = "FILE")]
        descriptions: Option<PathBuf>,

        /// Actions CSV: Disease,Action1,Action2,...
        #[arg(long, value_name = "FILE")]
        actions: Option<PathBuf>,

        /// Severity CSV: Symptom,Weight
        #[arg(long, value_name = "FILE")]
        severity: Option<PathBuf>,

        /// Start from an empty store instead of merging
        #[arg(long)]
        replace: bool,

        /// Suppress stderr notes
        #[arg(long, short = 'q')]
        quiet: bool,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// All diseases with their descriptions
    Diseases {
        #[command(flatten)]
        store: StoreArg,

        /// Machine-readable JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// All symptoms with severity weight and band
    Symptoms {
        #[command(flatten)]
        store: StoreArg,

        /// Machine-readable JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum AddCommands {
    /// Add a new disease
    Disease {
        #[command(flatten)]
        store: StoreArg,

        /// Disease name (must be unique)
        name: String,

        /// Description text
        #[arg(long)]
        description: Option<String>,
    },

    /// Add a new symptom
    Symptom {
        #[command(flatten)]
        store: StoreArg,

        /// Symptom name (must be unique)
        name: String,

        /// Severity weight (non-negative)
        #[arg(long, default_value = "0")]
        severity: f64,
    },

    /// Add one condition group (AND-set of symptoms) to a disease
    #[command(after_help = "\
Examples:
  symdex add rule -S heart.symdex Angina -s 'chest pain' -s 'shortness of breath'")]
    Rule {
        #[command(flatten)]
        store: StoreArg,

        /// Disease name
        disease: String,

        /// Symptom in the group (repeatable)
        #[arg(long = "symptom", short = 's', value_name = "NAME", required = true)]
        symptoms: Vec<String>,
    },

    /// Add a recommended action to a disease
    Action {
        #[command(flatten)]
        store: StoreArg,

        /// Disease name
        disease: String,

        /// Action text
        text: String,
    },
}

#[derive(Subcommand)]
enum RemoveCommands {
    /// Remove a disease with its rule and actions
    Disease {
        #[command(flatten)]
        store: StoreArg,

        /// Disease name
        name: String,
    },

    /// Remove a symptom, stripping it from every condition group
    Symptom {
        #[command(flatten)]
        store: StoreArg,

        /// Symptom name
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load();

    let result = match cli.command {
        Commands::Diagnose { store, symptoms, top, boost, suggest, json, quiet } => {
            run_diagnose(&store, &settings, symptoms, top, boost, suggest, json, quiet)
        }
        Commands::Import { command } => match command {
            ImportCommands::Json { store, diseases, symptoms, merge, quiet } => {
                run_import_json(&store, &settings, &diseases, &symptoms, merge, quiet)
            }
            ImportCommands::Csv {
                store,
                rules,
                associations,
                descriptions,
                actions,
                severity,
                replace,
                quiet,
            } => run_import_csv(
                &store,
                &settings,
                CsvSources { rules, associations, descriptions, actions, severity },
                replace,
                quiet,
            ),
        },
        Commands::Export { store, diseases, symptoms } => {
            run_export(&store, &settings, &diseases, &symptoms)
        }
        Commands::List { command } => match command {
            ListCommands::Diseases { store, json } => run_list_diseases(&store, &settings, json),
            ListCommands::Symptoms { store, json } => run_list_symptoms(&store, &settings, json),
        },
        Commands::Show { store, name, json } => run_show(&store, &settings, &name, json),
        Commands::Add { command } => match command {
            AddCommands::Disease { store, name, description } => {
                run_add_disease(&store, &settings, &name, description.as_deref())
            }
            AddCommands::Symptom { store, name, severity } => {
                run_add_symptom(&store, &settings, &name, severity)
            }
            AddCommands::Rule { store, disease, symptoms } => {
                run_add_rule(&store, &settings, &disease, &symptoms)
            }
            AddCommands::Action { store, disease, text } => {
                run_add_action(&store, &settings, &disease, &text)
            }
        },
        Commands::Remove { command } => match command {
            RemoveCommands::Disease { store, name } => {
                run_remove_disease(&store, &settings, &name)
            }
            RemoveCommands::Symptom { store, name } => {
                run_remove_symptom(&store, &settings, &name)
            }
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err((code, message)) => {
            eprintln!("error: {}", message);
            ExitCode::from(code)
        }
    }
}

fn load_store(path: &Path) -> Result<KnowledgeBase, CommandError> {
    native::load(path).map_err(|e| (EXIT_STORE, e))
}

fn save_store(kb: &KnowledgeBase, path: &Path) -> Result<(), CommandError> {
    native::save(kb, path).map_err(|e| (EXIT_STORE, e))
}

// ---------------------------------------------------------------------------
// diagnose
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn run_diagnose(
    store: &StoreArg,
    settings: &Settings,
    symptoms: Vec<String>,
    top: Option<usize>,
    boost: Option<f64>,
    suggest: Option<usize>,
    json: bool,
    quiet: bool,
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let kb = load_store(&path)?;

    if symptoms.is_empty() {
        if json {
            println!(
                "{}",
                serde_json::json!({ "candidates": [], "suggestions": [], "unknown": [] })
            );
        } else {
            println!("No symptoms selected. Add at least one with --symptom.");
        }
        return Ok(());
    }

    let mut selected = Vec::new();
    let mut unknown: Vec<String> = Vec::new();
    for name in &symptoms {
        let name = name.trim();
        match kb.symptom_by_name(name) {
            Some(symptom) => selected.push(symptom.id),
            None => unknown.push(name.to_string()),
        }
    }
    if !quiet {
        for name in &unknown {
            eprintln!("note: unknown symptom '{}' ignored", name);
        }
    }

    let opts = MatcherOptions {
        top_candidates: top.unwrap_or(settings.top_candidates),
        group_boost: boost.unwrap_or(settings.group_boost),
        suggestion_limit: suggest.unwrap_or(settings.suggestion_limit),
    };
    let result = diagnose(&kb, &selected, &opts);

    if json {
        let payload = serde_json::json!({
            "candidates": result.candidates,
            "suggestions": result.suggestions,
            "unknown": unknown,
        });
        let output =
            serde_json::to_string_pretty(&payload).map_err(|e| (EXIT_ERROR, e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    if result.candidates.is_empty() {
        println!("No matching diseases for the selected symptoms.");
        return Ok(());
    }

    let threshold = settings.likely_threshold;
    let likely: Vec<_> = result
        .candidates
        .iter()
        .filter(|c| c.confidence >= threshold)
        .collect();

    if likely.is_empty() {
        println!(
            "No disease reached {:.0}% confidence. Closest candidates:",
            threshold * 100.0
        );
        for candidate in result.candidates.iter().take(opts.top_candidates) {
            println!("  {:<36} {:>5.1}%", candidate.name, candidate.confidence * 100.0);
        }
    } else {
        println!("Likely diagnoses (confidence >= {:.0}%):", threshold * 100.0);
        for candidate in &likely {
            println!("  {:<36} {:>5.1}%", candidate.name, candidate.confidence * 100.0);
        }

        // Details for the top diagnosis
        let top_candidate = &result.candidates[0];
        if let Some(disease) = kb.disease(top_candidate.disease) {
            if let Some(description) = &disease.description {
                println!("\n{}: {}", disease.name, description);
            }
            let actions = kb.actions(disease.id);
            if !actions.is_empty() {
                println!("Recommended actions:");
                for action in actions {
                    println!("  - {}", action);
                }
            }
        }

        let others = result.candidates.len() - likely.len();
        if others > 0 {
            println!("\n({} lower-confidence candidates not shown)", others);
        }
    }

    if !result.suggestions.is_empty() {
        println!("\nYou might also ask about:");
        for suggestion in &result.suggestions {
            println!("  {:<36} seen in {} rule groups", suggestion.name, suggestion.frequency);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// import / export
// ---------------------------------------------------------------------------

fn run_import_json(
    store: &StoreArg,
    settings: &Settings,
    diseases: &Path,
    symptoms: &Path,
    merge: bool,
    quiet: bool,
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;

    let (kb, report) = if merge {
        let mut kb = load_store(&path)?;
        let report =
            json_doc::import_into(&mut kb, diseases, symptoms).map_err(|e| (EXIT_IMPORT, e))?;
        (kb, report)
    } else {
        json_doc::import(diseases, symptoms).map_err(|e| (EXIT_IMPORT, e))?
    };

    save_store(&kb, &path)?;

    if !quiet {
        for note in &report.skipped {
            eprintln!("note: skipped {}", note);
        }
    }
    println!(
        "Imported {} symptoms, {} diseases, {} rule groups into {}",
        report.symptoms,
        report.diseases,
        report.groups,
        path.display()
    );
    Ok(())
}

struct CsvSources {
    rules: Option<PathBuf>,
    associations: Option<PathBuf>,
    descriptions: Option<PathBuf>,
    actions: Option<PathBuf>,
    severity: Option<PathBuf>,
}

fn run_import_csv(
    store: &StoreArg,
    settings: &Settings,
    sources: CsvSources,
    replace: bool,
    quiet: bool,
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;

    if sources.rules.is_none()
        && sources.associations.is_none()
        && sources.descriptions.is_none()
        && sources.actions.is_none()
        && sources.severity.is_none()
    {
        return Err((EXIT_USAGE, "no CSV sources given (see symdex import csv --help)".into()));
    }

    let mut kb = if replace || !path.exists() {
        KnowledgeBase::new()
    } else {
        load_store(&path)?
    };

    let mut rows = 0;
    let mut groups = 0;
    let mut notes: Vec<String> = Vec::new();

    // Severity first so symptoms created by rule rows carry weights
    let imports: [(&Option<PathBuf>, fn(&mut KnowledgeBase, &Path) -> Result<csv_import::CsvReport, String>); 5] = [
        (&sources.severity, csv_import::import_severity),
        (&sources.descriptions, csv_import::import_descriptions),
        (&sources.actions, csv_import::import_actions),
        (&sources.rules, csv_import::import_rules),
        (&sources.associations, csv_import::import_associations),
    ];
    for (source, import) in imports {
        if let Some(source) = source {
            let report = import(&mut kb, source).map_err(|e| (EXIT_IMPORT, e))?;
            rows += report.rows;
            groups += report.groups;
            notes.extend(report.skipped);
        }
    }

    save_store(&kb, &path)?;

    if !quiet {
        for note in &notes {
            eprintln!("note: skipped {}", note);
        }
    }
    println!(
        "Imported {} rows ({} rule groups) into {}",
        rows,
        groups,
        path.display()
    );
    Ok(())
}

fn run_export(
    store: &StoreArg,
    settings: &Settings,
    diseases: &Path,
    symptoms: &Path,
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let kb = load_store(&path)?;
    json_doc::export(&kb, diseases, symptoms).map_err(|e| (EXIT_ERROR, e))?;
    let with_rules = kb.diseases().filter(|d| kb.rule(d.id).is_some()).count();
    println!(
        "Exported {} diseases and {} symptoms",
        with_rules,
        kb.symptom_count()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// list / show
// ---------------------------------------------------------------------------

fn run_list_diseases(store: &StoreArg, settings: &Settings, json: bool) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let kb = load_store(&path)?;

    if json {
        let rows: Vec<serde_json::Value> = kb
            .diseases()
            .map(|d| {
                serde_json::json!({
                    "id": d.id,
                    "name": d.name,
                    "description": d.description,
                    "groups": kb.rule(d.id).map(|r| r.groups.len()).unwrap_or(0),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).map_err(|e| (EXIT_ERROR, e.to_string()))?
        );
        return Ok(());
    }

    for disease in kb.diseases() {
        let description = disease.description.as_deref().unwrap_or("");
        println!("{:>4}  {:<36} {}", disease.id.0, disease.name, description);
    }
    Ok(())
}

fn run_list_symptoms(store: &StoreArg, settings: &Settings, json: bool) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let kb = load_store(&path)?;

    if json {
        let rows: Vec<serde_json::Value> = kb
            .symptoms()
            .map(|s| {
                serde_json::json!({
                    "id": s.id,
                    "name": s.name,
                    "severity": s.severity,
                    "band": SeverityBand::classify(s.severity).label(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).map_err(|e| (EXIT_ERROR, e.to_string()))?
        );
        return Ok(());
    }

    for symptom in kb.symptoms() {
        println!(
            "{:>4}  {:<36} {:>5.1}  {}",
            symptom.id.0,
            symptom.name,
            symptom.severity,
            SeverityBand::classify(symptom.severity).label()
        );
    }
    Ok(())
}

fn run_show(
    store: &StoreArg,
    settings: &Settings,
    name: &str,
    json: bool,
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let kb = load_store(&path)?;

    let disease = kb
        .disease_by_name(name)
        .ok_or_else(|| (EXIT_UNKNOWN_NAME, format!("unknown disease '{}'", name)))?;
    let member_name = |m: &GroupMember| {
        kb.symptom(m.symptom)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("symptom {}", m.symptom.0))
    };

    if json {
        let groups: Vec<serde_json::Value> = kb
            .rule(disease.id)
            .map(|rule| {
                rule.groups
                    .iter()
                    .map(|group| {
                        group
                            .members
                            .iter()
                            .map(|m| match m.weight {
                                Some(w) => serde_json::json!([member_name(m), w]),
                                None => serde_json::json!(member_name(m)),
                            })
                            .collect::<Vec<serde_json::Value>>()
                            .into()
                    })
                    .collect()
            })
            .unwrap_or_default();
        let payload = serde_json::json!({
            "id": disease.id,
            "name": disease.name,
            "description": disease.description,
            "actions": kb.actions(disease.id),
            "groups": groups,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| (EXIT_ERROR, e.to_string()))?
        );
        return Ok(());
    }

    println!("{}", disease.name);
    if let Some(description) = &disease.description {
        println!("  {}", description);
    }
    let actions = kb.actions(disease.id);
    if !actions.is_empty() {
        println!("Recommended actions:");
        for action in actions {
            println!("  - {}", action);
        }
    }
    match kb.rule(disease.id) {
        Some(rule) => {
            println!("Rules:");
            for (i, group) in rule.groups.iter().enumerate() {
                let members: Vec<String> = group
                    .members
                    .iter()
                    .map(|m| match m.weight {
                        Some(w) => format!("{} (weight {})", member_name(m), w),
                        None => member_name(m),
                    })
                    .collect();
                let prefix = if i == 0 { "  " } else { "  OR " };
                println!("{}(ALL of: {})", prefix, members.join(", "));
            }
        }
        None => println!("Rules: none"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// add / remove
// ---------------------------------------------------------------------------

fn run_add_disease(
    store: &StoreArg,
    settings: &Settings,
    name: &str,
    description: Option<&str>,
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let mut kb = load_store(&path)?;
    let id = kb.add_disease(name, description).map_err(|e| (EXIT_ERROR, e))?;
    save_store(&kb, &path)?;
    println!("Added disease '{}' (id {})", name, id.0);
    Ok(())
}

fn run_add_symptom(
    store: &StoreArg,
    settings: &Settings,
    name: &str,
    severity: f64,
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let mut kb = load_store(&path)?;
    let id = kb.add_symptom(name, severity).map_err(|e| (EXIT_ERROR, e))?;
    save_store(&kb, &path)?;
    println!("Added symptom '{}' (id {})", name, id.0);
    Ok(())
}

fn run_add_rule(
    store: &StoreArg,
    settings: &Settings,
    disease: &str,
    symptoms: &[String],
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let mut kb = load_store(&path)?;

    let disease_id = kb
        .disease_by_name(disease)
        .map(|d| d.id)
        .ok_or_else(|| (EXIT_UNKNOWN_NAME, format!("unknown disease '{}'", disease)))?;

    let mut members = Vec::new();
    for name in symptoms {
        let name = name.trim();
        match kb.symptom_by_name(name) {
            Some(symptom) => members.push(GroupMember::new(symptom.id)),
            None => eprintln!("note: unknown symptom '{}' skipped", name),
        }
    }
    if members.is_empty() {
        return Err((EXIT_UNKNOWN_NAME, "no known symptoms in the group".into()));
    }

    let added = kb.add_rule_group(disease_id, members).map_err(|e| (EXIT_ERROR, e))?;
    if !added {
        println!("Group already present for '{}'; nothing added", disease);
        return Ok(());
    }
    save_store(&kb, &path)?;
    println!("Added condition group to '{}'", disease);
    Ok(())
}

fn run_add_action(
    store: &StoreArg,
    settings: &Settings,
    disease: &str,
    text: &str,
) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let mut kb = load_store(&path)?;
    let disease_id = kb
        .disease_by_name(disease)
        .map(|d| d.id)
        .ok_or_else(|| (EXIT_UNKNOWN_NAME, format!("unknown disease '{}'", disease)))?;
    kb.add_action(disease_id, text).map_err(|e| (EXIT_ERROR, e))?;
    save_store(&kb, &path)?;
    println!("Added action to '{}'", disease);
    Ok(())
}

fn run_remove_disease(store: &StoreArg, settings: &Settings, name: &str) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let mut kb = load_store(&path)?;
    let id = kb
        .disease_by_name(name)
        .map(|d| d.id)
        .ok_or_else(|| (EXIT_UNKNOWN_NAME, format!("unknown disease '{}'", name)))?;
    kb.remove_disease(id).map_err(|e| (EXIT_ERROR, e))?;
    save_store(&kb, &path)?;
    println!("Removed disease '{}'", name);
    Ok(())
}

fn run_remove_symptom(store: &StoreArg, settings: &Settings, name: &str) -> Result<(), CommandError> {
    let path = store.resolve(settings)?;
    let mut kb = load_store(&path)?;
    let id = kb
        .symptom_by_name(name)
        .map(|s| s.id)
        .ok_or_else(|| (EXIT_UNKNOWN_NAME, format!("unknown symptom '{}'", name)))?;
    kb.remove_symptom(id).map_err(|e| (EXIT_ERROR, e))?;
    save_store(&kb, &path)?;
    println!("Removed symptom '{}' (rules updated)", name);
    Ok(())
}
