// src/config.rs

//! Configuration loading and validation.
//!
//! The configuration file is TOML. Loading is self-healing: a missing file is
//! materialized from built-in defaults, and an unparsable file is overwritten
//! with them (the parse error is logged). Structural problems are another
//! matter: validation collects *every* violation, logs them all, and
//! fails closed so no stage runs against a bad document.
//!
//! [`validate`] works on the raw parsed document rather than the typed
//! [`Config`] so that missing sections and wrong types are reported the way
//! an operator edited them, not as serde errors.

use std::fmt;
use std::fs;
use std::path::Path;

use toml::Value;
use toml::value::Table;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Required top-level sections. If any is missing, per-section checks
/// that depend on it are skipped.
const REQUIRED_SECTIONS: &[&str] = &[
    "incremental_processing",
    "input_output",
    "processing",
    "logging",
    "normalization",
    "position_levels",
    "work_mode_keywords",
    "experience_types",
    "salary_parsing",
    "experience_parsing",
    "deadline_parsing",
    "scoring_weights",
];

/// Accepted values for `logging.level` (case-insensitive).
const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "warning", "error"];

/// Raw parsed configuration document.
///
/// Kept alongside the typed [`Config`] as a narrow compatibility shim for
/// optional or experimental settings that have no typed field yet.
#[derive(Debug, Clone)]
pub struct Document {
    value: Value,
}

impl Document {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Look up a value by dotted key path, e.g. `"processing.max_jobs_per_email"`.
    ///
    /// Returns `None` when any traversal step is missing or the intermediate
    /// value is not a table. Never errors.
    pub fn get_setting(&self, path: &str) -> Option<&Value> {
        let mut current = &self.value;
        for key in path.split('.') {
            current = current.as_table()?.get(key)?;
        }
        Some(current)
    }

    /// Typed variant of [`Self::get_setting`] with a default.
    pub fn setting_or<T: serde::de::DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.get_setting(path)
            .cloned()
            .and_then(|v| v.try_into().ok())
            .unwrap_or(default)
    }

    fn section(&self, name: &str) -> Option<&Table> {
        self.value.as_table()?.get(name)?.as_table()
    }
}

/// One structural problem found during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted key the violation refers to (section or field)
    pub key: String,
    pub message: String,
}

impl Violation {
    fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Load, self-heal, validate and type the configuration.
///
/// Fails closed on structural violations; any other read error is raised
/// as-is. A nonexistent or unparsable file never errors.
pub fn load(path: &Path) -> Result<(Config, Document)> {
    let text = if path.exists() {
        fs::read_to_string(path)?
    } else {
        log::warn!("Configuration file not found at {}", path.display());
        log::info!("Creating default configuration file");
        materialize_default(path)?
    };

    let value: Value = match text.parse() {
        Ok(value) => value,
        Err(e) => {
            log::error!("Invalid TOML in configuration file: {}", e);
            log::info!("Re-creating default configuration");
            materialize_default(path)?.parse()?
        }
    };

    let document = Document::new(value);
    let violations = validate(&document);
    if !violations.is_empty() {
        for violation in &violations {
            log::error!("Configuration violation - {}", violation);
        }
        return Err(AppError::validation(format!(
            "configuration failed validation with {} violation(s)",
            violations.len()
        )));
    }

    let config: Config = document.value.clone().try_into()?;
    log_configuration(&config);
    Ok((config, document))
}

/// Write the built-in default document to `path`, creating parent
/// directories, and return its text.
fn materialize_default(path: &Path) -> Result<String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = default_document_text()?;
    fs::write(path, &text)?;
    log::info!("Default configuration written to {}", path.display());
    Ok(text)
}

/// TOML text of the built-in default configuration.
pub fn default_document_text() -> Result<String> {
    Ok(toml::to_string_pretty(&Config::default())?)
}

/// Expected container/scalar type for a required field.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Bool,
    Str,
    Int,
    /// Integer or float
    Number,
    Array,
    Table,
}

impl Kind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Kind::Bool => value.is_bool(),
            Kind::Str => value.is_str(),
            Kind::Int => value.is_integer(),
            Kind::Number => value.is_integer() || value.is_float(),
            Kind::Array => value.is_array(),
            Kind::Table => value.is_table(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "boolean",
            Kind::Str => "string",
            Kind::Int => "integer",
            Kind::Number => "number",
            Kind::Array => "array",
            Kind::Table => "table",
        }
    }
}

/// Validate the raw document, accumulating every violation found.
///
/// Does not short-circuit within a section. Nested lists and tables are
/// checked for presence and container type only; their elements are owned
/// by the consuming stage.
pub fn validate(document: &Document) -> Vec<Violation> {
    let mut violations = Vec::new();

    let Some(root) = document.value.as_table() else {
        violations.push(Violation::new("<root>", "document is not a table"));
        return violations;
    };

    let mut missing_section = false;
    for section in REQUIRED_SECTIONS {
        match root.get(*section) {
            None => {
                violations.push(Violation::new(*section, "missing required section"));
                missing_section = true;
            }
            Some(value) if !value.is_table() => {
                violations.push(Violation::new(
                    *section,
                    format!("expected table, got {}", value.type_str()),
                ));
                missing_section = true;
            }
            Some(_) => {}
        }
    }

    // Field-level checks depend on their sections being present
    if missing_section {
        return violations;
    }

    check_incremental_processing(document, &mut violations);
    check_input_output(document, &mut violations);
    check_processing(document, &mut violations);
    check_logging(document, &mut violations);
    check_fields(
        document,
        "normalization",
        &[
            ("skill_map", Kind::Table),
            ("degree_map", Kind::Table),
            ("city_map", Kind::Table),
            ("company_suffixes", Kind::Array),
        ],
        &mut violations,
    );
    check_fields(
        document,
        "position_levels",
        &[
            ("senior_keywords", Kind::Array),
            ("junior_keywords", Kind::Array),
            ("intern_keywords", Kind::Array),
            ("manager_keywords", Kind::Array),
        ],
        &mut violations,
    );
    check_fields(
        document,
        "work_mode_keywords",
        &[("remote", Kind::Array), ("hybrid", Kind::Array)],
        &mut violations,
    );
    check_experience_types(document, &mut violations);
    check_fields(
        document,
        "salary_parsing",
        &[
            ("patterns", Kind::Array),
            ("default_currency", Kind::Str),
            ("default_period", Kind::Str),
        ],
        &mut violations,
    );
    check_fields(
        document,
        "experience_parsing",
        &[("patterns", Kind::Array)],
        &mut violations,
    );
    check_fields(
        document,
        "deadline_parsing",
        &[
            ("date_patterns", Kind::Array),
            ("relative_keywords", Kind::Table),
        ],
        &mut violations,
    );
    check_fields(
        document,
        "scoring_weights",
        &[
            ("skills_match", Kind::Number),
            ("experience_fit", Kind::Number),
            ("location_preference", Kind::Number),
            ("completeness", Kind::Number),
            ("salary_attractiveness", Kind::Number),
            ("company_reputation", Kind::Number),
            ("deadline_urgency", Kind::Number),
            ("work_mode_preference", Kind::Number),
        ],
        &mut violations,
    );

    violations
}

/// Check required fields of one section for presence and type.
fn check_fields(
    document: &Document,
    section: &str,
    fields: &[(&str, Kind)],
    violations: &mut Vec<Violation>,
) {
    let Some(table) = document.section(section) else {
        return;
    };

    for (field, kind) in fields {
        let key = format!("{section}.{field}");
        match table.get(*field) {
            None => violations.push(Violation::new(key, "missing required field")),
            Some(value) if !kind.matches(value) => violations.push(Violation::new(
                key,
                format!("expected {}, got {}", kind.name(), value.type_str()),
            )),
            Some(_) => {}
        }
    }
}

fn check_incremental_processing(document: &Document, violations: &mut Vec<Violation>) {
    check_fields(
        document,
        "incremental_processing",
        &[
            ("enabled", Kind::Bool),
            ("state_directory", Kind::Str),
            ("state_file", Kind::Str),
            ("checkpoint_interval", Kind::Int),
            ("force_full_reprocess", Kind::Bool),
        ],
        violations,
    );

    if let Some(interval) =
        document.get_setting("incremental_processing.checkpoint_interval")
    {
        if let Some(n) = interval.as_integer() {
            if n <= 0 {
                violations.push(Violation::new(
                    "incremental_processing.checkpoint_interval",
                    format!("must be a positive integer, got {n}"),
                ));
            }
        }
    }
}

fn check_input_output(document: &Document, violations: &mut Vec<Violation>) {
    check_fields(
        document,
        "input_output",
        &[
            ("input_file", Kind::Str),
            ("output_csv", Kind::Str),
            ("output_json", Kind::Str),
            ("ranked_jobs", Kind::Str),
        ],
        violations,
    );

    // Referential validity is fail-open: the input may be produced by an
    // earlier stage that has not run yet.
    if let Some(input) = document
        .get_setting("input_output.input_file")
        .and_then(Value::as_str)
    {
        if !Path::new(input).exists() {
            log::warn!("Input file does not exist yet: {}", input);
        }
    }
}

fn check_processing(document: &Document, violations: &mut Vec<Violation>) {
    check_fields(
        document,
        "processing",
        &[
            ("max_jobs_per_email", Kind::Int),
            ("max_companies_per_email", Kind::Int),
            ("max_positions_per_email", Kind::Int),
            ("max_skills_per_email", Kind::Int),
            ("min_completeness_score", Kind::Number),
            ("enable_analytics", Kind::Bool),
        ],
        violations,
    );

    for field in [
        "max_jobs_per_email",
        "max_companies_per_email",
        "max_positions_per_email",
        "max_skills_per_email",
    ] {
        let key = format!("processing.{field}");
        if let Some(n) = document.get_setting(&key).and_then(Value::as_integer) {
            if n <= 0 {
                violations.push(Violation::new(
                    key,
                    format!("must be a positive integer, got {n}"),
                ));
            }
        }
    }

    if let Some(score) = document.get_setting("processing.min_completeness_score") {
        let score = score
            .as_float()
            .or_else(|| score.as_integer().map(|n| n as f64));
        if let Some(s) = score {
            if !(0.0..=1.0).contains(&s) {
                violations.push(Violation::new(
                    "processing.min_completeness_score",
                    format!("must be between 0.0 and 1.0, got {s}"),
                ));
            }
        }
    }
}

fn check_logging(document: &Document, violations: &mut Vec<Violation>) {
    check_fields(
        document,
        "logging",
        &[
            ("level", Kind::Str),
            ("file", Kind::Str),
            ("enable_performance_metrics", Kind::Bool),
        ],
        violations,
    );

    if let Some(level) = document.get_setting("logging.level").and_then(Value::as_str) {
        if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            violations.push(Violation::new(
                "logging.level",
                format!(
                    "invalid log level '{}', must be one of: {}",
                    level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }
    }
}

fn check_experience_types(document: &Document, violations: &mut Vec<Violation>) {
    check_fields(
        document,
        "experience_types",
        &[
            ("fresher_keywords", Kind::Array),
            ("thresholds", Kind::Table),
        ],
        violations,
    );

    if document
        .get_setting("experience_types.thresholds")
        .is_some_and(Value::is_table)
    {
        for field in ["entry_level_max", "mid_level_max"] {
            let key = format!("experience_types.thresholds.{field}");
            match document.get_setting(&key) {
                None => violations.push(Violation::new(key, "missing required field")),
                Some(value) if !value.is_integer() => violations.push(Violation::new(
                    key,
                    format!("expected integer, got {}", value.type_str()),
                )),
                Some(_) => {}
            }
        }
    }
}

/// Log the loaded settings for confirmation.
fn log_configuration(config: &Config) {
    let inc = &config.incremental_processing;
    log::info!(
        "Incremental processing: enabled={} state_dir={} interval={}",
        inc.enabled,
        inc.state_directory,
        inc.checkpoint_interval
    );
    log::info!(
        "I/O: input={} output_json={} ranked_jobs={}",
        config.input_output.input_file,
        config.input_output.output_json,
        config.input_output.ranked_jobs
    );
    log::info!(
        "Processing: max_jobs={} min_completeness={}",
        config.processing.max_jobs_per_email,
        config.processing.min_completeness_score
    );
    log::info!(
        "Normalization: {} skills, {} degrees, {} cities",
        config.normalization.skill_map.len(),
        config.normalization.degree_map.len(),
        config.normalization.city_map.len()
    );
    log::info!(
        "Parsing: {} salary patterns, {} experience patterns, {} date patterns",
        config.salary_parsing.patterns.len(),
        config.experience_parsing.patterns.len(),
        config.deadline_parsing.date_patterns.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn default_document() -> Document {
        let value: Value = default_document_text().unwrap().parse().unwrap();
        Document::new(value)
    }

    fn root_mut(document: &mut Document) -> &mut Table {
        document.value.as_table_mut().unwrap()
    }

    #[test]
    fn default_document_has_zero_violations() {
        assert_eq!(validate(&default_document()), Vec::new());
    }

    #[test]
    fn missing_section_is_the_only_violation_reported() {
        let mut doc = default_document();
        root_mut(&mut doc).remove("logging");

        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "logging");
        assert_eq!(violations[0].message, "missing required section");
    }

    #[test]
    fn missing_field_and_bad_type_are_both_reported() {
        let mut doc = default_document();
        let inc = root_mut(&mut doc)
            .get_mut("incremental_processing")
            .unwrap()
            .as_table_mut()
            .unwrap();
        inc.remove("state_file");
        inc.insert("checkpoint_interval".into(), Value::String("fifty".into()));

        let violations = validate(&doc);
        let keys: Vec<&str> = violations.iter().map(|v| v.key.as_str()).collect();
        assert!(keys.contains(&"incremental_processing.state_file"));
        assert!(keys.contains(&"incremental_processing.checkpoint_interval"));
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn checkpoint_interval_must_be_positive() {
        let mut doc = default_document();
        root_mut(&mut doc)
            .get_mut("incremental_processing")
            .unwrap()
            .as_table_mut()
            .unwrap()
            .insert("checkpoint_interval".into(), Value::Integer(0));

        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "incremental_processing.checkpoint_interval");
    }

    #[test]
    fn completeness_score_accepts_integer_or_float_in_range() {
        let mut doc = default_document();
        let processing = root_mut(&mut doc)
            .get_mut("processing")
            .unwrap()
            .as_table_mut()
            .unwrap();

        processing.insert("min_completeness_score".into(), Value::Integer(1));
        assert!(validate(&doc).is_empty());

        root_mut(&mut doc)
            .get_mut("processing")
            .unwrap()
            .as_table_mut()
            .unwrap()
            .insert("min_completeness_score".into(), Value::Float(1.5));
        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "processing.min_completeness_score");
    }

    #[test]
    fn per_email_maxima_must_be_positive() {
        let mut doc = default_document();
        root_mut(&mut doc)
            .get_mut("processing")
            .unwrap()
            .as_table_mut()
            .unwrap()
            .insert("max_companies_per_email".into(), Value::Integer(-1));

        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "processing.max_companies_per_email");
    }

    #[test]
    fn log_level_is_case_insensitive_and_closed_set() {
        let mut doc = default_document();
        root_mut(&mut doc)
            .get_mut("logging")
            .unwrap()
            .as_table_mut()
            .unwrap()
            .insert("level".into(), Value::String("WARNING".into()));
        assert!(validate(&doc).is_empty());

        root_mut(&mut doc)
            .get_mut("logging")
            .unwrap()
            .as_table_mut()
            .unwrap()
            .insert("level".into(), Value::String("verbose".into()));
        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, "logging.level");
    }

    #[test]
    fn pattern_lists_are_checked_at_container_level_only() {
        // Malformed inner elements pass; only the container type matters.
        let mut doc = default_document();
        root_mut(&mut doc)
            .get_mut("salary_parsing")
            .unwrap()
            .as_table_mut()
            .unwrap()
            .insert(
                "patterns".into(),
                Value::Array(vec![Value::Integer(1), Value::Integer(2)]),
            );
        assert!(validate(&doc).is_empty());

        // An empty list passes too
        root_mut(&mut doc)
            .get_mut("salary_parsing")
            .unwrap()
            .as_table_mut()
            .unwrap()
            .insert("patterns".into(), Value::Array(vec![]));
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn unknown_extra_keys_are_ignored() {
        let mut doc = default_document();
        root_mut(&mut doc).insert("experimental".into(), Value::Table(Table::new()));
        root_mut(&mut doc)
            .get_mut("logging")
            .unwrap()
            .as_table_mut()
            .unwrap()
            .insert("color".into(), Value::Boolean(true));
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn get_setting_returns_none_for_each_missing_step() {
        let text = r#"
            [a]
            [a.b]
            c = 42
        "#;
        let full = Document::new(text.parse().unwrap());
        assert_eq!(
            full.get_setting("a.b.c").and_then(Value::as_integer),
            Some(42)
        );
        assert_eq!(full.setting_or("a.b.c", 0i64), 42);

        // "a" absent
        let no_a = Document::new("".parse::<Value>().unwrap());
        assert_eq!(no_a.setting_or("a.b.c", 7i64), 7);

        // "a.b" absent
        let no_b = Document::new("[a]\nx = 1".parse::<Value>().unwrap());
        assert_eq!(no_b.setting_or("a.b.c", 7i64), 7);

        // "a.b.c" absent
        let no_c = Document::new("[a.b]\nx = 1".parse::<Value>().unwrap());
        assert_eq!(no_c.setting_or("a.b.c", 7i64), 7);
    }

    #[test]
    fn get_setting_handles_non_table_intermediate() {
        let doc = Document::new("a = 5".parse::<Value>().unwrap());
        assert!(doc.get_setting("a.b.c").is_none());
        assert_eq!(doc.setting_or("a.b.c", "x".to_string()), "x");
    }

    #[test]
    fn load_materializes_default_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("conf/config.toml");

        let (config, _) = load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.incremental_processing.checkpoint_interval, 50);

        // Second load reads the materialized file
        let (reloaded, _) = load(&path).unwrap();
        assert_eq!(
            reloaded.processing.max_jobs_per_email,
            config.processing.max_jobs_per_email
        );
    }

    #[test]
    fn load_self_heals_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is { not toml").unwrap();

        let (config, _) = load(&path).unwrap();
        assert_eq!(config.logging.level, "info");

        // The corrupt file was replaced with a parsable default
        let healed = fs::read_to_string(&path).unwrap();
        assert!(healed.parse::<Value>().is_ok());
    }

    #[test]
    fn load_fails_closed_on_structural_violations() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let mut doc = default_document();
        root_mut(&mut doc).remove("scoring_weights");
        fs::write(&path, toml::to_string(&doc.value).unwrap()).unwrap();

        assert!(matches!(load(&path), Err(AppError::Validation(_))));
    }
}
