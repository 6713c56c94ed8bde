//! Typed pipeline configuration.
//!
//! Every recognized option is explicit here; the raw document behind it is
//! validated section-by-section in [`crate::config`] before this struct is
//! built.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Root pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Incremental processing / state bookkeeping
    #[serde(default)]
    pub incremental_processing: IncrementalConfig,

    /// Stage artifact paths
    #[serde(default)]
    pub input_output: IoConfig,

    /// Per-email processing limits
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Log level and destination
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Normalization lookup tables
    #[serde(default)]
    pub normalization: NormalizationConfig,

    /// Seniority keyword lists
    #[serde(default)]
    pub position_levels: PositionLevels,

    /// Work mode keyword lists
    #[serde(default)]
    pub work_mode_keywords: WorkModeKeywords,

    /// Experience classification settings
    #[serde(default)]
    pub experience_types: ExperienceTypes,

    /// Salary extraction patterns
    #[serde(default)]
    pub salary_parsing: SalaryParsing,

    /// Experience extraction patterns
    #[serde(default)]
    pub experience_parsing: ExperienceParsing,

    /// Application deadline extraction patterns
    #[serde(default)]
    pub deadline_parsing: DeadlineParsing,

    /// Prioritization scoring weights
    #[serde(default)]
    pub scoring_weights: ScoringWeights,
}

/// Incremental processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalConfig {
    /// Skip emails whose message IDs are already in the state file
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Directory holding state and checkpoint files
    #[serde(default = "defaults::state_directory")]
    pub state_directory: String,

    /// State file name inside the state directory
    #[serde(default = "defaults::state_file")]
    pub state_file: String,

    /// Write a checkpoint every N processed emails
    #[serde(default = "defaults::checkpoint_interval")]
    pub checkpoint_interval: u32,

    /// Ignore existing state and reprocess everything
    #[serde(default)]
    pub force_full_reprocess: bool,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            state_directory: defaults::state_directory(),
            state_file: defaults::state_file(),
            checkpoint_interval: defaults::checkpoint_interval(),
            force_full_reprocess: false,
        }
    }
}

impl IncrementalConfig {
    /// Full path to the state file.
    pub fn state_path(&self) -> std::path::PathBuf {
        Path::new(&self.state_directory).join(&self.state_file)
    }
}

/// Stage artifact paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    /// Cleaned/filtered email CSV consumed by entity structuring
    #[serde(default = "defaults::input_file")]
    pub input_file: String,

    /// Structured postings CSV output
    #[serde(default = "defaults::output_csv")]
    pub output_csv: String,

    /// Structured postings JSON output
    #[serde(default = "defaults::output_json")]
    pub output_json: String,

    /// Final ranked jobs dataset served by the web assistant
    #[serde(default = "defaults::ranked_jobs")]
    pub ranked_jobs: String,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_file: defaults::input_file(),
            output_csv: defaults::output_csv(),
            output_json: defaults::output_json(),
            ranked_jobs: defaults::ranked_jobs(),
        }
    }
}

/// Per-email processing limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Maximum job postings extracted from a single email
    #[serde(default = "defaults::max_jobs_per_email")]
    pub max_jobs_per_email: u32,

    /// Maximum distinct companies recognized per email
    #[serde(default = "defaults::max_companies_per_email")]
    pub max_companies_per_email: u32,

    /// Maximum distinct positions recognized per email
    #[serde(default = "defaults::max_positions_per_email")]
    pub max_positions_per_email: u32,

    /// Maximum skills attached to a posting from one email
    #[serde(default = "defaults::max_skills_per_email")]
    pub max_skills_per_email: u32,

    /// Drop postings scoring below this completeness threshold (0.0 - 1.0)
    #[serde(default = "defaults::min_completeness_score")]
    pub min_completeness_score: f64,

    /// Emit an analytics report after structuring
    #[serde(default = "defaults::enabled")]
    pub enable_analytics: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_jobs_per_email: defaults::max_jobs_per_email(),
            max_companies_per_email: defaults::max_companies_per_email(),
            max_positions_per_email: defaults::max_positions_per_email(),
            max_skills_per_email: defaults::max_skills_per_email(),
            min_completeness_score: defaults::min_completeness_score(),
            enable_analytics: defaults::enabled(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of: debug, info, warn, warning, error (case-insensitive)
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Log file name
    #[serde(default = "defaults::log_file")]
    pub file: String,

    /// Log stage timings alongside results
    #[serde(default = "defaults::enabled")]
    pub enable_performance_metrics: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file: defaults::log_file(),
            enable_performance_metrics: defaults::enabled(),
        }
    }
}

/// Normalization lookup tables used by entity structuring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Skill aliases, e.g. "js" -> "javascript"
    #[serde(default = "defaults::skill_map")]
    pub skill_map: BTreeMap<String, String>,

    /// Degree aliases, e.g. "btech" -> "B.Tech"
    #[serde(default = "defaults::degree_map")]
    pub degree_map: BTreeMap<String, String>,

    /// City aliases, e.g. "bengaluru" -> "Bangalore"
    #[serde(default = "defaults::city_map")]
    pub city_map: BTreeMap<String, String>,

    /// Corporate suffixes stripped from company names
    #[serde(default = "defaults::company_suffixes")]
    pub company_suffixes: Vec<String>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            skill_map: defaults::skill_map(),
            degree_map: defaults::degree_map(),
            city_map: defaults::city_map(),
            company_suffixes: defaults::company_suffixes(),
        }
    }
}

/// Seniority keyword lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLevels {
    #[serde(default = "defaults::senior_keywords")]
    pub senior_keywords: Vec<String>,
    #[serde(default = "defaults::junior_keywords")]
    pub junior_keywords: Vec<String>,
    #[serde(default = "defaults::intern_keywords")]
    pub intern_keywords: Vec<String>,
    #[serde(default = "defaults::manager_keywords")]
    pub manager_keywords: Vec<String>,
}

impl Default for PositionLevels {
    fn default() -> Self {
        Self {
            senior_keywords: defaults::senior_keywords(),
            junior_keywords: defaults::junior_keywords(),
            intern_keywords: defaults::intern_keywords(),
            manager_keywords: defaults::manager_keywords(),
        }
    }
}

/// Work mode keyword lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkModeKeywords {
    #[serde(default = "defaults::remote_keywords")]
    pub remote: Vec<String>,
    #[serde(default = "defaults::hybrid_keywords")]
    pub hybrid: Vec<String>,
}

impl Default for WorkModeKeywords {
    fn default() -> Self {
        Self {
            remote: defaults::remote_keywords(),
            hybrid: defaults::hybrid_keywords(),
        }
    }
}

/// Experience classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceTypes {
    #[serde(default = "defaults::fresher_keywords")]
    pub fresher_keywords: Vec<String>,

    #[serde(default)]
    pub thresholds: ExperienceThresholds,
}

impl Default for ExperienceTypes {
    fn default() -> Self {
        Self {
            fresher_keywords: defaults::fresher_keywords(),
            thresholds: ExperienceThresholds::default(),
        }
    }
}

/// Year thresholds separating entry / mid / senior postings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceThresholds {
    #[serde(default = "defaults::entry_level_max")]
    pub entry_level_max: u32,
    #[serde(default = "defaults::mid_level_max")]
    pub mid_level_max: u32,
}

impl Default for ExperienceThresholds {
    fn default() -> Self {
        Self {
            entry_level_max: defaults::entry_level_max(),
            mid_level_max: defaults::mid_level_max(),
        }
    }
}

/// Salary extraction patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryParsing {
    #[serde(default = "defaults::salary_patterns")]
    pub patterns: Vec<SalaryPattern>,

    #[serde(default = "defaults::default_currency")]
    pub default_currency: String,

    #[serde(default = "defaults::default_period")]
    pub default_period: String,
}

impl Default for SalaryParsing {
    fn default() -> Self {
        Self {
            patterns: defaults::salary_patterns(),
            default_currency: defaults::default_currency(),
            default_period: defaults::default_period(),
        }
    }
}

/// A named salary regex with a confidence weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryPattern {
    pub name: String,
    pub pattern: String,
    pub confidence: f64,
}

/// Experience extraction patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceParsing {
    #[serde(default = "defaults::experience_patterns")]
    pub patterns: Vec<String>,
}

impl Default for ExperienceParsing {
    fn default() -> Self {
        Self {
            patterns: defaults::experience_patterns(),
        }
    }
}

/// Application deadline extraction patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineParsing {
    #[serde(default = "defaults::date_patterns")]
    pub date_patterns: Vec<DatePattern>,

    /// Relative keywords to day offsets, e.g. "tomorrow" -> 1
    #[serde(default = "defaults::relative_keywords")]
    pub relative_keywords: BTreeMap<String, i64>,
}

impl Default for DeadlineParsing {
    fn default() -> Self {
        Self {
            date_patterns: defaults::date_patterns(),
            relative_keywords: defaults::relative_keywords(),
        }
    }
}

/// A date regex with its chrono format string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatePattern {
    pub pattern: String,
    pub format: String,
}

/// Prioritization scoring weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "defaults::w_skills_match")]
    pub skills_match: f64,
    #[serde(default = "defaults::w_experience_fit")]
    pub experience_fit: f64,
    #[serde(default = "defaults::w_location_preference")]
    pub location_preference: f64,
    #[serde(default = "defaults::w_completeness")]
    pub completeness: f64,
    #[serde(default = "defaults::w_salary_attractiveness")]
    pub salary_attractiveness: f64,
    #[serde(default = "defaults::w_company_reputation")]
    pub company_reputation: f64,
    #[serde(default = "defaults::w_deadline_urgency")]
    pub deadline_urgency: f64,
    #[serde(default = "defaults::w_work_mode_preference")]
    pub work_mode_preference: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills_match: defaults::w_skills_match(),
            experience_fit: defaults::w_experience_fit(),
            location_preference: defaults::w_location_preference(),
            completeness: defaults::w_completeness(),
            salary_attractiveness: defaults::w_salary_attractiveness(),
            company_reputation: defaults::w_company_reputation(),
            deadline_urgency: defaults::w_deadline_urgency(),
            work_mode_preference: defaults::w_work_mode_preference(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;

    use super::{DatePattern, SalaryPattern};

    pub fn enabled() -> bool {
        true
    }

    // Incremental processing defaults
    pub fn state_directory() -> String {
        "state".into()
    }
    pub fn state_file() -> String {
        "processed_message_ids.txt".into()
    }
    pub fn checkpoint_interval() -> u32 {
        50
    }

    // I/O defaults
    pub fn input_file() -> String {
        "artifacts/relevant_placement_emails.csv".into()
    }
    pub fn output_csv() -> String {
        "artifacts/structured_job_postings.csv".into()
    }
    pub fn output_json() -> String {
        "artifacts/structured_job_postings.json".into()
    }
    pub fn ranked_jobs() -> String {
        "artifacts/prioritized_jobs.json".into()
    }

    // Processing defaults
    pub fn max_jobs_per_email() -> u32 {
        5
    }
    pub fn max_companies_per_email() -> u32 {
        3
    }
    pub fn max_positions_per_email() -> u32 {
        3
    }
    pub fn max_skills_per_email() -> u32 {
        20
    }
    pub fn min_completeness_score() -> f64 {
        0.3
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn log_file() -> String {
        "jobmail.log".into()
    }

    // Normalization defaults
    pub fn skill_map() -> BTreeMap<String, String> {
        [
            ("js", "javascript"),
            ("ts", "typescript"),
            ("py", "python"),
            ("reactjs", "react"),
            ("nodejs", "node.js"),
            ("ml", "machine learning"),
            ("ai", "artificial intelligence"),
            ("dl", "deep learning"),
            ("nlp", "natural language processing"),
            ("cv", "computer vision"),
            ("k8s", "kubernetes"),
            ("tf", "tensorflow"),
            ("scikit", "scikit-learn"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    pub fn degree_map() -> BTreeMap<String, String> {
        [
            ("btech", "B.Tech"),
            ("b.tech", "B.Tech"),
            ("be", "B.E"),
            ("b.e", "B.E"),
            ("mtech", "M.Tech"),
            ("m.tech", "M.Tech"),
            ("bca", "BCA"),
            ("mca", "MCA"),
            ("bsc", "B.Sc"),
            ("b.sc", "B.Sc"),
            ("msc", "M.Sc"),
            ("m.sc", "M.Sc"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    pub fn city_map() -> BTreeMap<String, String> {
        [
            ("bangalore", "Bangalore"),
            ("bengaluru", "Bangalore"),
            ("blr", "Bangalore"),
            ("mumbai", "Mumbai"),
            ("bombay", "Mumbai"),
            ("delhi", "Delhi"),
            ("new delhi", "Delhi"),
            ("ncr", "Delhi NCR"),
            ("gurgaon", "Gurgaon"),
            ("gurugram", "Gurgaon"),
            ("hyderabad", "Hyderabad"),
            ("pune", "Pune"),
            ("chennai", "Chennai"),
            ("kolkata", "Kolkata"),
            ("calcutta", "Kolkata"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    pub fn company_suffixes() -> Vec<String> {
        [
            "PVT LTD",
            "PVT. LTD.",
            "PRIVATE LIMITED",
            "LIMITED",
            "LTD",
            "INC",
            "CORP",
            "CORPORATION",
            "LLC",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Position level defaults
    pub fn senior_keywords() -> Vec<String> {
        ["senior", "lead", "principal", "staff"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn junior_keywords() -> Vec<String> {
        ["junior", "associate", "entry"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn intern_keywords() -> Vec<String> {
        ["intern", "trainee"].into_iter().map(String::from).collect()
    }
    pub fn manager_keywords() -> Vec<String> {
        ["manager", "head", "director"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    // Work mode defaults
    pub fn remote_keywords() -> Vec<String> {
        ["remote", "wfh", "work from home", "anywhere"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn hybrid_keywords() -> Vec<String> {
        vec!["hybrid".into()]
    }

    // Experience defaults
    pub fn fresher_keywords() -> Vec<String> {
        ["fresher", "freshers", "entry level"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn entry_level_max() -> u32 {
        2
    }
    pub fn mid_level_max() -> u32 {
        5
    }

    // Salary parsing defaults
    pub fn salary_patterns() -> Vec<SalaryPattern> {
        vec![
            SalaryPattern {
                name: "lpa_range".into(),
                pattern: r"(\d+(?:\.\d+)?)\s*(?:-|to)\s*(\d+(?:\.\d+)?)\s*(?:lpa|lakhs?\s+per\s+annum)".into(),
                confidence: 0.9,
            },
            SalaryPattern {
                name: "lpa_single".into(),
                pattern: r"(\d+(?:\.\d+)?)\s*(?:lpa|lakhs?\s+per\s+annum)".into(),
                confidence: 0.85,
            },
            SalaryPattern {
                name: "monthly".into(),
                pattern: r"(\d+)k?\s*(?:per\s+month|pm|/month)".into(),
                confidence: 0.8,
            },
            SalaryPattern {
                name: "ctc".into(),
                pattern: r"ctc\s*:?\s*(\d+(?:\.\d+)?)\s*(?:lpa|lakhs?)".into(),
                confidence: 0.85,
            },
            SalaryPattern {
                name: "package_range".into(),
                pattern: r"package\s*:?\s*(\d+(?:\.\d+)?)\s*(?:-|to)\s*(\d+(?:\.\d+)?)\s*lakhs?".into(),
                confidence: 0.85,
            },
        ]
    }
    pub fn default_currency() -> String {
        "INR".into()
    }
    pub fn default_period() -> String {
        "annual".into()
    }

    // Experience parsing defaults
    pub fn experience_patterns() -> Vec<String> {
        vec![
            r"(\d+)\s*(?:-|to)\s*(\d+)\s*years?".into(),
            r"(\d+)\s*years?\s+(?:of\s+)?experience".into(),
            r"0\s*(?:-|to)\s*(\d+)\s*years?".into(),
        ]
    }

    // Deadline parsing defaults
    pub fn date_patterns() -> Vec<DatePattern> {
        vec![
            DatePattern {
                pattern: r"(\d{1,2})[-/](\d{1,2})[-/](\d{4})".into(),
                format: "%d-%m-%Y".into(),
            },
            DatePattern {
                pattern: r"(\d{1,2})[-/](\d{1,2})[-/](\d{2})".into(),
                format: "%d-%m-%y".into(),
            },
            DatePattern {
                pattern: r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})".into(),
                format: "%Y-%m-%d".into(),
            },
        ]
    }
    pub fn relative_keywords() -> BTreeMap<String, i64> {
        [("today".to_string(), 0), ("tomorrow".to_string(), 1)]
            .into_iter()
            .collect()
    }

    // Scoring weight defaults
    pub fn w_skills_match() -> f64 {
        0.30
    }
    pub fn w_experience_fit() -> f64 {
        0.05
    }
    pub fn w_location_preference() -> f64 {
        0.15
    }
    pub fn w_completeness() -> f64 {
        0.05
    }
    pub fn w_salary_attractiveness() -> f64 {
        0.15
    }
    pub fn w_company_reputation() -> f64 {
        0.10
    }
    pub fn w_deadline_urgency() -> f64 {
        0.10
    }
    pub fn w_work_mode_preference() -> f64 {
        0.10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(
            parsed.incremental_processing.checkpoint_interval,
            config.incremental_processing.checkpoint_interval
        );
        assert_eq!(parsed.salary_parsing.patterns.len(), 5);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.incremental_processing.enabled);
        assert_eq!(config.incremental_processing.checkpoint_interval, 50);
        assert_eq!(config.processing.max_jobs_per_email, 5);
    }

    #[test]
    fn state_path_joins_directory_and_file() {
        let inc = IncrementalConfig::default();
        assert_eq!(
            inc.state_path(),
            std::path::Path::new("state").join("processed_message_ids.txt")
        );
    }
}
