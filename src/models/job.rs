//! Ranked job posting records.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of the prioritized jobs dataset produced by the final stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_id: u64,

    pub company_name: String,

    pub position_title: String,

    #[serde(default)]
    pub location_city: String,

    /// Upper salary bound as extracted, e.g. "12 LPA"
    #[serde(default)]
    pub salary_max: String,

    /// Comma-separated skill list as extracted
    #[serde(default)]
    pub skills_required: String,

    #[serde(default)]
    pub job_description: String,

    /// Prioritization score in [0, 1], higher is better
    #[serde(default)]
    pub priority_score: f64,
}

impl JobPosting {
    /// Load the ranked dataset from a JSON file, sorted by priority descending.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        let mut jobs: Vec<Self> = serde_json::from_str(&content)?;
        jobs.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(jobs)
    }

    /// Built-in sample postings served when no dataset has been produced yet.
    pub fn samples() -> Vec<Self> {
        vec![
            Self {
                job_id: 1,
                company_name: "TechCorp India".into(),
                position_title: "Software Developer".into(),
                location_city: "Bangalore".into(),
                salary_max: "12 LPA".into(),
                skills_required: "Python, JavaScript, React, SQL".into(),
                job_description: "Full stack development role".into(),
                priority_score: 0.82,
            },
            Self {
                job_id: 2,
                company_name: "DataSoft Solutions".into(),
                position_title: "Data Analyst".into(),
                location_city: "Hyderabad".into(),
                salary_max: "8 LPA".into(),
                skills_required: "Python, SQL, Excel, Tableau".into(),
                job_description: "Business analytics and reporting".into(),
                priority_score: 0.71,
            },
            Self {
                job_id: 3,
                company_name: "CloudNet Systems".into(),
                position_title: "DevOps Engineer".into(),
                location_city: "Pune".into(),
                salary_max: "15 LPA".into(),
                skills_required: "AWS, Docker, Kubernetes, CI/CD".into(),
                job_description: "Cloud infrastructure management".into(),
                priority_score: 0.69,
            },
            Self {
                job_id: 4,
                company_name: "AI Innovations".into(),
                position_title: "ML Engineer".into(),
                location_city: "Bangalore".into(),
                salary_max: "18 LPA".into(),
                skills_required: "Python, TensorFlow, PyTorch, NLP".into(),
                job_description: "Machine learning model development".into(),
                priority_score: 0.66,
            },
            Self {
                job_id: 5,
                company_name: "WebTech Global".into(),
                position_title: "Frontend Developer".into(),
                location_city: "Remote".into(),
                salary_max: "10 LPA".into(),
                skills_required: "React, TypeScript, CSS, HTML".into(),
                job_description: "UI/UX development for web apps".into(),
                priority_score: 0.61,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_all_sorts_by_priority_descending() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("jobs.json");

        let mut jobs = JobPosting::samples();
        jobs.reverse();
        std::fs::write(&path, serde_json::to_string(&jobs).unwrap()).unwrap();

        let loaded = JobPosting::load_all(&path).unwrap();
        assert_eq!(loaded.len(), 5);
        assert!(loaded[0].priority_score >= loaded[4].priority_score);
        assert_eq!(loaded[0].company_name, "TechCorp India");
    }

    #[test]
    fn load_all_missing_file_is_an_error() {
        assert!(JobPosting::load_all("no/such/file.json").is_err());
    }

    #[test]
    fn posting_tolerates_missing_optional_fields() {
        let json = r#"[{"job_id": 9, "company_name": "X", "position_title": "Y"}]"#;
        let jobs: Vec<JobPosting> = serde_json::from_str(json).unwrap();
        assert_eq!(jobs[0].location_city, "");
        assert_eq!(jobs[0].priority_score, 0.0);
    }
}
