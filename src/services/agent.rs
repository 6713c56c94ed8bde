//! Job search assistant.
//!
//! Matches user queries against the ranked dataset, keeps a rolling
//! conversation window per user, and delegates answer generation to a
//! [`TextGenerator`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::models::{JobPosting, QueryIntent, UserContext};
use crate::services::genai::TextGenerator;

/// Maximum job matches returned for a single query.
const MAX_MATCHES: usize = 5;

const SYSTEM_INSTRUCTION: &str = "You are a helpful job search assistant for a \
campus placement cell. Answer using only the job postings provided. Be \
concise and specific: name companies, positions, salaries and skills from \
the data. If no posting matches, say so and suggest broadening the search.";

/// Reply produced for one chat query.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    /// "success" or "error"
    pub status: String,

    pub response: String,

    pub intent: QueryIntent,

    /// Postings that matched the query, best first
    pub jobs: Vec<JobPosting>,

    pub timestamp: DateTime<Utc>,
}

/// Conversational agent over the prioritized jobs dataset.
pub struct JobSearchAgent {
    jobs: Vec<JobPosting>,
    contexts: Mutex<HashMap<String, UserContext>>,
    generator: Arc<dyn TextGenerator>,
}

impl JobSearchAgent {
    pub fn new(jobs: Vec<JobPosting>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            jobs,
            contexts: Mutex::new(HashMap::new()),
            generator,
        }
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    /// Case-insensitive keyword search over the dataset.
    ///
    /// A posting matches when any query token appears as a substring of any
    /// of its text fields. No match means an empty result. Results keep
    /// dataset order (priority descending).
    pub fn search_jobs(&self, query: &str) -> Vec<JobPosting> {
        let query = query.to_lowercase();
        let tokens: Vec<&str> = query.split_whitespace().collect();

        if tokens.is_empty() {
            return Vec::new();
        }

        self.jobs
            .iter()
            .filter(|job| {
                let haystack = format!(
                    "{} {} {} {} {}",
                    job.company_name,
                    job.position_title,
                    job.skills_required,
                    job.location_city,
                    job.job_description
                )
                .to_lowercase();
                tokens.iter().any(|t| haystack.contains(t))
            })
            .take(MAX_MATCHES)
            .cloned()
            .collect()
    }

    /// Answer one query for `user_id`.
    ///
    /// Generation failures are reported in the reply, never propagated; the
    /// conversation window records the exchange either way.
    pub async fn process_query(&self, user_id: &str, query: &str) -> AgentReply {
        let intent = QueryIntent::classify(query);
        let matches = self.search_jobs(query);

        let context_snapshot = {
            let mut contexts = self.contexts.lock().await;
            let ctx = contexts.entry(user_id.to_string()).or_default();
            ctx.add_turn("user", query);
            ctx.recent_context()
        };

        let prompt = build_prompt(&context_snapshot, &matches, query);

        let (status, response) = match self.generator.generate(SYSTEM_INSTRUCTION, &prompt).await
        {
            Ok(text) => ("success".to_string(), text),
            Err(e) => {
                log::warn!("generation failed for user {}: {}", user_id, e);
                (
                    "error".to_string(),
                    "Sorry, I could not generate a response right now. Please try again."
                        .to_string(),
                )
            }
        };

        {
            let mut contexts = self.contexts.lock().await;
            if let Some(ctx) = contexts.get_mut(user_id) {
                ctx.add_turn("assistant", &response);
            }
        }

        AgentReply {
            status,
            response,
            intent,
            jobs: matches,
            timestamp: Utc::now(),
        }
    }

    /// Number of users with live conversation windows.
    pub async fn active_users(&self) -> usize {
        self.contexts.lock().await.len()
    }
}

fn build_prompt(context: &str, matches: &[JobPosting], query: &str) -> String {
    let mut prompt = String::new();

    if !context.is_empty() {
        prompt.push_str("Conversation so far:\n");
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }

    if matches.is_empty() {
        prompt.push_str("No job postings matched the query.\n\n");
    } else {
        prompt.push_str("Matching job postings (best first):\n");
        for job in matches {
            prompt.push_str(&format!(
                "- {} at {} | {} | up to {} | skills: {}\n",
                job.position_title,
                job.company_name,
                job.location_city,
                job.salary_max,
                job.skills_required
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str("Question: ");
    prompt.push_str(query);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::{AppError, Result};

    struct CannedGenerator {
        reply: String,
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String> {
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String> {
            Err(AppError::generation("backend unavailable"))
        }
    }

    fn agent_with(generator: Arc<dyn TextGenerator>) -> JobSearchAgent {
        JobSearchAgent::new(JobPosting::samples(), generator)
    }

    #[test]
    fn search_matches_any_token_across_fields() {
        let agent = agent_with(Arc::new(CannedGenerator {
            reply: String::new(),
        }));

        let python = agent.search_jobs("python roles");
        assert!(python.iter().all(|j| {
            j.skills_required.to_lowercase().contains("python")
                || j.position_title.to_lowercase().contains("python")
        }));

        let bangalore = agent.search_jobs("bangalore");
        assert_eq!(bangalore.len(), 2);
    }

    #[test]
    fn search_keeps_short_skill_tokens() {
        let agent = agent_with(Arc::new(CannedGenerator {
            reply: String::new(),
        }));

        let ml = agent.search_jobs("ml roles");
        assert!(
            ml.iter()
                .any(|j| j.position_title.to_lowercase().contains("ml")),
            "two-letter skill keywords must still match"
        );
    }

    #[test]
    fn search_with_no_match_returns_empty() {
        let agent = agent_with(Arc::new(CannedGenerator {
            reply: String::new(),
        }));
        assert!(agent.search_jobs("cobol").is_empty());
        assert!(agent.search_jobs("").is_empty());
        assert!(agent.search_jobs("   ").is_empty());
    }

    #[tokio::test]
    async fn process_query_returns_generated_text_and_matches() {
        let agent = agent_with(Arc::new(CannedGenerator {
            reply: "Two postings look relevant.".into(),
        }));

        let reply = agent.process_query("u1", "python jobs in Bangalore").await;
        assert_eq!(reply.status, "success");
        assert_eq!(reply.response, "Two postings look relevant.");
        assert_eq!(reply.intent, QueryIntent::JobSearch);
        assert!(!reply.jobs.is_empty());
        assert_eq!(agent.active_users().await, 1);
    }

    #[tokio::test]
    async fn generation_failure_is_reported_not_propagated() {
        let agent = agent_with(Arc::new(FailingGenerator));

        let reply = agent.process_query("u1", "any openings?").await;
        assert_eq!(reply.status, "error");
        assert!(reply.response.contains("try again"));
        // The exchange is still recorded
        assert_eq!(agent.active_users().await, 1);
    }

    #[tokio::test]
    async fn contexts_are_isolated_per_user() {
        let agent = agent_with(Arc::new(CannedGenerator {
            reply: "ok".into(),
        }));

        agent.process_query("alice", "python jobs").await;
        agent.process_query("bob", "salary info").await;
        assert_eq!(agent.active_users().await, 2);
    }

    #[test]
    fn prompt_includes_context_and_matches() {
        let prompt = build_prompt(
            "User: python jobs",
            &JobPosting::samples()[..1],
            "what about salary?",
        );
        assert!(prompt.contains("Conversation so far:"));
        assert!(prompt.contains("TechCorp India"));
        assert!(prompt.ends_with("Question: what about salary?"));
    }
}
