//! Conversation context for the job search assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum turns kept per user; oldest turns are dropped beyond this.
const CONTEXT_CAP: usize = 10;

/// Turns rendered into the prompt sent to the text generator.
const PROMPT_TURNS: usize = 5;

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Rolling per-user conversation window.
///
/// Advisory context only: lives for the process lifetime, never persisted,
/// and same-user write races are last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    turns: Vec<ChatTurn>,
}

impl UserContext {
    /// Append a turn, dropping the oldest beyond the cap.
    pub fn add_turn(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: role.into(),
            content: content.into(),
            timestamp: Utc::now(),
        });
        if self.turns.len() > CONTEXT_CAP {
            let excess = self.turns.len() - CONTEXT_CAP;
            self.turns.drain(..excess);
        }
    }

    /// Render the most recent turns as prompt context.
    pub fn recent_context(&self) -> String {
        self.turns
            .iter()
            .rev()
            .take(PROMPT_TURNS)
            .rev()
            .map(|t| format!("{}: {}", capitalize(&t.role), t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Coarse classification of what the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    JobSearch,
    SalaryInfo,
    LocationQuery,
    SkillAnalysis,
    CompanyInfo,
    GeneralChat,
}

impl QueryIntent {
    /// Keyword-based intent classification.
    pub fn classify(query: &str) -> Self {
        let q = query.to_lowercase();

        if contains_any(&q, &["salary", "lpa", "ctc", "package", "pay"]) {
            Self::SalaryInfo
        } else if contains_any(&q, &["location", "city", "remote", "relocat", "where"]) {
            Self::LocationQuery
        } else if contains_any(&q, &["skill", "requirement", "qualif", "learn"]) {
            Self::SkillAnalysis
        } else if contains_any(&q, &["company", "about", "who is", "reputation"]) {
            Self::CompanyInfo
        } else if contains_any(&q, &["job", "role", "position", "opening", "opportunit", "hiring"])
        {
            Self::JobSearch
        } else {
            Self::GeneralChat
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_drops_oldest_beyond_cap() {
        let mut ctx = UserContext::default();
        for i in 0..15 {
            ctx.add_turn("user", format!("message {i}"));
        }
        assert_eq!(ctx.len(), CONTEXT_CAP);
        // Oldest surviving turn is message 5
        assert!(ctx.recent_context().contains("message 14"));
        assert!(!ctx.recent_context().contains("message 4"));
    }

    #[test]
    fn recent_context_renders_last_five_in_order() {
        let mut ctx = UserContext::default();
        for i in 0..8 {
            ctx.add_turn(if i % 2 == 0 { "user" } else { "assistant" }, format!("m{i}"));
        }
        let rendered = ctx.recent_context();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Assistant: m3");
        assert_eq!(lines[4], "Assistant: m7");
    }

    #[test]
    fn intent_classification_covers_keywords() {
        assert_eq!(
            QueryIntent::classify("What is the salary for this role?"),
            QueryIntent::SalaryInfo
        );
        assert_eq!(
            QueryIntent::classify("any remote openings?"),
            QueryIntent::LocationQuery
        );
        assert_eq!(
            QueryIntent::classify("python jobs please"),
            QueryIntent::JobSearch
        );
        assert_eq!(QueryIntent::classify("hello there"), QueryIntent::GeneralChat);
    }
}
