//! External collaborators and the chat agent.

pub mod agent;
pub mod genai;

pub use agent::{AgentReply, JobSearchAgent};
pub use genai::{GeminiClient, TextGenerator};
