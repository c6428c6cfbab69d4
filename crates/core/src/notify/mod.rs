pub mod daily;
pub mod prompts;
pub mod welcome;

pub use daily::{resolve_news_for_users, run_daily_news_summary, UserNews};
pub use welcome::{run_welcome_email, SignupProfile};

/// What a pipeline run reports back to its scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub message: String,
}
