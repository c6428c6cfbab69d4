use crate::llm::TextGenerator;
use crate::mail::{Mailer, WelcomeEmail};
use crate::notify::{prompts, RunOutcome};

pub const WELCOME_INTRO_FALLBACK: &str = "Thanks for joining Signalist. You now have the tools to track markets and make smarter moves.";

/// Signup answers carried on the "user created" event.
#[derive(Debug, Clone)]
pub struct SignupProfile {
    pub email: String,
    pub name: String,
    pub country: Option<String>,
    pub investment_goals: Option<String>,
    pub risk_tolerance: Option<String>,
    pub preferred_industry: Option<String>,
}

/// One-shot welcome pipeline. Intro generation may fail or come back empty;
/// either way the send is still attempted with the fallback copy. Only a
/// failed send is an error.
pub async fn run_welcome_email(
    llm: &dyn TextGenerator,
    mailer: &dyn Mailer,
    profile: &SignupProfile,
) -> anyhow::Result<RunOutcome> {
    let prompt = prompts::render_welcome_prompt(profile);

    let intro = match llm.generate(&prompt).await {
        Ok(Some(text)) => text,
        Ok(None) => WELCOME_INTRO_FALLBACK.to_string(),
        Err(err) => {
            tracing::warn!(
                user = %profile.email,
                error = %err,
                "welcome intro generation failed; using fallback copy"
            );
            WELCOME_INTRO_FALLBACK.to_string()
        }
    };

    mailer
        .send_welcome(&WelcomeEmail {
            email: profile.email.clone(),
            name: profile.name.clone(),
            intro,
        })
        .await?;

    Ok(RunOutcome {
        success: true,
        message: "Welcome email sent successfully".to_string(),
    })
}
