use crate::notify::welcome::SignupProfile;

pub const NEWS_SUMMARY_EMAIL_PROMPT: &str = "\
You are a financial newsletter writer for Signalist, a stock market tracking app.
Write the body of a concise daily market news email from the articles below.
Guidelines:
- Lead with the most market-moving story.
- Group related stories together.
- Plain text only. No markdown, no HTML.
- Keep it under 200 words.
- Use only facts present in the articles.

Articles JSON:
{{newsData}}";

pub const PERSONALIZED_WELCOME_EMAIL_PROMPT: &str = "\
You are writing the intro paragraph of a welcome email for Signalist, a stock
market tracking app. Personalize it using the new user's signup profile below.
Guidelines:
- One short paragraph, at most two sentences, warm but not salesy.
- Mention their preferred industry or goal when the profile has one.
- Plain text only.

User profile:
{{userProfile}}";

pub fn render_news_summary_prompt(news_json: &str) -> String {
    NEWS_SUMMARY_EMAIL_PROMPT.replace("{{newsData}}", news_json)
}

pub fn render_welcome_prompt(profile: &SignupProfile) -> String {
    PERSONALIZED_WELCOME_EMAIL_PROMPT.replace("{{userProfile}}", &profile_block(profile))
}

fn profile_block(profile: &SignupProfile) -> String {
    let field = |v: &Option<String>| -> String {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Not specified")
            .to_string()
    };

    format!(
        "- Country: {}\n- Investment goals: {}\n- Risk tolerance: {}\n- Preferred industry: {}",
        field(&profile.country),
        field(&profile.investment_goals),
        field(&profile.risk_tolerance),
        field(&profile.preferred_industry),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_news_data_placeholder() {
        let prompt = render_news_summary_prompt("[{\"id\":1}]");
        assert!(prompt.contains("[{\"id\":1}]"));
        assert!(!prompt.contains("{{newsData}}"));
    }

    #[test]
    fn renders_profile_with_defaults_for_missing_answers() {
        let prompt = render_welcome_prompt(&SignupProfile {
            email: "sam@example.com".into(),
            name: "Sam".into(),
            country: Some("Norway".into()),
            investment_goals: None,
            risk_tolerance: Some("  ".into()),
            preferred_industry: Some("Tech".into()),
        });

        assert!(prompt.contains("- Country: Norway"));
        assert!(prompt.contains("- Investment goals: Not specified"));
        assert!(prompt.contains("- Risk tolerance: Not specified"));
        assert!(prompt.contains("- Preferred industry: Tech"));
        assert!(!prompt.contains("{{userProfile}}"));
    }
}
