use crate::domain::{Article, User};
use crate::llm::TextGenerator;
use crate::mail::{Mailer, NewsSummaryEmail};
use crate::news::NewsSource;
use crate::notify::{prompts, RunOutcome};
use crate::storage::{UserDirectory, WatchlistStore};
use crate::time::formatted_today;
use futures::future::join_all;

/// Substituted when the model answers without usable text. The email still
/// goes out in that case.
const SUMMARY_FALLBACK: &str = "No Market news";

/// One user's resolved slice of the day's news.
#[derive(Debug, Clone)]
pub struct UserNews {
    pub user: User,
    pub articles: Vec<Article>,
}

/// Daily batch: load recipients, resolve news per user, summarize, send.
/// Every failure is accounted to a single user; the run itself only reports
/// "no users" as unsuccessful.
pub async fn run_daily_news_summary(
    directory: &dyn UserDirectory,
    watchlists: &dyn WatchlistStore,
    news: &dyn NewsSource,
    llm: &dyn TextGenerator,
    mailer: &dyn Mailer,
) -> RunOutcome {
    let users = match directory.list_users_with_email().await {
        Ok(users) => users,
        Err(err) => {
            tracing::error!(error = %err, "failed to load users for news email");
            Vec::new()
        }
    };

    if users.is_empty() {
        return RunOutcome {
            success: false,
            message: "No users found for news email".to_string(),
        };
    }

    let per_user = resolve_news_for_users(watchlists, news, users).await;

    // Summaries run one user at a time; a null summary means "do not email
    // this user today".
    let mut summaries: Vec<(User, Option<String>)> = Vec::with_capacity(per_user.len());
    for entry in &per_user {
        let summary = summarize_for_user(llm, entry).await;
        summaries.push((entry.user.clone(), summary));
    }

    let sends = summaries.iter().filter_map(|(user, summary)| {
        let news_content = summary.as_deref()?;
        Some(send_news_summary(mailer, user, news_content))
    });
    join_all(sends).await;

    RunOutcome {
        success: true,
        message: "Daily news summary emails sent successfully".to_string(),
    }
}

/// Fans out one task per user. A failed watchlist lookup degrades to an empty
/// symbol list (general news); a failed news resolution degrades to no
/// articles. Either way the other users' tasks are untouched.
pub async fn resolve_news_for_users(
    watchlists: &dyn WatchlistStore,
    news: &dyn NewsSource,
    users: Vec<User>,
) -> Vec<UserNews> {
    join_all(users.into_iter().map(|user| async move {
        let symbols = match watchlists.symbols_for_email(&user.email).await {
            Ok(symbols) => symbols,
            Err(err) => {
                tracing::warn!(
                    user = %user.email,
                    error = %err,
                    "watchlist lookup failed; treating watchlist as empty"
                );
                Vec::new()
            }
        };

        let articles = match news.news_for_symbols(&symbols).await {
            Ok(articles) => articles,
            Err(err) => {
                tracing::warn!(
                    user = %user.email,
                    error = %err,
                    "news resolution failed; continuing without articles"
                );
                Vec::new()
            }
        };

        UserNews { user, articles }
    }))
    .await
}

async fn summarize_for_user(llm: &dyn TextGenerator, entry: &UserNews) -> Option<String> {
    let news_json = match serde_json::to_string_pretty(&entry.articles) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(user = %entry.user.email, error = %err, "failed to encode news for prompt");
            return None;
        }
    };

    let prompt = prompts::render_news_summary_prompt(&news_json);

    match llm.generate(&prompt).await {
        Ok(Some(text)) => Some(text),
        Ok(None) => Some(SUMMARY_FALLBACK.to_string()),
        Err(err) => {
            tracing::warn!(user = %entry.user.email, error = %err, "failed to summarize news");
            None
        }
    }
}

async fn send_news_summary(mailer: &dyn Mailer, user: &User, news_content: &str) {
    let payload = NewsSummaryEmail {
        email: user.email.clone(),
        date: formatted_today(),
        news_content: news_content.to_string(),
    };

    if let Err(err) = mailer.send_news_summary(&payload).await {
        tracing::warn!(recipient = %user.email, error = %err, "news summary email send failed");
    }
}
