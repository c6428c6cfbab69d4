use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signalist_core::config::Settings;
use signalist_core::llm::gemini::GeminiClient;
use signalist_core::mail::smtp::SmtpMailer;
use signalist_core::market::{FinnhubClient, MarketDataProvider};
use signalist_core::news::NewsAggregator;
use signalist_core::notify::{self, SignupProfile};
use signalist_core::storage::{PgUserDirectory, PgWatchlistStore, UserDirectory};

#[derive(Debug, Parser)]
#[command(name = "signalist_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send every user their daily market news summary email. Scheduled
    /// externally at 12:00 UTC (cron "0 12 * * *").
    Daily {
        /// Run date (YYYY-MM-DD) used for the duplicate-run lock. Defaults to
        /// today's UTC date.
        #[arg(long)]
        date: Option<String>,

        /// Resolve watchlists and news but stop before summarizing and
        /// sending.
        #[arg(long)]
        dry_run: bool,
    },

    /// Send a personalized welcome email to one new user.
    Welcome {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        goals: Option<String>,

        #[arg(long)]
        risk: Option<String>,

        #[arg(long)]
        industry: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Daily { date, dry_run } => run_daily(&settings, date.as_deref(), dry_run).await,
        Command::Welcome {
            email,
            name,
            country,
            goals,
            risk,
            industry,
        } => {
            let profile = SignupProfile {
                email,
                name,
                country,
                investment_goals: goals,
                risk_tolerance: risk,
                preferred_industry: industry,
            };
            run_welcome(&settings, &profile).await
        }
    };

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
    }

    result
}

async fn run_daily(
    settings: &Settings,
    date_arg: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let run_date = resolve_run_date(date_arg)?;

    let db_url = settings.require_database_url()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    signalist_core::storage::migrate(&pool).await?;

    let acquired =
        signalist_core::storage::lock::try_acquire_daily_run_lock(&pool, run_date).await?;
    if !acquired {
        tracing::warn!(%run_date, "daily run lock not acquired; another run in progress");
        return Ok(());
    }

    let result = run_daily_locked(settings, &pool, run_date, dry_run).await;

    let _ = signalist_core::storage::lock::release_daily_run_lock(&pool, run_date).await;
    result
}

async fn run_daily_locked(
    settings: &Settings,
    pool: &sqlx::PgPool,
    run_date: chrono::NaiveDate,
    dry_run: bool,
) -> anyhow::Result<()> {
    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(FinnhubClient::from_settings(settings)?);
    let news = NewsAggregator::new(provider);
    let directory = PgUserDirectory::new(pool.clone());
    let watchlists = PgWatchlistStore::new(pool.clone());

    if dry_run {
        let users = directory.list_users_with_email().await?;
        let resolved = notify::resolve_news_for_users(&watchlists, &news, users).await;
        for entry in &resolved {
            tracing::info!(
                email = %entry.user.email,
                articles = entry.articles.len(),
                "dry-run: resolved news"
            );
        }
        tracing::info!(
            %run_date,
            users = resolved.len(),
            dry_run = true,
            "daily news summary dry-run complete"
        );
        return Ok(());
    }

    let llm = GeminiClient::from_settings(settings)?;
    let mailer = SmtpMailer::from_settings(settings)?;

    let outcome =
        notify::run_daily_news_summary(&directory, &watchlists, &news, &llm, &mailer).await;

    if outcome.success {
        tracing::info!(%run_date, message = %outcome.message, "daily news summary run finished");
    } else {
        tracing::warn!(
            %run_date,
            message = %outcome.message,
            "daily news summary run finished without sending"
        );
    }

    Ok(())
}

async fn run_welcome(settings: &Settings, profile: &SignupProfile) -> anyhow::Result<()> {
    let llm = GeminiClient::from_settings(settings)?;
    let mailer = SmtpMailer::from_settings(settings)?;

    let outcome = notify::run_welcome_email(&llm, &mailer, profile).await?;

    tracing::info!(
        email = %profile.email,
        message = %outcome.message,
        "welcome email run finished"
    );
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_run_date(date_arg: Option<&str>) -> anyhow::Result<chrono::NaiveDate> {
    if let Some(s) = date_arg {
        return Ok(chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")?);
    }
    Ok(chrono::Utc::now().date_naive())
}
