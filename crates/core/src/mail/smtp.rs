use crate::config::Settings;
use crate::mail::{Mailer, NewsSummaryEmail, WelcomeEmail};
use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

const DEFAULT_SMTP_PORT: u16 = 587;

/// Outbound-only SMTP mailer. Credentials are optional so a local relay
/// without auth still works in development.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let host = settings.require_smtp_host()?;
        let from = settings
            .require_smtp_from_address()?
            .parse::<Mailbox>()
            .context("SMTP_FROM_ADDRESS is not a valid mailbox")?;
        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_SMTP_PORT);

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .context("failed to configure SMTP relay")?
            .port(port);

        if let (Some(username), Some(password)) = (
            settings.smtp_username.clone(),
            settings.smtp_password.clone(),
        ) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_news_message(&self, email: &NewsSummaryEmail) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(email
                .email
                .parse()
                .context("invalid news summary recipient address")?)
            .subject(format!("Market News Summary Today - {}", email.date))
            .body(format!(
                "Here is your market news summary for {}.\n\n{}\n",
                email.date, email.news_content
            ))
            .context("failed to build news summary email")
    }

    fn build_welcome_message(&self, email: &WelcomeEmail) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(email
                .email
                .parse()
                .context("invalid welcome recipient address")?)
            .subject("Welcome to Signalist - your stock market toolkit is ready!")
            .body(format!(
                "Hi {},\n\n{}\n\nThe Signalist Team\n",
                email.name, email.intro
            ))
            .context("failed to build welcome email")
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send_news_summary(&self, email: &NewsSummaryEmail) -> Result<()> {
        let message = self.build_news_message(email)?;
        self.transport
            .send(message)
            .await
            .context("SMTP send failed for news summary email")?;
        tracing::info!(recipient = %email.email, "news summary email sent");
        Ok(())
    }

    async fn send_welcome(&self, email: &WelcomeEmail) -> Result<()> {
        let message = self.build_welcome_message(email)?;
        self.transport
            .send(message)
            .await
            .context("SMTP send failed for welcome email")?;
        tracing::info!(recipient = %email.email, "welcome email sent");
        Ok(())
    }
}
