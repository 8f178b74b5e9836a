use anyhow::{bail, Context, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use tracing::info;

const SENDER_NAME: &str = "Hibrain 임용 알리미";
/// Implicit-TLS submission port; everything else goes through STARTTLS.
const SMTPS_PORT: u16 = 465;

/// SMTP settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    pub to: Vec<String>,
}

impl MailSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string());
        let port = match get("SMTP_PORT") {
            Some(p) => p
                .parse::<u16>()
                .with_context(|| format!("SMTP_PORT is not a port number: {}", p))?,
            None => 587,
        };

        let mut missing = Vec::new();
        let user = get("SMTP_USER");
        let password = get("SMTP_PASSWORD");
        let to_raw = get("SMTP_TO");
        if user.is_none() {
            missing.push("SMTP_USER");
        }
        if password.is_none() {
            missing.push("SMTP_PASSWORD");
        }
        if to_raw.is_none() {
            missing.push("SMTP_TO");
        }
        let (Some(user), Some(password), Some(to_raw)) = (user, password, to_raw) else {
            bail!("Missing SMTP settings: {}", missing.join(", "));
        };

        let from = get("SMTP_FROM").unwrap_or_else(|| user.clone());
        let to: Vec<String> = to_raw
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if to.is_empty() {
            bail!("SMTP_TO lists no recipients");
        }

        Ok(Self {
            host,
            port,
            user,
            password,
            from,
            to,
        })
    }
}

pub struct Mailer {
    settings: MailSettings,
}

impl Mailer {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    /// Send a plain-text UTF-8 mail to every configured recipient.
    pub async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let message = build_message(&self.settings, subject, body)?;
        let settings = self.settings.clone();

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || -> Result<()> {
            let relay = if settings.port == SMTPS_PORT {
                SmtpTransport::relay(&settings.host)
            } else {
                SmtpTransport::starttls_relay(&settings.host)
            };
            let builder = relay
                .with_context(|| format!("SMTP relay init failed for {}", settings.host))?;

            let transport = builder
                .port(settings.port)
                .credentials(Credentials::new(settings.user.clone(), settings.password.clone()))
                .build();
            transport.send(&message).context("SMTP send failed")?;
            Ok(())
        })
        .await
        .context("spawn_blocking join failed")??;

        info!(
            recipients = self.settings.to.len(),
            subject, "Mail sent"
        );
        Ok(())
    }
}

fn build_message(settings: &MailSettings, subject: &str, body: &str) -> Result<Message> {
    let from_addr: Address = settings
        .from
        .parse()
        .with_context(|| format!("SMTP_FROM is not a mail address: {}", settings.from))?;

    let mut builder = Message::builder()
        .from(Mailbox::new(Some(SENDER_NAME.to_string()), from_addr))
        .subject(subject)
        .header(ContentType::TEXT_PLAIN);
    for to in &settings.to {
        let mailbox: Mailbox = to
            .parse()
            .with_context(|| format!("Invalid recipient address: {}", to))?;
        builder = builder.to(mailbox);
    }

    builder
        .body(body.to_string())
        .context("Failed to build mail message")
}
