//! Outbound SMTP transport for replies and newsletter sends.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP relay host (default: `localhost`, unencrypted, dev only).
    pub host: String,
    /// Optional credentials; both or neither must be set.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address on all outbound mail.
    pub from_address: String,
    /// Sender display name.
    pub from_name: String,
}

impl MailerConfig {
    /// Load SMTP configuration from environment variables.
    ///
    /// | Env Var         | Default              |
    /// |-----------------|----------------------|
    /// | `SMTP_HOST`     | `localhost`          |
    /// | `SMTP_USERNAME` | unset                |
    /// | `SMTP_PASSWORD` | unset                |
    /// | `SMTP_FROM`     | `kontor@localhost`   |
    /// | `SMTP_FROM_NAME`| `Kontor`             |
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".into()),
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            from_address: std::env::var("SMTP_FROM").unwrap_or_else(|_| "kontor@localhost".into()),
            from_name: std::env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Kontor".into()),
        }
    }
}

/// Failure while building or sending a message.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP send failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl From<MailerError> for crate::error::AppError {
    fn from(err: MailerError) -> Self {
        crate::error::AppError::InternalError(err.to_string())
    }
}

/// Cheaply cloneable SMTP sender shared via [`AppState`].
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    /// Build a transport from config.
    ///
    /// With credentials the connection uses the relay port with TLS;
    /// without them it falls back to an unencrypted local relay, which
    /// is only suitable for development.
    pub fn new(config: &MailerConfig) -> Result<Self, MailerError> {
        let transport = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
                    .credentials(Credentials::new(username.clone(), password.clone()))
                    .build()
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).build(),
        };

        let from = Mailbox::new(
            Some(config.from_name.clone()),
            config.from_address.parse()?,
        );

        Ok(Self { transport, from })
    }

    /// Send a plain-text message.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(message).await?;
        Ok(())
    }

    /// The configured sender address (used as `to_address` on stored
    /// reply copies).
    pub fn from_address(&self) -> String {
        self.from.email.to_string()
    }
}
