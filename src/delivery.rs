//! Email delivery of the exported CSV, gated behind the `email` feature.
//!
//! With the feature enabled, [`Mailer::connect`] authenticates against the
//! Gmail submission relay (STARTTLS on port 587) before any crawling happens,
//! so bad credentials stop the run early. [`Mailer::send`] attaches the CSV
//! once it has been written.
//!
//! Without the feature both calls return [`DeliveryError::Disabled`], which
//! `main` only ever sees when mail options were actually supplied.
//!
//! Enable with: `cargo build --features email`

use std::path::Path;

use crate::error::DeliveryError;

/// Outbound relay every message goes through.
#[cfg_attr(not(feature = "email"), allow(dead_code))]
pub const SMTP_RELAY: &str = "smtp.gmail.com";

/// Subject line of the delivery email.
#[cfg_attr(not(feature = "email"), allow(dead_code))]
pub const SUBJECT: &str = "Canopy Forum Scraper Data";

/// Sender credentials and recipient.
#[derive(Clone)]
pub struct MailSettings {
    pub from: String,
    pub password: String,
    pub to: String,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("from", &self.from)
            .field("password", &"<redacted>")
            .field("to", &self.to)
            .finish()
    }
}

/// An authenticated SMTP session factory.
#[cfg(feature = "email")]
pub struct Mailer {
    settings: MailSettings,
    transport: lettre::AsyncSmtpTransport<lettre::Tokio1Executor>,
}

#[cfg(feature = "email")]
impl Mailer {
    /// Authenticate against [`SMTP_RELAY`]; fails fast on bad credentials.
    #[tracing::instrument(level = "info", skip_all, fields(from = %settings.from))]
    pub async fn connect(settings: MailSettings) -> Result<Self, DeliveryError> {
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{AsyncSmtpTransport, Tokio1Executor};

        let auth_error = |message: String| DeliveryError::Auth {
            user: settings.from.clone(),
            message,
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(SMTP_RELAY)
            .map_err(|e| auth_error(e.to_string()))?
            .credentials(Credentials::new(
                settings.from.clone(),
                settings.password.clone(),
            ))
            .build();

        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => return Err(auth_error("relay refused the connection".to_string())),
            Err(e) => return Err(auth_error(e.to_string())),
        }
        tracing::info!(relay = SMTP_RELAY, "Mail login successful");
        Ok(Self {
            settings,
            transport,
        })
    }

    /// Send `attachment` to the configured recipient.
    #[tracing::instrument(level = "info", skip_all, fields(to = %self.settings.to, path = %attachment.display()))]
    pub async fn send(&self, attachment: &Path) -> Result<(), DeliveryError> {
        use lettre::message::header::ContentType;
        use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
        use lettre::{AsyncTransport, Message};

        let mailbox = |address: &str| {
            address
                .parse::<Mailbox>()
                .map_err(|e| DeliveryError::Address {
                    address: address.to_string(),
                    message: e.to_string(),
                })
        };

        let body = tokio::fs::read(attachment)
            .await
            .map_err(|source| DeliveryError::Io {
                path: attachment.to_path_buf(),
                source,
            })?;
        let filename = attachment
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export.csv".to_string());
        let content_type =
            ContentType::parse("text/csv").map_err(|e| DeliveryError::Build(e.to_string()))?;

        let message = Message::builder()
            .from(mailbox(&self.settings.from)?)
            .to(mailbox(&self.settings.to)?)
            .subject(SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(String::new()))
                    .singlepart(Attachment::new(filename).body(body, content_type)),
            )
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Send {
                to: self.settings.to.clone(),
                message: e.to_string(),
            })?;
        tracing::info!("Emailed exported data");
        Ok(())
    }
}

/// Placeholder when the binary is built without the `email` feature.
#[cfg(not(feature = "email"))]
#[derive(Debug)]
pub struct Mailer;

#[cfg(not(feature = "email"))]
impl Mailer {
    /// Always [`DeliveryError::Disabled`] (no-op when `email` feature is disabled).
    pub async fn connect(_settings: MailSettings) -> Result<Self, DeliveryError> {
        Err(DeliveryError::Disabled)
    }

    /// Always [`DeliveryError::Disabled`].
    pub async fn send(&self, _attachment: &Path) -> Result<(), DeliveryError> {
        Err(DeliveryError::Disabled)
    }
}
