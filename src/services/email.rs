use crate::config::email::EmailConfig;
use anyhow::Result;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

/// The external mail collaborator. Opaque to the rest of the engine: it takes
/// (to, subject, html) and answers success or failure. Failures are retryable
/// and never escalate past the delivery they belong to.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: Option<String>,
    send_timeout: Duration,
}

impl EmailService {
    /// Build from environment variables. If SMTP is not configured, the
    /// service reports unconfigured and deliveries keep their email state
    /// pending (graceful degradation).
    pub fn from_env() -> Self {
        match EmailConfig::from_env() {
            Some(cfg) => {
                let creds = Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
                let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
                    .map(|builder| builder.port(cfg.smtp_port).credentials(creds).build());

                match transport {
                    Ok(t) => Self {
                        transport: Some(t),
                        from_address: Some(cfg.from_address),
                        send_timeout: Duration::from_secs(cfg.send_timeout_secs),
                    },
                    Err(e) => {
                        tracing::warn!("Failed to build SMTP transport: {e}");
                        Self {
                            transport: None,
                            from_address: None,
                            send_timeout: Duration::from_secs(cfg.send_timeout_secs),
                        }
                    }
                }
            }
            None => Self {
                transport: None,
                from_address: None,
                send_timeout: Duration::from_secs(10),
            },
        }
    }

    /// Returns true if SMTP is configured and available.
    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Send one HTML notification email, bounded by the configured timeout.
    /// Callers must check `is_configured` first; an unconfigured send is an
    /// error so delivery state is never marked sent without a real send.
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("SMTP not configured"))?;
        let from_address = self
            .from_address
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("SMTP from address not configured"))?;

        let from_mailbox: Mailbox =
            from_address
                .parse()
                .map_err(|e: lettre::address::AddressError| {
                    anyhow::anyhow!("Invalid from address '{}': {}", from_address, e)
                })?;
        let to_mailbox: Mailbox = to.parse().map_err(|e: lettre::address::AddressError| {
            anyhow::anyhow!("Invalid to address '{}': {}", to, e)
        })?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;

        match tokio::time::timeout(self.send_timeout, transport.send(email)).await {
            Ok(Ok(_)) => {
                tracing::info!("Email sent to {to}: {subject}");
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(anyhow::anyhow!(
                "SMTP send to {to} timed out after {:?}",
                self.send_timeout
            )),
        }
    }
}
