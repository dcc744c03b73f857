//! Digest delivery over SMTP.
//!
//! The digest body is Markdown; it is sent as plain text and reads fine in
//! any client. The orchestrator only sees the [`Notifier`] capability.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use tubedigest_shared::{Result, TubedigestError};

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Capability interface for delivering a digest to a recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `body` to `to` under `subject`.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SmtpNotifier
// ---------------------------------------------------------------------------

/// SMTP-backed [`Notifier`] using an authenticated TLS relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Create a notifier for an implicit-TLS relay. The account username is
    /// also the sender address.
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Result<Self> {
        let from: Mailbox = username.parse().map_err(|e| {
            TubedigestError::config(format!("smtp username is not a mail address: {e}"))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| TubedigestError::Delivery(format!("smtp relay {host}: {e}")))?
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self { transport, from })
    }
}

/// Assemble the outgoing message. Split out so header assembly is testable
/// without a live relay.
fn build_message(from: &Mailbox, to: &str, subject: &str, body: &str) -> Result<Message> {
    let to: Mailbox = to
        .parse()
        .map_err(|e| TubedigestError::Delivery(format!("invalid recipient {to}: {e}")))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| TubedigestError::Delivery(format!("message assembly: {e}")))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[instrument(skip_all, fields(to = %to, subject = %subject))]
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = build_message(&self.from, to, subject, body)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| TubedigestError::Delivery(e.to_string()))?;

        info!(to, "digest email sent");
        Ok(())
    }
}
