//! Email backends.
//!
//! - [`SmtpBackend`] - Delivers messages to an SMTP relay
//! - [`ConsoleBackend`] - Prints messages to stdout
//! - [`InMemoryBackend`] - Collects messages for inspection in tests
//! - [`DummyBackend`] - Drops every message
//!
//! [`backend_from_settings`] picks one from [`CoreSettings::email_backend`].

use std::sync::Arc;

use async_trait::async_trait;
use django_core_common::error::{CoreError, CoreResult};
use django_core_common::settings::{CoreSettings, EmailBackendKind};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tokio::sync::RwLock;

use crate::message::EmailMessage;

/// Sends email messages.
#[async_trait]
pub trait EmailBackend: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()>;

    /// Sends each message in turn, stopping at the first failure. Returns
    /// how many were sent.
    async fn send_messages(&self, messages: &[EmailMessage]) -> CoreResult<usize> {
        for message in messages {
            self.send(message).await?;
        }
        Ok(messages.len())
    }
}

fn require_recipients(message: &EmailMessage) -> CoreResult<()> {
    if message.recipients().is_empty() {
        return Err(CoreError::BadRequest(
            "Email must have at least one recipient".to_string(),
        ));
    }
    Ok(())
}

// ── SmtpBackend ─────────────────────────────────────────────────────

/// Delivers messages to an SMTP relay, one connection per message.
///
/// The connection is plain text with no authentication.
#[derive(Debug, Clone)]
pub struct SmtpBackend {
    pub host: String,
    pub port: u16,
}

impl SmtpBackend {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn transport(&self) -> AsyncSmtpTransport<Tokio1Executor> {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(self.host.as_str())
            .port(self.port)
            .build()
    }
}

#[async_trait]
impl EmailBackend for SmtpBackend {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()> {
        require_recipients(message)?;
        let mime = message.to_mime()?;
        self.transport().send(mime).await.map_err(|e| {
            tracing::error!(host = %self.host, port = self.port, error = %e, "smtp delivery failed");
            CoreError::InternalServerError(format!("SMTP delivery failed: {e}"))
        })?;
        tracing::info!(
            subject = %message.subject,
            from = %message.from_email,
            to = %message.to.join(", "),
            host = %self.host,
            port = self.port,
            "email sent"
        );
        Ok(())
    }
}

// ── ConsoleBackend ──────────────────────────────────────────────────

/// Prints messages to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleBackend;

#[async_trait]
impl EmailBackend for ConsoleBackend {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()> {
        let separator = "-".repeat(60);
        let formatted = message.format_message();
        tokio::task::spawn_blocking(move || {
            println!("{separator}");
            print!("{formatted}");
            println!("{separator}");
        })
        .await
        .map_err(|e| CoreError::InternalServerError(e.to_string()))
    }
}

// ── InMemoryBackend ─────────────────────────────────────────────────

/// Keeps every message in an outbox. Clones share the outbox.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    outbox: Arc<RwLock<Vec<EmailMessage>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.outbox.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.outbox.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.outbox.write().await.clear();
    }
}

#[async_trait]
impl EmailBackend for InMemoryBackend {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()> {
        require_recipients(message)?;
        self.outbox.write().await.push(message.clone());
        Ok(())
    }
}

// ── DummyBackend ────────────────────────────────────────────────────

/// Accepts and discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyBackend;

#[async_trait]
impl EmailBackend for DummyBackend {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()> {
        tracing::debug!(subject = %message.subject, "email discarded");
        Ok(())
    }
}

/// The backend `settings` select.
///
/// Each call returns a new backend, so `locmem` gets an empty outbox.
pub fn backend_from_settings(settings: &CoreSettings) -> Arc<dyn EmailBackend> {
    match settings.email_backend {
        EmailBackendKind::Smtp => Arc::new(SmtpBackend::new(
            settings.email_host.clone(),
            settings.email_port,
        )),
        EmailBackendKind::Console => Arc::new(ConsoleBackend),
        EmailBackendKind::Locmem => Arc::new(InMemoryBackend::new()),
        EmailBackendKind::Dummy => Arc::new(DummyBackend),
    }
}
