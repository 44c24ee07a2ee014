//! Delivery with an ordered transport fallback: the Gmail API first, then a
//! direct SMTP session. One pass, no retries within a transport.

pub mod gmail;
pub mod smtp;

pub use gmail::GmailTransport;
pub use smtp::SmtpTransport;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::context::AppContext;

#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub recipient: String,
    pub cc: Option<String>,
    pub subject: String,
    pub body_html: String,
    pub attachment_path: Option<PathBuf>,
}

/// Failures stay inside the delivery layer: every variant routes the attempt
/// to the next transport instead of propagating.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("credential unavailable: {0}")]
    CredentialUnavailable(String),
    #[error("message build failed: {0}")]
    Build(String),
    #[error("provider rejected the message: {0}")]
    Provider(String),
    #[error("smtp session failed: {0}")]
    Smtp(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, request: &DeliveryRequest) -> Result<(), TransportError>;
}

/// Walks the transports in their given order and reports true on the first
/// success. False means every transport failed; the caller decides the user
/// messaging.
pub async fn attempt_delivery(transports: &[&dyn Transport], request: &DeliveryRequest) -> bool {
    for transport in transports {
        match transport.send(request).await {
            Ok(()) => {
                info!(transport = transport.name(), "message delivered");
                return true;
            }
            Err(err) => {
                warn!(transport = transport.name(), error = %err, "transport failed");
            }
        }
    }

    warn!("all transports failed; message not delivered");
    false
}

pub async fn deliver(ctx: &AppContext, request: &DeliveryRequest) -> bool {
    let gmail = GmailTransport::from_context(ctx);
    let smtp = SmtpTransport::from_context(ctx);

    attempt_delivery(&[&gmail, &smtp], request).await
}
