use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::super::domain::DonorId;

/// Prepared e-mail handed to the mail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub donor_id: DonorId,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound mail boundary (SMTP relay, provider API, or a test double).
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Cheap reachability check issued once before a fan-out.
    async fn probe(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
    #[error("delivery to {address} refused: {reason}")]
    Rejected { address: String, reason: String },
    #[error("donor has no delivery address")]
    MissingAddress,
}
