//! Urgent-request fan-out to donors flagged as available.
//!
//! Deliveries are independent: each send runs in a bounded-concurrency group and its result is
//! captured per donor, so one refused address never stops the others. Only a failed transport
//! probe or donor lookup aborts a dispatch, and neither affects the stored request.

mod message;
mod transport;

pub use transport::{MailTransport, OutboundMessage, TransportError};

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{BloodRequest, DonorId, RequestId};
use super::repository::{DonorFilter, DonorRepository, RepositoryError};

pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
pub const DEFAULT_SENDER: &str = "Blood Donation System <noreply@bdas.local>";

/// Fan-out tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    pub max_concurrency: usize,
    pub sender: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            sender: DEFAULT_SENDER.to_string(),
        }
    }
}

/// One undelivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    pub donor_id: DonorId,
    pub address: String,
    pub error: String,
}

/// Per-dispatch tally returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub request_id: RequestId,
    pub attempted: usize,
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DispatchReport {
    fn empty(request_id: RequestId) -> Self {
        Self {
            request_id,
            attempted: 0,
            delivered: 0,
            failures: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unable to load donors for notification: {0}")]
    Donors(#[from] RepositoryError),
    #[error(transparent)]
    TransportUnavailable(TransportError),
}

pub struct NotificationDispatcher<D, M> {
    donors: Arc<D>,
    transport: Arc<M>,
    config: DispatchConfig,
}

impl<D, M> NotificationDispatcher<D, M>
where
    D: DonorRepository,
    M: MailTransport,
{
    pub fn new(donors: Arc<D>, transport: Arc<M>, config: DispatchConfig) -> Self {
        Self {
            donors,
            transport,
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Notify every flagged-eligible donor whose blood type matches the request.
    pub async fn dispatch(&self, request: &BloodRequest) -> Result<DispatchReport, DispatchError> {
        let recipients: Vec<_> = self
            .donors
            .fetch_donors(&DonorFilter::flagged_eligible())?
            .into_iter()
            .filter(|donor| donor.blood_type.matches_label(&request.blood_type))
            .collect();

        let mut report = DispatchReport::empty(request.id.clone());
        if recipients.is_empty() {
            info!(request_id = %request.id, "no eligible donors to notify");
            return Ok(report);
        }

        self.transport
            .probe()
            .await
            .map_err(DispatchError::TransportUnavailable)?;

        report.attempted = recipients.len();
        let mut messages = Vec::with_capacity(recipients.len());
        for donor in &recipients {
            if donor.email.trim().is_empty() {
                report.failures.push(DeliveryFailure {
                    donor_id: donor.id.clone(),
                    address: String::new(),
                    error: TransportError::MissingAddress.to_string(),
                });
                continue;
            }
            messages.push(message::build_message(request, donor, &self.config.sender));
        }

        let transport = self.transport.as_ref();
        let outcomes: Vec<_> = stream::iter(messages)
            .map(|message| async move {
                let donor_id = message.donor_id.clone();
                let address = message.to.clone();
                (donor_id, address, transport.send(message).await)
            })
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        for (donor_id, address, outcome) in outcomes {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!(request_id = %request.id, donor_id = %donor_id, %error, "donor notification failed");
                    report.failures.push(DeliveryFailure {
                        donor_id,
                        address,
                        error: error.to_string(),
                    });
                }
            }
        }

        info!(
            request_id = %request.id,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed(),
            "emergency notifications dispatched"
        );
        Ok(report)
    }
}
