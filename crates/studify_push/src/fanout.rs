// --- File: crates/studify_push/src/fanout.rs ---
//! Bounded-chunk multicast over the push transport.
//!
//! Deliveries are batched into bounded-size chunks; a failing chunk is logged
//! and never aborts the remaining chunks, and per-destination invalid-token
//! failures are reported back so the caller can deactivate dead endpoints.

use futures_util::future::join_all;
use studify_common::services::{PushDeliveryError, PushPayload, PushTransport};
use tracing::{debug, warn};

/// Outcome of one fan-out over a list of destination tokens.
#[derive(Debug, Default)]
pub struct FanoutReport {
    /// Number of deliveries attempted
    pub attempted: usize,
    /// Number of deliveries the transport accepted
    pub delivered: usize,
    /// Message ids returned by the transport for accepted deliveries
    pub message_ids: Vec<String>,
    /// Tokens the transport declared dead; callers deactivate these
    pub invalid_tokens: Vec<String>,
    /// Number of transient transport failures
    pub transport_failures: usize,
}

impl FanoutReport {
    /// True when at least one delivery was accepted by the transport.
    pub fn any_delivered(&self) -> bool {
        self.delivered > 0
    }
}

/// Deliver one payload to every destination token, `chunk_size` tokens at a
/// time. Deliveries within a chunk run concurrently.
pub async fn deliver_to_tokens(
    transport: &dyn PushTransport,
    tokens: &[String],
    payload: &PushPayload,
    chunk_size: usize,
) -> FanoutReport {
    let mut report = FanoutReport::default();
    let chunk_size = chunk_size.max(1);

    for chunk in tokens.chunks(chunk_size) {
        let sends = chunk
            .iter()
            .map(|token| async move { (token, transport.send_to_token(token, payload).await) });

        for (token, result) in join_all(sends).await {
            report.attempted += 1;
            match result {
                Ok(message_id) => {
                    report.delivered += 1;
                    report.message_ids.push(message_id);
                }
                Err(PushDeliveryError::InvalidToken(reason)) => {
                    debug!("Destination token declared dead by transport: {}", reason);
                    report.invalid_tokens.push(token.clone());
                }
                Err(PushDeliveryError::Transport(reason)) => {
                    // Transient failure for this destination only; the rest
                    // of the chunk and all later chunks still go out.
                    warn!("Push delivery failed: {}", reason);
                    report.transport_failures += 1;
                }
            }
        }
    }

    report
}
