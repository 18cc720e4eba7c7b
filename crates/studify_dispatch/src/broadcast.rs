// --- File: crates/studify_dispatch/src/broadcast.rs ---
//! Ad-hoc course broadcasts: new quiz, schedule change, announcement.
//!
//! Triggered by course-authoring actions, this path never consults the
//! occurrence calculator. Every current enrollee gets one personalized
//! message, fanned out to all of their active devices.

use crate::error::DispatchError;
use crate::gateway::DispatchGateway;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use studify_common::models::Enrollment;
use studify_common::services::PushPayload;
use studify_db::{DeviceRegistrationRepository, SentReminderRepository};
use studify_push::deliver_to_tokens;
use tracing::{info, warn};

/// A broadcast request as issued by a course-authoring route.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BroadcastRequest {
    pub course_id: String,
    pub title: String,
    pub message: String,
    /// Event category, e.g. "quiz", "tutorial", "assignment", "announcement"
    pub kind: String,
    /// Custom key-value data for the client app
    pub data: Option<HashMap<String, String>>,
}

/// Counters from one broadcast.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BroadcastOutcome {
    /// Enrollees addressed by the broadcast
    pub recipients: usize,
    /// Push deliveries attempted across all recipients' devices
    pub deliveries_attempted: usize,
    /// Deliveries the transport accepted
    pub delivered: usize,
    /// Dead endpoints deactivated along the way
    pub devices_deactivated: usize,
}

impl<R, S> DispatchGateway<R, S>
where
    R: DeviceRegistrationRepository,
    S: SentReminderRepository,
{
    /// Send one personalized message to every current enrollee of a course.
    pub async fn broadcast(
        &self,
        request: BroadcastRequest,
    ) -> Result<BroadcastOutcome, DispatchError> {
        let enrollees = self
            .enrollments
            .course_enrollees(&request.course_id)
            .await
            .map_err(|e| DispatchError::ProviderError(e.to_string()))?;

        let mut outcome = BroadcastOutcome {
            recipients: enrollees.len(),
            ..BroadcastOutcome::default()
        };

        for enrollee in &enrollees {
            if !enrollee.notifications_enabled {
                continue;
            }

            let tokens: Vec<String> = match self.registry.list_active(&enrollee.user_id).await {
                Ok(devices) => devices.into_iter().map(|d| d.destination_token).collect(),
                Err(e) => {
                    // One enrollee's registry failure must not stop the rest
                    // of the course from being notified.
                    warn!(
                        "Device lookup failed for user {} during broadcast: {}",
                        enrollee.user_id, e
                    );
                    continue;
                }
            };

            if tokens.is_empty() {
                continue;
            }

            let payload = broadcast_payload(&request, enrollee);
            let report = deliver_to_tokens(
                self.transport.as_ref(),
                &tokens,
                &payload,
                self.config.chunk_size,
            )
            .await;

            outcome.deliveries_attempted += report.attempted;
            outcome.delivered += report.delivered;

            for token in &report.invalid_tokens {
                match self.registry.deactivate(token).await {
                    Ok(true) => outcome.devices_deactivated += 1,
                    Ok(false) => {}
                    Err(e) => warn!("Failed to deactivate dead token: {}", e),
                }
            }
        }

        info!(
            "Broadcast for course {} ({}): {} recipients, {} deliveries attempted, {} delivered",
            request.course_id,
            request.kind,
            outcome.recipients,
            outcome.deliveries_attempted,
            outcome.delivered
        );
        Ok(outcome)
    }
}

/// One personalized payload per recipient, addressed by display name, with
/// the channel resolved once from the recipient's sound preference.
fn broadcast_payload(request: &BroadcastRequest, enrollee: &Enrollment) -> PushPayload {
    let body = format!("Hi {}, {}", enrollee.display_name, request.message);

    let mut data = request.data.clone().unwrap_or_default();
    data.insert("type".to_string(), request.kind.clone());
    data.insert("course_id".to_string(), request.course_id.clone());

    PushPayload {
        title: request.title.clone(),
        body,
        channel_id: Some(enrollee.sound.channel_id().to_string()),
        data: Some(data),
    }
}
