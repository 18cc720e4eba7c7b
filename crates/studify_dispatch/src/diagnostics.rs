// --- File: crates/studify_dispatch/src/diagnostics.rs ---
//! Read-only operator report: per course, each enrollee's reminder
//! eligibility. Consumed by operators, never by the scheduling logic.

use crate::error::DispatchError;
use crate::gateway::DispatchGateway;
use serde::Serialize;
use studify_db::{DeviceRegistrationRepository, SentReminderRepository};
use tracing::warn;

/// One enrollee's eligibility snapshot.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EnrolleeDiagnostics {
    pub user_id: String,
    pub display_name: String,
    /// Whether the enrollment still grants course access
    pub active_access: bool,
    pub notifications_enabled: bool,
    /// Active registrations in the device registry
    pub device_count: usize,
    /// Whether the profile still carries a pre-registry push token (never
    /// used for delivery)
    pub has_legacy_token: bool,
}

/// The per-course report.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CourseDiagnosticsReport {
    pub course_id: String,
    pub enrollees: Vec<EnrolleeDiagnostics>,
}

impl<R, S> DispatchGateway<R, S>
where
    R: DeviceRegistrationRepository,
    S: SentReminderRepository,
{
    /// Build the eligibility report for one course.
    pub async fn course_report(
        &self,
        course_id: &str,
    ) -> Result<CourseDiagnosticsReport, DispatchError> {
        let enrollees = self
            .enrollments
            .course_enrollees(course_id)
            .await
            .map_err(|e| DispatchError::ProviderError(e.to_string()))?;

        let mut report = CourseDiagnosticsReport {
            course_id: course_id.to_string(),
            enrollees: Vec::with_capacity(enrollees.len()),
        };

        for enrollee in enrollees {
            let device_count = match self.registry.list_active(&enrollee.user_id).await {
                Ok(devices) => devices.len(),
                Err(e) => {
                    warn!(
                        "Device count unavailable for user {}: {}",
                        enrollee.user_id, e
                    );
                    0
                }
            };

            report.enrollees.push(EnrolleeDiagnostics {
                user_id: enrollee.user_id,
                display_name: enrollee.display_name,
                active_access: enrollee.is_active,
                notifications_enabled: enrollee.notifications_enabled,
                device_count,
                has_legacy_token: enrollee.legacy_token.is_some(),
            });
        }

        Ok(report)
    }
}
