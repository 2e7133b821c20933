//! Volunteer administration, profile and time logging

use secure_client::{ApiRequest, SecureClient};
use serde::Serialize;
use tracing::info;

use crate::endpoints::{self, VOLUNTEER_ADMIN, detail};
use crate::error::{Error, Result};
use crate::fetch_list;
use crate::models::{ApplicationStatus, NewTimeLog, TimeLog, Volunteer};

pub struct Volunteers<'a> {
    client: &'a SecureClient,
}

impl<'a> Volunteers<'a> {
    pub fn new(client: &'a SecureClient) -> Self {
        Self { client }
    }

    /// Admin listing, optionally narrowed to one application status.
    pub async fn admin_list(&self, status: Option<ApplicationStatus>) -> Result<Vec<Volunteer>> {
        let mut request = ApiRequest::get(endpoints::VOLUNTEER_ADMIN_LIST);
        if let Some(status) = status {
            request = request.query("status", status.as_str());
        }
        fetch_list(self.client, request).await
    }

    pub async fn admin_get(&self, id: u64) -> Result<Volunteer> {
        let response = self.client.get(&detail(VOLUNTEER_ADMIN, id, None)).await?;
        Ok(response.json()?)
    }

    /// Approve or reject an application.
    pub async fn set_application_status(
        &self,
        id: u64,
        status: ApplicationStatus,
    ) -> Result<Volunteer> {
        let response = self
            .client
            .patch(
                &detail(VOLUNTEER_ADMIN, id, None),
                &serde_json::json!({ "application_status": status }),
            )
            .await?;
        info!(id, status = status.as_str(), "application status updated");
        Ok(response.json()?)
    }

    /// Update the signed-in volunteer's own profile.
    pub async fn update_profile<B: Serialize + ?Sized>(&self, patch: &B) -> Result<Volunteer> {
        let response = self
            .client
            .patch(endpoints::VOLUNTEER_PROFILE, patch)
            .await?;
        Ok(response.json()?)
    }

    pub async fn time_logs(&self) -> Result<Vec<TimeLog>> {
        fetch_list(self.client, ApiRequest::get(endpoints::VOLUNTEER_TIME_LOGS)).await
    }

    pub async fn log_time(&self, entry: &NewTimeLog) -> Result<TimeLog> {
        // RFC 3339 strings of equal format compare chronologically.
        if entry.end_time <= entry.start_time {
            return Err(Error::InvalidInput("end time must be after start time".into()));
        }
        let response = self
            .client
            .post(endpoints::VOLUNTEER_TIME_LOGS, entry)
            .await?;
        info!(task = entry.task, "time logged");
        Ok(response.json()?)
    }
}
