//! Wire models for the NGOConnect API
//!
//! Only the fields the client reads are typed. Anything else the server sends
//! is kept in `extra` so it survives a round trip to JSON output.

use serde::{Deserialize, Deserializer, Serialize};

/// Untyped server fields.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// A list response: either a bare array or a paginated `{ "results": [...] }`.
///
/// An object without `results` reads as an empty list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Paginated {
        #[serde(default = "Vec::new")]
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
    },
}

impl<T> ListEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Paginated { results, .. } => results,
        }
    }
}

/// Monetary amounts arrive as numbers or as decimal strings.
fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<u64>,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Registration form.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordReset {
    pub email: String,
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "amount")]
    pub goal_amount: Option<f64>,
    #[serde(default, deserialize_with = "amount")]
    pub raised_amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "amount")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub campaign_title: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Donation {
    /// Numeric `id` for admin records, the string `_id` for donor records.
    pub fn record_id(&self) -> Option<String> {
        if let Some(id) = self.id {
            return Some(id.to_string());
        }
        self.extra
            .get("_id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Guest donation request.
#[derive(Debug, Clone, Serialize)]
pub struct DonationIntent {
    pub amount: f64,
    pub guest_name: String,
    pub guest_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<u64>,
}

/// Where to send the donor to pay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    pub payment_url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Restart payment for one of the signed-in donor's pending donations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationPayment {
    pub amount: f64,
    pub donation_id: String,
    pub donor_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// Checkout page returned for a restarted payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRedirect {
    pub url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Admin donation listing filter. Unset fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct DonationFilter {
    pub status: Option<String>,
    pub campaign_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub campaign: Option<u64>,
    #[serde(default)]
    pub start_datetime: Option<String>,
    #[serde(default)]
    pub end_datetime: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub campaign: u64,
    pub start_datetime: String,
    pub end_datetime: String,
    pub location: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub campaign: Option<u64>,
    #[serde(default)]
    pub assigned_to: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Task body for create and full update. `assigned_to: None` is sent as null
/// to unassign.
#[derive(Debug, Clone, Serialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub campaign: u64,
    pub assigned_to: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub application_status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLog {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub task: Option<u64>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Time entry as submitted. Times are RFC 3339 strings.
#[derive(Debug, Clone, Serialize)]
pub struct NewTimeLog {
    pub task: u64,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Role-dependent dashboard figures. Fields the caller's role does not see
/// are absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_users: Option<u64>,
    #[serde(default, deserialize_with = "amount")]
    pub total_donations: Option<f64>,
    #[serde(default)]
    pub hours_logged_minutes: Option<u64>,
    #[serde(default, deserialize_with = "amount")]
    pub my_total_donations: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl DashboardSummary {
    /// Logged volunteer time in hours.
    pub fn hours_logged(&self) -> Option<f64> {
        self.hours_logged_minutes.map(|m| m as f64 / 60.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}
