//! API paths, relative to the base URL

pub const AUTH_REGISTER: &str = "/api/auth/register/";
pub const AUTH_PROFILE: &str = "/api/auth/profile/";
pub const AUTH_FORGOT_PASSWORD: &str = "/api/auth/forgot-password/";
pub const AUTH_RESET_PASSWORD: &str = "/api/auth/reset-password/";

pub const CAMPAIGNS: &str = "/api/projects/campaigns/";
pub const EVENTS: &str = "/api/projects/events/";
pub const TASKS: &str = "/api/projects/tasks/";

pub const DONATION_INITIATE: &str = "/api/donations/initiate/";
pub const DONATION_PUBLIC: &str = "/api/donations/public/";
pub const DONATION_ADMIN: &str = "/api/donations/admin/";
/// Signed-in donor's own records; these live outside the `/api` prefix.
pub const MY_DONATIONS: &str = "/donations";
pub const DONATION_PAYMENT_SESSION: &str = "/donation-payment-session";

pub const VOLUNTEER_ADMIN: &str = "/api/volunteer/admin/";
pub const VOLUNTEER_ADMIN_LIST: &str = "/api/volunteer/admin/list/";
pub const VOLUNTEER_PROFILE: &str = "/api/volunteer/profile/";
pub const VOLUNTEER_TIME_LOGS: &str = "/api/volunteer/time-logs/";

pub const NOTIFICATIONS: &str = "/api/notifications/";
pub const NOTIFICATIONS_MARK_ALL_READ: &str = "/api/notifications/mark-all-read/";

pub const DASHBOARD_SUMMARY: &str = "/api/dashboard/summary/";
pub const CONTACT: &str = "/api/contact/";

/// A donor's donation record, addressed by its backend id.
pub fn donation(id: impl std::fmt::Display) -> String {
    format!("{MY_DONATIONS}/{id}")
}

/// `{collection}{id}/`, optionally followed by an action segment.
pub fn detail(collection: &str, id: u64, action: Option<&str>) -> String {
    match action {
        Some(action) => format!("{collection}{id}/{action}/"),
        None => format!("{collection}{id}/"),
    }
}
