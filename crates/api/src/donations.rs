//! Donations: guest checkout, public feed, donor records and admin management

use secure_client::{ApiRequest, SecureClient};
use tracing::info;

use crate::endpoints;
use crate::error::{Error, Result};
use crate::fetch_list;
use crate::models::{
    CheckoutRedirect, Donation, DonationFilter, DonationIntent, DonationPayment, PaymentSession,
};
use crate::public::PublicClient;

pub struct Donations<'a> {
    client: &'a SecureClient,
    public: &'a PublicClient,
}

impl<'a> Donations<'a> {
    pub fn new(client: &'a SecureClient, public: &'a PublicClient) -> Self {
        Self { client, public }
    }

    /// Start a guest donation. Needs no session; returns the payment page URL.
    pub async fn initiate(&self, intent: &DonationIntent) -> Result<PaymentSession> {
        if !(intent.amount.is_finite() && intent.amount > 0.0) {
            return Err(Error::InvalidInput("amount must be a positive number".into()));
        }
        if intent.guest_name.trim().is_empty() || !intent.guest_email.contains('@') {
            return Err(Error::InvalidInput(
                "donor name and a valid email are required".into(),
            ));
        }

        let session: PaymentSession = self
            .public
            .post(endpoints::DONATION_INITIATE, intent)
            .await?;
        info!(amount = intent.amount, "donation initiated");
        Ok(session)
    }

    /// Recent donations shown on the public home page.
    pub async fn recent_public(&self) -> Result<Vec<Donation>> {
        let envelope: crate::models::ListEnvelope<Donation> =
            self.public.get(endpoints::DONATION_PUBLIC).await?;
        Ok(envelope.into_vec())
    }

    pub async fn admin_list(&self, filter: &DonationFilter) -> Result<Vec<Donation>> {
        let mut request = ApiRequest::get(endpoints::DONATION_ADMIN);
        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            request = request.query("status", status);
        }
        if let Some(campaign_id) = filter.campaign_id {
            request = request.query("campaign_id", campaign_id);
        }
        fetch_list(self.client, request).await
    }

    /// The signed-in donor's own donations.
    pub async fn mine(&self, email: &str) -> Result<Vec<Donation>> {
        if email.trim().is_empty() {
            return Err(Error::InvalidInput("donor email is required".into()));
        }
        let request = ApiRequest::get(endpoints::MY_DONATIONS).query("email", email);
        fetch_list(self.client, request).await
    }

    /// Open a new checkout for an unpaid donation. Returns the gateway URL.
    pub async fn payment_session(&self, payment: &DonationPayment) -> Result<CheckoutRedirect> {
        if !(payment.amount.is_finite() && payment.amount > 0.0) {
            return Err(Error::InvalidInput("amount must be a positive number".into()));
        }
        let response = self
            .client
            .post(endpoints::DONATION_PAYMENT_SESSION, payment)
            .await?;
        let redirect: CheckoutRedirect = response.json()?;
        info!(donation_id = %payment.donation_id, "payment session opened");
        Ok(redirect)
    }

    /// Remove a donation record. Takes the numeric admin id or a donor `_id`.
    pub async fn delete(&self, id: impl std::fmt::Display) -> Result<()> {
        let id = id.to_string();
        self.client.delete(&endpoints::donation(&id)).await?;
        info!(id = %id, "donation deleted");
        Ok(())
    }
}
