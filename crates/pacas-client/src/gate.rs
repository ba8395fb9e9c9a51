//! Lead-capture gate in front of outbound listing links.
//!
//! The first "view details" click with no email on file asks for contact
//! details; once an email is cached every later click redirects straight
//! away. Each redirect records a lead with the backend in a spawned task whose
//! failure is logged and otherwise ignored.

use std::sync::Arc;

use chrono::Utc;
use pacas_core::validate::validate_email;
use pacas_core::{Listing, ValidationError};
use tokio::task::JoinHandle;

use crate::account::{AccountDetails, ContactDetails, PendingRegistration};
use crate::client::PacasClient;
use crate::error::ClientError;
use crate::store::{LeadCaptureState, StateStore};
use crate::types::{LeadRequest, LeadType, UserInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    NoEmail,
    EmailCaptured,
    AccountCreated,
}

/// What to do after a "view details" click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Open this URL on the source site.
    Redirect(String),
    /// Ask for contact details, then call [`LeadGate::submit_contact`].
    PromptForContact,
}

pub struct LeadGate<S: StateStore> {
    client: Arc<PacasClient>,
    store: S,
    state: LeadCaptureState,
    tracking: Vec<JoinHandle<()>>,
}

impl<S: StateStore> LeadGate<S> {
    /// Loads persisted state and hands any saved session cookie to `client`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Store`] if the stored state cannot be read.
    pub fn load(client: Arc<PacasClient>, store: S) -> Result<Self, ClientError> {
        let state = store.load()?;
        if client.session_cookie().is_none() && state.session_cookie.is_some() {
            client.set_session_cookie(state.session_cookie.clone());
        }
        Ok(Self {
            client,
            store,
            state,
            tracking: Vec::new(),
        })
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        if self.state.account_created {
            GateState::AccountCreated
        } else if self.state.has_email() {
            GateState::EmailCaptured
        } else {
            GateState::NoEmail
        }
    }

    #[must_use]
    pub fn lead_state(&self) -> &LeadCaptureState {
        &self.state
    }

    #[must_use]
    pub fn client(&self) -> &PacasClient {
        &self.client
    }

    /// Handles a "view details" click.
    ///
    /// The view counter always increments. With an email on file the lead is
    /// tracked and the listing URL returned; otherwise the caller must prompt.
    /// A failed save of the counter is logged and does not block the redirect.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a listing without a URL.
    pub fn view_details(&mut self, listing: &Listing) -> Result<GateDecision, ClientError> {
        let url = listing_url(listing)?;
        self.state.view_count += 1;

        if !self.state.has_email() {
            self.save_best_effort();
            tracing::debug!(view_count = self.state.view_count, "no contact on file, prompting");
            return Ok(GateDecision::PromptForContact);
        }

        let lead = self.lead_for(Some(listing), false, LeadType::PropertyView);
        self.save_best_effort();
        self.track(lead);
        Ok(GateDecision::Redirect(url))
    }

    /// Accepts the contact form, caches it, tracks the lead, and returns the
    /// URL to redirect to.
    ///
    /// The contact stays cached for this process even if it cannot be saved;
    /// the save failure is logged.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a bad email or phone (nothing is saved).
    pub fn submit_contact(
        &mut self,
        listing: &Listing,
        contact: &ContactDetails,
    ) -> Result<String, ClientError> {
        let url = listing_url(listing)?;
        let contact = contact.validated()?;

        self.state.email = Some(contact.email);
        if contact.phone.is_some() {
            self.state.phone = contact.phone;
        }
        if contact.name.is_some() {
            self.state.name = contact.name;
        }
        tracing::info!("contact details captured");

        let lead = self.lead_for(Some(listing), contact.wants_callback, LeadType::PropertyView);
        self.save_best_effort();
        self.track(lead);
        Ok(url)
    }

    /// Validates the account form and asks the backend to email a code.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] before any request, or the backend's
    /// refusal to send the code.
    pub async fn begin_registration(
        &self,
        details: &AccountDetails,
    ) -> Result<PendingRegistration, ClientError> {
        let details = details.validated()?;
        self.client.send_verification_code(&details.email).await?;
        tracing::info!(email = %details.email, "verification code requested");
        Ok(PendingRegistration::new(details))
    }

    /// Checks the emailed code, creates the account, and caches the contact.
    ///
    /// `listing` is the card that triggered sign-up, if any; it is attached to
    /// the account-creation lead.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] unless the code is six digits, the
    /// backend's rejection of the code or registration, or
    /// [`ClientError::Store`].
    pub async fn confirm_registration(
        &mut self,
        pending: &PendingRegistration,
        code: &str,
        listing: Option<&Listing>,
    ) -> Result<UserInfo, ClientError> {
        let request = pending.registration_request(code)?;
        self.client.verify_code(&request.email, &request.code).await?;
        let user = self.client.register(&request).await?;

        self.state.email = Some(request.email.clone());
        self.state.phone = Some(request.phone.clone());
        self.state.name = Some(request.name.clone());
        self.state.account_created = true;
        self.state.email_verified = true;
        if let Some(cookie) = self.client.session_cookie() {
            self.state.session_cookie = Some(cookie);
        }

        let lead = self.lead_for(listing, false, LeadType::AccountCreation);
        self.track(lead);
        self.store.save(&self.state)?;
        Ok(user)
    }

    /// Signs in and persists the session cookie.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a malformed email, any error from
    /// [`PacasClient::login`], or [`ClientError::Store`].
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserInfo, ClientError> {
        let email = validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::new("password", "Please enter your password").into());
        }
        let user = self.client.login(&email, password).await?;

        self.state.session_cookie = self.client.session_cookie();
        if !self.state.has_email() {
            self.state.email = Some(user.email.clone());
        }
        if user.email_verified {
            self.state.email_verified = true;
        }
        self.store.save(&self.state)?;
        Ok(user)
    }

    /// Signs out. The saved cookie is dropped even if the backend call fails.
    ///
    /// # Errors
    ///
    /// [`ClientError::Store`] if the state cannot be saved, otherwise the
    /// backend's error, if any.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let result = self.client.logout().await;
        self.state.session_cookie = None;
        self.store.save(&self.state)?;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "backend logout failed; local session cleared");
        }
        result
    }

    /// Waits for every spawned tracking call to finish.
    pub async fn flush_tracking(&mut self) {
        for handle in self.tracking.drain(..) {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "lead tracking task did not complete");
            }
        }
    }

    fn save_best_effort(&self) {
        if let Err(err) = self.store.save(&self.state) {
            tracing::warn!(error = %err, "could not save lead-capture state");
        }
    }

    fn lead_for(
        &mut self,
        listing: Option<&Listing>,
        wants_callback: bool,
        lead_type: LeadType,
    ) -> LeadRequest {
        self.state.last_lead_at = Some(Utc::now());
        let (property_url, property_title, property_price, site) = match listing {
            Some(l) => (
                l.url.clone(),
                l.display_title().to_owned(),
                l.price.clone(),
                l.source.clone(),
            ),
            None => Default::default(),
        };
        LeadRequest {
            email: self.state.email.clone().unwrap_or_default(),
            property_url,
            property_title,
            property_price,
            site,
            phone: self.state.phone.clone().unwrap_or_default(),
            name: self.state.name.clone().unwrap_or_default(),
            wants_callback,
            lead_type,
        }
    }

    /// Fire-and-forget lead capture.
    fn track(&mut self, lead: LeadRequest) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(property_url = %lead.property_url, "no async runtime, lead not tracked");
            return;
        };
        self.tracking.retain(|h| !h.is_finished());
        let client = Arc::clone(&self.client);
        self.tracking.push(runtime.spawn(async move {
            match client.capture_lead(&lead).await {
                Ok(()) => tracing::debug!(property_url = %lead.property_url, "lead captured"),
                Err(err) => tracing::warn!(
                    error = %err,
                    property_url = %lead.property_url,
                    "lead tracking failed"
                ),
            }
        }));
    }
}

fn listing_url(listing: &Listing) -> Result<String, ValidationError> {
    let url = listing.url.trim();
    if url.is_empty() {
        return Err(ValidationError::new(
            "url",
            "This listing has no link to the source site",
        ));
    }
    Ok(url.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;

    fn gate(state: LeadCaptureState) -> LeadGate<MemoryStore> {
        // Nothing listens here; tracking failures are only logged.
        let client = PacasClient::with_base_url("http://127.0.0.1:9", 1, "pacas-test")
            .expect("client construction should not fail");
        LeadGate::load(Arc::new(client), MemoryStore::new(state)).unwrap()
    }

    fn listing() -> Listing {
        Listing {
            title: "2 bed flat".to_owned(),
            price: "£1,250 pcm".to_owned(),
            url: "https://www.zoopla.co.uk/to-rent/details/1".to_owned(),
            source: "Zoopla".to_owned(),
            ..Listing::default()
        }
    }

    #[test]
    fn state_reflects_stored_flags() {
        assert_eq!(gate(LeadCaptureState::default()).state(), GateState::NoEmail);
        let captured = LeadCaptureState {
            email: Some("jo@example.com".to_owned()),
            ..LeadCaptureState::default()
        };
        assert_eq!(gate(captured.clone()).state(), GateState::EmailCaptured);
        let created = LeadCaptureState {
            account_created: true,
            ..captured
        };
        assert_eq!(gate(created).state(), GateState::AccountCreated);
    }

    #[test]
    fn saved_cookie_is_handed_to_client() {
        let gate = gate(LeadCaptureState {
            session_cookie: Some("session=abc".to_owned()),
            ..LeadCaptureState::default()
        });
        assert_eq!(gate.client().session_cookie().as_deref(), Some("session=abc"));
    }

    #[test]
    fn first_click_without_email_prompts_and_counts() {
        let mut gate = gate(LeadCaptureState::default());
        let decision = gate.view_details(&listing()).unwrap();
        assert_eq!(decision, GateDecision::PromptForContact);
        assert_eq!(gate.lead_state().view_count, 1);
        assert_eq!(gate.store.snapshot().view_count, 1);
    }

    #[test]
    fn listing_without_url_is_rejected() {
        let mut gate = gate(LeadCaptureState::default());
        let no_url = Listing {
            url: String::new(),
            ..listing()
        };
        let err = gate.view_details(&no_url).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref e) if e.field == "url"));
        assert_eq!(gate.lead_state().view_count, 0);
    }

    #[test]
    fn invalid_contact_is_not_saved() {
        let mut gate = gate(LeadCaptureState::default());
        let contact = ContactDetails {
            email: "not-an-email".to_owned(),
            ..ContactDetails::default()
        };
        assert!(gate.submit_contact(&listing(), &contact).is_err());
        assert_eq!(gate.state(), GateState::NoEmail);
        assert!(!gate.store.snapshot().has_email());
    }

    struct ReadOnlyStore;

    impl StateStore for ReadOnlyStore {
        fn load(&self) -> Result<LeadCaptureState, StoreError> {
            Ok(LeadCaptureState::default())
        }

        fn save(&self, _state: &LeadCaptureState) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: "/ro/state.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn failed_save_does_not_block_redirect() {
        let client = PacasClient::with_base_url("http://127.0.0.1:9", 1, "pacas-test")
            .expect("client construction should not fail");
        let mut gate = LeadGate::load(Arc::new(client), ReadOnlyStore).unwrap();

        assert_eq!(
            gate.view_details(&listing()).unwrap(),
            GateDecision::PromptForContact
        );
        let contact = ContactDetails {
            email: "jo@example.com".to_owned(),
            ..ContactDetails::default()
        };
        let url = gate.submit_contact(&listing(), &contact).unwrap();
        assert_eq!(url, "https://www.zoopla.co.uk/to-rent/details/1");
        assert_eq!(gate.state(), GateState::EmailCaptured);

        let decision = gate.view_details(&listing()).unwrap();
        assert_eq!(decision, GateDecision::Redirect(url));
        assert_eq!(gate.lead_state().view_count, 2);
    }

    #[tokio::test]
    async fn tracking_failure_still_redirects() {
        let mut gate = gate(LeadCaptureState::default());
        let contact = ContactDetails {
            email: "Jo@Example.com".to_owned(),
            phone: Some("07123 456789".to_owned()),
            name: Some("Jo".to_owned()),
            wants_callback: true,
        };
        let url = gate.submit_contact(&listing(), &contact).unwrap();
        assert_eq!(url, "https://www.zoopla.co.uk/to-rent/details/1");
        assert_eq!(gate.state(), GateState::EmailCaptured);

        let decision = gate.view_details(&listing()).unwrap();
        assert_eq!(decision, GateDecision::Redirect(url));
        gate.flush_tracking().await;

        let saved = gate.store.snapshot();
        assert_eq!(saved.email.as_deref(), Some("jo@example.com"));
        assert_eq!(saved.phone.as_deref(), Some("07123456789"));
        assert_eq!(saved.view_count, 1);
        assert!(saved.last_lead_at.is_some());
    }

    #[test]
    fn tracking_without_runtime_is_skipped() {
        let mut gate = gate(LeadCaptureState {
            email: Some("jo@example.com".to_owned()),
            ..LeadCaptureState::default()
        });
        let decision = gate.view_details(&listing()).unwrap();
        assert!(matches!(decision, GateDecision::Redirect(_)));
        assert!(gate.tracking.is_empty());
    }
}
