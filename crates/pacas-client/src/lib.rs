//! Typed client for the PacasHomes backend API, plus the search session and
//! lead-capture gate built on top of it.
//!
//! # Overview
//!
//! - [`PacasClient`] talks to the backend: search, account, favorites, and
//!   lead endpoints.
//! - [`SearchSession`] holds fetched listings, pages through them, and merges
//!   further backend pages on "Show More".
//! - [`LeadGate`] asks for contact details before the first outbound click and
//!   records a lead for every one.
//! - [`StateStore`] persists the gate's state between runs.

pub mod account;
pub mod client;
pub mod error;
pub mod gate;
pub mod pager;
pub(crate) mod retry;
pub mod session;
pub mod store;
pub mod types;

pub use account::{AccountDetails, ContactDetails, PendingRegistration};
pub use client::PacasClient;
pub use error::{ClientError, StoreError};
pub use gate::{GateDecision, GateState, LeadGate};
pub use pager::{ListingPager, MergeStats};
pub use session::{LoadMorePolicy, LoadOutcome, SearchSession};
pub use store::{JsonFileStore, LeadCaptureState, MemoryStore, StateStore};
pub use types::{LeadRequest, LeadType, RegistrationRequest, UserInfo, UserStatus};
