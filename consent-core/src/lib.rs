//! Consent and access-authorization core.
//!
//! A customer controls which external partners may view specific categories
//! of its uploaded documents. Three services cooperate:
//!
//! - [`services::PartnerAuthenticator`] verifies a partner's (api key,
//!   secret) pair with a constant-time comparison and yields a sanitized
//!   partner identity.
//! - [`services::ConsentLedger`] owns the lifecycle of time-bounded,
//!   token-addressed consent grants: creation with active-grant
//!   deduplication, expiry, and the one-way transition to granted.
//! - [`services::AccessFilter`] computes the visible document set for an
//!   authenticated partner by intersecting the partner's live category
//!   configuration with the grant's snapshotted requested categories.
//!
//! Durable state lives behind the [`store`] traits; the dashmap-backed
//! [`store::MemoryStore`] is the reference implementation. The clock, token
//! generator, and audit sink are injectable collaborators.

pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod store;
pub mod utils;
