//! Boundary contracts for durable state.
//!
//! Credentials, grants, customers, and documents live in a shared,
//! externally-synchronized store. This core only depends on the traits
//! below; [`MemoryStore`] is the in-process reference implementation and
//! production deployments bind the traits to their database of choice.

mod cache;
mod memory;

pub use cache::CachingCredentialStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    CategorySet, ConsentGrant, ConsentToken, Customer, CustomerDocument, Partner,
};
use crate::services::ConsentError;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Partner>, ConsentError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Partner>, ConsentError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Partner>, ConsentError>;
    async fn find_by_company_name(&self, name: &str) -> Result<Option<Partner>, ConsentError>;
    async fn insert(&self, partner: Partner) -> Result<(), ConsentError>;
    /// Toggle the active flag. Implementations layered behind a cache must
    /// invalidate promptly; see [`CachingCredentialStore`].
    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), ConsentError>;
    async fn update_categories(
        &self,
        id: Uuid,
        categories: CategorySet,
    ) -> Result<(), ConsentError>;
}

/// Outcome of the atomic grant transition.
#[derive(Debug, Clone)]
pub enum GrantAttempt {
    /// This caller won the false -> true flip; the updated grant.
    Granted(ConsentGrant),
    /// Another caller granted first; `granted_at` was left untouched.
    AlreadyGranted,
}

#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn find_by_token(
        &self,
        token: &ConsentToken,
    ) -> Result<Option<ConsentGrant>, ConsentError>;

    /// The single active (ungranted, unexpired) grant for a pair, if any.
    async fn find_active(
        &self,
        partner_id: Uuid,
        customer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsentGrant>, ConsentError>;

    /// The granted grant for a pair with the latest expiry, if any.
    /// Expiry is the caller's concern; a granted-but-expired grant is still
    /// returned so the caller can distinguish expired from absent.
    async fn find_granted(
        &self,
        partner_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<ConsentGrant>, ConsentError>;

    /// Insert under a uniqueness constraint on (partner, customer, active).
    /// If an active grant for the pair already exists, that grant is
    /// returned and the candidate is discarded, so racing identical
    /// requests converge on a single winner.
    async fn insert_active_unique(
        &self,
        grant: ConsentGrant,
        now: DateTime<Utc>,
    ) -> Result<ConsentGrant, ConsentError>;

    /// Atomic false -> true grant transition. Exactly one of any number of
    /// racing callers observes `Granted`; the rest observe
    /// `AlreadyGranted`.
    async fn try_grant(
        &self,
        token: &ConsentToken,
        granted_at: DateTime<Utc>,
    ) -> Result<GrantAttempt, ConsentError>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, ConsentError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, ConsentError>;
    async fn insert(&self, customer: Customer) -> Result<(), ConsentError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn documents_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerDocument>, ConsentError>;
    async fn insert(&self, document: CustomerDocument) -> Result<(), ConsentError>;
}
