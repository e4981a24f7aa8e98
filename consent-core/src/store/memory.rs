//! In-memory store - dashmap-backed reference implementation.
//!
//! Upholds the two concurrency contracts the services rely on: a uniqueness
//! constraint on (partner, customer, active) for consent requests, and an
//! atomic false -> true transition for granting.
//!
//! Lock ordering: flows that touch both the active-pair index and the grant
//! map take the index first, or drop the grant guard before touching the
//! index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{
    CategorySet, ConsentGrant, ConsentToken, Customer, CustomerDocument, Partner,
};
use crate::services::ConsentError;

use super::{CredentialStore, CustomerDirectory, DocumentStore, GrantAttempt, GrantStore};

#[derive(Default)]
pub struct MemoryStore {
    partners: DashMap<Uuid, Partner>,
    api_key_index: DashMap<String, Uuid>,
    grants: DashMap<String, ConsentGrant>,
    /// (partner_id, customer_id) -> token of the active grant.
    active_index: DashMap<(Uuid, Uuid), String>,
    customers: DashMap<Uuid, Customer>,
    customer_email_index: DashMap<String, Uuid>,
    documents: DashMap<Uuid, Vec<CustomerDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Partner>, ConsentError> {
        let id = match self.api_key_index.get(api_key) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.partners.get(&id).map(|p| p.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Partner>, ConsentError> {
        Ok(self.partners.get(&id).map(|p| p.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Partner>, ConsentError> {
        Ok(self
            .partners
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .map(|p| p.clone()))
    }

    async fn find_by_company_name(&self, name: &str) -> Result<Option<Partner>, ConsentError> {
        Ok(self
            .partners
            .iter()
            .find(|p| p.company_name == name)
            .map(|p| p.clone()))
    }

    async fn insert(&self, partner: Partner) -> Result<(), ConsentError> {
        match self.api_key_index.entry(partner.api_key.clone()) {
            Entry::Occupied(_) => Err(ConsentError::Storage(anyhow::anyhow!(
                "api key already exists"
            ))),
            Entry::Vacant(vacant) => {
                vacant.insert(partner.id);
                self.partners.insert(partner.id, partner);
                Ok(())
            }
        }
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), ConsentError> {
        let mut partner = self
            .partners
            .get_mut(&id)
            .ok_or_else(|| ConsentError::Storage(anyhow::anyhow!("partner not found: {}", id)))?;
        partner.active = active;
        partner.updated_at = Utc::now();
        Ok(())
    }

    async fn update_categories(
        &self,
        id: Uuid,
        categories: CategorySet,
    ) -> Result<(), ConsentError> {
        let mut partner = self
            .partners
            .get_mut(&id)
            .ok_or_else(|| ConsentError::Storage(anyhow::anyhow!("partner not found: {}", id)))?;
        partner.categories = categories;
        partner.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl GrantStore for MemoryStore {
    async fn find_by_token(
        &self,
        token: &ConsentToken,
    ) -> Result<Option<ConsentGrant>, ConsentError> {
        Ok(self.grants.get(token.as_str()).map(|g| g.clone()))
    }

    async fn find_active(
        &self,
        partner_id: Uuid,
        customer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ConsentGrant>, ConsentError> {
        let pair = (partner_id, customer_id);
        let token = match self.active_index.get(&pair) {
            Some(token) => token.clone(),
            None => return Ok(None),
        };
        let grant = self.grants.get(&token).map(|g| g.clone());
        match grant {
            Some(grant) if grant.is_active(now) => Ok(Some(grant)),
            _ => {
                // Stale index entry (granted or expired since insertion).
                self.active_index.remove_if(&pair, |_, t| *t == token);
                Ok(None)
            }
        }
    }

    async fn find_granted(
        &self,
        partner_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<ConsentGrant>, ConsentError> {
        Ok(self
            .grants
            .iter()
            .filter(|g| g.partner_id == partner_id && g.customer_id == customer_id && g.granted)
            .max_by_key(|g| g.expires_at)
            .map(|g| g.clone()))
    }

    async fn insert_active_unique(
        &self,
        grant: ConsentGrant,
        now: DateTime<Utc>,
    ) -> Result<ConsentGrant, ConsentError> {
        let pair = (grant.partner_id, grant.customer_id);
        match self.active_index.entry(pair) {
            Entry::Occupied(mut occupied) => {
                let existing_token = occupied.get().clone();
                let existing = self.grants.get(&existing_token).map(|g| g.clone());
                match existing {
                    Some(existing) if existing.is_active(now) => Ok(existing),
                    _ => {
                        // Stale winner; replace with the candidate.
                        occupied.insert(grant.token.as_str().to_string());
                        self.grants
                            .insert(grant.token.as_str().to_string(), grant.clone());
                        Ok(grant)
                    }
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(grant.token.as_str().to_string());
                self.grants
                    .insert(grant.token.as_str().to_string(), grant.clone());
                Ok(grant)
            }
        }
    }

    async fn try_grant(
        &self,
        token: &ConsentToken,
        granted_at: DateTime<Utc>,
    ) -> Result<GrantAttempt, ConsentError> {
        let updated = {
            let mut entry = self.grants.get_mut(token.as_str()).ok_or_else(|| {
                ConsentError::Storage(anyhow::anyhow!("grant vanished: {}", token))
            })?;
            if entry.granted {
                return Ok(GrantAttempt::AlreadyGranted);
            }
            entry.granted = true;
            entry.granted_at = Some(granted_at);
            entry.clone()
            // Guard dropped here, before the index is touched.
        };
        self.active_index
            .remove_if(&(updated.partner_id, updated.customer_id), |_, t| {
                *t == updated.token.as_str()
            });
        Ok(GrantAttempt::Granted(updated))
    }
}

#[async_trait]
impl CustomerDirectory for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, ConsentError> {
        let id = match self.customer_email_index.get(&email.to_lowercase()) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.customers.get(&id).map(|c| c.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, ConsentError> {
        Ok(self.customers.get(&id).map(|c| c.clone()))
    }

    async fn insert(&self, customer: Customer) -> Result<(), ConsentError> {
        self.customer_email_index
            .insert(customer.email.to_lowercase(), customer.id);
        self.customers.insert(customer.id, customer);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn documents_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<CustomerDocument>, ConsentError> {
        Ok(self
            .documents
            .get(&customer_id)
            .map(|docs| docs.clone())
            .unwrap_or_default())
    }

    async fn insert(&self, document: CustomerDocument) -> Result<(), ConsentError> {
        self.documents
            .entry(document.customer_id)
            .or_default()
            .push(document);
        Ok(())
    }
}
