//! Read-through credential cache with a bounded staleness window.
//!
//! Partner credentials are read-mostly, so the authentication lookup may be
//! cached. Deactivation through this decorator invalidates immediately;
//! writes that bypass it are visible after at most the configured TTL.
//! Only `find_by_api_key` is cached: the access filter's live category
//! re-check goes through `find_by_id` and must never see a stale record.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{CategorySet, Partner};
use crate::services::ConsentError;
use crate::utils::Clock;

use super::CredentialStore;

struct CachedPartner {
    partner: Partner,
    cached_at: DateTime<Utc>,
}

pub struct CachingCredentialStore {
    inner: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    by_api_key: DashMap<String, CachedPartner>,
}

impl CachingCredentialStore {
    pub fn new(inner: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            inner,
            clock,
            ttl,
            by_api_key: DashMap::new(),
        }
    }

    pub fn invalidate(&self, api_key: &str) {
        self.by_api_key.remove(api_key);
    }

    fn invalidate_id(&self, id: Uuid) {
        self.by_api_key.retain(|_, cached| cached.partner.id != id);
    }
}

#[async_trait]
impl CredentialStore for CachingCredentialStore {
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Partner>, ConsentError> {
        let now = self.clock.now();
        if let Some(cached) = self.by_api_key.get(api_key) {
            if now - cached.cached_at < self.ttl {
                return Ok(Some(cached.partner.clone()));
            }
        }
        let fresh = self.inner.find_by_api_key(api_key).await?;
        match &fresh {
            Some(partner) => {
                self.by_api_key.insert(
                    api_key.to_string(),
                    CachedPartner {
                        partner: partner.clone(),
                        cached_at: now,
                    },
                );
            }
            // Negative results are not cached; an unknown key stays a
            // store lookup.
            None => {
                self.by_api_key.remove(api_key);
            }
        }
        Ok(fresh)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Partner>, ConsentError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Partner>, ConsentError> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_company_name(&self, name: &str) -> Result<Option<Partner>, ConsentError> {
        self.inner.find_by_company_name(name).await
    }

    async fn insert(&self, partner: Partner) -> Result<(), ConsentError> {
        self.inner.insert(partner).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), ConsentError> {
        self.inner.set_active(id, active).await?;
        self.invalidate_id(id);
        Ok(())
    }

    async fn update_categories(
        &self,
        id: Uuid,
        categories: CategorySet,
    ) -> Result<(), ConsentError> {
        self.inner.update_categories(id, categories).await?;
        self.invalidate_id(id);
        Ok(())
    }
}
