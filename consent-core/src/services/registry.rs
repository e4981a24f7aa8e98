//! Partner registry - registration, configuration, and deactivation.
//!
//! Key material is minted exactly once at registration; the registration
//! response is the only place the secret is ever exposed.

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AuditEvent, CategoryRegistry, CategorySet, Partner, SanitizedPartner};
use crate::store::CredentialStore;
use crate::utils::{generate_api_key, generate_api_secret, Clock};

use super::audit::AuditSink;
use super::error::ConsentError;

#[derive(Debug, Validate)]
pub struct NewPartner {
    #[validate(length(min = 2, max = 200))]
    pub company_name: String,
    #[validate(email)]
    pub email: String,
    pub categories: Vec<String>,
}

/// Registration response; carries the secret this one time only.
#[derive(Debug)]
pub struct PartnerRegistration {
    pub partner: SanitizedPartner,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone)]
pub struct PartnerRegistry {
    credentials: Arc<dyn CredentialStore>,
    categories: Arc<CategoryRegistry>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl PartnerRegistry {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        categories: Arc<CategoryRegistry>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            categories,
            audit,
            clock,
        }
    }

    pub async fn register(&self, input: NewPartner) -> Result<PartnerRegistration, ConsentError> {
        input
            .validate()
            .map_err(|e| ConsentError::Validation(e.to_string()))?;
        let categories: CategorySet = self
            .categories
            .parse_set(input.categories.iter().map(String::as_str))?;

        if self
            .credentials
            .find_by_email(&input.email)
            .await?
            .is_some()
        {
            return Err(ConsentError::Validation(
                "a partner with this email already exists".to_string(),
            ));
        }
        if self
            .credentials
            .find_by_company_name(&input.company_name)
            .await?
            .is_some()
        {
            return Err(ConsentError::Validation(
                "a partner with this company name already exists".to_string(),
            ));
        }

        let api_key = generate_api_key();
        let api_secret = generate_api_secret();
        let partner = Partner::new(
            input.company_name,
            input.email.to_lowercase(),
            api_key.clone(),
            api_secret.clone(),
            categories,
            self.clock.now(),
        );
        let sanitized = partner.sanitized();
        self.credentials.insert(partner).await?;

        tracing::info!(
            partner_id = %sanitized.id,
            company_name = %sanitized.company_name,
            "partner registered"
        );
        self.audit
            .record(AuditEvent::success("partner_registered", Some(sanitized.id)))
            .await;

        Ok(PartnerRegistration {
            partner: sanitized,
            api_key,
            api_secret,
        })
    }

    /// Replace the partner's configured categories. Existing grants keep
    /// their snapshot; future access is bounded by the new set.
    pub async fn update_categories(
        &self,
        partner_id: Uuid,
        categories: Vec<String>,
    ) -> Result<SanitizedPartner, ConsentError> {
        let parsed = self
            .categories
            .parse_set(categories.iter().map(String::as_str))?;
        self.credentials
            .update_categories(partner_id, parsed)
            .await?;
        let partner = self
            .credentials
            .find_by_id(partner_id)
            .await?
            .ok_or_else(|| ConsentError::Storage(anyhow::anyhow!("partner vanished after update")))?;

        tracing::info!(partner_id = %partner_id, "partner categories updated");
        self.audit
            .record(AuditEvent::success("partner_categories_updated", Some(partner_id)))
            .await;

        Ok(partner.sanitized())
    }

    /// Deactivate a partner. Authentication fails from here on; any cached
    /// credential is invalidated by the caching store layer.
    pub async fn deactivate(&self, partner_id: Uuid) -> Result<(), ConsentError> {
        self.credentials.set_active(partner_id, false).await?;
        tracing::info!(partner_id = %partner_id, "partner deactivated");
        self.audit
            .record(AuditEvent::success("partner_deactivated", Some(partner_id)))
            .await;
        Ok(())
    }
}
