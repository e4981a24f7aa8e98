//! Consent ledger - lifecycle of consent grants.
//!
//! Grants move through a small state machine: active (ungranted, unexpired)
//! until either the customer grants them (terminal, one-way) or they expire.
//! An ungranted grant that expires becomes permanently inert; there is no
//! denied state and no revocation.

use std::sync::Arc;
use uuid::Uuid;

use crate::config::ConsentConfig;
use crate::models::{
    AuditEvent, ConsentGrant, ConsentReceipt, ConsentSummary,
    ConsentToken,
};
use crate::store::{CredentialStore, CustomerDirectory, GrantAttempt, GrantStore};
use crate::utils::{Clock, TokenGenerator};

use super::audit::AuditSink;
use super::error::ConsentError;

#[derive(Clone)]
pub struct ConsentLedger {
    grants: Arc<dyn GrantStore>,
    credentials: Arc<dyn CredentialStore>,
    customers: Arc<dyn CustomerDirectory>,
    tokens: Arc<dyn TokenGenerator>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    config: ConsentConfig,
}

impl ConsentLedger {
    pub fn new(
        grants: Arc<dyn GrantStore>,
        credentials: Arc<dyn CredentialStore>,
        customers: Arc<dyn CustomerDirectory>,
        tokens: Arc<dyn TokenGenerator>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        config: ConsentConfig,
    ) -> Self {
        Self {
            grants,
            credentials,
            customers,
            tokens,
            audit,
            clock,
            config,
        }
    }

    /// Request consent from a customer on behalf of an authenticated
    /// partner.
    ///
    /// Idempotent for a given (partner, customer) pair while an active
    /// grant exists: repeated polling returns the existing token instead of
    /// minting a new one. The requested categories are a snapshot of the
    /// partner's configuration at this moment.
    pub async fn request_consent(
        &self,
        partner_id: Uuid,
        customer_email: &str,
    ) -> Result<ConsentReceipt, ConsentError> {
        let partner = match self.credentials.find_by_id(partner_id).await? {
            Some(partner) => partner,
            None => {
                self.audit
                    .record(AuditEvent::failure(
                        "consent_requested",
                        Some(partner_id),
                        "unknown partner",
                    ))
                    .await;
                return Err(ConsentError::InvalidConfiguration);
            }
        };
        if partner.categories.is_empty() {
            tracing::warn!(partner_id = %partner_id, "consent request from partner with no configured categories");
            self.audit
                .record(AuditEvent::failure(
                    "consent_requested",
                    Some(partner_id),
                    "no categories configured",
                ))
                .await;
            return Err(ConsentError::InvalidConfiguration);
        }

        let customer = match self.customers.find_by_email(customer_email).await? {
            Some(customer) => customer,
            None => {
                self.audit
                    .record(AuditEvent::failure(
                        "consent_requested",
                        Some(partner.id),
                        "customer not found",
                    ))
                    .await;
                return Err(ConsentError::CustomerNotFound);
            }
        };

        let now = self.clock.now();
        if let Some(existing) = self
            .grants
            .find_active(partner.id, customer.id, now)
            .await?
        {
            tracing::info!(
                partner_id = %partner.id,
                customer_id = %customer.id,
                "returning existing active consent request"
            );
            self.audit
                .record(AuditEvent::success("consent_requested", Some(partner.id)))
                .await;
            return Ok(ConsentReceipt {
                token: existing.token,
                expires_at: existing.expires_at,
            });
        }

        let grant = ConsentGrant::new(
            self.tokens.generate(),
            partner.id,
            customer.id,
            partner.categories.clone(),
            now,
            now + self.config.validity_window(),
        );

        // Racing identical requests converge on a single winner in the
        // store; either grant is acceptable, never a corrupted one.
        let winner = self.grants.insert_active_unique(grant, now).await?;

        tracing::info!(
            partner_id = %partner.id,
            customer_id = %customer.id,
            expires_at = %winner.expires_at,
            "consent requested"
        );
        self.audit
            .record(AuditEvent::success("consent_requested", Some(partner.id)))
            .await;

        Ok(ConsentReceipt {
            token: winner.token,
            expires_at: winner.expires_at,
        })
    }

    /// View a pending consent request by its capability token, for the
    /// customer deciding whether to grant it.
    pub async fn view_consent(&self, token: &ConsentToken) -> Result<ConsentSummary, ConsentError> {
        let grant = self.checked_pending("consent_viewed", token).await?;
        let summary = self.summarize(&grant).await?;
        self.audit
            .record(AuditEvent::success("consent_viewed", Some(grant.partner_id)))
            .await;
        Ok(summary)
    }

    /// Grant a pending consent. The only mutating entry point into the
    /// ledger; the false -> true flip is atomic, so of two racing callers
    /// exactly one succeeds and the other observes `ConsentAlreadyGranted`.
    pub async fn grant_consent(
        &self,
        token: &ConsentToken,
    ) -> Result<ConsentSummary, ConsentError> {
        let pending = self.checked_pending("consent_granted", token).await?;

        let granted = match self.grants.try_grant(token, self.clock.now()).await? {
            GrantAttempt::Granted(grant) => grant,
            GrantAttempt::AlreadyGranted => {
                self.audit
                    .record(AuditEvent::failure(
                        "consent_granted",
                        Some(pending.partner_id),
                        "already granted",
                    ))
                    .await;
                return Err(ConsentError::ConsentAlreadyGranted);
            }
        };

        tracing::info!(
            partner_id = %granted.partner_id,
            customer_id = %granted.customer_id,
            "consent granted"
        );
        self.audit
            .record(AuditEvent::success(
                "consent_granted",
                Some(granted.partner_id),
            ))
            .await;

        self.summarize(&granted).await
    }

    /// Read-only status lookup. Unlike [`view_consent`](Self::view_consent)
    /// this reports granted or expired grants as data; only an unknown
    /// token fails.
    pub async fn consent_status(
        &self,
        token: &ConsentToken,
    ) -> Result<ConsentSummary, ConsentError> {
        let grant = self
            .grants
            .find_by_token(token)
            .await?
            .ok_or(ConsentError::TokenNotFound)?;
        self.summarize(&grant).await
    }

    /// Shared failure ladder for acting on a token: unknown, then expired,
    /// then already granted. Every failure is recorded against the caller's
    /// `action` event type.
    async fn checked_pending(
        &self,
        action: &'static str,
        token: &ConsentToken,
    ) -> Result<ConsentGrant, ConsentError> {
        let grant = match self.grants.find_by_token(token).await? {
            Some(grant) => grant,
            None => {
                self.audit
                    .record(AuditEvent::failure(action, None, "unknown token"))
                    .await;
                return Err(ConsentError::TokenNotFound);
            }
        };

        if grant.is_expired(self.clock.now()) {
            self.audit
                .record(AuditEvent::failure(
                    action,
                    Some(grant.partner_id),
                    "consent expired",
                ))
                .await;
            return Err(ConsentError::ConsentExpired);
        }
        if grant.granted {
            self.audit
                .record(AuditEvent::failure(
                    action,
                    Some(grant.partner_id),
                    "already granted",
                ))
                .await;
            return Err(ConsentError::ConsentAlreadyGranted);
        }
        Ok(grant)
    }

    async fn summarize(&self, grant: &ConsentGrant) -> Result<ConsentSummary, ConsentError> {
        let partner = self
            .credentials
            .find_by_id(grant.partner_id)
            .await?
            .ok_or_else(|| {
                ConsentError::Storage(anyhow::anyhow!(
                    "grant references missing partner {}",
                    grant.partner_id
                ))
            })?;
        let customer = self
            .customers
            .find_by_id(grant.customer_id)
            .await?
            .ok_or_else(|| {
                ConsentError::Storage(anyhow::anyhow!(
                    "grant references missing customer {}",
                    grant.customer_id
                ))
            })?;

        Ok(ConsentSummary {
            partner_name: partner.company_name.clone(),
            customer_name: customer.company_name.clone(),
            customer_email: customer.email.clone(),
            requested_categories: grant.requested_categories.clone(),
            granted: grant.granted,
            granted_at: grant.granted_at,
            expires_at: grant.expires_at,
        })
    }
}
