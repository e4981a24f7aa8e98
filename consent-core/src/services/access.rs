//! Access filter - computes the document set a partner may actually see.

use std::sync::Arc;

use crate::models::{AuditEvent, DocumentSummary, SanitizedPartner};
use crate::store::{CredentialStore, CustomerDirectory, DocumentStore, GrantStore};
use crate::utils::Clock;

use super::audit::AuditSink;
use super::error::ConsentError;

/// Restricts document listings to the intersection of three sets: the
/// partner's live category configuration, the consent grant's snapshotted
/// requested categories, and the documents the customer actually uploaded.
///
/// Takes the authenticated [`SanitizedPartner`] projection, so this path is
/// unreachable without a prior successful
/// [`PartnerAuthenticator::authenticate`](super::PartnerAuthenticator::authenticate).
#[derive(Clone)]
pub struct AccessFilter {
    grants: Arc<dyn GrantStore>,
    credentials: Arc<dyn CredentialStore>,
    customers: Arc<dyn CustomerDirectory>,
    documents: Arc<dyn DocumentStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl AccessFilter {
    pub fn new(
        grants: Arc<dyn GrantStore>,
        credentials: Arc<dyn CredentialStore>,
        customers: Arc<dyn CustomerDirectory>,
        documents: Arc<dyn DocumentStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            grants,
            credentials,
            customers,
            documents,
            audit,
            clock,
        }
    }

    /// List the documents of `customer_email` visible to the partner.
    ///
    /// Failure detail is limited to `CustomerNotFound`, `ConsentRequired`
    /// (no granted consent at all, re-request needed from scratch) and
    /// `ConsentExpired` (granted but past expiry, re-request needed);
    /// nothing finer leaks to partner-facing callers.
    pub async fn list_accessible_documents(
        &self,
        partner: &SanitizedPartner,
        customer_email: &str,
    ) -> Result<Vec<DocumentSummary>, ConsentError> {
        let customer = self
            .customers
            .find_by_email(customer_email)
            .await?
            .ok_or(ConsentError::CustomerNotFound)?;

        let grant = self
            .grants
            .find_granted(partner.id, customer.id)
            .await?
            .ok_or_else(|| {
                tracing::info!(
                    partner_id = %partner.id,
                    customer_id = %customer.id,
                    "document listing refused: no granted consent"
                );
                ConsentError::ConsentRequired
            })?;

        if grant.is_expired(self.clock.now()) {
            tracing::info!(
                partner_id = %partner.id,
                customer_id = %customer.id,
                expired_at = %grant.expires_at,
                "document listing refused: consent expired"
            );
            return Err(ConsentError::ConsentExpired);
        }

        // Re-resolve the partner: the live configuration bounds access, so
        // narrowing (or deactivating) a partner takes effect immediately,
        // while the grant snapshot bounds any later expansion.
        let live = self
            .credentials
            .find_by_id(partner.id)
            .await?
            .filter(|p| p.active)
            .ok_or(ConsentError::InvalidCredentials)?;

        let allowed = live.categories.intersection(&grant.requested_categories);

        let documents = self.documents.documents_for_customer(customer.id).await?;
        let visible: Vec<DocumentSummary> = documents
            .iter()
            .filter(|doc| allowed.contains(&doc.category))
            .map(DocumentSummary::from)
            .collect();

        tracing::info!(
            partner_id = %partner.id,
            customer_id = %customer.id,
            visible = visible.len(),
            total = documents.len(),
            "documents listed"
        );
        self.audit
            .record(AuditEvent::success("documents_listed", Some(partner.id)))
            .await;

        Ok(visible)
    }
}
