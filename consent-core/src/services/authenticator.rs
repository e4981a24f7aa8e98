//! Partner authentication - gates every partner-initiated call path.

use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::models::{AuditEvent, SanitizedPartner};
use crate::store::CredentialStore;

use super::audit::AuditSink;
use super::error::ConsentError;

/// Verifies a claimed (api key, secret) pair against the credential store.
///
/// Collaborators are injected at construction; there is no process-wide
/// credential state. Failures collapse to a single generic
/// [`ConsentError::InvalidCredentials`]; the distinguishing cause is
/// recorded only in the audit trail.
#[derive(Clone)]
pub struct PartnerAuthenticator {
    credentials: Arc<dyn CredentialStore>,
    audit: Arc<dyn AuditSink>,
}

impl PartnerAuthenticator {
    pub fn new(credentials: Arc<dyn CredentialStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { credentials, audit }
    }

    /// Authenticate a partner. `origin` is the caller's network origin as
    /// reported by the transport layer; it goes to the audit trail only.
    pub async fn authenticate(
        &self,
        api_key: &str,
        claimed_secret: &str,
        origin: &str,
    ) -> Result<SanitizedPartner, ConsentError> {
        let partner = self.credentials.find_by_api_key(api_key).await?;

        let partner = match partner {
            Some(partner) => partner,
            None => {
                tracing::warn!(origin = %origin, "authentication failed: unknown api key");
                self.audit
                    .record(
                        AuditEvent::failure("partner_auth", None, "unknown api key")
                            .with_origin(origin),
                    )
                    .await;
                return Err(ConsentError::InvalidCredentials);
            }
        };

        if !partner.active {
            tracing::warn!(partner_id = %partner.id, origin = %origin, "authentication failed: partner inactive");
            self.audit
                .record(
                    AuditEvent::failure("partner_auth", Some(partner.id), "partner inactive")
                        .with_origin(origin),
                )
                .await;
            return Err(ConsentError::InvalidCredentials);
        }

        // Length mismatch is rejected before the timing-safe compare;
        // content inequality must cost the same regardless of where the
        // strings differ.
        let stored = partner.expose_secret().as_bytes();
        let claimed = claimed_secret.as_bytes();
        let secret_matches =
            stored.len() == claimed.len() && bool::from(stored.ct_eq(claimed));

        if !secret_matches {
            tracing::warn!(partner_id = %partner.id, origin = %origin, "authentication failed: secret mismatch");
            self.audit
                .record(
                    AuditEvent::failure("partner_auth", Some(partner.id), "secret mismatch")
                        .with_origin(origin),
                )
                .await;
            return Err(ConsentError::InvalidCredentials);
        }

        tracing::info!(
            partner_id = %partner.id,
            company_name = %partner.company_name,
            "partner authenticated"
        );
        self.audit
            .record(AuditEvent::success("partner_auth", Some(partner.id)).with_origin(origin))
            .await;

        Ok(partner.sanitized())
    }
}
