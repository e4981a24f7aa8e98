//! Consent grant model - time-bounded, token-addressed authorization records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::category::CategorySet;

/// Opaque capability token referencing a single consent grant.
///
/// The token is the sole external reference to a grant; holding it stands in
/// for authorization to view or act on the grant, with no further
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsentToken(String);

impl ConsentToken {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A customer's time-bounded authorization for one partner to access
/// specific document categories.
///
/// State machine: an ungranted, unexpired grant is *active*. `granted` flips
/// false -> true exactly once and never reverts; expiry is evaluated against
/// the immutable `expires_at`. Granted and expired are non-exclusive: a
/// grant granted before expiry stays granted after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentGrant {
    pub token: ConsentToken,
    pub partner_id: Uuid,
    pub customer_id: Uuid,
    /// Snapshot of the partner's configured categories at creation time.
    /// Later partner configuration changes never alter this set.
    pub requested_categories: CategorySet,
    pub granted: bool,
    /// Present iff `granted` is true; set at the moment of granting.
    pub granted_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ConsentGrant {
    pub fn new(
        token: ConsentToken,
        partner_id: Uuid,
        customer_id: Uuid,
        requested_categories: CategorySet,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token,
            partner_id,
            customer_id,
            requested_categories,
            granted: false,
            granted_at: None,
            expires_at,
            created_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Active means neither granted nor expired; only active grants are
    /// deduplicated on repeated consent requests.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.granted && !self.is_expired(now)
    }
}

/// Returned to the requesting partner: the capability token and its expiry,
/// nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct ConsentReceipt {
    pub token: ConsentToken,
    pub expires_at: DateTime<Utc>,
}

/// Human-facing view of a consent grant. Carries display identities and the
/// requested categories, never the customer's document contents.
#[derive(Debug, Clone, Serialize)]
pub struct ConsentSummary {
    pub partner_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub requested_categories: CategorySet,
    pub granted: bool,
    pub granted_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}
