//! Partner model - external organizations holding API credentials.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use uuid::Uuid;

use super::category::CategorySet;

/// Partner credential entity.
///
/// The api key is the unique lookup index; the api secret is generated once
/// at registration and never exposed again outside the registration
/// response. The secret is wrapped in [`Secret`] so it cannot end up in
/// debug output or logs by accident.
#[derive(Debug, Clone)]
pub struct Partner {
    pub id: Uuid,
    pub company_name: String,
    pub email: String,
    pub api_key: String,
    pub api_secret: Secret<String>,
    pub categories: CategorySet,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    pub fn new(
        company_name: String,
        email: String,
        api_key: String,
        api_secret: String,
        categories: CategorySet,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_name,
            email,
            api_key,
            api_secret: Secret::new(api_secret),
            categories,
            active: true,
            created_at,
            updated_at: created_at,
        }
    }

    /// Projection with the secret stripped; the only partner shape services
    /// hand back to callers.
    pub fn sanitized(&self) -> SanitizedPartner {
        SanitizedPartner {
            id: self.id,
            company_name: self.company_name.clone(),
            email: self.email.clone(),
            categories: self.categories.clone(),
            active: self.active,
            created_at: self.created_at,
        }
    }

    pub fn expose_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

/// Partner with the secret field excluded under all circumstances.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPartner {
    pub id: Uuid,
    pub company_name: String,
    pub email: String,
    pub categories: CategorySet,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
