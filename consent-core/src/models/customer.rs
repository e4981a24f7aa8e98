//! Customer model - the document-owning entity, read-only in this core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub company_name: String,
    /// Unique; partners address customers by email.
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(company_name: String, email: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_name,
            email,
            created_at,
        }
    }
}
