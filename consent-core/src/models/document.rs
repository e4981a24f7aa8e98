//! Customer document model and the partner-facing summary projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::DocumentCategory;

/// A document a customer has uploaded. Upload handling and blob storage are
/// external; this core only reads the metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDocument {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub category: DocumentCategory,
    pub storage_ref: String,
    pub verified: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl CustomerDocument {
    pub fn new(
        customer_id: Uuid,
        category: DocumentCategory,
        storage_ref: String,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            category,
            storage_ref,
            verified: false,
            uploaded_at,
        }
    }
}

/// What a partner sees for each visible document. Documents outside the
/// authorized category intersection never appear in any shape.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub category: DocumentCategory,
    pub storage_ref: String,
    pub verified: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&CustomerDocument> for DocumentSummary {
    fn from(doc: &CustomerDocument) -> Self {
        Self {
            category: doc.category.clone(),
            storage_ref: doc.storage_ref.clone(),
            verified: doc.verified,
            uploaded_at: doc.uploaded_at,
        }
    }
}
