pub mod audit;
pub mod category;
pub mod consent;
pub mod customer;
pub mod document;
pub mod partner;

pub use audit::{AuditEvent, AuditOutcome};
pub use category::{CategoryRegistry, CategorySet, DocumentCategory};
pub use consent::{ConsentGrant, ConsentReceipt, ConsentSummary, ConsentToken};
pub use customer::Customer;
pub use document::{CustomerDocument, DocumentSummary};
pub use partner::{Partner, SanitizedPartner};
