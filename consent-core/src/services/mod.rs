//! Services layer: partner authentication, the consent ledger, the access
//! filter, and partner registration, plus the shared error taxonomy and
//! audit sink.

mod access;
mod audit;
mod authenticator;
pub mod error;
mod ledger;
mod registry;

pub use access::AccessFilter;
pub use audit::{AuditSink, MemoryAuditSink, TracingAuditSink};
pub use authenticator::PartnerAuthenticator;
pub use error::{ConsentError, ConsentErrorKind};
pub use ledger::ConsentLedger;
pub use registry::{NewPartner, PartnerRegistration, PartnerRegistry};
