//! Consent workflow integration tests library.
//!
//! Provides the wiring for end-to-end tests of the consent core: the full
//! service stack (registry, authenticator, ledger, access filter) bound to
//! the in-memory store, with a manual clock and an inspectable audit sink.

use std::sync::Arc;

use consent_core::config::ConsentConfig;
use consent_core::models::{CategoryRegistry, Customer, CustomerDocument};
use consent_core::services::{
    AccessFilter, ConsentLedger, MemoryAuditSink, PartnerAuthenticator, PartnerRegistration,
    PartnerRegistry,
};
use consent_core::store::{CustomerDirectory, DocumentStore, MemoryStore};
use consent_core::utils::{Clock, ManualClock, RandomTokenGenerator};

/// Document categories seeded for workflow tests.
pub const PLATFORM_CATEGORIES: [&str; 5] = [
    "Proof of Address",
    "Tax ID",
    "Passport",
    "Bank Statement",
    "Certificate of Incorporation",
];

/// The assembled consent stack.
pub struct ConsentStack {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub audit: Arc<MemoryAuditSink>,
    pub categories: Arc<CategoryRegistry>,
    pub config: ConsentConfig,
    pub registry: PartnerRegistry,
    pub authenticator: PartnerAuthenticator,
    pub ledger: ConsentLedger,
    pub access: AccessFilter,
}

impl ConsentStack {
    pub fn new() -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::starting_now());
        let audit = Arc::new(MemoryAuditSink::new());
        let config = ConsentConfig::default();
        let categories = Arc::new(CategoryRegistry::new(PLATFORM_CATEGORIES)?);

        let registry = PartnerRegistry::new(
            store.clone(),
            categories.clone(),
            audit.clone(),
            clock.clone(),
        );
        let authenticator = PartnerAuthenticator::new(store.clone(), audit.clone());
        let ledger = ConsentLedger::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(RandomTokenGenerator),
            audit.clone(),
            clock.clone(),
            config.clone(),
        );
        let access = AccessFilter::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            audit.clone(),
            clock.clone(),
        );

        Ok(Self {
            store,
            clock,
            audit,
            categories,
            config,
            registry,
            authenticator,
            ledger,
            access,
        })
    }

    /// Register a partner configured for the given categories.
    pub async fn onboard_partner(
        &self,
        company_name: &str,
        email: &str,
        categories: &[&str],
    ) -> anyhow::Result<PartnerRegistration> {
        Ok(self
            .registry
            .register(consent_core::services::NewPartner {
                company_name: company_name.to_string(),
                email: email.to_string(),
                categories: categories.iter().map(|c| c.to_string()).collect(),
            })
            .await?)
    }

    /// Seed a customer with documents in the given categories.
    pub async fn onboard_customer(
        &self,
        company_name: &str,
        email: &str,
        document_categories: &[&str],
    ) -> anyhow::Result<Customer> {
        let customer = Customer::new(
            company_name.to_string(),
            email.to_string(),
            self.clock.now(),
        );
        CustomerDirectory::insert(self.store.as_ref(), customer.clone()).await?;

        for name in document_categories {
            let category = self.categories.parse(name)?;
            let document = CustomerDocument::new(
                customer.id,
                category,
                format!("s3://documents/{}/{}", customer.id, uuid::Uuid::new_v4()),
                self.clock.now(),
            );
            DocumentStore::insert(self.store.as_ref(), document).await?;
        }
        Ok(customer)
    }
}
