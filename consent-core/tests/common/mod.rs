//! Shared test harness: the full consent stack wired over the in-memory
//! store with a manual clock and deterministic tokens.
#![allow(dead_code)]

use std::sync::Arc;

use consent_core::config::ConsentConfig;
use consent_core::models::{
    CategoryRegistry, Customer, CustomerDocument, DocumentCategory,
};
use consent_core::services::{
    AccessFilter, ConsentLedger, MemoryAuditSink, PartnerAuthenticator, PartnerRegistration,
    PartnerRegistry,
};
use consent_core::store::{CachingCredentialStore, MemoryStore};
use consent_core::utils::{Clock, ManualClock, SequenceTokenGenerator};
use uuid::Uuid;

pub const KNOWN_CATEGORIES: [&str; 5] = [
    "Proof of Address",
    "Tax ID",
    "Passport",
    "Bank Statement",
    "Certificate of Incorporation",
];

pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub cached_credentials: Arc<CachingCredentialStore>,
    pub clock: Arc<ManualClock>,
    pub audit: Arc<MemoryAuditSink>,
    pub category_registry: Arc<CategoryRegistry>,
    pub config: ConsentConfig,
    pub registry: PartnerRegistry,
    pub authenticator: PartnerAuthenticator,
    /// Authenticator reading through the TTL cache, for staleness tests.
    pub cached_authenticator: PartnerAuthenticator,
    pub ledger: ConsentLedger,
    pub access: AccessFilter,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::starting_now());
        let audit = Arc::new(MemoryAuditSink::new());
        let config = ConsentConfig::default();
        let category_registry =
            Arc::new(CategoryRegistry::new(KNOWN_CATEGORIES).expect("known categories"));
        let cached_credentials = Arc::new(CachingCredentialStore::new(
            store.clone(),
            clock.clone(),
            config.credential_cache_ttl(),
        ));

        let registry = PartnerRegistry::new(
            store.clone(),
            category_registry.clone(),
            audit.clone(),
            clock.clone(),
        );
        let authenticator = PartnerAuthenticator::new(store.clone(), audit.clone());
        let cached_authenticator =
            PartnerAuthenticator::new(cached_credentials.clone(), audit.clone());
        let ledger = ConsentLedger::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(SequenceTokenGenerator::new("tok")),
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

        Self {
            store,
            cached_credentials,
            clock,
            audit,
            category_registry,
            config,
            registry,
            authenticator,
            cached_authenticator,
            ledger,
            access,
        }
    }

    pub async fn register_partner(
        &self,
        company_name: &str,
        categories: &[&str],
    ) -> PartnerRegistration {
        self.registry
            .register(consent_core::services::NewPartner {
                company_name: company_name.to_string(),
                email: format!(
                    "ops@{}.example",
                    company_name.to_lowercase().replace(' ', "-")
                ),
                categories: categories.iter().map(|c| c.to_string()).collect(),
            })
            .await
            .expect("partner registration")
    }

    pub async fn seed_customer(&self, company_name: &str, email: &str) -> Customer {
        let customer = Customer::new(
            company_name.to_string(),
            email.to_string(),
            self.clock.now(),
        );
        use consent_core::store::CustomerDirectory;
        self.store
            .insert(customer.clone())
            .await
            .expect("customer insert");
        customer
    }

    pub async fn seed_document(&self, customer_id: Uuid, category: &str, verified: bool) {
        let category: DocumentCategory =
            self.category_registry.parse(category).expect("known category");
        let mut document = CustomerDocument::new(
            customer_id,
            category,
            format!("s3://documents/{}", Uuid::new_v4()),
            self.clock.now(),
        );
        document.verified = verified;
        use consent_core::store::DocumentStore;
        self.store.insert(document).await.expect("document insert");
    }
}
