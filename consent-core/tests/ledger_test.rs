//! Consent ledger tests: request preconditions, active-grant deduplication,
//! the expiry/granted failure ladder, and grant atomicity.

mod common;

use chrono::Duration;
use common::TestHarness;
use consent_core::models::{AuditOutcome, ConsentToken};
use consent_core::services::ConsentErrorKind;
use consent_core::utils::Clock;

#[tokio::test]
async fn request_consent_mints_token_with_24h_expiry() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("consent request");

    assert_eq!(receipt.expires_at, h.clock.now() + Duration::hours(24));
}

#[tokio::test]
async fn request_fails_for_unknown_partner() {
    let h = TestHarness::new();
    h.seed_customer("Globex", "finance@globex.example").await;

    let err = h
        .ledger
        .request_consent(uuid::Uuid::new_v4(), "finance@globex.example")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::InvalidConfiguration);
}

#[tokio::test]
async fn request_fails_for_partner_without_categories() {
    let h = TestHarness::new();
    let reg = h.register_partner("Unconfigured Co", &[]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let err = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::InvalidConfiguration);
}

#[tokio::test]
async fn request_fails_for_unknown_customer() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;

    let err = h
        .ledger
        .request_consent(reg.partner.id, "nobody@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::CustomerNotFound);
}

#[tokio::test]
async fn repeated_requests_return_the_existing_active_grant() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let first = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("first request");
    let second = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("second request");

    assert_eq!(first.token, second.token);
    assert_eq!(first.expires_at, second.expires_at);

    // The dedup short-circuit still records the action.
    let requested = h
        .audit
        .events()
        .into_iter()
        .filter(|e| e.event_type == "consent_requested" && e.outcome == AuditOutcome::Success)
        .count();
    assert_eq!(requested, 2);
}

#[tokio::test]
async fn concurrent_requests_converge_on_one_grant() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let (a, b) = tokio::join!(
        h.ledger
            .request_consent(reg.partner.id, "finance@globex.example"),
        h.ledger
            .request_consent(reg.partner.id, "finance@globex.example"),
    );

    let a = a.expect("first racer");
    let b = b.expect("second racer");
    assert_eq!(a.token, b.token, "racing requests must converge on a single active grant");
}

#[tokio::test]
async fn distinct_customers_get_distinct_tokens() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;
    h.seed_customer("Initech", "ap@initech.example").await;

    let first = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");
    let second = h
        .ledger
        .request_consent(reg.partner.id, "ap@initech.example")
        .await
        .expect("request");

    assert_ne!(first.token, second.token);
}

#[tokio::test]
async fn view_fails_for_unknown_expired_and_granted_tokens() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let err = h
        .ledger
        .view_consent(&ConsentToken::new("no-such-token".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::TokenNotFound);

    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");

    h.ledger.grant_consent(&receipt.token).await.expect("grant");
    let err = h.ledger.view_consent(&receipt.token).await.unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::ConsentAlreadyGranted);

    // A fresh request for the same pair, left to expire.
    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");
    h.clock.advance(Duration::hours(24));
    let err = h.ledger.view_consent(&receipt.token).await.unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::ConsentExpired);
}

#[tokio::test]
async fn view_shows_identities_and_requested_categories() {
    let h = TestHarness::new();
    let reg = h
        .register_partner("Acme Lending", &["Proof of Address", "Tax ID"])
        .await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");
    let summary = h.ledger.view_consent(&receipt.token).await.expect("view");

    assert_eq!(summary.partner_name, "Acme Lending");
    assert_eq!(summary.customer_name, "Globex");
    assert_eq!(summary.customer_email, "finance@globex.example");
    assert!(!summary.granted);
    let mut names = summary.requested_categories.names();
    names.sort();
    assert_eq!(names, vec!["Proof of Address".to_string(), "Tax ID".to_string()]);
}

#[tokio::test]
async fn grant_is_one_way_and_granted_at_never_moves() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");

    let summary = h.ledger.grant_consent(&receipt.token).await.expect("grant");
    assert!(summary.granted);
    let granted_at = summary.granted_at.expect("granted_at set on grant");
    assert_eq!(granted_at, h.clock.now());

    h.clock.advance(Duration::hours(1));
    let err = h.ledger.grant_consent(&receipt.token).await.unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::ConsentAlreadyGranted);

    let status = h
        .ledger
        .consent_status(&receipt.token)
        .await
        .expect("status");
    assert_eq!(status.granted_at, Some(granted_at));
}

#[tokio::test]
async fn racing_grants_produce_exactly_one_winner() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");

    let (a, b) = tokio::join!(
        h.ledger.grant_consent(&receipt.token),
        h.ledger.grant_consent(&receipt.token),
    );

    let outcomes = [a, b];
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one of two racing grant calls may win");
    let loser = outcomes
        .iter()
        .find(|r| r.is_err())
        .expect("one racer must lose");
    assert_eq!(
        loser.as_ref().unwrap_err().kind(),
        ConsentErrorKind::ConsentAlreadyGranted
    );
}

#[tokio::test]
async fn grant_after_expiry_is_rejected() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");
    h.clock.advance(Duration::hours(24));

    let err = h.ledger.grant_consent(&receipt.token).await.unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::ConsentExpired);
}

#[tokio::test]
async fn expired_grant_does_not_block_a_fresh_request() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let stale = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");
    h.clock.advance(Duration::hours(25));

    let fresh = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("fresh request after expiry");
    assert_ne!(stale.token, fresh.token);
    assert_eq!(fresh.expires_at, h.clock.now() + Duration::hours(24));
}

#[tokio::test]
async fn requested_categories_are_a_snapshot() {
    let h = TestHarness::new();
    let reg = h
        .register_partner("Acme Lending", &["Proof of Address", "Tax ID"])
        .await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");

    // Widening the partner's configuration after the fact must not widen
    // the grant.
    h.registry
        .update_categories(
            reg.partner.id,
            vec![
                "Proof of Address".to_string(),
                "Tax ID".to_string(),
                "Passport".to_string(),
            ],
        )
        .await
        .expect("update categories");

    let summary = h.ledger.grant_consent(&receipt.token).await.expect("grant");
    let mut names = summary.requested_categories.names();
    names.sort();
    assert_eq!(names, vec!["Proof of Address".to_string(), "Tax ID".to_string()]);
}

#[tokio::test]
async fn failed_request_view_and_grant_actions_are_audited() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    // Rejected request: unknown customer.
    let _ = h
        .ledger
        .request_consent(reg.partner.id, "nobody@example.com")
        .await
        .unwrap_err();

    // Failed view: unknown token.
    let _ = h
        .ledger
        .view_consent(&ConsentToken::new("no-such-token".to_string()))
        .await
        .unwrap_err();

    // Repeated grant on an already granted token, no race involved.
    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");
    h.ledger.grant_consent(&receipt.token).await.expect("grant");
    let _ = h.ledger.grant_consent(&receipt.token).await.unwrap_err();

    let failures = h.audit.failures();
    let has = |event_type: &str, detail: &str| {
        failures
            .iter()
            .any(|e| e.event_type == event_type && e.detail.as_deref() == Some(detail))
    };
    assert!(has("consent_requested", "customer not found"));
    assert!(has("consent_viewed", "unknown token"));
    assert!(has("consent_granted", "already granted"));
    assert!(failures
        .iter()
        .all(|e| e.outcome == AuditOutcome::Failure));

    // Expired tokens are audited too.
    let fresh = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("fresh request");
    h.clock.advance(Duration::hours(24));
    let _ = h.ledger.view_consent(&fresh.token).await.unwrap_err();
    assert!(h
        .audit
        .failures()
        .iter()
        .any(|e| e.event_type == "consent_viewed"
            && e.detail.as_deref() == Some("consent expired")
            && e.partner_id == Some(reg.partner.id)));
}

#[tokio::test]
async fn status_reads_granted_and_expired_grants_as_data() {
    let h = TestHarness::new();
    let reg = h.register_partner("Acme Lending", &["Tax ID"]).await;
    h.seed_customer("Globex", "finance@globex.example").await;

    let err = h
        .ledger
        .consent_status(&ConsentToken::new("missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ConsentErrorKind::TokenNotFound);

    let receipt = h
        .ledger
        .request_consent(reg.partner.id, "finance@globex.example")
        .await
        .expect("request");
    h.ledger.grant_consent(&receipt.token).await.expect("grant");
    h.clock.advance(Duration::hours(48));

    let status = h
        .ledger
        .consent_status(&receipt.token)
        .await
        .expect("status of granted+expired grant");
    assert!(status.granted);
    assert!(status.expires_at < h.clock.now());
}
