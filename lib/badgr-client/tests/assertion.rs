#![allow(missing_docs)]

use rstest::rstest;
use serde_json::json;

use badgr_client::{ApiClient, ApiClientError, Assertion, Evidence, NewAssertion};

mod common;
pub use self::common::*;

fn issued(entity_id: &str, badge_class: &str) -> serde_json::Value {
    result([json!({
        "entityId": entity_id,
        "badgeclass": badge_class,
        "recipient": {"type": "email", "identity": "test@test.com"},
        "revoked": false,
    })])
}

#[rstest]
#[tokio::test]
async fn should_issue_by_badge_name(
    #[future] loaded_client: ApiClient<MockTransport>,
) -> anyhow::Result<()> {
    let client = loaded_client.await;
    client
        .transport()
        .respond(issued("hF2kR0mQm8TqBz", "s0ziri1rZs6cNQVnHw"));

    let mut assertion = Assertion::new(&client);
    assertion
        .create(
            &NewAssertion::new("test@test.com")
                .with_badge_name("Speak Up!", "test")
                .with_issued_on("dummy"),
        )
        .await?;

    let requests = client.transport().api_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        describe(&requests[0]),
        "POST /v2/badgeclasses/s0ziri1rZs6cNQVnHw/assertions"
    );
    assert_eq!(
        requests[0].json_body(),
        Some(&json!({
            "recipient": {"type": "email", "identity": "test@test.com"},
            "narrative": null,
            "evidence": [],
            "notify": true,
            "expires": null,
            "issuedOn": "dummy",
        }))
    );
    assert_eq!(assertion.entity_id(), Some("hF2kR0mQm8TqBz"));
    assert_eq!(assertion.badge_class_eid(), Some("s0ziri1rZs6cNQVnHw"));

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_issue_by_badge_eid(client: ApiClient<MockTransport>) -> anyhow::Result<()> {
    client.transport().respond(issued("a1", "bc_eid"));

    let mut assertion = Assertion::new(&client);
    assertion
        .create(
            &NewAssertion::new("test@test.com")
                .with_badge_eid("bc_eid")
                .with_narrative("Asked great questions")
                .with_evidence(Evidence::url("https://example.org/log"))
                .with_notify(false),
        )
        .await?;

    let requests = client.transport().api_requests();
    assert_eq!(describe(&requests[0]), "POST /v2/badgeclasses/bc_eid/assertions");
    let body = requests[0].json_body().cloned().unwrap_or_default();
    assert_eq!(body["narrative"], "Asked great questions");
    assert_eq!(body["evidence"], json!([{"url": "https://example.org/log"}]));
    assert_eq!(body["notify"], false);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_require_badge_reference(client: ApiClient<MockTransport>) {
    let mut assertion = Assertion::new(&client);

    let result = assertion.create(&NewAssertion::new("test@test.com")).await;
    assert!(matches!(result, Err(ApiClientError::Validation { .. })));

    let result = assertion
        .create(&NewAssertion::new("test@test.com").with_badge_eid(""))
        .await;
    assert!(matches!(result, Err(ApiClientError::Validation { .. })));

    let result = assertion
        .create(&NewAssertion::new("test@test.com").with_badge_name_only("Speak Up!"))
        .await;
    assert!(matches!(result, Err(ApiClientError::Validation { .. })));

    assert!(client.transport().requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn should_fail_on_unknown_badge_name(#[future] loaded_client: ApiClient<MockTransport>) {
    let client = loaded_client.await;

    let mut assertion = Assertion::new(&client);
    let result = assertion
        .create(&NewAssertion::new("test@test.com").with_badge_name("Speak Louder!", "test"))
        .await;

    assert!(matches!(result, Err(ApiClientError::Lookup { .. })));
    assert!(client.transport().requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn should_fail_on_unloaded_issuer(client: ApiClient<MockTransport>) {
    let mut assertion = Assertion::new(&client);
    let result = assertion
        .create(&NewAssertion::new("test@test.com").with_badge_name("Speak Up!", "test"))
        .await;

    assert!(matches!(result, Err(ApiClientError::IssuerNotLoaded { .. })));
    assert!(client.transport().requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn should_revoke_assertion(client: ApiClient<MockTransport>) -> anyhow::Result<()> {
    client.transport().respond(serde_json::Value::Null);

    let assertion = Assertion::with_eid(&client, "hF2kR0mQm8TqBz");
    assertion.revoke("Issued by mistake").await?;

    let requests = client.transport().api_requests();
    assert_eq!(describe(&requests[0]), "DELETE /v2/assertions/hF2kR0mQm8TqBz");
    assert_eq!(
        requests[0].json_body(),
        Some(&json!({"revocation_reason": "Issued by mistake"}))
    );

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_revoke_in_bulk(client: ApiClient<MockTransport>) -> anyhow::Result<()> {
    client.revoke_assertions(["a", "b"]).await?;

    let requests = client.transport().api_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(describe(&requests[0]), "POST /v2/assertions/revoke");

    let body = requests[0].json_body().map(ToString::to_string).unwrap_or_default();
    insta::assert_snapshot!(body, @r#"[{"entityId":"a","revocationReason":"Revoked by badgerclient"},{"entityId":"b","revocationReason":"Revoked by badgerclient"}]"#);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_revoke_in_bulk_with_reason(client: ApiClient<MockTransport>) -> anyhow::Result<()> {
    client
        .revoke_assertions_with_reason(vec!["asd".to_string()], "Expired course")
        .await?;

    let requests = client.transport().api_requests();
    assert_eq!(
        requests[0].json_body(),
        Some(&json!([{"entityId": "asd", "revocationReason": "Expired course"}]))
    );

    Ok(())
}
