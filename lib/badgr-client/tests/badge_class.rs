#![allow(missing_docs)]

use rstest::rstest;
use serde_json::json;

use badgr_client::{ApiClient, ApiClientError, BadgeClass, NewBadgeClass};

mod common;
pub use self::common::*;

const IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVQYV2Ng+M9QDwADgQF/iwmQSQAAAABJRU5ErkJggg==";

fn new_badge_class(name: &str) -> NewBadgeClass {
    NewBadgeClass::new(name, IMAGE, "Participated in an IRC meeting.")
        .with_criteria_text("Attend an IRC meeting")
}

#[rstest]
#[tokio::test]
async fn should_require_criteria_before_any_call(client: ApiClient<MockTransport>) {
    let mut badge_class = BadgeClass::new(&client);
    let payload = NewBadgeClass::new("Speak Up!", IMAGE, "Participated in an IRC meeting.");

    let result = badge_class.create("test", &payload).await;

    assert!(matches!(result, Err(ApiClientError::Validation { .. })));
    assert!(client.transport().requests().is_empty());
    assert!(badge_class.data().is_none());
}

#[rstest]
#[tokio::test]
async fn should_create_badge_class(client: ApiClient<MockTransport>) -> anyhow::Result<()> {
    client.transport().respond(result([badgeclass_data(
        "Speak Up!",
        "s0ziri1LRpyrZs6cNQVnHw",
        "QkTqddx3QomyiAZOxR1abQ",
    )]));

    let mut badge_class = BadgeClass::new(&client);
    badge_class
        .create(
            "QkTqddx3QomyiAZOxR1abQ",
            &new_badge_class("Speak Up!").with_tags(["irc", "community"]),
        )
        .await?;

    assert_eq!(badge_class.entity_id(), Some("s0ziri1LRpyrZs6cNQVnHw"));

    let requests = client.transport().api_requests();
    assert_eq!(describe(&requests[0]), "POST /v2/badgeclasses");
    assert_eq!(
        requests[0].json_body(),
        Some(&json!({
            "name": "Speak Up!",
            "image": IMAGE,
            "issuer": "QkTqddx3QomyiAZOxR1abQ",
            "description": "Participated in an IRC meeting.",
            "criteria_text": "Attend an IRC meeting",
            "criteria_url": null,
            "alignments": [],
            "tags": ["irc", "community"],
            "expires": null,
        }))
    );

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_leave_data_unset_when_create_fails(client: ApiClient<MockTransport>) {
    client.transport().fail(400, r#"{"image": ["invalid"]}"#);

    let mut badge_class = BadgeClass::new(&client);
    let result = badge_class.create("test", &new_badge_class("Speak Up!")).await;

    assert!(matches!(
        result,
        Err(ApiClientError::Api {
            status_code: 400,
            ..
        })
    ));
    assert!(badge_class.entity_id().is_none());
    assert!(badge_class.data().is_none());
}

#[rstest]
#[tokio::test]
async fn should_resolve_loaded_names(#[future] loaded_client: ApiClient<MockTransport>) {
    let client = loaded_client.await;

    for (name, eid) in TEST_BADGES {
        let resolved = client.get_eid_from_badge_name(name, "test").await;
        assert_eq!(resolved.ok().as_deref(), Some(eid));
    }
}

#[rstest]
#[tokio::test]
async fn should_reject_duplicate_name_before_any_call(
    #[future] loaded_client: ApiClient<MockTransport>,
) {
    let client = loaded_client.await;

    let mut badge_class = BadgeClass::new(&client);
    let result = badge_class.create("test", &new_badge_class("Speak Up!")).await;

    let Err(ApiClientError::DuplicateName { name, issuer_eid }) = result else {
        panic!("expected a duplicate name error, got {result:?}");
    };
    assert_eq!(name, "Speak Up!");
    assert_eq!(issuer_eid, "test");
    assert!(client.transport().requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn should_cache_created_name(
    #[future] loaded_client: ApiClient<MockTransport>,
) -> anyhow::Result<()> {
    let client = loaded_client.await;
    client
        .transport()
        .respond(result([badgeclass_data("Fresh", "fr3sh", "test")]));

    let mut badge_class = BadgeClass::new(&client);
    badge_class.create("test", &new_badge_class("Fresh")).await?;

    assert_eq!(client.get_eid_from_badge_name("Fresh", "test").await?, "fr3sh");

    let mut again = BadgeClass::new(&client);
    let result = again.create("test", &new_badge_class("Fresh")).await;
    assert!(matches!(result, Err(ApiClientError::DuplicateName { .. })));
    assert_eq!(client.transport().api_calls(), ["POST /v2/badgeclasses"]);

    Ok(())
}

#[tokio::test]
async fn should_reject_concurrent_creation_of_same_name() -> anyhow::Result<()> {
    let client = load_test_badges(test_client_with(MockTransport::yielding(), true)).await;
    client
        .transport()
        .respond(result([badgeclass_data("Fresh", "fr3sh", "test")]));

    let payload = new_badge_class("Fresh");
    let mut first = BadgeClass::new(&client);
    let mut second = BadgeClass::new(&client);
    let (first_result, second_result) = tokio::join!(
        first.create("test", &payload),
        second.create("test", &payload)
    );

    let results = [&first_result, &second_result];
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|result| matches!(result, Err(ApiClientError::DuplicateName { .. })))
    );
    assert_eq!(client.transport().api_calls(), ["POST /v2/badgeclasses"]);
    assert_eq!(client.get_eid_from_badge_name("Fresh", "test").await?, "fr3sh");

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_release_name_when_create_fails(
    #[future] loaded_client: ApiClient<MockTransport>,
) -> anyhow::Result<()> {
    let client = loaded_client.await;
    client.transport().fail(500, "oops");
    client
        .transport()
        .respond(result([badgeclass_data("Fresh", "fr3sh", "test")]));

    let mut badge_class = BadgeClass::new(&client);
    let result = badge_class.create("test", &new_badge_class("Fresh")).await;
    assert!(matches!(result, Err(ApiClientError::Api { .. })));

    badge_class.create("test", &new_badge_class("Fresh")).await?;

    assert_eq!(
        client.transport().api_calls(),
        ["POST /v2/badgeclasses", "POST /v2/badgeclasses"]
    );
    assert_eq!(badge_class.entity_id(), Some("fr3sh"));

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_load_names_before_first_create(
    unique_client: ApiClient<MockTransport>,
) -> anyhow::Result<()> {
    let client = unique_client;
    client.transport().respond(result([badgeclass_data(
        "Speak Up!",
        "s0ziri1rZs6cNQVnHw",
        "test",
    )]));

    let mut badge_class = BadgeClass::new(&client);
    let result = badge_class.create("test", &new_badge_class("Speak Up!")).await;

    assert!(matches!(result, Err(ApiClientError::DuplicateName { .. })));
    assert_eq!(
        client.transport().api_calls(),
        ["GET /v2/issuers/test/badgeclasses"]
    );

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_not_check_names_by_default(client: ApiClient<MockTransport>) -> anyhow::Result<()> {
    client
        .transport()
        .respond(result([badgeclass_data("Speak Up!", "again", "test")]));

    let mut badge_class = BadgeClass::new(&client);
    badge_class.create("test", &new_badge_class("Speak Up!")).await?;

    assert_eq!(client.transport().api_calls(), ["POST /v2/badgeclasses"]);
    assert!(!client.names().is_loaded("test").await);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_bind_badge_class_from_name(
    #[future] loaded_client: ApiClient<MockTransport>,
) -> anyhow::Result<()> {
    let client = loaded_client.await;

    let badge_class = BadgeClass::from_name(&client, "Speak Up!", "test").await?;

    assert_eq!(badge_class.entity_id(), Some("s0ziri1rZs6cNQVnHw"));
    assert!(client.transport().requests().is_empty());

    let result = BadgeClass::from_name(&client, "Unknown", "test").await;
    assert!(matches!(result, Err(ApiClientError::Lookup { .. })));

    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_fail_lookup_for_unloaded_issuer(client: ApiClient<MockTransport>) {
    let result = client.get_eid_from_badge_name("Speak Up!", "test").await;

    assert!(matches!(result, Err(ApiClientError::IssuerNotLoaded { .. })));
}

#[rstest]
#[case::all(None, "GET /v2/badgeclasses/s0ziri1LRpyrZs6cNQVnHw/assertions")]
#[case::recipient(
    Some("test_email@dummy.com"),
    "GET /v2/badgeclasses/s0ziri1LRpyrZs6cNQVnHw/assertions?recipient=test_email%40dummy.com"
)]
#[tokio::test]
async fn should_fetch_assertions(
    client: ApiClient<MockTransport>,
    #[case] recipient: Option<&str>,
    #[case] expected: &str,
) -> anyhow::Result<()> {
    client.transport().respond(result([
        json!({"entityId": "a1", "badgeclass": "s0ziri1LRpyrZs6cNQVnHw"}),
        json!({"entityId": "a2", "badgeclass": "s0ziri1LRpyrZs6cNQVnHw"}),
    ]));

    let badge_class = BadgeClass::with_eid(&client, "s0ziri1LRpyrZs6cNQVnHw");
    let assertions = badge_class.fetch_assertions(recipient).await?;

    assert_eq!(client.transport().api_calls(), [expected]);
    let ids = assertions
        .iter()
        .filter_map(|assertion| assertion.entity_id())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["a1", "a2"]);
    assert_eq!(
        assertions[0].badge_class_eid(),
        Some("s0ziri1LRpyrZs6cNQVnHw")
    );

    Ok(())
}
