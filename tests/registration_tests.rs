mod harness;

use std::sync::Arc;

use alto_tracker::application::AllowListChange;
use alto_tracker::domain::{Destination, EntityKind, GroupId};
use alto_tracker::error::{NotificationError, RegistrationError, ScrapeError};
use alto_tracker::infrastructure::bootstrap::{Stores, Tracker};
use alto_tracker::infrastructure::config::Config;

use harness::{collection, listing, page_url, test_tracker, wallet};

const HOOK: &str = "https://hooks.example/1";
const FOO_LINK: &str = "https://alto.build/collections/foo";

fn allowed(group: &str) -> (harness::TestTracker, GroupId) {
    let t = test_tracker(&Config::default());
    let group = GroupId::new(group);
    t.tracker.registrar.allow(&group).unwrap();
    (t, group)
}

#[tokio::test]
async fn group_must_be_allowed() {
    let t = test_tracker(&Config::default());

    let err = t
        .tracker
        .registrar
        .add(
            &GroupId::new("stranger"),
            EntityKind::Collection,
            FOO_LINK,
            Destination::new(HOOK),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::NotAuthorized));
    assert!(t.scraper.calls().is_empty());
    assert!(t.transport.sent().is_empty());
}

#[tokio::test]
async fn link_without_a_name_is_invalid() {
    let (t, group) = allowed("g1");

    let err = t
        .tracker
        .registrar
        .add(&group, EntityKind::Wallet, "   ", Destination::new(HOOK))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::InvalidLink(_)));
}

#[tokio::test]
async fn unscrapeable_entity_is_an_invalid_link() {
    let (t, group) = allowed("g1");
    t.scraper.push_failure(
        FOO_LINK,
        ScrapeError::Parse("no activity table".into()),
    );

    let err = t
        .tracker
        .registrar
        .add(&group, EntityKind::Collection, FOO_LINK, Destination::new(HOOK))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::InvalidLink(_)));
    assert!(t.tracker.registrar.tracked(None).unwrap().is_empty());
    assert!(t.transport.sent().is_empty());
}

#[tokio::test]
async fn unreachable_destination_is_rejected_and_nothing_is_stored() {
    let (t, group) = allowed("g1");
    t.transport.reject(HOOK);

    let err = t
        .tracker
        .registrar
        .add(&group, EntityKind::Collection, FOO_LINK, Destination::new(HOOK))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RegistrationError::InvalidDestination(NotificationError::InvalidDestination { .. })
    ));
    assert!(t.tracker.registrar.tracked(None).unwrap().is_empty());
}

#[tokio::test]
async fn failed_test_message_is_rejected() {
    let (t, group) = allowed("g1");
    t.transport.fail_deliveries_to(HOOK);

    let err = t
        .tracker
        .registrar
        .add(&group, EntityKind::Collection, FOO_LINK, Destination::new(HOOK))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::InvalidDestination(_)));
    assert!(t.tracker.registrar.tracked(None).unwrap().is_empty());
}

#[tokio::test]
async fn add_seeds_history_and_sends_only_a_test_message() {
    let (t, group) = allowed("g1");
    let foo = collection("foo");
    t.scraper.push_events(
        &page_url(&foo),
        vec![listing(&foo, "1", "1"), listing(&foo, "2", "2")],
    );

    let registration = t
        .tracker
        .registrar
        .add(&group, EntityKind::Collection, FOO_LINK, Destination::new(HOOK))
        .await
        .unwrap();

    assert_eq!(registration.entity, foo);
    assert_eq!(registration.seeded_events, 2);
    assert_eq!(registration.replaced, None);
    let messages = t.transport.messages_to(HOOK);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].title, "Testing");
    assert_eq!(messages[0].description.as_deref(), Some("Testing the Webhook"));

    let tracked = t.tracker.registrar.tracked(Some(&group)).unwrap();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].listeners, 1);
    assert_eq!(tracked[0].history_len, 2);
}

#[tokio::test]
async fn re_adding_replaces_the_group_destination() {
    let (t, group) = allowed("g1");

    t.tracker
        .registrar
        .add(&group, EntityKind::Collection, FOO_LINK, Destination::new(HOOK))
        .await
        .unwrap();
    let again = t
        .tracker
        .registrar
        .add(
            &group,
            EntityKind::Collection,
            FOO_LINK,
            Destination::new("https://hooks.example/2"),
        )
        .await
        .unwrap();

    assert_eq!(again.replaced, Some(Destination::new(HOOK)));
    assert_eq!(t.tracker.registrar.tracked(None).unwrap()[0].listeners, 1);
}

#[tokio::test]
async fn remove_of_unregistered_entity_is_reported() {
    let (t, group) = allowed("g1");

    let err = t
        .tracker
        .registrar
        .remove(&group, EntityKind::Wallet, "https://alto.build/profile/0xabc", false)
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::NotRegistered(_)));
}

#[tokio::test]
async fn remove_keeps_other_groups_listening() {
    let (t, g1) = allowed("g1");
    let g2 = GroupId::new("g2");
    t.tracker.registrar.allow(&g2).unwrap();
    let link = "https://alto.build/profile/0xabc";
    for group in [&g1, &g2] {
        t.tracker
            .registrar
            .add(group, EntityKind::Wallet, link, Destination::new(HOOK))
            .await
            .unwrap();
    }

    let removed = t
        .tracker
        .registrar
        .remove(&g1, EntityKind::Wallet, link, true)
        .await
        .unwrap();

    assert_eq!(removed, wallet("0xabc"));
    let tracked = t.tracker.registrar.tracked(None).unwrap();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].listeners, 1);
    assert!(t.tracker.registrar.tracked(Some(&g1)).unwrap().is_empty());
}

#[tokio::test]
async fn purge_deletes_history_of_untracked_entity() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.data_dir = dir.path().to_path_buf();
    let scraper = harness::scripted_scraper::ScriptedScraper::new();
    let tracker = Tracker::assemble(
        &config,
        Stores::open(&config.storage).unwrap(),
        Arc::new(scraper.clone()),
        Arc::new(harness::recording_transport::RecordingTransport::new()),
    );
    let group = GroupId::new("g1");
    let foo = collection("foo");
    let bar = collection("bar");
    tracker.registrar.allow(&group).unwrap();
    for entity in [&foo, &bar] {
        scraper.push_events(&page_url(entity), vec![listing(entity, "1", "1")]);
        tracker
            .registrar
            .add(&group, EntityKind::Collection, &page_url(entity), Destination::new(HOOK))
            .await
            .unwrap();
    }

    tracker
        .registrar
        .remove(&group, EntityKind::Collection, FOO_LINK, true)
        .await
        .unwrap();
    tracker
        .registrar
        .remove(&group, EntityKind::Collection, &page_url(&bar), false)
        .await
        .unwrap();

    let history: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(config.storage.history_path()).unwrap())
            .unwrap();
    assert!(history.get("collection:foo").is_none());
    assert_eq!(history["collection:bar"].as_array().unwrap().len(), 1);
    assert!(tracker.registrar.tracked(None).unwrap().is_empty());
}

#[test]
fn allow_and_disallow_are_idempotent() {
    let t = test_tracker(&Config::default());
    let registrar = &t.tracker.registrar;
    let group = GroupId::new("g1");

    assert_eq!(registrar.allow(&group).unwrap(), AllowListChange::Added);
    assert_eq!(registrar.allow(&group).unwrap(), AllowListChange::AlreadyAllowed);
    assert_eq!(registrar.allowed_groups().unwrap(), vec![group.clone()]);
    assert_eq!(registrar.disallow(&group).unwrap(), AllowListChange::Removed);
    assert_eq!(registrar.disallow(&group).unwrap(), AllowListChange::NotAllowed);
    assert!(registrar.allowed_groups().unwrap().is_empty());
}

#[tokio::test]
async fn disallowed_group_cannot_add() {
    let (t, group) = allowed("g1");
    t.tracker.registrar.disallow(&group).unwrap();

    let err = t
        .tracker
        .registrar
        .add(&group, EntityKind::Collection, FOO_LINK, Destination::new(HOOK))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::NotAuthorized));
}

#[tokio::test]
async fn failed_history_seed_leaves_nothing_registered() {
    let (t, group) = allowed("g1");
    let foo = collection("foo");
    t.scraper
        .push_events(&page_url(&foo), vec![listing(&foo, "1", "10")]);
    t.history.fail_writes_to("collection:foo");

    let err = t
        .tracker
        .registrar
        .add(&group, EntityKind::Collection, FOO_LINK, Destination::new(HOOK))
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::Store(_)));
    assert!(t.tracker.registrar.tracked(None).unwrap().is_empty());

    t.tracker.poller.run_cycle().await;
    assert_eq!(t.scraper.calls().len(), 1);
    assert_eq!(t.transport.titles_to(HOOK), vec!["Testing"]);
}
