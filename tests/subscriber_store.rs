use news_digest_bot::subscribers::SubscriberStore;
use news_digest_bot::telegram::ChatId;

#[test]
fn registrations_survive_a_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("subscribers.json");
    {
        let store = SubscriberStore::load(path.clone());
        assert!(store.is_empty(), "fresh registry starts empty");
        assert!(store.add(ChatId(100)));
        assert!(store.add(ChatId(-42)));
        assert!(!store.add(ChatId(100)), "re-adding is a no-op");
    }

    let reloaded = SubscriberStore::load(path);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.snapshot(), vec![ChatId(-42), ChatId(100)]);
}

#[test]
fn registry_file_is_a_plain_sorted_json_array() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("subscribers.json");
    let store = SubscriberStore::load(path.clone());
    store.add(ChatId(7));
    store.add(ChatId(3));

    let raw = std::fs::read_to_string(&path).expect("registry written");
    let ids: Vec<i64> = serde_json::from_str(&raw).expect("plain json array");
    assert_eq!(ids, vec![3, 7]);
}

#[test]
fn corrupt_registry_degrades_to_empty_and_recovers_on_next_add() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("subscribers.json");
    std::fs::write(&path, "{ definitely not a json array").unwrap();

    let store = SubscriberStore::load(path.clone());
    assert!(store.is_empty(), "corrupt file must not block startup");

    assert!(store.add(ChatId(5)));
    let raw = std::fs::read_to_string(&path).unwrap();
    let ids: Vec<i64> = serde_json::from_str(&raw).expect("rewritten as valid json");
    assert_eq!(ids, vec![5]);
}

#[test]
fn concurrent_adds_land_exactly_once() {
    use std::sync::Arc;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("subscribers.json");
    let store = Arc::new(SubscriberStore::load(path.clone()));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                // Ids overlap across threads; each distinct id must land once.
                for id in 0..20 {
                    store.add(ChatId(id % 10 + (t % 2) * 10));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("adder thread");
    }

    assert_eq!(store.len(), 20);
    let raw = std::fs::read_to_string(&path).unwrap();
    let ids: Vec<i64> = serde_json::from_str(&raw).expect("registry stays well-formed");
    assert_eq!(ids, (0..20).collect::<Vec<i64>>());
}

#[test]
fn missing_parent_directory_keeps_registrations_in_memory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("no-such-dir").join("subscribers.json");

    let store = SubscriberStore::load(path);
    assert!(store.add(ChatId(9)), "persist failure must not lose the registration");
    assert_eq!(store.snapshot(), vec![ChatId(9)]);
}
