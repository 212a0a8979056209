use super::*;
use std::collections::BTreeSet;
use std::time::{Duration, SystemTime};

fn make_item(file_name: &str, copied_at: SystemTime) -> Item {
    Item {
        id: ItemId::generate(),
        file_name: file_name.to_string(),
        size: 0,
        copied_at,
        kind: ItemKind::File,
        preview_text: String::new(),
        preview_image: None,
        is_pinned: false,
        labels: BTreeSet::new(),
        source_app: None,
        device: None,
    }
}

fn seconds_ago(secs: u64) -> SystemTime {
    SystemTime::now() - Duration::from_secs(secs)
}

mod insert_front {
    use super::*;

    #[test]
    fn test_new_items_go_to_front() {
        let mut store = ItemStore::new();
        store.insert_front(make_item("a.txt", seconds_ago(30)));
        store.insert_front(make_item("b.txt", seconds_ago(20)));

        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].file_name, "b.txt");
        assert_eq!(snapshot[1].file_name, "a.txt");
    }

    #[test]
    fn test_same_id_updates_in_place() {
        let mut store = ItemStore::new();
        let mut item = make_item("a.txt", seconds_ago(30));
        let id = item.id.clone();
        store.insert_front(item.clone());
        store.insert_front(make_item("b.txt", seconds_ago(20)));

        item.labels.insert("Updated".to_string());
        store.insert_front(item);

        assert_eq!(store.len(), 2);
        let snapshot = store.snapshot();
        // position preserved: b.txt is still first
        assert_eq!(snapshot[0].file_name, "b.txt");
        assert!(store.get(&id).unwrap().labels.contains("Updated"));
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let mut store = ItemStore::new();
        store.insert_front(make_item("old.txt", seconds_ago(100)));

        let batch = vec![
            make_item("a.txt", seconds_ago(3)),
            make_item("b.txt", seconds_ago(2)),
            make_item("c.txt", seconds_ago(1)),
        ];
        store.insert_batch_front(batch);

        let snapshot = store.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt", "old.txt"]);
    }
}

mod remove {
    use super::*;

    #[test]
    fn test_remove_existing() {
        let mut store = ItemStore::new();
        let item = make_item("a.txt", seconds_ago(10));
        let id = item.id.clone();
        store.insert_front(item);

        let removed = store.remove(&id);
        assert!(removed.is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = ItemStore::new();
        store.insert_front(make_item("a.txt", seconds_ago(10)));

        assert!(store.remove(&ItemId::generate()).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_drain_returns_all_in_order() {
        let mut store = ItemStore::new();
        store.insert_front(make_item("a.txt", seconds_ago(30)));
        store.insert_front(make_item("b.txt", seconds_ago(20)));

        let drained = store.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].file_name, "b.txt");
        assert!(store.is_empty());
    }
}

mod sorted {
    use super::*;

    #[test]
    fn test_recency_order() {
        let mut store = ItemStore::new();
        store.insert_front(make_item("oldest.txt", seconds_ago(30)));
        store.insert_front(make_item("middle.txt", seconds_ago(20)));
        store.insert_front(make_item("newest.txt", seconds_ago(10)));

        let sorted = store.sorted();
        let names: Vec<&str> = sorted.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["newest.txt", "middle.txt", "oldest.txt"]);
    }

    #[test]
    fn test_pinned_precede_unpinned() {
        let mut store = ItemStore::new();
        let older = make_item("a-older.txt", seconds_ago(100));
        let older_id = older.id.clone();
        store.insert_front(older);
        store.insert_front(make_item("b-newer.txt", seconds_ago(1)));

        store.toggle_pin(&older_id);

        let sorted = store.sorted();
        let names: Vec<&str> = sorted.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a-older.txt", "b-newer.txt"]);
    }

    #[test]
    fn test_order_invariant_after_mutations() {
        let mut store = ItemStore::new();
        let ids: Vec<ItemId> = (0..6)
            .map(|n| {
                let item = make_item(&format!("f{n}.txt"), seconds_ago(600 - n * 60));
                let id = item.id.clone();
                store.insert_front(item);
                id
            })
            .collect();

        store.toggle_pin(&ids[0]);
        store.toggle_pin(&ids[3]);
        store.add_label(&ids[2], "Work");
        store.toggle_pin(&ids[3]); // unpin again
        store.remove(&ids[5]);

        let sorted = store.sorted();
        let first_unpinned = sorted.iter().position(|i| !i.is_pinned).unwrap_or(sorted.len());
        assert!(sorted[..first_unpinned].iter().all(|i| i.is_pinned));
        assert!(sorted[first_unpinned..].iter().all(|i| !i.is_pinned));
        for group in [&sorted[..first_unpinned], &sorted[first_unpinned..]] {
            for pair in group.windows(2) {
                assert!(pair[0].copied_at >= pair[1].copied_at);
            }
        }
    }

    #[test]
    fn test_pin_does_not_touch_copied_at() {
        let mut store = ItemStore::new();
        let item = make_item("a.txt", seconds_ago(50));
        let id = item.id.clone();
        let copied_at = item.copied_at;
        store.insert_front(item);

        store.toggle_pin(&id);
        store.add_label(&id, "Work");

        assert_eq!(store.get(&id).unwrap().copied_at, copied_at);
    }
}

mod filtered {
    use super::*;

    #[test]
    fn test_search_matches_preview_and_labels() {
        let mut store = ItemStore::new();
        let mut item = make_item("report.txt", seconds_ago(10));
        item.preview_text = "hello world".to_string();
        item.labels.insert("Work".to_string());
        store.insert_front(item);

        assert_eq!(store.filtered("ORLD", &HashSet::new()).len(), 1);
        assert_eq!(store.filtered("work", &HashSet::new()).len(), 1);
        assert!(store.filtered("xyz", &HashSet::new()).is_empty());
    }

    #[test]
    fn test_empty_kind_set_selects_all() {
        let mut store = ItemStore::new();
        store.insert_front(make_item("a.txt", seconds_ago(10)));

        assert_eq!(store.filtered("", &HashSet::new()).len(), 1);
    }

    #[test]
    fn test_kind_facet_narrows() {
        let mut store = ItemStore::new();
        let mut image = make_item("pic.png", seconds_ago(10));
        image.kind = ItemKind::Image;
        store.insert_front(make_item("a.txt", seconds_ago(20)));
        store.insert_front(image);

        let only_images: HashSet<ItemKind> = [ItemKind::Image].into_iter().collect();
        let result = store.filtered("", &only_images);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].file_name, "pic.png");
    }
}

mod from_items {
    use super::*;

    #[test]
    fn test_round_trips_snapshot_order() {
        let mut store = ItemStore::new();
        store.insert_front(make_item("a.txt", seconds_ago(30)));
        store.insert_front(make_item("b.txt", seconds_ago(20)));

        let snapshot = store.snapshot();
        let rebuilt = ItemStore::from_items(snapshot.clone());
        assert_eq!(rebuilt.snapshot(), snapshot);
    }
}
