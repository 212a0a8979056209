//! Retention sweeps driven through the worker service.

use ledge_core::types::{
    AppConfig, Config, CustomUnit, RetentionPreset, RetentionSetting,
};
use ledge_core::worker::{self, Event};
use ledge_core::CollectionKind;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn start_service(app_config: AppConfig) -> (worker::ServiceHandle, Receiver<Event>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        base_path: temp_dir.path().to_path_buf(),
    };
    let (handle, events) = worker::start(config, app_config).unwrap();
    (handle, events, temp_dir)
}

fn wait_for<F>(events: &Receiver<Event>, mut predicate: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .expect("timed out waiting for event");
        let event = events.recv_timeout(remaining).expect("event channel closed");
        if predicate(&event) {
            return event;
        }
    }
}

#[test]
fn test_sweep_removes_items_with_missing_artifacts() {
    let (handle, events, temp) = start_service(AppConfig::default());

    handle.ingest_text(CollectionKind::Clipboard, "will vanish".to_string(), None);
    let event = wait_for(&events, |event| {
        matches!(event, Event::ItemsChanged { items, .. } if !items.is_empty())
    });
    let Event::ItemsChanged { items, .. } = event else {
        unreachable!()
    };

    // Pull the artifact out from under the store.
    let artifact = temp
        .path()
        .join("ClipboardItems")
        .join(items[0].id.to_string())
        .join(&items[0].file_name);
    std::fs::remove_file(&artifact).unwrap();

    handle.sweep(true);

    let swept = wait_for(&events, |event| {
        matches!(event, Event::SweepCompleted { collection, expired }
            if *collection == CollectionKind::Clipboard && *expired == 1)
    });
    let Event::SweepCompleted { expired, .. } = swept else {
        unreachable!()
    };
    assert_eq!(expired, 1);

    let after = wait_for(&events, |event| {
        matches!(event, Event::ItemsChanged { collection, .. }
            if *collection == CollectionKind::Clipboard)
    });
    let Event::ItemsChanged { items, .. } = after else {
        unreachable!()
    };
    assert!(items.is_empty());
}

#[test]
fn test_sweep_keeps_fresh_items() {
    let (handle, events, _temp) = start_service(AppConfig::default());

    handle.ingest_text(CollectionKind::Clipboard, "fresh".to_string(), None);
    let _ = wait_for(&events, |event| {
        matches!(event, Event::ItemsChanged { items, .. } if !items.is_empty())
    });

    handle.sweep(true);
    let swept = wait_for(&events, |event| {
        matches!(event, Event::SweepCompleted { collection, .. }
            if *collection == CollectionKind::Clipboard)
    });
    let Event::SweepCompleted { expired, .. } = swept else {
        unreachable!()
    };
    assert_eq!(expired, 0);
}

#[test]
fn test_zero_custom_retention_does_not_mass_delete() {
    let mut app_config = AppConfig::default();
    app_config.clipboard = RetentionSetting {
        preset: RetentionPreset::Custom,
        custom_value: 0,
        custom_unit: CustomUnit::Hours,
    };
    assert!(!app_config.validate().is_empty());

    let (handle, events, _temp) = start_service(app_config);

    handle.ingest_text(CollectionKind::Clipboard, "kept".to_string(), None);
    let _ = wait_for(&events, |event| {
        matches!(event, Event::ItemsChanged { items, .. } if !items.is_empty())
    });

    handle.sweep(true);
    let swept = wait_for(&events, |event| {
        matches!(event, Event::SweepCompleted { collection, .. }
            if *collection == CollectionKind::Clipboard)
    });
    let Event::SweepCompleted { expired, .. } = swept else {
        unreachable!()
    };
    assert_eq!(expired, 0);
}

#[test]
fn test_set_retention_persists_config() {
    let (handle, events, temp) = start_service(AppConfig::default());

    let setting = RetentionSetting {
        preset: RetentionPreset::OneWeek,
        custom_value: 1,
        custom_unit: CustomUnit::Days,
    };
    handle.set_retention(CollectionKind::Clipboard, setting);

    let _ = wait_for(&events, |event| {
        matches!(event, Event::RetentionChanged { collection, setting }
            if *collection == CollectionKind::Clipboard
                && setting.preset == RetentionPreset::OneWeek)
    });

    let config_path = AppConfig::path(temp.path());
    let reloaded = AppConfig::load(&config_path).unwrap();
    assert_eq!(reloaded.clipboard.preset, RetentionPreset::OneWeek);
    assert_eq!(reloaded.tray.preset, RetentionPreset::default());
}
