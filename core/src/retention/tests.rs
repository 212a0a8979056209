use super::*;
use crate::types::{CustomUnit, ItemKind, RetentionPreset};
use std::collections::BTreeSet;

fn make_item(age_secs: u64, now: SystemTime) -> Item {
    Item {
        id: crate::types::ItemId::generate(),
        file_name: "a.txt".to_string(),
        size: 0,
        copied_at: now - Duration::from_secs(age_secs),
        kind: ItemKind::File,
        preview_text: String::new(),
        preview_image: None,
        is_pinned: false,
        labels: BTreeSet::new(),
        source_app: None,
        device: None,
    }
}

fn setting(preset: RetentionPreset) -> RetentionSetting {
    RetentionSetting {
        preset,
        ..RetentionSetting::default()
    }
}

mod effective_expiry {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(
            setting(RetentionPreset::OneHour).effective_expiry(),
            Some(Duration::from_secs(3600))
        );
        assert_eq!(
            setting(RetentionPreset::OneDay).effective_expiry(),
            Some(Duration::from_secs(86_400))
        );
        assert_eq!(
            setting(RetentionPreset::OneWeek).effective_expiry(),
            Some(Duration::from_secs(604_800))
        );
        assert_eq!(setting(RetentionPreset::Forever).effective_expiry(), None);
    }

    #[test]
    fn test_custom_units() {
        let custom = |value, unit| RetentionSetting {
            preset: RetentionPreset::Custom,
            custom_value: value,
            custom_unit: unit,
        };

        assert_eq!(
            custom(2, CustomUnit::Hours).effective_expiry(),
            Some(Duration::from_secs(2 * 3600))
        );
        assert_eq!(
            custom(1, CustomUnit::Months).effective_expiry(),
            Some(Duration::from_secs(30 * 86_400))
        );
        assert_eq!(
            custom(1, CustomUnit::Years).effective_expiry(),
            Some(Duration::from_secs(365 * 86_400))
        );
    }

    #[test]
    fn test_zero_custom_value_means_never() {
        let zeroed = RetentionSetting {
            preset: RetentionPreset::Custom,
            custom_value: 0,
            custom_unit: CustomUnit::Days,
        };
        assert_eq!(zeroed.effective_expiry(), None);
    }
}

mod is_expired {
    use super::*;

    #[test]
    fn test_age_past_expiry() {
        let now = SystemTime::now();
        let item = make_item(7200, now);

        assert!(is_expired(&item, Some(Duration::from_secs(3600)), true, now));
        assert!(!is_expired(&item, Some(Duration::from_secs(86_400)), true, now));
    }

    #[test]
    fn test_missing_artifact_always_expires() {
        let now = SystemTime::now();
        let item = make_item(1, now);

        assert!(is_expired(&item, Some(Duration::from_secs(3600)), false, now));
        // even with "never expire"
        assert!(is_expired(&item, None, false, now));
    }

    #[test]
    fn test_never_expiry_keeps_old_items() {
        let now = SystemTime::now();
        let item = make_item(10 * 365 * 86_400, now);

        assert!(!is_expired(&item, None, true, now));
    }

    #[test]
    fn test_future_copied_at_not_expired() {
        let now = SystemTime::now();
        let mut item = make_item(0, now);
        item.copied_at = now + Duration::from_secs(3600);

        assert!(!is_expired(&item, Some(Duration::from_secs(1)), true, now));
    }
}

mod sweep_candidates {
    use super::*;

    #[test]
    fn test_filters_expired_only() {
        let now = SystemTime::now();
        let fresh = make_item(10, now);
        let stale = make_item(2 * 86_400, now);
        let stale_id = stale.id.clone();
        let items = vec![fresh, stale];

        let candidates = sweep_candidates(&items, &setting(RetentionPreset::OneDay), now, |_| true);
        assert_eq!(candidates, vec![stale_id]);
    }

    #[test]
    fn test_zero_custom_duration_flags_missing_artifacts_only() {
        let now = SystemTime::now();
        let old_with_artifact = make_item(100 * 86_400, now);
        let gone = make_item(5, now);
        let gone_id = gone.id.clone();
        let items = vec![old_with_artifact, gone];

        let zeroed = RetentionSetting {
            preset: RetentionPreset::Custom,
            custom_value: 0,
            custom_unit: CustomUnit::Days,
        };

        let candidates = sweep_candidates(&items, &zeroed, now, |item| item.id != gone_id);
        assert_eq!(candidates, vec![gone_id]);
    }

    #[test]
    fn test_forever_still_flags_missing_artifacts() {
        let now = SystemTime::now();
        let gone = make_item(5, now);
        let gone_id = gone.id.clone();
        let items = vec![gone];

        let candidates = sweep_candidates(&items, &setting(RetentionPreset::Forever), now, |_| false);
        assert_eq!(candidates, vec![gone_id]);
    }
}
