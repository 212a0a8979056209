use serde::{Deserialize, Serialize};
use std::time::Duration;

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// How long items are kept before the sweep may remove them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPreset {
    OneHour,
    #[default]
    OneDay,
    TwoDays,
    ThreeDays,
    OneWeek,
    /// Items never expire by age; only missing-artifact items are swept.
    Forever,
    /// Use `custom_value` x `custom_unit`.
    Custom,
}

/// Unit for custom retention durations. Calendar-naive: a month is 30 days
/// and a year is 365, always.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomUnit {
    Hours,
    #[default]
    Days,
    Weeks,
    Months,
    Years,
}

impl CustomUnit {
    pub fn seconds(&self) -> u64 {
        match self {
            CustomUnit::Hours => HOUR,
            CustomUnit::Days => DAY,
            CustomUnit::Weeks => WEEK,
            CustomUnit::Months => 30 * DAY,
            CustomUnit::Years => 365 * DAY,
        }
    }
}

/// Per-collection retention configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RetentionSetting {
    #[serde(default)]
    pub preset: RetentionPreset,
    #[serde(default = "default_custom_value")]
    pub custom_value: u32,
    #[serde(default)]
    pub custom_unit: CustomUnit,
}

impl Default for RetentionSetting {
    fn default() -> Self {
        Self {
            preset: RetentionPreset::default(),
            custom_value: default_custom_value(),
            custom_unit: CustomUnit::default(),
        }
    }
}

fn default_custom_value() -> u32 {
    1
}

impl RetentionSetting {
    /// Resolves the configured duration. `None` means items never expire by
    /// age. A custom value of zero resolves to `None` rather than "expire
    /// everything": a misconfigured duration must not trigger mass deletion.
    pub fn effective_expiry(&self) -> Option<Duration> {
        let secs = match self.preset {
            RetentionPreset::OneHour => HOUR,
            RetentionPreset::OneDay => DAY,
            RetentionPreset::TwoDays => 2 * DAY,
            RetentionPreset::ThreeDays => 3 * DAY,
            RetentionPreset::OneWeek => WEEK,
            RetentionPreset::Forever => return None,
            RetentionPreset::Custom => u64::from(self.custom_value) * self.custom_unit.seconds(),
        };

        if secs == 0 {
            return None;
        }
        Some(Duration::from_secs(secs))
    }
}
