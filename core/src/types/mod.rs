pub(crate) mod config;
pub use config::{
    AppConfig, AppConfigError, Config, CustomUnit, RetentionPreset, RetentionSetting, SweepConfig,
};

pub(crate) mod item;
pub use item::{Item, ItemId, ItemKind};
