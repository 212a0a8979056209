//! Expiry policy: decides which items a sweep may remove.
//!
//! The policy is a pure filter over a store snapshot; scheduling is the
//! embedding app's responsibility.

use crate::types::{Item, ItemId, RetentionSetting};
use std::time::{Duration, SystemTime};

/// An item is expired iff its backing artifact is gone (always wins, as a
/// safety net against orphaned metadata), or a finite expiry is configured
/// and the item's age exceeds it. With `expiry == None` items never expire
/// by age.
pub fn is_expired(
    item: &Item,
    expiry: Option<Duration>,
    artifact_exists: bool,
    now: SystemTime,
) -> bool {
    if !artifact_exists {
        return true;
    }

    let Some(expiry) = expiry else {
        return false;
    };

    // A copied_at in the future means clock skew, not old age.
    match now.duration_since(item.copied_at) {
        Ok(age) => age > expiry,
        Err(_) => false,
    }
}

/// Ids of items the sweep should remove, given the configured setting and
/// an artifact-existence probe. Pure; does not mutate anything.
pub fn sweep_candidates<'a, I>(
    items: I,
    setting: &RetentionSetting,
    now: SystemTime,
    artifact_exists: impl Fn(&Item) -> bool,
) -> Vec<ItemId>
where
    I: IntoIterator<Item = &'a Item>,
{
    let expiry = setting.effective_expiry();

    items
        .into_iter()
        .filter(|item| is_expired(item, expiry, artifact_exists(item), now))
        .map(|item| item.id.clone())
        .collect()
}

#[cfg(test)]
mod tests;
