pub mod classify;
pub mod clipboard;
pub mod core;
pub mod retention;
pub mod types;
pub mod watch;
pub mod worker;

pub use crate::core::{Collection, CollectionKind, IngestFailure};
pub use worker::{Event, ServiceHandle};
