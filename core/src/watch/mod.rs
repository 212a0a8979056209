//! External change watchers: pasteboard polling and tray-directory events.
//!
//! Both dispatch through a [`ServiceHandle`](crate::worker::ServiceHandle);
//! reconciliation itself runs on the worker thread.

mod pasteboard;
mod tray;

pub use pasteboard::{PasteboardWatcher, PASTEBOARD_POLL_INTERVAL};
pub use tray::TrayWatcher;
