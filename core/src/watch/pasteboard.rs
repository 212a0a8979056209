use crate::clipboard::{self, ClipboardContent, ClipboardError};
use crate::core::CollectionKind;
use crate::worker::ServiceHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed poll period. Event-driven pasteboard notification is not
/// available, so capture latency is bounded by this.
pub const PASTEBOARD_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polls the pasteboard and feeds new content into the clipboard
/// collection. Change detection is a blake3 fingerprint of the content; the
/// fingerprint is primed at startup so whatever is already on the
/// pasteboard is not re-ingested.
pub struct PasteboardWatcher {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl PasteboardWatcher {
    pub fn start(handle: ServiceHandle) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let thread = thread::spawn(move || monitor_loop(handle, stop_flag));

        Self {
            stop,
            thread: Some(thread),
        }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PasteboardWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn fingerprint(content: &ClipboardContent) -> blake3::Hash {
    match content {
        ClipboardContent::Text(text) => blake3::hash(text.as_bytes()),
        ClipboardContent::Image(bytes) => blake3::hash(bytes),
        ClipboardContent::Files(paths) => {
            let mut hasher = blake3::Hasher::new();
            for path in paths {
                hasher.update(path.to_string_lossy().as_bytes());
                hasher.update(&[0]);
            }
            hasher.finalize()
        }
    }
}

fn monitor_loop(handle: ServiceHandle, stop: Arc<AtomicBool>) {
    let mut last = clipboard::read_clipboard()
        .ok()
        .map(|content| fingerprint(&content));

    info!(
        poll_interval_secs = PASTEBOARD_POLL_INTERVAL.as_secs(),
        "pasteboard watcher started"
    );

    loop {
        thread::sleep(PASTEBOARD_POLL_INTERVAL);
        if stop.load(Ordering::Relaxed) {
            break;
        }

        match clipboard::read_clipboard() {
            Ok(content) => {
                let current = fingerprint(&content);
                if last.as_ref() == Some(&current) {
                    continue;
                }
                last = Some(current);
                dispatch(&handle, content);
            }
            // An empty pasteboard is not a change.
            Err(ClipboardError::NoContent) => {}
            Err(e) => warn!(error = %e, "pasteboard read failed"),
        }
    }

    info!("pasteboard watcher stopped");
}

fn dispatch(handle: &ServiceHandle, content: ClipboardContent) {
    match content {
        ClipboardContent::Files(paths) => {
            debug!(count = paths.len(), "pasteboard files detected");
            handle.ingest_paths(CollectionKind::Clipboard, paths);
        }
        ClipboardContent::Image(bytes) => {
            debug!(bytes = bytes.len(), "pasteboard image detected");
            handle.ingest_image(CollectionKind::Clipboard, bytes);
        }
        ClipboardContent::Text(text) => {
            debug!(text_len = text.len(), "pasteboard text detected");
            handle.ingest_text(CollectionKind::Clipboard, text, None);
        }
    }
}
