use crate::worker::ServiceHandle;
use notify::{recommended_watcher, RecommendedWatcher, RecursiveMode, Result as NotifyResult, Watcher};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches the tray directory for out-of-band changes and asks the worker
/// to reconcile. Events are debounced: a burst of filesystem activity
/// produces one reconciliation pass.
pub struct TrayWatcher {
    watcher: Option<RecommendedWatcher>,
    thread: Option<thread::JoinHandle<()>>,
}

impl TrayWatcher {
    pub fn start(root: PathBuf, handle: ServiceHandle) -> NotifyResult<Self> {
        let (watch_tx, watch_rx) = channel();

        let mut watcher = recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = watch_tx.send(res);
        })?;
        watcher.watch(&root, RecursiveMode::NonRecursive)?;

        info!(path = %root.display(), "tray watcher started");

        let thread = thread::spawn(move || watch_loop(watch_rx, handle));

        Ok(Self {
            watcher: Some(watcher),
            thread: Some(thread),
        })
    }
}

impl Drop for TrayWatcher {
    fn drop(&mut self) {
        // Dropping the watcher closes the event channel, which ends the loop.
        self.watcher = None;
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn watch_loop(rx: Receiver<notify::Result<notify::Event>>, handle: ServiceHandle) {
    let debounce_active = Arc::new(Mutex::new(false));

    loop {
        match rx.recv() {
            Ok(Ok(event)) => {
                let is_relevant = matches!(
                    event.kind,
                    notify::EventKind::Create(_)
                        | notify::EventKind::Modify(_)
                        | notify::EventKind::Remove(_)
                );

                let touches_tracked_file = event.paths.iter().any(|path: &PathBuf| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .map(|name| name != ".DS_Store")
                        .unwrap_or(false)
                });

                if is_relevant && touches_tracked_file {
                    let mut debounce = debounce_active.lock().unwrap();
                    if !*debounce {
                        *debounce = true;
                        drop(debounce);

                        let handle_clone = handle.clone();
                        let debounce_flag = Arc::clone(&debounce_active);

                        thread::spawn(move || {
                            thread::sleep(DEBOUNCE);
                            handle_clone.reconcile_tray();
                            let mut flag = debounce_flag.lock().unwrap();
                            *flag = false;
                        });
                    }
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "tray watcher error");
            }
            Err(_) => {
                info!("tray watcher shutting down");
                break;
            }
        }
    }
}
