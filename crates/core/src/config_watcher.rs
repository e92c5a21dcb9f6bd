use anyhow::{anyhow, Context, Result};
use notify::{Event, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tokio::sync::watch;

/// How often the blocking loop checks whether anyone is still listening.
const RECEIVER_POLL: Duration = Duration::from_millis(250);

/// Re-reads a file whenever it changes and broadcasts the freshly loaded value.
///
/// Used for the application config as well as for plan files being edited
/// while their schedule is displayed.
pub struct ConfigWatcher<T> {
    tx: watch::Sender<T>,
}

impl<T> ConfigWatcher<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a new watcher with an initial value.
    ///
    /// Returns a tuple of the watcher and a receiver for updates.
    #[must_use]
    pub fn new(initial: T) -> (Self, watch::Receiver<T>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx }, rx)
    }

    /// Watches `path` and re-runs `load` whenever it is modified or replaced,
    /// publishing the result. Reload failures are logged and the previous
    /// value is kept.
    ///
    /// The parent directory is watched so that editors which save by renaming
    /// a temporary file over `path` keep triggering reloads.
    ///
    /// # Errors
    ///
    /// Returns an error if file watching cannot be initiated or if the watcher task fails.
    pub async fn watch<F>(&self, path: impl AsRef<Path>, load: F) -> Result<()>
    where
        F: Fn(&Path) -> Result<T> + Send + 'static,
    {
        let tx = self.tx.clone();
        let path: PathBuf = std::fs::canonicalize(path.as_ref())
            .with_context(|| format!("Cannot watch {}", path.as_ref().display()))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("{} has no parent directory", path.display()))?;

        tokio::task::spawn_blocking(move || {
            let (notify_tx, notify_rx) = std::sync::mpsc::channel();

            let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            })?;

            watcher.watch(&dir, RecursiveMode::NonRecursive)?;

            loop {
                let event = match notify_rx.recv_timeout(RECEIVER_POLL) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => {
                        if tx.is_closed() {
                            tracing::debug!("No receivers left, stopping watcher");
                            break;
                        }
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                };

                let replaced = event.kind.is_modify() || event.kind.is_create();
                if replaced && event.paths.iter().any(|p| p == &path) {
                    tracing::info!(path = %path.display(), "File changed, reloading...");
                    match load(&path) {
                        Ok(value) => {
                            if tx.send(value).is_err() {
                                tracing::debug!("No receivers left, stopping watcher");
                                break;
                            }
                            tracing::info!("Reloaded successfully");
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload {}: {:#}", path.display(), e);
                        }
                    }
                }
            }

            Ok::<_, anyhow::Error>(())
        })
        .await??;

        Ok(())
    }
}
