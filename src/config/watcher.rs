//! Configuration file watcher for hot reload.
//!
//! Watches the parent directory and filters by file name, so a config
//! replaced by rename is still seen.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ServerConfig;
use crate::observability::metrics;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ServerConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ServerConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let file_name = self
            .path
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| notify::Error::generic("config path has no file name"))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if affects(&event, &file_name) {
                        tracing::info!(path = ?path, "Config file change detected, reloading");
                        match load_config(&path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                metrics::record_reload("invalid");
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload config, keeping current configuration"
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Whether `event` writes, creates or renames onto the watched file.
fn affects(event: &Event, file_name: &OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name))
}
