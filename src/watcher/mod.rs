use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::channel;
use tracing::{debug, info, warn};
use crate::provider::FruitProvider;
use crate::uri::ContentUri;

/// Suffixes SQLite appends for its side files
const SIDE_FILES: &[&str] = &["-wal", "-journal"];

/// Turns writes to the database file made by other processes into change
/// notifications on the provider's bus.
pub struct DbWatcher {
    db_path: PathBuf,
    provider: Arc<FruitProvider>,
}

impl DbWatcher {
    pub fn new(db_path: PathBuf, provider: Arc<FruitProvider>) -> Self {
        Self { db_path, provider }
    }

    /// Block, watching the database directory until the event channel closes
    pub fn run(&self) -> anyhow::Result<()> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;

        let dir = match self.db_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!("Watching {} for external changes", self.db_path.display());

        while let Ok(res) = rx.recv() {
            let mut touched = self.handle_result(res);
            // Coalesce a burst of events from one transaction into one notification
            while let Ok(res) = rx.try_recv() {
                touched |= self.handle_result(res);
            }
            if touched {
                let notified = self.provider.notify_change(&ContentUri::fruits());
                debug!("Database changed on disk, notified {} subscriber(s)", notified);
            }
        }

        Ok(())
    }

    fn handle_result(&self, res: notify::Result<Event>) -> bool {
        match res {
            Ok(event) => self.is_relevant(&event),
            Err(e) => {
                warn!("watch error: {:?}", e);
                false
            }
        }
    }

    /// True if `event` is a write, create or removal of the database or one
    /// of its side files
    pub fn is_relevant(&self, event: &Event) -> bool {
        matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) && event.paths.iter().any(|p| self.is_database_file(p))
    }

    fn is_database_file(&self, path: &Path) -> bool {
        let (Some(db_name), Some(name)) = (self.db_path.file_name(), path.file_name()) else {
            return false;
        };
        if name == db_name {
            return true;
        }
        SIDE_FILES.iter().any(|suffix| {
            let mut side = OsString::from(db_name);
            side.push(suffix);
            name == side
        })
    }
}
