//! Quest Registry
//!
//! Owns the published `QuestStore` and replaces it on reload. A reload builds
//! the complete new store first and then swaps it in with a single write, so
//! readers holding a snapshot never see a half-linked graph.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info};

use super::loader::{ContentCleanup, LoadReport, QuestLoader};
use super::rows::QuestTables;
use super::store::QuestStore;
use crate::config::ContentConfig;
use crate::data::ContentStores;
use crate::db::WorldDatabase;
use crate::error::ContentError;

/// Registry for the current quest graph
pub struct QuestRegistry {
    current: RwLock<Arc<QuestStore>>,
    config: ContentConfig,
}

impl QuestRegistry {
    /// Start with an empty store
    pub fn new(config: ContentConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(QuestStore::empty())),
            config,
        }
    }

    /// The current store. Stays valid across later reloads.
    pub async fn snapshot(&self) -> Arc<QuestStore> {
        Arc::clone(&*self.current.read().await)
    }

    /// Get count of loaded quests
    pub async fn count(&self) -> usize {
        self.current.read().await.len()
    }

    /// Build a store from already fetched tables and publish it
    pub async fn reload_from_tables(
        &self,
        tables: &QuestTables,
        stores: &mut ContentStores,
    ) -> (LoadReport, Vec<ContentCleanup>) {
        let load = QuestLoader::load(&self.config, tables, stores);
        let store = Arc::new(load.store);

        *self.current.write().await = store;
        info!(
            "Published {} quests, {} objectives",
            load.report.quests, load.report.objectives
        );

        (load.report, load.cleanup)
    }

    /// Fetch every quest table, rebuild and publish, then apply auto-clean
    /// deletes to the database.
    pub async fn reload(
        &self,
        db: &WorldDatabase,
        stores: &mut ContentStores,
    ) -> Result<LoadReport, ContentError> {
        let tables = db.fetch_quest_tables().await?;
        let (report, cleanup) = self.reload_from_tables(&tables, stores).await;

        if self.config.auto_clean && !cleanup.is_empty() {
            let deleted = db.apply_cleanup(&cleanup).await?;
            info!("Auto-clean deleted {} invalid quest rows", deleted);
        }

        Ok(report)
    }
}

/// A touch of the reload trigger file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    pub path: PathBuf,
}

/// Watch `trigger` and emit a `ReloadRequest` whenever it is created or
/// modified.
///
/// The parent directory is watched so the file does not need to exist yet.
/// The watcher lives on its own thread until the receiver is dropped.
pub fn watch_reload_trigger(trigger: &Path) -> Result<mpsc::Receiver<ReloadRequest>, ContentError> {
    use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let Some(file_name) = trigger.file_name().map(|name| name.to_os_string()) else {
        return Err(ContentError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("reload trigger {:?} has no file name", trigger),
        )));
    };

    let (tx, rx) = mpsc::channel(8);
    let (notify_tx, notify_rx) = std::sync::mpsc::channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = notify_tx.send(event);
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )?;

    let dir = match trigger.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    info!("Watching {:?} for quest reload requests", trigger);

    std::thread::spawn(move || {
        let _watcher = watcher;

        while let Ok(event) = notify_rx.recv() {
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                continue;
            }

            for path in event.paths {
                if path.file_name() != Some(file_name.as_os_str()) {
                    continue;
                }
                if tx.blocking_send(ReloadRequest { path }).is_err() {
                    error!("Reload request receiver closed, stopping watcher");
                    return;
                }
            }
        }
    });

    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::rows::QuestTemplateRow;
    use std::time::Duration;
    use tempfile::TempDir;

    fn tables(ids: &[u32]) -> QuestTables {
        QuestTables {
            templates: ids
                .iter()
                .map(|&id| QuestTemplateRow {
                    id,
                    log_title: format!("Quest {}", id),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reload_swaps_store() {
        let registry = QuestRegistry::new(ContentConfig::default());
        let mut stores = ContentStores::default();
        assert_eq!(registry.count().await, 0);

        let (report, cleanup) = registry.reload_from_tables(&tables(&[1, 2]), &mut stores).await;
        assert_eq!(report.quests, 2);
        assert!(cleanup.is_empty());

        let before = registry.snapshot().await;
        registry.reload_from_tables(&tables(&[3]), &mut stores).await;

        // the old snapshot is untouched by the reload
        assert_eq!(before.len(), 2);
        assert!(before.get_quest_template(1).is_some());

        let after = registry.snapshot().await;
        assert_eq!(after.len(), 1);
        assert!(after.get_quest_template(1).is_none());
        assert!(after.loaded_at() >= before.loaded_at());
    }

    #[tokio::test]
    async fn test_reload_trigger_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let trigger = temp_dir.path().join("reload-quests");
        let mut rx = watch_reload_trigger(&trigger).unwrap();

        std::fs::write(temp_dir.path().join("unrelated"), "x").unwrap();
        std::fs::write(&trigger, "now").unwrap();

        let request = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.path.file_name(), trigger.file_name());
    }
}
