use std::path::PathBuf;

use thiserror::Error;

/// Failures of the content pipeline's infrastructure.
///
/// Bad content never ends up here: broken references and malformed rows are
/// logged and corrected during load. These variants cover the database, the
/// config file and the reload watcher.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("file watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// Returned by lookups that require the quest to exist.
    #[error("quest {0} does not exist")]
    UnknownQuest(u32),
}
