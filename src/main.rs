use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use quest_content::config::WorldConfig;
use quest_content::db::WorldDatabase;
use quest_content::error::ContentError;
use quest_content::quest::{watch_reload_trigger, QuestRegistry};

#[tokio::main]
async fn main() -> Result<(), ContentError> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = WorldConfig::load(&config_path);

    // Initialize logging; RUST_LOG wins over the config file
    let filter = config
        .as_ref()
        .map(|c| c.logging.filter.clone())
        .unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = config?;
    info!("Using config {:?}", config_path);

    let db = WorldDatabase::connect(&config.database).await?;
    let mut stores = db.load_content_stores().await?;

    let registry = QuestRegistry::new(config.content.clone());
    let report = registry.reload(&db, &mut stores).await?;
    info!(
        "Quest content ready: {} quests, {} objectives, {} auto-push, {} exclusive groups, \
         {} relations, {} area trigger relations, {} rows dropped",
        report.quests,
        report.objectives,
        report.auto_push,
        report.exclusive_groups,
        report.relations,
        report.area_trigger_relations,
        report.dropped_rows
    );

    let mut reload_requests = match &config.content.reload_trigger {
        Some(path) => Some(watch_reload_trigger(path)?),
        None => None,
    };

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Shutting down");
                break;
            }
            request = async {
                match reload_requests.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                let Some(request) = request else {
                    warn!("Reload watcher stopped");
                    reload_requests = None;
                    continue;
                };

                info!("Reload requested via {:?}", request.path);
                match registry.reload(&db, &mut stores).await {
                    Ok(report) => info!(
                        "Reloaded {} quests ({} rows dropped)",
                        report.quests, report.dropped_rows
                    ),
                    Err(e) => error!("Quest reload failed, keeping previous quests: {}", e),
                }
            }
        }
    }

    Ok(())
}
