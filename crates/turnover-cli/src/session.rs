use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use turnover_core::cache::FileCache;
use turnover_core::config::Config;
use turnover_core::paths;
use turnover_core::remote::{ReadySignal, RemoteLink, RestStore};
use turnover_core::sync::{BootstrapOutcome, Reconciler};

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub json: bool,
    pub offline: bool,
}

/// A loaded roster, bootstrapped from the remote store when one is reachable.
pub struct Session {
    pub reconciler: Reconciler,
    pub outcome: BootstrapOutcome,
    pub config: Config,
}

pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    let config = Config::load(root)
        .context("failed to load .turnover/config.yaml")?
        .with_env();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

pub async fn open(root: &Path, offline: bool) -> anyhow::Result<Session> {
    let config = load_config(root)?;

    let link = if offline || !config.remote.is_configured() {
        None
    } else {
        let store = RestStore::new(&config.remote).context("failed to set up remote store")?;
        Some(RemoteLink::new(Arc::new(store), ReadySignal::resolved(true)))
    };

    let cache = FileCache::new(paths::cache_dir(root));
    debug!(dir = %cache.dir().display(), "opening local cache");
    let mut reconciler = Reconciler::new(Box::new(cache), link, config.sync.clone());
    reconciler.load();
    let outcome = reconciler.bootstrap_remote().await;

    Ok(Session {
        reconciler,
        outcome,
        config,
    })
}

/// Convert a 1-based command-line position to a roster index.
pub fn index_of(position: usize) -> anyhow::Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("positions start at 1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn positions_are_one_based() {
        assert_eq!(index_of(1).unwrap(), 0);
        assert_eq!(index_of(11).unwrap(), 10);
        assert!(index_of(0).is_err());
    }

    #[tokio::test]
    async fn offline_open_seeds_roster() {
        let dir = TempDir::new().unwrap();
        let session = open(dir.path(), true).await.unwrap();
        assert_eq!(session.outcome, BootstrapOutcome::Offline);
        assert_eq!(session.reconciler.roster().len(), 10);
    }
}
