use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TURNOVER_DIR: &str = ".turnover";
pub const CACHE_DIR: &str = ".turnover/cache";
pub const CONFIG_FILE: &str = ".turnover/config.yaml";

/// Cache key under which the whole roster is stored.
pub const ROSTER_KEY: &str = "turnover_manual_v1";

/// Remote table holding consultant rows.
pub const REMOTE_TABLE: &str = "consultants";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn turnover_dir(root: &Path) -> PathBuf {
    root.join(TURNOVER_DIR)
}

pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// File backing a single cache key.
pub fn cache_entry(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}
