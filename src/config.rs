// ⚙️ Configuration - where the tracker keeps its data
//
// Resolution order: explicit value (CLI flag / env, handled by clap),
// then the platform data directory, then the working directory.

use crate::store::STORAGE_KEY;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "cert-tracker";
pub const DB_FILE_NAME: &str = "tracker.db";
pub const LOG_FILE_NAME: &str = "cert-tracker.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub log_path: PathBuf,
}

impl Config {
    pub fn resolve(db_path: Option<PathBuf>, storage_key: Option<String>) -> Self {
        let db_path = db_path.unwrap_or_else(default_db_path);
        let log_path = log_path_for(&db_path);

        Config {
            db_path,
            storage_key: storage_key
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| STORAGE_KEY.to_string()),
            log_path,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

/// `<data dir>/cert-tracker/tracker.db`, or `./tracker.db` without a data dir
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

fn log_path_for(db_path: &Path) -> PathBuf {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(LOG_FILE_NAME),
        _ => PathBuf::from(LOG_FILE_NAME),
    }
}
