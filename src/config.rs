use crate::error::Result;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Where the library lives on disk and how eagerly the watcher fires.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Flat folder of media files, resolved to an absolute path at startup.
    pub media_dir: PathBuf,
    /// SQLite catalog file.
    pub catalog_path: PathBuf,
    /// Rotating log files; defaults to a `logs` folder next to the catalog.
    pub log_dir: PathBuf,
    /// Minimum gap between watcher-triggered reconcile passes.
    pub watch_debounce: Duration,
}

impl LibraryConfig {
    pub fn new(media_dir: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        let catalog_path: PathBuf = catalog_path.into();
        let log_dir = catalog_path
            .parent()
            .map(|parent| parent.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));

        Self {
            media_dir: media_dir.into(),
            catalog_path,
            log_dir,
            watch_debounce: Duration::from_secs(5),
        }
    }

    /// Conventional locations: `./media` (absolute) for the files, the
    /// per-user data directory for catalog and logs. Creates the data
    /// directories if needed.
    pub fn default_paths() -> Result<Self> {
        let media_dir = std::env::current_dir()?.join("media");

        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spinwheel");
        fs::create_dir_all(&data_dir)?;

        Ok(Self {
            media_dir,
            catalog_path: data_dir.join("catalog.db"),
            log_dir: data_dir.join("logs"),
            watch_debounce: Duration::from_secs(5),
        })
    }
}
