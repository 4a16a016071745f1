use crate::db::Catalog;
use crate::error::{LibraryError, Result};
use crate::logging::Logger;
use crate::models::Media;
use crate::probe::{self, DurationProbe};
use crate::scanner::{scan_dir, MediaKind};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

/// Converges the catalog with the current contents of the media folder.
///
/// A pass is a pure set difference by path: rows whose file is gone are
/// deleted, files with no row are inserted, and everything else is left
/// untouched — tag edits on an already-cataloged path never update the row.
/// Freshly inserted videos carry a provisional length of 0 until the
/// background duration probe completes its targeted update.
pub struct Reconciler {
    catalog: Arc<Mutex<Catalog>>,
    media_dir: PathBuf,
    probe: Arc<dyn DurationProbe>,
    logger: Logger,
    probe_worker: Option<JoinHandle<()>>,
}

impl Reconciler {
    /// A relative `media_dir` is resolved against the working directory at
    /// construction. Cataloged paths are compared byte-for-byte against what
    /// the scanner produces under the resolved folder, so a folder must keep
    /// one spelling for path identity to hold across passes.
    pub fn new(
        catalog: Arc<Mutex<Catalog>>,
        media_dir: impl Into<PathBuf>,
        probe: Arc<dyn DurationProbe>,
        logger: Logger,
    ) -> Self {
        let media_dir = media_dir.into();
        let media_dir = if media_dir.is_absolute() {
            media_dir
        } else {
            match env::current_dir() {
                Ok(cwd) => cwd.join(&media_dir),
                Err(_) => media_dir,
            }
        };

        Self {
            catalog,
            media_dir,
            probe,
            logger,
            probe_worker: None,
        }
    }

    /// Runs one reconcile pass and returns the converged media set.
    ///
    /// Store failures abort the pass; per-file scan failures only drop that
    /// file from the candidate set. An empty media folder wipes the catalog —
    /// a transiently unmounted volume looks identical to "everything was
    /// deleted", which is inherited behavior (see DESIGN.md).
    pub fn reconcile(&mut self) -> Result<Vec<Media>> {
        let persisted = self.lock_catalog()?.all_media()?;
        let (local, videos) = self.collect_local()?;

        if local.is_empty() && !persisted.is_empty() {
            let catalog = self.lock_catalog()?;
            for media in &persisted {
                catalog.delete_media(&media.path)?;
            }
            self.logger.info(&format!(
                "media folder is empty; removed all {} catalog entries",
                persisted.len()
            ));
            return Ok(Vec::new());
        }

        let local_paths: HashSet<&str> = local.iter().map(|m| m.path.as_str()).collect();
        let persisted_paths: HashSet<&str> = persisted.iter().map(|m| m.path.as_str()).collect();

        let mut merged = Vec::new();
        let mut inserted = 0usize;
        let mut deleted = 0usize;
        {
            let catalog = self.lock_catalog()?;

            // Deletes first, then inserts. Order within each phase carries no
            // meaning; the diff guarantees each statement targets a distinct
            // path, so re-running a pass with no filesystem changes is a no-op.
            for media in &persisted {
                if local_paths.contains(media.path.as_str()) {
                    merged.push(media.clone());
                } else {
                    catalog.delete_media(&media.path)?;
                    deleted += 1;
                }
            }

            for media in &local {
                if !persisted_paths.contains(media.path.as_str()) {
                    catalog.insert_media(media)?;
                    merged.push(media.clone());
                    inserted += 1;
                }
            }
        }

        if inserted > 0 || deleted > 0 {
            self.logger.info(&format!(
                "reconciled media folder: {} inserted, {} deleted, {} total",
                inserted,
                deleted,
                merged.len()
            ));
        }

        let pending: Vec<PathBuf> = videos
            .into_iter()
            .filter(|path| {
                let key = path.to_string_lossy();
                merged.iter().any(|m| m.path == key && m.length == 0)
            })
            .collect();
        self.spawn_duration_worker(pending);

        Ok(merged)
    }

    /// Blocks until the deferred duration updates from the most recent pass
    /// have been applied. Callers that can live with provisional video
    /// durations never need this.
    pub fn wait_for_probes(&mut self) {
        if let Some(handle) = self.probe_worker.take() {
            let _ = handle.join();
        }
    }

    fn lock_catalog(&self) -> Result<MutexGuard<'_, Catalog>> {
        self.catalog.lock().map_err(|_| LibraryError::Poisoned)
    }

    /// Candidate set from the media folder. Returns the media plus the paths
    /// of every video seen, so the caller can schedule duration probes.
    fn collect_local(&self) -> Result<(Vec<Media>, Vec<PathBuf>)> {
        let mut local = Vec::new();
        let mut videos = Vec::new();

        for file in scan_dir(&self.media_dir)? {
            match probe::read_media(&file) {
                Ok(media) => {
                    if file.kind == MediaKind::Video {
                        videos.push(file.path.clone());
                    }
                    local.push(media);
                }
                // Classification and tag failures are local to the file: it
                // is simply absent from the candidate set this pass.
                Err(e) => self.logger.debug(&format!("skipping: {}", e)),
            }
        }

        Ok((local, videos))
    }

    fn spawn_duration_worker(&mut self, pending: Vec<PathBuf>) {
        if pending.is_empty() {
            return;
        }

        let catalog = Arc::clone(&self.catalog);
        let probe = Arc::clone(&self.probe);
        let logger = self.logger.clone();

        // Fire-and-forget relative to reconcile(); the handle is only kept so
        // wait_for_probes() can offer determinism to callers that want it.
        self.probe_worker = Some(thread::spawn(move || {
            for path in pending {
                let Some(length) = probe.probe(&path) else {
                    continue;
                };
                let key = path.to_string_lossy();

                match catalog.lock() {
                    Ok(catalog) => {
                        if let Err(e) = catalog.update_media_length(&key, length) {
                            logger.error(&format!(
                                "deferred duration update failed for {}: {}",
                                key, e
                            ));
                        }
                    }
                    Err(_) => {
                        logger.error("catalog lock poisoned; dropping deferred duration updates");
                        return;
                    }
                }
            }
        }));
    }
}
