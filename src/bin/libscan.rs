use anyhow::Result;
use spinwheel::{Catalog, LibraryConfig, Logger, NoProbe, PlaylistManager, Reconciler};
use std::env;
use std::sync::{Arc, Mutex};

/// Runs one reconcile pass against the catalog and prints the library.
///
/// Usage: libscan [media_dir] [catalog_path]
fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut config = LibraryConfig::default_paths()?;
    if let Some(dir) = args.get(1) {
        config.media_dir = dir.into();
    }
    if let Some(path) = args.get(2) {
        config.catalog_path = path.into();
    }

    println!("Media folder: {}", config.media_dir.display());
    println!("Catalog:      {}", config.catalog_path.display());

    let logger = Logger::new(config.log_dir.clone());
    let catalog = Arc::new(Mutex::new(Catalog::open(&config.catalog_path)?));

    // No playback engine here, so video durations stay provisional.
    let mut reconciler = Reconciler::new(
        Arc::clone(&catalog),
        &config.media_dir,
        Arc::new(NoProbe),
        logger.clone(),
    );
    let media = reconciler.reconcile()?;

    println!("\n{} media file(s):", media.len());
    for m in &media {
        let title = if m.title.is_empty() { "(untitled)" } else { &m.title };
        println!("  {}  {}  —  {}", m.duration(), title, m.path);
    }

    let manager = PlaylistManager::new(catalog, logger);
    let playlists = manager.list()?;
    println!("\n{} playlist(s):", playlists.len());
    for playlist in &playlists {
        println!("  {} ({} entries)", playlist.name, playlist.media.len());
    }

    Ok(())
}
