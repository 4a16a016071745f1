use crate::logging::Logger;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

enum Msg {
    Fs(notify::Result<notify::Event>),
    Stop,
}

/// Keeps the watcher thread alive; dropping it stops watching and joins the
/// thread.
pub struct WatcherHandle {
    stop: Sender<Msg>,
    thread: Option<JoinHandle<()>>,
}

impl WatcherHandle {
    pub fn stop(self) {
        // Drop does the work.
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(Msg::Stop);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Watches the media folder (non-recursive, matching the scanner) and invokes
/// `on_change` when its contents change — typically wired to a reconcile
/// pass. Events are debounced: at most one callback per `debounce` window,
/// and editor temp/lock files are filtered out as noise.
pub fn watch_media_dir(
    dir: &Path,
    debounce: Duration,
    logger: Logger,
    on_change: impl Fn() + Send + 'static,
) -> notify::Result<WatcherHandle> {
    let (tx, rx) = channel();
    let stop_tx = tx.clone();

    let event_tx = tx;
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = event_tx.send(Msg::Fs(res));
        },
        Config::default(),
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    logger.info(&format!("watching media folder: {}", dir.display()));

    let thread = thread::spawn(move || {
        // The watcher must live on this thread for as long as we run.
        let _watcher = watcher;
        let mut last_emit: Option<Instant> = None;

        loop {
            match rx.recv() {
                Ok(Msg::Stop) | Err(_) => break,
                Ok(Msg::Fs(Err(e))) => logger.warn(&format!("watch error: {}", e)),
                Ok(Msg::Fs(Ok(event))) => {
                    let relevant = event.paths.iter().any(|p| {
                        let s = p.to_string_lossy();
                        !s.ends_with(".lock") && !s.contains(".tmp")
                    });
                    if !relevant {
                        continue;
                    }

                    let debounced = last_emit.is_some_and(|t| t.elapsed() < debounce);
                    if debounced {
                        logger.debug(&format!("media folder event within debounce window ({:?})", event.kind));
                        continue;
                    }

                    last_emit = Some(Instant::now());
                    logger.info(&format!("media folder changed ({:?})", event.kind));
                    on_change();
                }
            }
        }
    });

    Ok(WatcherHandle {
        stop: stop_tx,
        thread: Some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    #[test]
    fn change_in_watched_folder_fires_callback() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();

        let handle = watch_media_dir(
            dir.path(),
            Duration::from_millis(0),
            Logger::disabled(),
            move || {
                let _ = tx.send(());
            },
        )
        .unwrap();

        fs::write(dir.path().join("new-song.wav"), b"x").unwrap();

        // Platform watchers can be slow to deliver; give it a few seconds.
        rx.recv_timeout(Duration::from_secs(5))
            .expect("expected a change notification");
        handle.stop();
    }
}
