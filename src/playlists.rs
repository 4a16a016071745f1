use crate::db::Catalog;
use crate::error::{LibraryError, Result};
use crate::logging::Logger;
use crate::models::{Media, Playlist};
use std::sync::{Arc, Mutex, MutexGuard};

/// CRUD over playlists and their membership, on top of the catalog store.
///
/// Enforces name uniqueness (case-sensitive, exact match) and the
/// duplicate-membership guard. Deleting a playlist does NOT remove its
/// membership rows; the membership query filters orphans out on read.
pub struct PlaylistManager {
    catalog: Arc<Mutex<Catalog>>,
    logger: Logger,
}

impl PlaylistManager {
    pub fn new(catalog: Arc<Mutex<Catalog>>, logger: Logger) -> Self {
        Self { catalog, logger }
    }

    /// Every playlist with its current membership.
    pub fn list(&self) -> Result<Vec<Playlist>> {
        let catalog = self.lock_catalog()?;
        let mut playlists = Vec::new();

        for name in catalog.playlist_names()? {
            let media = catalog.playlist_media(&name)?;
            playlists.push(Playlist { name, media });
        }

        Ok(playlists)
    }

    pub fn create(&self, name: &str) -> Result<Playlist> {
        let catalog = self.lock_catalog()?;
        if catalog.playlist_names()?.iter().any(|n| n == name) {
            return Err(LibraryError::DuplicateName(name.to_string()));
        }

        catalog.insert_playlist(name)?;
        self.logger.info(&format!("created playlist \"{}\"", name));
        Ok(Playlist::new(name))
    }

    /// Two-step rename: the store row is updated keyed by the *current* name,
    /// and only then does the in-memory identity change. Renaming a playlist
    /// to its own name is allowed and is a no-op.
    pub fn rename(&self, playlist: &mut Playlist, new_name: &str) -> Result<()> {
        let catalog = self.lock_catalog()?;
        if catalog
            .playlist_names()?
            .iter()
            .any(|n| n == new_name && *n != playlist.name)
        {
            return Err(LibraryError::DuplicateName(new_name.to_string()));
        }

        catalog.rename_playlist(&playlist.name, new_name)?;
        self.logger.info(&format!(
            "renamed playlist \"{}\" to \"{}\"",
            playlist.name, new_name
        ));
        playlist.name = new_name.to_string();
        Ok(())
    }

    /// Removes the playlist row. Its membership rows stay behind (known gap
    /// inherited from the original player — see DESIGN.md).
    pub fn delete(&self, playlist: &Playlist) -> Result<()> {
        self.lock_catalog()?.delete_playlist(&playlist.name)?;
        self.logger
            .info(&format!("deleted playlist \"{}\"", playlist.name));
        Ok(())
    }

    pub fn add_member(&self, playlist: &mut Playlist, media: &Media) -> Result<()> {
        if playlist.media.iter().any(|m| m.path == media.path) {
            return Err(LibraryError::AlreadyMember {
                playlist: playlist.name.clone(),
                path: media.path.clone(),
            });
        }

        self.lock_catalog()?
            .insert_playlist_member(&playlist.name, &media.path)?;
        playlist.media.push(media.clone());
        Ok(())
    }

    fn lock_catalog(&self) -> Result<MutexGuard<'_, Catalog>> {
        self.catalog.lock().map_err(|_| LibraryError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> PlaylistManager {
        let catalog = Arc::new(Mutex::new(Catalog::open_in_memory().unwrap()));
        PlaylistManager::new(catalog, Logger::disabled())
    }

    fn media(path: &str) -> Media {
        Media::new(path, "", "", 60)
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let manager = manager();
        manager.create("Favorites").unwrap();
        match manager.create("Favorites") {
            Err(LibraryError::DuplicateName(name)) => assert_eq!(name, "Favorites"),
            other => panic!("expected DuplicateName, got {:?}", other.map(|p| p.name)),
        }
        // Case-sensitive exact match: different case is a different playlist.
        manager.create("favorites").unwrap();
    }

    #[test]
    fn duplicate_member_is_rejected_and_size_stays_one() {
        let manager = manager();
        let mut playlist = manager.create("Road Trip").unwrap();
        let song = media("/media/song.mp3");

        manager
            .catalog
            .lock()
            .unwrap()
            .insert_media(&song)
            .unwrap();

        manager.add_member(&mut playlist, &song).unwrap();
        assert!(matches!(
            manager.add_member(&mut playlist, &song),
            Err(LibraryError::AlreadyMember { .. })
        ));
        assert_eq!(playlist.media.len(), 1);

        let reloaded = manager.list().unwrap();
        assert_eq!(reloaded[0].media.len(), 1);
    }

    #[test]
    fn rename_collision_keeps_the_old_name() {
        let manager = manager();
        let mut a = manager.create("A").unwrap();
        manager.create("B").unwrap();

        assert!(matches!(
            manager.rename(&mut a, "B"),
            Err(LibraryError::DuplicateName(_))
        ));
        assert_eq!(a.name, "A");

        let mut names: Vec<String> = manager.list().unwrap().into_iter().map(|p| p.name).collect();
        names.sort();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn rename_updates_store_and_identity() {
        let manager = manager();
        let mut playlist = manager.create("Old").unwrap();
        manager.rename(&mut playlist, "New").unwrap();

        assert_eq!(playlist.name, "New");
        let names: Vec<String> = manager.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["New"]);

        // Renaming to the current name is a no-op, not a collision.
        manager.rename(&mut playlist, "New").unwrap();
    }

    #[test]
    fn delete_removes_playlist_from_listing() {
        let manager = manager();
        let mut playlist = manager.create("Mix").unwrap();
        let song = media("/media/track.mp3");
        manager.catalog.lock().unwrap().insert_media(&song).unwrap();
        manager.add_member(&mut playlist, &song).unwrap();

        manager.delete(&playlist).unwrap();
        assert!(manager.list().unwrap().is_empty());
    }
}
