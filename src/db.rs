use crate::error::Result;
use crate::models::Media;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::Duration;

/// A busy catalog file fails the statement instead of blocking forever.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const DB_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS media (
        path TEXT PRIMARY KEY,
        title TEXT NOT NULL DEFAULT '',
        artist TEXT NOT NULL DEFAULT '',
        length INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS playlists (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS playlist_media (
        playlist_name TEXT NOT NULL,
        media_path TEXT NOT NULL,
        PRIMARY KEY (playlist_name, media_path)
    );
"#;

/// The catalog store: one long-lived SQLite connection and the fixed set of
/// statements the library layer needs. Every statement is parameterized, so
/// quotes in file or playlist names can never corrupt a statement.
///
/// The connection is meant to be opened once per process and shared behind a
/// `Mutex` by the reconciler and playlist manager. No transactional atomicity
/// is promised across calls; callers rely on path/name uniqueness instead.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(DB_SCHEMA)?;
        Ok(Self { conn })
    }

    /// In-memory catalog, handy for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(DB_SCHEMA)?;
        Ok(Self { conn })
    }

    // ─── media ───────────────────────────────────────────────────

    pub fn all_media(&self) -> Result<Vec<Media>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, title, artist, length FROM media")?;
        let media = stmt
            .query_map([], media_from_row)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(media)
    }

    pub fn insert_media(&self, media: &Media) -> Result<()> {
        self.conn.execute(
            "INSERT INTO media (path, title, artist, length) VALUES (?1, ?2, ?3, ?4)",
            params![media.path, media.title, media.artist, media.length],
        )?;
        Ok(())
    }

    /// Deleting a path that is not present is a no-op.
    pub fn delete_media(&self, path: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM media WHERE path = ?1", params![path])?;
        Ok(())
    }

    /// Targeted update used by the deferred video-duration probe.
    pub fn update_media_length(&self, path: &str, length: u32) -> Result<()> {
        self.conn.execute(
            "UPDATE media SET length = ?1 WHERE path = ?2",
            params![length, path],
        )?;
        Ok(())
    }

    pub fn media_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))?;
        Ok(count)
    }

    // ─── playlists ───────────────────────────────────────────────

    pub fn playlist_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM playlists")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, rusqlite::Error>>()?;
        Ok(names)
    }

    /// Media belonging to a playlist, via the membership subquery. Membership
    /// rows whose media was removed from the catalog simply don't match and
    /// are filtered out here.
    pub fn playlist_media(&self, name: &str) -> Result<Vec<Media>> {
        let mut stmt = self.conn.prepare(
            "SELECT path, title, artist, length FROM media
             WHERE path IN (SELECT media_path FROM playlist_media WHERE playlist_name = ?1)",
        )?;
        let media = stmt
            .query_map(params![name], media_from_row)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(media)
    }

    pub fn insert_playlist(&self, name: &str) -> Result<()> {
        self.conn
            .execute("INSERT INTO playlists (name) VALUES (?1)", params![name])?;
        Ok(())
    }

    /// The row is located by the *old* name; the caller updates its in-memory
    /// identity only after this succeeds.
    pub fn rename_playlist(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE playlists SET name = ?1 WHERE name = ?2",
            params![new_name, old_name],
        )?;
        Ok(())
    }

    /// Removes the playlist row only. Membership rows are left behind; see
    /// DESIGN.md on the (deliberate) lack of cascading deletes.
    pub fn delete_playlist(&self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM playlists WHERE name = ?1", params![name])?;
        Ok(())
    }

    pub fn insert_playlist_member(&self, name: &str, path: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO playlist_media (playlist_name, media_path) VALUES (?1, ?2)",
            params![name, path],
        )?;
        Ok(())
    }
}

/// Shared row mapper. NULL title/artist columns (possible in catalogs written
/// by older versions of the player) are normalized to the empty string here
/// so the marker never leaks upward.
fn media_from_row(row: &Row) -> std::result::Result<Media, rusqlite::Error> {
    Ok(Media {
        path: row.get(0)?,
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        artist: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        length: row.get(3)?,
    })
}
