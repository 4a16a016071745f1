use crate::error::Result;
use lofty::probe::Probe;
use std::fs;
use std::path::{Path, PathBuf};

/// Containers classified as video. The MP4 family sniffs as audio in lofty,
/// so the container table is consulted before the audio probe.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "mkv", "avi", "webm", "wmv", "flv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    /// Readable, but not a media file.
    Ignored,
    /// The file could not be opened or probed.
    Unreadable,
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// Lists the media folder (direct children only, never recursive) and
/// classifies every regular file. Pure read: nothing is written or cached.
///
/// Entries that vanish mid-scan are skipped. Scan order is whatever the
/// filesystem returns; callers must not rely on it. A folder that cannot be
/// listed at all is an error — the caller decides whether that aborts the
/// pass.
pub fn scan_dir(dir: &Path) -> Result<impl Iterator<Item = ScannedFile>> {
    let entries = fs::read_dir(dir)?;

    Ok(entries.filter_map(|entry| {
        let entry = entry.ok()?;
        if !entry.file_type().ok()?.is_file() {
            return None;
        }
        let path = entry.path();
        let kind = classify(&path);
        Some(ScannedFile { path, kind })
    }))
}

/// Classification by content sniffing. Audio is identified from magic bytes
/// via lofty's probe; video by container extension; anything else is noise.
fn classify(path: &Path) -> MediaKind {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    if let Some(ext) = extension {
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            return MediaKind::Video;
        }
    }

    let probe = match Probe::open(path) {
        Ok(probe) => probe,
        Err(_) => return MediaKind::Unreadable,
    };
    match probe.guess_file_type() {
        Ok(probe) if probe.file_type().is_some() => MediaKind::Audio,
        Ok(_) => MediaKind::Ignored,
        Err(_) => MediaKind::Unreadable,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    /// Minimal valid PCM WAV: 8 kHz mono 16-bit, `seconds` of silence.
    pub(crate) fn write_wav(path: &Path, seconds: u32) {
        let byte_rate: u32 = 8000 * 2;
        let data_len = byte_rate * seconds;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&8000u32.to_le_bytes());
        bytes.extend_from_slice(&byte_rate.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(bytes.len() + data_len as usize, 0);

        File::create(path).unwrap().write_all(&bytes).unwrap();
    }

    #[test]
    fn classifies_direct_children() {
        let dir = TempDir::new().unwrap();
        write_wav(&dir.path().join("song.wav"), 2);
        fs::write(dir.path().join("clip.mp4"), b"not sniffed, extension wins").unwrap();
        fs::write(dir.path().join("notes.txt"), b"plain text").unwrap();

        let mut kinds: Vec<(String, MediaKind)> = scan_dir(dir.path())
            .unwrap()
            .map(|f| (f.path.file_name().unwrap().to_string_lossy().into_owned(), f.kind))
            .collect();
        kinds.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(
            kinds,
            vec![
                ("clip.mp4".to_string(), MediaKind::Video),
                ("notes.txt".to_string(), MediaKind::Ignored),
                ("song.wav".to_string(), MediaKind::Audio),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_flagged() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locked.wav");
        write_wav(&path, 1);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to observe in that case.
        if File::open(&path).is_ok() {
            return;
        }

        let scanned: Vec<ScannedFile> = scan_dir(dir.path()).unwrap().collect();
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].kind, MediaKind::Unreadable);
    }

    #[test]
    fn subdirectories_are_not_entered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_wav(&dir.path().join("nested").join("hidden.wav"), 1);

        assert_eq!(scan_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("no-such-folder");
        assert!(scan_dir(&gone).is_err());
    }
}
