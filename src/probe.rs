use crate::error::{LibraryError, Result};
use crate::models::Media;
use crate::scanner::{MediaKind, ScannedFile};
use lofty::prelude::*;
use lofty::read_from_path;
use std::path::Path;

/// Candidate catalog entry for one scanned file. Non-media and unreadable
/// entries come back as errors so the caller can decide to skip or report;
/// the reconciler skips them.
pub fn read_media(file: &ScannedFile) -> Result<Media> {
    match file.kind {
        MediaKind::Audio => read_audio_media(&file.path),
        MediaKind::Video => Ok(video_media(&file.path)),
        MediaKind::Ignored | MediaKind::Unreadable => Err(LibraryError::UnsupportedMedia {
            path: file.path.clone(),
        }),
    }
}

/// Reads tags and duration from an audio file.
///
/// Title and artist come from the primary tag, falling back to any tag that
/// is present; a file with no usable tag fields still gets cataloged with
/// empty strings. A file whose container can't be parsed at all is a
/// [`LibraryError::TagRead`] and the caller skips it.
pub fn read_audio_media(path: &Path) -> Result<Media> {
    let tagged_file = read_from_path(path).map_err(|source| LibraryError::TagRead {
        path: path.to_path_buf(),
        source,
    })?;

    let length = tagged_file.properties().duration().as_secs() as u32;

    let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag());
    let title = tag
        .and_then(|t| t.title().map(|s| s.to_string()))
        .unwrap_or_default();
    let artist = tag
        .and_then(|t| t.artist().map(|s| s.to_string()))
        .unwrap_or_default();

    Ok(Media::new(path.to_string_lossy(), title, artist, length))
}

/// Builds the provisional catalog entry for a video file: title is the file
/// name, artist empty, length 0 until the duration probe reports in.
pub fn video_media(path: &Path) -> Media {
    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Media::new(path.to_string_lossy(), title, "", 0)
}

/// Seam for the playback engine's duration probing. Some containers only
/// report a duration after a decoding probe completes, so the reconciler
/// always calls this off-thread and applies the result as a deferred update.
pub trait DurationProbe: Send + Sync + 'static {
    /// True duration of a video file in seconds, or `None` if it cannot be
    /// determined. May block.
    fn probe(&self, path: &Path) -> Option<u32>;
}

/// Probe that never reports a duration. Lets the library run without a
/// playback engine; video lengths then stay at their provisional 0.
pub struct NoProbe;

impl DurationProbe for NoProbe {
    fn probe(&self, _path: &Path) -> Option<u32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tests::write_wav;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_duration_from_untagged_wav() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("silence.wav");
        write_wav(&path, 3);

        let media = read_audio_media(&path).unwrap();
        assert_eq!(media.length, 3);
        assert_eq!(media.title, "");
        assert_eq!(media.artist, "");
        assert_eq!(media.path, path.to_string_lossy());
    }

    #[test]
    fn garbage_file_is_a_tag_read_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.wav");
        fs::write(&path, b"RIFFnope").unwrap();

        match read_audio_media(&path) {
            Err(LibraryError::TagRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected TagRead, got {:?}", other.map(|m| m.path)),
        }
    }

    #[test]
    fn non_media_is_unsupported() {
        let file = ScannedFile {
            path: "/media/readme.txt".into(),
            kind: MediaKind::Ignored,
        };
        assert!(matches!(
            read_media(&file),
            Err(LibraryError::UnsupportedMedia { .. })
        ));
    }

    #[test]
    fn video_entry_is_provisional() {
        let media = video_media(Path::new("/media/holiday.mp4"));
        assert_eq!(media.title, "holiday.mp4");
        assert_eq!(media.artist, "");
        assert_eq!(media.length, 0);
        assert_eq!(media.duration(), "00:00:00");
    }
}
