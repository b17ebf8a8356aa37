//! External collaborator seams
//!
//! Narrow interfaces to the subsystems this crate deliberately does not
//! implement: audio output queueing, playback position reporting, the
//! cross-unit synchronization transport, and playlist existence lookups.
//! Collaborators are passed in explicitly at construction; there is no
//! process-wide singleton access.

use std::path::{Path, PathBuf};

/// Current playback position as reported by the host's playlist engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackPosition {
    /// Absolute playback position in milliseconds
    pub position_ms: u64,
    /// Index of the currently playing item
    pub item_index: u32,
    /// Start position of the current item in milliseconds
    pub item_start_ms: u64,
}

/// Output device seam: accepts encoded frames for queued playback and
/// exposes how much queued audio has not yet played (the backpressure probe)
pub trait AudioSink: Send {
    /// Queued-but-unplayed audio, in sample-frames
    fn queued_frames(&self) -> usize;

    /// Queue one encoded frame of audio for playback
    fn submit(&mut self, samples: &[u8]);
}

/// Playback position seam
pub trait PositionProvider: Send {
    /// Current playback position and item boundaries
    fn current_position(&self) -> PlaybackPosition;
}

/// Cross-unit synchronization transport seam
pub trait SyncTransport: Send {
    /// Synchronize playback to a position within a target playlist/slot
    fn sync_to(&self, position_ms: u64, slot_index: i32, playlist: Option<&str>, act_as_master: bool);

    /// Stop playback everywhere
    fn stop_all(&self);
}

/// Playlist existence lookup, used to resolve user-bits playlist names
pub trait PlaylistStore: Send {
    /// True if a playlist with this name exists
    fn exists(&self, name: &str) -> bool;
}

/// Filesystem-backed playlist store: a playlist named `n` exists when
/// `<dir>/<n>.json` is a file
#[derive(Debug, Clone)]
pub struct DirPlaylistStore {
    dir: PathBuf,
}

impl DirPlaylistStore {
    /// Create a store rooted at the given playlist directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirPlaylistStore { dir: dir.into() }
    }

    /// The playlist directory this store searches
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PlaylistStore for DirPlaylistStore {
    fn exists(&self, name: &str) -> bool {
        self.dir.join(format!("{name}.json")).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_playlist_store_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("smpte-pl-42.json"), "{}").unwrap();

        let store = DirPlaylistStore::new(dir.path());
        assert!(store.exists("smpte-pl-42"));
        assert!(!store.exists("smpte-pl-7"));
    }

    #[test]
    fn test_dir_playlist_store_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("smpte-pl-1.json")).unwrap();

        let store = DirPlaylistStore::new(dir.path());
        assert!(!store.exists("smpte-pl-1"));
    }
}
