//! Session Settings
//!
//! Recognized configuration options for one synchronization session, with
//! defaults matching a freshly installed unit. Settings are read once at
//! session start; the addressing mode and frame rates are immutable for the
//! session's lifetime.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::addressing::AddressingMode;
use crate::host::DirPlaylistStore;
use crate::timecode::FrameRate;
use crate::Result;

/// Playlist sentinel meaning "no fallback playlist configured"
pub const PLAYLIST_NONE: &str = "--none--";

/// Recognized configuration surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable timecode output (player units)
    pub enable_output: bool,
    /// Enable timecode input (remote units)
    pub enable_input: bool,
    /// Output audio device selector; empty disables output
    pub output_device: String,
    /// Input audio device selector; empty disables input
    pub input_device: String,
    /// Frame rate of the emitted timecode
    pub output_frame_rate: FrameRate,
    /// Frame rate expected on the captured timecode
    pub input_frame_rate: FrameRate,
    /// How decoded timestamps map to playlist targets
    pub addressing_mode: AddressingMode,
    /// Fallback playlist when user bits resolve nothing; [`PLAYLIST_NONE`]
    /// suppresses positional dispatch
    pub input_playlist: String,
    /// Directory searched for playlist files
    pub playlist_dir: PathBuf,
    /// Re-propagate received positions to further units as master
    pub resend_multisync: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enable_output: false,
            enable_input: false,
            output_device: String::new(),
            input_device: String::new(),
            output_frame_rate: FrameRate::Fps30,
            input_frame_rate: FrameRate::Fps30,
            addressing_mode: AddressingMode::ByPlaylistPosition,
            input_playlist: PLAYLIST_NONE.to_string(),
            playlist_dir: PathBuf::from("playlists"),
            resend_multisync: false,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Persist settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Playlist store over the configured playlist directory
    pub fn playlist_store(&self) -> DirPlaylistStore {
        DirPlaylistStore::new(self.playlist_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fresh_install() {
        let s = Settings::default();
        assert!(!s.enable_output);
        assert!(!s.enable_input);
        assert!(s.output_device.is_empty());
        assert_eq!(s.output_frame_rate, FrameRate::Fps30);
        assert_eq!(s.input_frame_rate, FrameRate::Fps30);
        assert_eq!(s.addressing_mode, AddressingMode::ByPlaylistPosition);
        assert_eq!(s.input_playlist, PLAYLIST_NONE);
        assert!(!s.resend_multisync);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(s.input_playlist, PLAYLIST_NONE);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut s = Settings::default();
        s.enable_input = true;
        s.input_device = "hw:1".into();
        s.input_frame_rate = FrameRate::Fps25;
        s.addressing_mode = AddressingMode::ByHourSlot;
        s.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert!(loaded.enable_input);
        assert_eq!(loaded.input_device, "hw:1");
        assert_eq!(loaded.input_frame_rate, FrameRate::Fps25);
        assert_eq!(loaded.addressing_mode, AddressingMode::ByHourSlot);
    }

    #[test]
    fn test_playlist_store_uses_configured_dir() {
        use crate::host::PlaylistStore;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("smpte-pl-3.json"), "{}").unwrap();

        let mut s = Settings::default();
        s.playlist_dir = dir.path().to_path_buf();
        assert!(s.playlist_store().exists("smpte-pl-3"));
        assert!(!s.playlist_store().exists("smpte-pl-4"));
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"enable_output": true, "output_frame_rate": "25"}"#).unwrap();

        let s = Settings::load(&path).unwrap();
        assert!(s.enable_output);
        assert_eq!(s.output_frame_rate, FrameRate::Fps25);
        assert_eq!(s.input_playlist, PLAYLIST_NONE);
    }
}
