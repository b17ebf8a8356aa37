//! SMPTE LTC timecode synchronization engine
//!
//! Embeds a positional timecode inside an audio signal so that independently
//! running playback units stay locked to a shared timeline, and recovers that
//! timecode from captured audio to drive synchronization actions on a remote
//! unit.
//!
//! # Features
//! - Drift-corrected, backpressure-aware pacing of encoded timecode frames
//! - Cheap single-frame increment path that preserves codec continuity
//! - Look-ahead gap filling when the host tick rate is coarser than the
//!   timecode frame rate
//! - Noise rejection of implausible timestamp jumps on the decode side
//! - Timestamp-to-playlist addressing (hour slots, 15-minute slots,
//!   embedded item field, playlist position)
//! - Lock-free handoff from the real-time decode context to a control-context
//!   dispatcher that coalesces decode bursts into single sync actions
//!
//! The audio devices, the bit-level LTC modulation, the playlist engine and
//! the cross-unit sync transport are external collaborators reached through
//! the traits in [`codec`] and [`host`].
//!
//! # Quick start
//! ## Encode side (player unit)
//! ```ignore
//! use ltc_sync::{FrameRate, TimecodeEncoder};
//!
//! // `sink` implements host::AudioSink, `codec` implements codec::FrameEncoder
//! let mut encoder = TimecodeEncoder::new(sink, codec, FrameRate::Fps30);
//! encoder.open(44_100)?;
//! // once per host tick:
//! encoder.advance(1_500); // playback position in milliseconds
//! ```
//!
//! ## Decode side (remote unit)
//! ```ignore
//! use std::sync::Arc;
//! use ltc_sync::bridge::{DecodeShared, EventBridge, WakeSignal};
//! use ltc_sync::{AddressingMode, FrameRate, TimecodeDecoder};
//!
//! let shared = Arc::new(DecodeShared::new());
//! let wake = WakeSignal::new();
//! let mut decoder = TimecodeDecoder::new(
//!     codec, // implements codec::FrameDecoder
//!     FrameRate::Fps30,
//!     AddressingMode::ByPlaylistPosition,
//!     Arc::clone(&shared),
//!     wake.clone(),
//! );
//! let bridge = EventBridge::new(shared, wake, transport, store, "--none--", false);
//! let _handle = bridge.spawn()?;
//! // from the capture callback:
//! decoder.on_samples(&captured_samples);
//! ```

#![warn(missing_docs)]

pub mod addressing; // Timestamp -> playlist slot mapping
pub mod bridge; // Real-time to control-context event handoff
pub mod codec; // Seam to the bit-level LTC modulator
pub mod config; // Session settings
pub mod decoder; // Captured audio -> filtered timestamps
pub mod encoder; // Playback position -> paced timecode frames
pub mod host; // External collaborator seams
pub mod session; // Host lifecycle glue
pub mod timecode; // Timecode field state

/// Error types for timecode synchronization operations
#[derive(thiserror::Error, Debug)]
pub enum LtcSyncError {
    /// Invalid or missing configuration value
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Audio device could not be opened or refused samples
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Timecode codec failure
    #[error("Codec error: {0}")]
    CodecError(String),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Settings parse error: {0}")]
    SettingsError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for LtcSyncError {
    /// Converts a String into `LtcSyncError::Other`.
    ///
    /// Convenience for generic string errors; prefer the specific variant
    /// constructors when the failure class is known.
    fn from(msg: String) -> Self {
        LtcSyncError::Other(msg)
    }
}

impl From<&str> for LtcSyncError {
    /// Converts a string slice into `LtcSyncError::Other`.
    fn from(msg: &str) -> Self {
        LtcSyncError::Other(msg.to_string())
    }
}

/// Result type for timecode synchronization operations
pub type Result<T> = std::result::Result<T, LtcSyncError>;

// Public API exports
pub use addressing::{resolve_slot, AddressingMode};
pub use bridge::{DecodeShared, EventBridge, SyncEvent, WakeSignal};
pub use codec::{DecodedFrame, FrameDecoder, FrameEncoder};
pub use config::Settings;
pub use decoder::TimecodeDecoder;
pub use encoder::TimecodeEncoder;
pub use host::{AudioSink, PlaylistStore, PositionProvider, SyncTransport};
pub use session::{PlaylistAction, SyncSession};
pub use timecode::{FrameRate, TimecodeFields, TvStandard};
