//! Addressing Mapper
//!
//! Turns a decoded timestamp into the intended playlist target: a slot index
//! plus a within-slot offset, or one of the sentinel values below. The mode
//! is fixed at session start from configuration.

use serde::{Deserialize, Serialize};

/// Slot sentinel: use the mode-derived default (playlist position)
pub const SLOT_PLAYLIST_POSITION: i32 = -1;
/// Slot sentinel: target is defined by the embedded item field, not the index
pub const SLOT_ITEM_DEFINED: i32 = -2;
/// Slot sentinel: global stop rather than a position
pub const SLOT_STOP_ALL: i32 = -99;

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_QUARTER_HOUR: u64 = 900_000;

/// Policy for turning a decoded timestamp into a target playlist/slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressingMode {
    /// Timestamp addresses the playlist as one continuous timeline
    #[default]
    #[serde(rename = "playlist")]
    ByPlaylistPosition,
    /// Each hour of timecode addresses one playlist slot
    #[serde(rename = "hour")]
    ByHourSlot,
    /// Each 15 minutes of timecode addresses one playlist slot
    #[serde(rename = "15min")]
    By15MinuteSlot,
    /// The embedded item field selects the target; the slot index is unused
    #[serde(rename = "item")]
    ByEmbeddedItemField,
}

impl AddressingMode {
    /// Map a timestamp through this mode; see [`resolve_slot`]
    pub fn resolve(&self, timestamp_ms: u64) -> (u64, i32) {
        resolve_slot(timestamp_ms, *self)
    }
}

/// Map a decoded timestamp onto `(adjusted_ms, slot_index)`
///
/// A timestamp of exactly zero (time-of-day 0:0:0 with zero frame offset) is
/// the encoder's canonical "no playback" convention and yields
/// [`SLOT_STOP_ALL`] under every mode.
pub fn resolve_slot(timestamp_ms: u64, mode: AddressingMode) -> (u64, i32) {
    if timestamp_ms == 0 {
        return (0, SLOT_STOP_ALL);
    }
    match mode {
        AddressingMode::ByPlaylistPosition => (timestamp_ms, SLOT_PLAYLIST_POSITION),
        AddressingMode::ByHourSlot => (
            timestamp_ms % MS_PER_HOUR,
            (timestamp_ms / MS_PER_HOUR) as i32,
        ),
        AddressingMode::By15MinuteSlot => (
            timestamp_ms % MS_PER_QUARTER_HOUR,
            (timestamp_ms / MS_PER_QUARTER_HOUR) as i32,
        ),
        AddressingMode::ByEmbeddedItemField => (timestamp_ms, SLOT_ITEM_DEFINED),
    }
}
