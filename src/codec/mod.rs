//! Seam to the bit-level LTC modulator/demodulator
//!
//! The engine decides *what* timecode to emit or interpret *when*; the
//! modulation of fields into audio samples (and back) is an external codec
//! reached through these traits. Both halves are stateful but side-effect
//! free beyond their own internal buffers, so a failed frame is simply
//! dropped and the next one starts clean.

use crate::timecode::{FrameRate, TimecodeFields, TvStandard};
use crate::Result;

/// One fully decoded timecode frame: time-of-day fields plus the auxiliary
/// user-bits payload carried alongside them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Decoded time-of-day fields
    pub fields: TimecodeFields,
    /// Auxiliary per-frame payload bits (playlist selection by convention)
    pub user_bits: u32,
}

/// Encoder half of the codec seam
///
/// Implementations keep an internal timecode and modulation phase so that
/// consecutive frames form a continuous stream. The engine resynchronizes
/// the internal timecode only when the pacing logic detects a real jump;
/// single-frame steps go through [`bump_frame`](FrameEncoder::bump_frame)
/// to preserve that continuity.
pub trait FrameEncoder: Send {
    /// Configure for a negotiated sample rate, frame rate and TV standard.
    /// Called once when the output device opens.
    fn configure(&mut self, sample_rate: u32, rate: FrameRate, standard: TvStandard)
        -> Result<()>;

    /// Resynchronize the internal timecode to a full field set
    fn set_timecode(&mut self, fields: &TimecodeFields);

    /// Advance the internal timecode by exactly one frame
    fn bump_frame(&mut self);

    /// Encode one frame's worth of audio for the current internal timecode.
    /// Returns the codec's internal buffer, valid until the next call.
    fn encode_frame(&mut self) -> &[u8];
}

/// Decoder half of the codec seam
///
/// Fed raw captured samples at a running sample offset; buffers internally
/// and yields zero or more complete frames per delivery.
pub trait FrameDecoder: Send {
    /// Feed raw samples captured at `cursor` (a monotonically increasing
    /// sample offset for the lifetime of one input session)
    fn write_samples(&mut self, samples: &[i16], cursor: u64);

    /// Drain the next complete buffered frame, if any
    fn read_frame(&mut self) -> Option<DecodedFrame>;
}
