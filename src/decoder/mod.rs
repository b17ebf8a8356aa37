//! Audio-to-Timecode Decoder
//!
//! Consumes raw captured audio on the input device's real-time delivery
//! path, drains complete frames from the codec, converts them to absolute
//! millisecond timestamps, rejects implausible jumps, and publishes accepted
//! readings through the event bridge. Runs entirely without blocking or
//! unbounded allocation; a bad frame is simply dropped and the stream is
//! self-healing on the next one.

use std::sync::Arc;

use crate::addressing::AddressingMode;
use crate::bridge::{DecodeShared, WakeSignal};
use crate::codec::FrameDecoder;
use crate::timecode::FrameRate;

/// Timestamp deltas at or beyond this are treated as signal dropouts or
/// misaligned sync and dropped, in milliseconds
pub const NOISE_REJECTION_CEILING_MS: u64 = 5000;

/// Turns a captured audio stream back into discrete, filtered timestamps
pub struct TimecodeDecoder<D> {
    codec: D,
    rate: FrameRate,
    mode: AddressingMode,
    cursor: u64,
    last_timestamp_ms: u64,
    shared: Arc<DecodeShared>,
    wake: WakeSignal,
}

impl<D: FrameDecoder> TimecodeDecoder<D> {
    /// Create a decoder publishing accepted readings into `shared` and
    /// signalling `wake` once per accepted frame
    pub fn new(
        codec: D,
        rate: FrameRate,
        mode: AddressingMode,
        shared: Arc<DecodeShared>,
        wake: WakeSignal,
    ) -> Self {
        TimecodeDecoder {
            codec,
            rate,
            mode,
            cursor: 0,
            last_timestamp_ms: 0,
            shared,
            wake,
        }
    }

    /// Deliver one captured buffer; called from the input device's real-time
    /// delivery mechanism
    pub fn on_samples(&mut self, samples: &[i16]) {
        self.codec.write_samples(samples, self.cursor);
        self.cursor += samples.len() as u64;

        while let Some(frame) = self.codec.read_frame() {
            let timestamp_ms = frame.fields.to_millis(self.rate);
            let delta = timestamp_ms.abs_diff(self.last_timestamp_ms);
            if delta > 0 && delta < NOISE_REJECTION_CEILING_MS {
                let (position_ms, slot_index) = self.mode.resolve(timestamp_ms);
                self.shared.publish(position_ms, frame.user_bits, slot_index);
                self.wake.notify();
            }
            // deltas are always measured against the newest reading, accepted
            // or not, so a rejected sample never freezes drift detection
            self.last_timestamp_ms = timestamp_ms;
        }
    }

    /// Running sample offset fed to the codec so far
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Reset the decode cursor; only valid when the input device is reopened
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
