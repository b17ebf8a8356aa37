//! Position-to-Timecode Encoder
//!
//! Converts a monotonically advancing playback position into a correctly
//! paced stream of encoded timecode frames. Three mechanisms keep the stream
//! clean:
//!
//! - a backpressure valve that skips encode opportunities while the output
//!   still holds more than [`BACKPRESSURE_CEILING_FRAMES`] of unplayed audio
//! - a cheap single-frame increment path that preserves the codec's internal
//!   modulation continuity across consecutive frames
//! - look-ahead gap filling that pre-encodes the intermediate frame when the
//!   host's tick rate is coarser than the timecode frame rate, so a receiver
//!   never sees a hole in the stream

use log::{debug, info};

use crate::codec::FrameEncoder;
use crate::host::AudioSink;
use crate::timecode::{FrameRate, TimecodeFields};
use crate::Result;

/// Maximum queued-but-unplayed output audio before an encode opportunity is
/// skipped, in sample-frames
pub const BACKPRESSURE_CEILING_FRAMES: usize = 2048;

/// Default host tick rate assumed for look-ahead estimation, in Hz
pub const DEFAULT_REFRESH_HZ: u32 = 20;

/// Paces encoded timecode frames against the playback position
pub struct TimecodeEncoder<S, E> {
    sink: S,
    codec: E,
    rate: FrameRate,
    refresh_hz: u32,
    fields: TimecodeFields,
    last_frame: u64,
    running: bool,
}

impl<S: AudioSink, E: FrameEncoder> TimecodeEncoder<S, E> {
    /// Create an encoder over an output sink and an encode codec
    pub fn new(sink: S, codec: E, rate: FrameRate) -> Self {
        TimecodeEncoder {
            sink,
            codec,
            rate,
            refresh_hz: DEFAULT_REFRESH_HZ,
            fields: TimecodeFields::default(),
            last_frame: 0,
            running: false,
        }
    }

    /// Override the assumed host tick rate used for look-ahead
    pub fn with_refresh_hz(mut self, refresh_hz: u32) -> Self {
        self.refresh_hz = refresh_hz.max(1);
        self
    }

    /// Start output: configure the codec for the negotiated sample rate and
    /// the selected frame-rate standard, reset pacing state, and emit one
    /// zero-position frame so a receiver has a valid reference before motion
    /// begins
    pub fn open(&mut self, sample_rate: u32) -> Result<()> {
        self.codec
            .configure(sample_rate, self.rate, self.rate.tv_standard())?;
        self.fields = TimecodeFields::default();
        self.codec.set_timecode(&self.fields);
        self.last_frame = 0;
        self.running = true;
        self.emit();
        info!(
            "timecode output started at {} fps, {} Hz",
            self.rate.fps(),
            sample_rate
        );
        Ok(())
    }

    /// Stop output and reset pacing state. The sink itself is released by
    /// the caller's device lifecycle, after the device is confirmed stopped.
    pub fn close(&mut self) {
        self.running = false;
        self.last_frame = 0;
        self.fields = TimecodeFields::default();
        debug!("timecode output stopped");
    }

    /// True between [`open`](Self::open) and [`close`](Self::close)
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frame number of the most recently emitted frame
    pub fn last_frame(&self) -> u64 {
        self.last_frame
    }

    /// Notify the encoder of the current playback position, once per
    /// synchronization opportunity
    ///
    /// Idempotent for repeated equal positions: when no new frame is due the
    /// call submits nothing. A position of 0 is the canonical "stop" and
    /// always forces a fresh field-set computation.
    pub fn advance(&mut self, position_ms: u64) {
        if !self.running {
            return;
        }
        // backpressure valve: let the queue drain before encoding more
        if self.sink.queued_frames() > BACKPRESSURE_CEILING_FRAMES {
            return;
        }

        let fps = self.rate.fps() as u64;
        let target = position_ms * fps / 1000;

        if target != self.last_frame || position_ms == 0 {
            if target == self.last_frame + 1 {
                // single step: keep the codec's continuity state intact
                self.fields.advance_frame(self.rate);
                self.codec.bump_frame();
                self.emit();
                self.last_frame = target;
            } else {
                let fields = TimecodeFields::from_millis(position_ms, self.rate);
                // duplicate calls can land on the same frame; only
                // resynchronize the codec when seconds+frame actually moved
                if fields.seconds != self.fields.seconds || fields.frame != self.fields.frame {
                    self.fields = fields;
                    self.codec.set_timecode(&self.fields);
                    self.emit();
                }
                // pacing always follows the target, even when the resync
                // above was skipped, so look-ahead never bumps a stale frame
                self.last_frame = target;
            }
        }

        // look-ahead: if the next expected call would skip past more than one
        // frame, pre-encode the intermediate frame now
        let next_ms = position_ms + 1000 / self.refresh_hz as u64;
        let next_frame = next_ms * fps / 1000;
        if next_frame > self.last_frame + 1 {
            self.fields.advance_frame(self.rate);
            self.codec.bump_frame();
            self.emit();
            self.last_frame += 1;
        }
    }

    fn emit(&mut self) {
        let buf = self.codec.encode_frame();
        self.sink.submit(buf);
    }
}
