//! Timecode Field State
//!
//! The time-of-day field set shared by the encode and decode paths, plus the
//! nominal frame rates the engine supports. Fields are always kept normalized
//! (no field exceeds its modulus) before they are handed to the codec.

use serde::{Deserialize, Serialize};

/// Nominal timecode frame rates supported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameRate {
    /// 24 fps (film)
    #[serde(rename = "24")]
    Fps24,
    /// 25 fps (PAL/625-line)
    #[serde(rename = "25")]
    Fps25,
    /// 30 fps (NTSC/525-line, non-drop)
    #[default]
    #[serde(rename = "30")]
    Fps30,
}

/// TV standard hint handed to the codec when the output is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvStandard {
    /// 24 fps film timing
    Film24,
    /// 625-line / 50 Hz (PAL)
    Pal25,
    /// 525-line / 60 Hz (NTSC)
    Ntsc30,
}

impl FrameRate {
    /// Frames per second as an integer
    pub fn fps(&self) -> u32 {
        match self {
            FrameRate::Fps24 => 24,
            FrameRate::Fps25 => 25,
            FrameRate::Fps30 => 30,
        }
    }

    /// TV standard matching this frame rate
    pub fn tv_standard(&self) -> TvStandard {
        match self {
            FrameRate::Fps24 => TvStandard::Film24,
            FrameRate::Fps25 => TvStandard::Pal25,
            FrameRate::Fps30 => TvStandard::Ntsc30,
        }
    }

    /// Parse a nominal rate from its fps value
    pub fn from_fps(fps: u32) -> Option<Self> {
        match fps {
            24 => Some(FrameRate::Fps24),
            25 => Some(FrameRate::Fps25),
            30 => Some(FrameRate::Fps30),
            _ => None,
        }
    }
}

/// One timecode frame's worth of time-of-day fields
///
/// Owned exclusively by whichever side (encoder or decoder) currently holds
/// it; results cross threads as scalar millisecond timestamps, never as live
/// field-set references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimecodeFields {
    /// Hours, 0-23
    pub hours: u8,
    /// Minutes, 0-59
    pub minutes: u8,
    /// Seconds, 0-59
    pub seconds: u8,
    /// Frame within the second, 0-(fps-1)
    pub frame: u8,
}

impl TimecodeFields {
    /// Derive a normalized field set from an absolute millisecond position
    pub fn from_millis(ms: u64, rate: FrameRate) -> Self {
        let frame = ((ms % 1000) * rate.fps() as u64 / 1000) as u8;
        let mut rest = ms / 1000;
        let seconds = (rest % 60) as u8;
        rest /= 60;
        let minutes = (rest % 60) as u8;
        rest /= 60;
        let hours = (rest % 24) as u8;
        TimecodeFields {
            hours,
            minutes,
            seconds,
            frame,
        }
    }

    /// Convert back to an absolute millisecond timestamp
    pub fn to_millis(&self, rate: FrameRate) -> u64 {
        let seconds =
            self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64;
        seconds * 1000 + self.frame as u64 * 1000 / rate.fps() as u64
    }

    /// Advance by exactly one frame, carrying into seconds/minutes/hours
    /// and wrapping at 24 hours
    pub fn advance_frame(&mut self, rate: FrameRate) {
        self.frame += 1;
        if self.frame as u32 >= rate.fps() {
            self.frame = 0;
            self.seconds += 1;
            if self.seconds >= 60 {
                self.seconds = 0;
                self.minutes += 1;
                if self.minutes >= 60 {
                    self.minutes = 0;
                    self.hours += 1;
                    if self.hours >= 24 {
                        self.hours = 0;
                    }
                }
            }
        }
    }

    /// True when all four fields are zero (the canonical "stop" position)
    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0 && self.frame == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_millis_field_breakdown() {
        let tc = TimecodeFields::from_millis(3_723_500, FrameRate::Fps30);
        assert_eq!(tc.hours, 1);
        assert_eq!(tc.minutes, 2);
        assert_eq!(tc.seconds, 3);
        assert_eq!(tc.frame, 15); // 500ms at 30fps
    }

    #[test]
    fn test_from_millis_zero_is_stop() {
        let tc = TimecodeFields::from_millis(0, FrameRate::Fps25);
        assert!(tc.is_zero());
    }

    #[test]
    fn test_frame_field_stays_below_fps() {
        for ms in 0..1000 {
            let tc = TimecodeFields::from_millis(ms, FrameRate::Fps24);
            assert!((tc.frame as u32) < 24, "frame {} at {}ms", tc.frame, ms);
        }
    }

    #[test]
    fn test_to_millis_matches_decode_formula() {
        let tc = TimecodeFields {
            hours: 1,
            minutes: 2,
            seconds: 3,
            frame: 15,
        };
        // (1*3600 + 2*60 + 3) * 1000 + 15 * 1000 / 30
        assert_eq!(tc.to_millis(FrameRate::Fps30), 3_723_500);
    }

    #[test]
    fn test_advance_frame_carries_through_all_fields() {
        let mut tc = TimecodeFields {
            hours: 0,
            minutes: 59,
            seconds: 59,
            frame: 29,
        };
        tc.advance_frame(FrameRate::Fps30);
        assert_eq!(
            tc,
            TimecodeFields {
                hours: 1,
                minutes: 0,
                seconds: 0,
                frame: 0
            }
        );
    }

    #[test]
    fn test_advance_frame_wraps_at_24_hours() {
        let mut tc = TimecodeFields {
            hours: 23,
            minutes: 59,
            seconds: 59,
            frame: 23,
        };
        tc.advance_frame(FrameRate::Fps24);
        assert!(tc.is_zero());
    }

    #[test]
    fn test_advance_frame_matches_from_millis_stepping() {
        // stepping one frame at a time must agree with direct derivation
        let rate = FrameRate::Fps25;
        let mut tc = TimecodeFields::from_millis(0, rate);
        for n in 1..=250u64 {
            tc.advance_frame(rate);
            let expected = TimecodeFields::from_millis(n * 1000 / 25, rate);
            assert_eq!(tc, expected, "after {} frames", n);
        }
    }

    #[test]
    fn test_frame_rate_fps_values() {
        assert_eq!(FrameRate::Fps24.fps(), 24);
        assert_eq!(FrameRate::Fps25.fps(), 25);
        assert_eq!(FrameRate::Fps30.fps(), 30);
        assert_eq!(FrameRate::from_fps(25), Some(FrameRate::Fps25));
        assert_eq!(FrameRate::from_fps(29), None);
    }

    #[test]
    fn test_frame_rate_tv_standards() {
        assert_eq!(FrameRate::Fps24.tv_standard(), TvStandard::Film24);
        assert_eq!(FrameRate::Fps25.tv_standard(), TvStandard::Pal25);
        assert_eq!(FrameRate::Fps30.tv_standard(), TvStandard::Ntsc30);
    }
}
