//! Host Lifecycle Glue
//!
//! Wires settings, encoder, decoder and bridge into one session driven by a
//! narrow set of host callbacks: position ticks, playlist lifecycle events,
//! and teardown. Failures here degrade to "this feature does nothing this
//! session" — nothing is fatal to the host process.

use std::sync::Arc;
use std::thread::JoinHandle;

use log::{info, warn};
use parking_lot::Mutex;

use crate::bridge::{DecodeShared, EventBridge, WakeSignal};
use crate::codec::{FrameDecoder, FrameEncoder};
use crate::config::Settings;
use crate::decoder::TimecodeDecoder;
use crate::encoder::TimecodeEncoder;
use crate::host::{AudioSink, PlaylistStore, PositionProvider, SyncTransport};
use crate::Result;

/// Playlist lifecycle notifications forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistAction {
    /// A playlist started
    Start,
    /// The playlist stopped
    Stop,
    /// Playback advanced to an item
    Playing,
}

/// One synchronization session: optional encode side, optional decode side
pub struct SyncSession<S: AudioSink, E: FrameEncoder, P: PositionProvider> {
    settings: Settings,
    provider: P,
    /// Behind a lock: ticks arrive on whatever thread the playback engine
    /// uses, lifecycle calls on the control context
    encoder: Option<Mutex<TimecodeEncoder<S, E>>>,
    shared: Option<Arc<DecodeShared>>,
    wake: Option<WakeSignal>,
    bridge_thread: Option<JoinHandle<()>>,
}

impl<S: AudioSink, E: FrameEncoder, P: PositionProvider> SyncSession<S, E, P> {
    /// Create a session over the host's position provider
    pub fn new(settings: Settings, provider: P) -> Self {
        SyncSession {
            settings,
            provider,
            encoder: None,
            shared: None,
            wake: None,
            bridge_thread: None,
        }
    }

    /// The session's settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// True once timecode output is running
    pub fn output_enabled(&self) -> bool {
        self.encoder.as_ref().is_some_and(|e| e.lock().is_running())
    }

    /// Enable timecode output
    ///
    /// `open` receives the configured device selector and returns the opened
    /// sink plus the negotiated sample rate. A missing selector or an open
    /// failure logs and leaves the feature disabled; neither is fatal.
    pub fn enable_output<F>(&mut self, codec: E, open: F) -> bool
    where
        F: FnOnce(&str) -> Result<(S, u32)>,
    {
        if !self.settings.enable_output {
            return false;
        }
        if self.settings.output_device.is_empty() {
            info!("no output audio device selected; timecode output disabled");
            return false;
        }
        let (sink, sample_rate) = match open(&self.settings.output_device) {
            Ok(opened) => opened,
            Err(e) => {
                warn!(
                    "could not open output audio device {}: {}",
                    self.settings.output_device, e
                );
                return false;
            }
        };
        let mut encoder = TimecodeEncoder::new(sink, codec, self.settings.output_frame_rate);
        if let Err(e) = encoder.open(sample_rate) {
            warn!("timecode encoder setup failed: {}", e);
            return false;
        }
        self.encoder = Some(Mutex::new(encoder));
        true
    }

    /// Enable timecode input
    ///
    /// `open` receives the configured device selector and returns the decode
    /// codec bound to the opened capture device. On success the returned
    /// decoder must be driven from the device's delivery callback; the
    /// control loop dispatching sync actions is spawned here.
    pub fn enable_input<D, T, Pl, F>(
        &mut self,
        transport: T,
        store: Pl,
        open: F,
    ) -> Option<TimecodeDecoder<D>>
    where
        D: FrameDecoder,
        T: SyncTransport + 'static,
        Pl: PlaylistStore + 'static,
        F: FnOnce(&str) -> Result<D>,
    {
        if !self.settings.enable_input {
            return None;
        }
        if self.settings.input_device.is_empty() {
            info!("no input audio device selected; timecode input disabled");
            return None;
        }
        let codec = match open(&self.settings.input_device) {
            Ok(codec) => codec,
            Err(e) => {
                warn!(
                    "could not open input audio device {}: {}",
                    self.settings.input_device, e
                );
                return None;
            }
        };

        let shared = Arc::new(DecodeShared::new());
        let wake = WakeSignal::new();
        let decoder = TimecodeDecoder::new(
            codec,
            self.settings.input_frame_rate,
            self.settings.addressing_mode,
            Arc::clone(&shared),
            wake.clone(),
        );
        let bridge = EventBridge::new(
            Arc::clone(&shared),
            wake.clone(),
            transport,
            store,
            self.settings.input_playlist.clone(),
            self.settings.resend_multisync,
        );
        match bridge.spawn() {
            Ok(handle) => {
                info!(
                    "timecode input enabled at {} fps",
                    self.settings.input_frame_rate.fps()
                );
                self.bridge_thread = Some(handle);
                self.shared = Some(shared);
                self.wake = Some(wake);
                Some(decoder)
            }
            Err(e) => {
                warn!("could not start sync bridge: {}", e);
                None
            }
        }
    }

    /// Per-frame/per-tick synchronization opportunity
    pub fn on_position_tick(&self) {
        if let Some(encoder) = &self.encoder {
            let pos = self.provider.current_position();
            encoder.lock().advance(pos.position_ms);
        }
    }

    /// Playlist lifecycle notification
    pub fn on_playlist_event(&self, action: PlaylistAction) {
        let Some(encoder) = &self.encoder else {
            return;
        };
        match action {
            // start and stop both pin the stream to the zero reference
            PlaylistAction::Start | PlaylistAction::Stop => encoder.lock().advance(0),
            PlaylistAction::Playing => {
                let pos = self.provider.current_position();
                encoder.lock().advance(pos.item_start_ms);
            }
        }
    }

    /// Tear the session down: stop pacing, wake and join the control loop.
    /// Safe to call while device callbacks may still be mid-flight; device
    /// close quiescing is the driver's contract.
    pub fn shutdown(&mut self) {
        if let Some(encoder) = &self.encoder {
            encoder.lock().close();
        }
        if let Some(shared) = &self.shared {
            shared.request_shutdown();
        }
        if let Some(wake) = &self.wake {
            wake.notify();
        }
        if let Some(handle) = self.bridge_thread.take() {
            let _ = handle.join();
        }
    }
}

impl<S: AudioSink, E: FrameEncoder, P: PositionProvider> Drop for SyncSession<S, E, P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::DecodedFrame;
    use crate::host::PlaybackPosition;
    use crate::timecode::{FrameRate, TimecodeFields, TvStandard};
    use crate::LtcSyncError;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    struct RecordingSink {
        submitted: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl AudioSink for RecordingSink {
        fn queued_frames(&self) -> usize {
            0
        }
        fn submit(&mut self, samples: &[u8]) {
            self.submitted.lock().push(samples.to_vec());
        }
    }

    struct FieldsCodec {
        fields: TimecodeFields,
        rate: FrameRate,
        buf: [u8; 4],
    }

    impl FieldsCodec {
        fn new() -> Self {
            FieldsCodec {
                fields: TimecodeFields::default(),
                rate: FrameRate::Fps30,
                buf: [0; 4],
            }
        }
    }

    impl FrameEncoder for FieldsCodec {
        fn configure(
            &mut self,
            _sample_rate: u32,
            rate: FrameRate,
            _standard: TvStandard,
        ) -> crate::Result<()> {
            self.rate = rate;
            Ok(())
        }
        fn set_timecode(&mut self, fields: &TimecodeFields) {
            self.fields = *fields;
        }
        fn bump_frame(&mut self) {
            self.fields.advance_frame(self.rate);
        }
        fn encode_frame(&mut self) -> &[u8] {
            self.buf = [
                self.fields.hours,
                self.fields.minutes,
                self.fields.seconds,
                self.fields.frame,
            ];
            &self.buf
        }
    }

    #[derive(Clone)]
    struct FixedProvider {
        position: Arc<Mutex<PlaybackPosition>>,
    }

    impl PositionProvider for FixedProvider {
        fn current_position(&self) -> PlaybackPosition {
            *self.position.lock()
        }
    }

    struct ScriptedDecoder {
        frames: VecDeque<DecodedFrame>,
    }

    impl FrameDecoder for ScriptedDecoder {
        fn write_samples(&mut self, _samples: &[i16], _cursor: u64) {}
        fn read_frame(&mut self) -> Option<DecodedFrame> {
            self.frames.pop_front()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingTransport {
        synced: Arc<Mutex<Vec<(u64, i32, Option<String>)>>>,
    }

    impl SyncTransport for RecordingTransport {
        fn sync_to(
            &self,
            position_ms: u64,
            slot_index: i32,
            playlist: Option<&str>,
            _act_as_master: bool,
        ) {
            self.synced
                .lock()
                .push((position_ms, slot_index, playlist.map(str::to_owned)));
        }
        fn stop_all(&self) {}
    }

    struct EmptyStore;

    impl PlaylistStore for EmptyStore {
        fn exists(&self, _name: &str) -> bool {
            false
        }
    }

    type TestSession = SyncSession<RecordingSink, FieldsCodec, FixedProvider>;

    fn session_with(settings: Settings) -> (TestSession, Arc<Mutex<PlaybackPosition>>) {
        let position = Arc::new(Mutex::new(PlaybackPosition::default()));
        let provider = FixedProvider {
            position: Arc::clone(&position),
        };
        (SyncSession::new(settings, provider), position)
    }

    fn output_settings() -> Settings {
        Settings {
            enable_output: true,
            output_device: "default".into(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_enable_output_requires_device_selection() {
        let settings = Settings {
            enable_output: true,
            ..Settings::default()
        };
        let (mut session, _) = session_with(settings);
        assert!(!session.enable_output(FieldsCodec::new(), |_| panic!("must not open")));
        assert!(!session.output_enabled());
    }

    #[test]
    fn test_output_stays_disabled_when_not_enabled() {
        let (mut session, _) = session_with(Settings::default());
        assert!(!session.enable_output(FieldsCodec::new(), |_| panic!("must not open")));
    }

    #[test]
    fn test_enable_output_survives_open_failure() {
        let (mut session, _) = session_with(output_settings());
        let enabled = session.enable_output(FieldsCodec::new(), |_| {
            Err(LtcSyncError::AudioDeviceError("no such device".into()))
        });
        assert!(!enabled);
        assert!(!session.output_enabled());
    }

    #[test]
    fn test_position_ticks_drive_the_encoder() {
        let (mut session, position) = session_with(output_settings());
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            submitted: Arc::clone(&submitted),
        };
        assert!(session.enable_output(FieldsCodec::new(), move |_| Ok((sink, 44_100))));
        assert_eq!(submitted.lock().len(), 1); // zero reference frame

        position.lock().position_ms = 1_000;
        session.on_position_tick();
        let frames = submitted.lock();
        assert_eq!(frames.last().unwrap()[2], 1); // one second in
    }

    #[test]
    fn test_playlist_stop_pins_zero_reference() {
        let (mut session, position) = session_with(output_settings());
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            submitted: Arc::clone(&submitted),
        };
        assert!(session.enable_output(FieldsCodec::new(), move |_| Ok((sink, 44_100))));

        position.lock().position_ms = 5_000;
        session.on_position_tick();
        session.on_playlist_event(PlaylistAction::Stop);
        assert_eq!(submitted.lock().last().unwrap().as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_playing_event_advances_from_item_start() {
        let (mut session, position) = session_with(output_settings());
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink {
            submitted: Arc::clone(&submitted),
        };
        assert!(session.enable_output(FieldsCodec::new(), move |_| Ok((sink, 44_100))));

        position.lock().item_start_ms = 2_000;
        session.on_playlist_event(PlaylistAction::Playing);
        assert_eq!(submitted.lock().last().unwrap()[2], 2);
    }

    #[test]
    fn test_enable_input_requires_device_selection() {
        let settings = Settings {
            enable_input: true,
            ..Settings::default()
        };
        let (mut session, _) = session_with(settings);
        let decoder = session.enable_input::<ScriptedDecoder, _, _, _>(
            RecordingTransport::default(),
            EmptyStore,
            |_| panic!("must not open"),
        );
        assert!(decoder.is_none());
    }

    #[test]
    fn test_input_path_end_to_end() {
        let settings = Settings {
            enable_input: true,
            input_device: "default".into(),
            input_playlist: "fallback".into(),
            ..Settings::default()
        };
        let (mut session, _) = session_with(settings);
        let transport = RecordingTransport::default();
        let synced = Arc::clone(&transport.synced);

        let mut frames = VecDeque::new();
        frames.push_back(DecodedFrame {
            fields: TimecodeFields {
                hours: 0,
                minutes: 0,
                seconds: 1,
                frame: 0,
            },
            user_bits: 42,
        });
        let mut decoder = session
            .enable_input(transport, EmptyStore, move |_| {
                Ok(ScriptedDecoder { frames })
            })
            .expect("input should enable");

        decoder.on_samples(&[0; 64]);
        for _ in 0..100 {
            if !synced.lock().is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let recorded = synced.lock().clone();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, 1_000);
        assert_eq!(recorded[0].2.as_deref(), Some("fallback"));
        drop(recorded);

        session.shutdown();
    }
}
