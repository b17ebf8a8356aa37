//! Event Bridge
//!
//! Crosses from the real-time decode context to the control context, where
//! synchronization side effects are allowed to block. The decode side never
//! blocks: accepted readings land in three independently updated atomics and
//! a fire-and-forget wake token. The control side waits, drains every token
//! that piled up while it was busy, and dispatches exactly one action for
//! the whole burst.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, info};

use crate::addressing::SLOT_STOP_ALL;
use crate::config::PLAYLIST_NONE;
use crate::host::{PlaylistStore, SyncTransport};
use crate::Result;

/// Playlist name prefix used when resolving user bits to a playlist
pub const PLAYLIST_PREFIX: &str = "smpte-pl";

/// Wake token capacity. Tokens are signals, not payloads: once the buffer is
/// full a wake is already guaranteed, so overflow is harmless.
const WAKE_CAPACITY: usize = 64;

/// One coalesced synchronization trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncEvent {
    /// Target position in milliseconds (already slot-adjusted)
    pub position_ms: u64,
    /// Auxiliary bits decoded alongside the timecode
    pub user_bits: u32,
    /// Slot index or one of the `addressing` sentinels
    pub slot_index: i32,
}

/// Latest accepted decode snapshot, shared between contexts
///
/// Three independent atomics rather than one locked record: the fields only
/// need eventual consistency with each other, and the decode context must
/// never block.
#[derive(Debug, Default)]
pub struct DecodeShared {
    position_ms: AtomicU64,
    user_bits: AtomicU32,
    slot_index: AtomicI32,
    shutdown: AtomicBool,
}

impl DecodeShared {
    /// Create an empty snapshot
    pub fn new() -> Self {
        DecodeShared::default()
    }

    /// Publish one accepted reading (decode context)
    pub fn publish(&self, position_ms: u64, user_bits: u32, slot_index: i32) {
        self.position_ms.store(position_ms, Ordering::Relaxed);
        self.user_bits.store(user_bits, Ordering::Relaxed);
        self.slot_index.store(slot_index, Ordering::Relaxed);
    }

    /// Read the latest reading (control context)
    pub fn snapshot(&self) -> SyncEvent {
        SyncEvent {
            position_ms: self.position_ms.load(Ordering::Relaxed),
            user_bits: self.user_bits.load(Ordering::Relaxed),
            slot_index: self.slot_index.load(Ordering::Relaxed),
        }
    }

    /// Ask the control loop to exit after its next wake
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// True once shutdown has been requested
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Wake-and-drain notification primitive
///
/// The decode side writes tokens without ever blocking; the control side
/// blocks on [`wait`](Self::wait) and then [`drain`](Self::drain)s whatever
/// burst accumulated, coalescing it into a single action.
#[derive(Clone)]
pub struct WakeSignal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl WakeSignal {
    /// Create a wake signal with a fixed token buffer
    pub fn new() -> Self {
        let (tx, rx) = bounded(WAKE_CAPACITY);
        WakeSignal { tx, rx }
    }

    /// Fire-and-forget wake; never blocks, a full buffer is already a wake
    pub fn notify(&self) {
        let _ = self.tx.try_send(());
    }

    /// Block until at least one token arrives. Returns false only if every
    /// sender is gone.
    pub fn wait(&self) -> bool {
        self.rx.recv().is_ok()
    }

    /// Drain all pending tokens without blocking; returns how many were
    /// coalesced
    pub fn drain(&self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-context handler: waits for decode bursts and dispatches one
/// synchronization action per burst
pub struct EventBridge<T, P> {
    shared: Arc<DecodeShared>,
    wake: WakeSignal,
    transport: T,
    store: P,
    fallback_playlist: String,
    act_as_master: bool,
}

impl<T: SyncTransport, P: PlaylistStore> EventBridge<T, P> {
    /// Create a bridge over a transport and playlist store
    ///
    /// `fallback_playlist` is used when the user-bits playlist does not
    /// exist; the `"--none--"` sentinel (or an empty string) suppresses
    /// positional dispatch entirely.
    pub fn new(
        shared: Arc<DecodeShared>,
        wake: WakeSignal,
        transport: T,
        store: P,
        fallback_playlist: impl Into<String>,
        act_as_master: bool,
    ) -> Self {
        EventBridge {
            shared,
            wake,
            transport,
            store,
            fallback_playlist: fallback_playlist.into(),
            act_as_master,
        }
    }

    /// Wait for one burst, coalesce it, and dispatch a single action.
    /// Returns false when the loop should exit (shutdown or senders gone).
    pub fn run_once(&self) -> bool {
        if !self.wake.wait() {
            return false;
        }
        let coalesced = self.wake.drain();
        if self.shared.shutdown_requested() {
            return false;
        }
        let event = self.shared.snapshot();
        debug!(
            "dispatching sync event at {}ms (coalesced {} wakes)",
            event.position_ms,
            coalesced + 1
        );
        self.dispatch(&event);
        true
    }

    /// Dispatch one synchronization action for a coalesced event
    pub fn dispatch(&self, event: &SyncEvent) {
        if event.slot_index == SLOT_STOP_ALL {
            self.transport.stop_all();
            return;
        }
        match self.resolve_playlist(event.user_bits) {
            Some(playlist) => self.transport.sync_to(
                event.position_ms,
                event.slot_index,
                Some(&playlist),
                self.act_as_master,
            ),
            None => debug!(
                "no playlist resolved for user bits {}; sync suppressed",
                event.user_bits
            ),
        }
    }

    /// Resolve the target playlist: user-bits convention first, then the
    /// configured fallback
    fn resolve_playlist(&self, user_bits: u32) -> Option<String> {
        let name = format!("{PLAYLIST_PREFIX}-{user_bits}");
        if self.store.exists(&name) {
            return Some(name);
        }
        if self.fallback_playlist.is_empty() || self.fallback_playlist == PLAYLIST_NONE {
            None
        } else {
            Some(self.fallback_playlist.clone())
        }
    }

    /// Drive [`run_once`](Self::run_once) on a dedicated control thread
    /// until shutdown
    pub fn spawn(self) -> Result<JoinHandle<()>>
    where
        T: 'static,
        P: 'static,
    {
        let handle = std::thread::Builder::new()
            .name("ltc-sync-bridge".into())
            .spawn(move || {
                while self.run_once() {}
                info!("sync bridge stopped");
            })?;
        Ok(handle)
    }
}
