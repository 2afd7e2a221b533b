//! Capture session: owns the live stream and routes every frame into the
//! rolling buffers.
//!
//! [`CaptureSession`] is driven from the UI/control thread (`start`, `stop`,
//! `toggle`, snapshots).  Frames arrive on the audio host's callback thread
//! through a [`FrameTap`], which holds its own `Arc` of the [`SharedSinks`]
//! and the generation it was registered for.
//!
//! # Sequencing
//!
//! Both buffers live in one [`SinkPair`] behind a single mutex.  `start()`
//! clears them and opens a new generation; `stop()` closes the generation
//! and clears them under the same lock.  A tap only appends while its
//! generation is the open one, so once `stop()` returns no in-flight frame
//! from the old stream can reach the buffers, and a stale tap never writes
//! into a later recording.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::audio::{
    first_channel, reduce, CaptureBackend, CaptureError, RollingBuffer, SessionResource,
    StreamFormat,
};
use crate::config::{AudioConfig, ConfigError};

use super::state::CaptureState;

// ---------------------------------------------------------------------------
// CaptureStats
// ---------------------------------------------------------------------------

/// Frame counters since the last `start()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Frames appended to both buffers.
    pub frames_accepted: u64,
    /// Frames with no usable channel data.
    pub frames_skipped: u64,
    /// Frames that arrived for a closed generation and were dropped.
    pub frames_discarded: u64,
}

// ---------------------------------------------------------------------------
// SinkPair / SharedSinks
// ---------------------------------------------------------------------------

/// The raw sample history and the decimated envelope, mutated together.
#[derive(Debug)]
pub struct SinkPair {
    samples: RollingBuffer<f32>,
    envelope: RollingBuffer<f32>,
    generation: u64,
    accepting: bool,
    stats: CaptureStats,
}

impl SinkPair {
    /// Create both buffers empty and closed.
    pub fn new(sample_capacity: usize, envelope_capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            samples: RollingBuffer::new(sample_capacity)?,
            envelope: RollingBuffer::new(envelope_capacity)?,
            generation: 0,
            accepting: false,
            stats: CaptureStats::default(),
        })
    }

    /// Clear both buffers and start accepting frames for a new generation.
    fn open(&mut self) -> u64 {
        self.samples.clear();
        self.envelope.clear();
        self.stats = CaptureStats::default();
        self.generation = self.generation.wrapping_add(1);
        self.accepting = true;
        self.generation
    }

    /// Stop accepting frames and clear both buffers.
    fn close(&mut self) {
        self.accepting = false;
        self.samples.clear();
        self.envelope.clear();
    }

    fn accepts(&self, generation: u64) -> bool {
        self.accepting && self.generation == generation
    }
}

/// Rolling buffers shared between the session and the audio callback.
///
/// Lock for a short critical section only; the audio thread waits on the
/// same mutex.
pub type SharedSinks = Arc<Mutex<SinkPair>>;

/// A poisoned lock still guards consistent buffers: every `SinkPair`
/// mutation completes before any code that could panic runs.
fn lock_sinks(sinks: &Mutex<SinkPair>) -> MutexGuard<'_, SinkPair> {
    sinks.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// FrameTap
// ---------------------------------------------------------------------------

/// Per-stream frame handler registered with the capture backend.
///
/// Decoding and reduction happen before the lock is taken, so the critical
/// section is two bounded appends.
pub struct FrameTap {
    sinks: SharedSinks,
    generation: u64,
    channels: usize,
    ratio: usize,
}

impl FrameTap {
    /// Route one interleaved frame into the buffers.
    pub fn on_frame(&self, interleaved: &[f32]) {
        let frame = first_channel(interleaved, self.channels).map(|samples| {
            let reduced = reduce(&samples, self.ratio);
            (samples, reduced)
        });

        let mut sinks = lock_sinks(&self.sinks);
        if !sinks.accepts(self.generation) {
            sinks.stats.frames_discarded += 1;
            return;
        }

        match frame {
            Ok((samples, reduced)) => {
                sinks.samples.append(&samples);
                sinks.envelope.append(&reduced);
                sinks.stats.frames_accepted += 1;
            }
            Err(warning) => {
                sinks.stats.frames_skipped += 1;
                drop(sinks);
                log::warn!("capture: skipping frame: {warning}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SinkReader
// ---------------------------------------------------------------------------

/// Read-only handle on the session's buffers for any thread.
#[derive(Clone)]
pub struct SinkReader {
    sinks: SharedSinks,
}

impl SinkReader {
    /// Raw samples, oldest first.
    pub fn sample_snapshot(&self) -> Vec<f32> {
        lock_sinks(&self.sinks).samples.snapshot()
    }

    /// Envelope points, oldest first.
    pub fn envelope_snapshot(&self) -> Vec<f32> {
        lock_sinks(&self.sinks).envelope.snapshot()
    }

    /// `(samples, envelope)` read under one lock.
    pub fn snapshots(&self) -> (Vec<f32>, Vec<f32>) {
        let sinks = lock_sinks(&self.sinks);
        (sinks.samples.snapshot(), sinks.envelope.snapshot())
    }

    /// `(samples.len(), envelope.len())`.
    pub fn lens(&self) -> (usize, usize) {
        let sinks = lock_sinks(&self.sinks);
        (sinks.samples.len(), sinks.envelope.len())
    }

    pub fn stats(&self) -> CaptureStats {
        lock_sinks(&self.sinks).stats
    }
}

// ---------------------------------------------------------------------------
// CaptureSession
// ---------------------------------------------------------------------------

/// Orchestrates start/stop of the capture backend and owns both buffers.
///
/// One session exists per process.  It holds at most one live stream
/// handle; every `start()` registers a fresh callback and every `stop()`
/// releases it.
pub struct CaptureSession<B: CaptureBackend, R: SessionResource> {
    backend: B,
    resource: R,
    sinks: SharedSinks,
    ratio: usize,
    preferred_sample_rate: u32,
    state: CaptureState,
    stream: Option<B::Handle>,
    format: Option<StreamFormat>,
}

impl<B: CaptureBackend, R: SessionResource> CaptureSession<B, R> {
    /// Create an idle session.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` has a zero capacity or ratio,
    /// or a capacity smaller than the ratio.
    pub fn new(config: &AudioConfig, backend: B, resource: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let sinks = SinkPair::new(config.sample_capacity, config.visualization_capacity())?;

        Ok(Self {
            backend,
            resource,
            sinks: Arc::new(Mutex::new(sinks)),
            ratio: config.decimation_ratio,
            preferred_sample_rate: config.preferred_sample_rate,
            state: CaptureState::Idle,
            stream: None,
            format: None,
        })
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// `Idle | Error → Recording | Error`.  No-op while recording.
    pub fn start(&mut self) {
        if self.state.is_recording() {
            log::debug!("session: start ignored, already recording");
            return;
        }

        if let Err(err) = self.resource.activate() {
            log::warn!("session: {err}");
        }

        match self.open_stream() {
            Ok(format) => {
                log::info!(
                    "session: {} → Recording ({} Hz, {} ch)",
                    self.state.label(),
                    format.sample_rate,
                    format.channels
                );
                self.format = Some(format);
                self.state = CaptureState::Recording;
            }
            Err(err) => {
                let reason = err.to_string();
                log::error!("session: start failed: {reason}");
                if let Err(err) = self.resource.deactivate() {
                    log::warn!("session: {err}");
                }
                self.state = CaptureState::Error(reason);
            }
        }
    }

    /// `Recording → Idle`.  No-op in `Idle` and `Error`.
    ///
    /// When this returns, no further frame will be appended and both buffers
    /// are empty.
    pub fn stop(&mut self) {
        if !self.state.is_recording() {
            log::debug!("session: stop ignored in {} state", self.state.label());
            return;
        }

        lock_sinks(&self.sinks).close();

        if let Some(handle) = self.stream.take() {
            self.backend.stop(handle);
        }

        if let Err(err) = self.resource.deactivate() {
            log::warn!("session: {err}");
        }

        self.format = None;
        self.state = CaptureState::Idle;
        log::info!("session: Recording → Idle");
    }

    /// `start()` when idle or failed, `stop()` when recording.
    pub fn toggle(&mut self) {
        if self.state.is_recording() {
            self.stop();
        } else {
            self.start();
        }
    }

    fn open_stream(&mut self) -> Result<StreamFormat, CaptureError> {
        if let Some(stale) = self.stream.take() {
            self.backend.stop(stale);
        }

        let format = self.backend.native_format()?;
        format.validate()?;

        if format.sample_rate != f64::from(self.preferred_sample_rate) {
            log::info!(
                "session: device rate {} Hz differs from preferred {} Hz; using device rate",
                format.sample_rate,
                self.preferred_sample_rate
            );
        }

        let generation = lock_sinks(&self.sinks).open();
        let tap = FrameTap {
            sinks: Arc::clone(&self.sinks),
            generation,
            channels: format.channels as usize,
            ratio: self.ratio,
        };

        match self
            .backend
            .start(Box::new(move |frame: &[f32]| tap.on_frame(frame)))
        {
            Ok(handle) => {
                self.stream = Some(handle);
                Ok(format)
            }
            Err(err) => {
                lock_sinks(&self.sinks).close();
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Format of the running stream; `None` unless recording.
    pub fn stream_format(&self) -> Option<StreamFormat> {
        self.format
    }

    pub fn decimation_ratio(&self) -> usize {
        self.ratio
    }

    /// Raw sample history, oldest first.
    pub fn sample_snapshot(&self) -> Vec<f32> {
        lock_sinks(&self.sinks).samples.snapshot()
    }

    /// Visualization series, oldest first.  Polled by the renderer.
    pub fn envelope_snapshot(&self) -> Vec<f32> {
        lock_sinks(&self.sinks).envelope.snapshot()
    }

    pub fn stats(&self) -> CaptureStats {
        lock_sinks(&self.sinks).stats
    }

    /// A cloneable reader for polling the buffers from another thread.
    pub fn reader(&self) -> SinkReader {
        SinkReader {
            sinks: Arc::clone(&self.sinks),
        }
    }
}

impl<B: CaptureBackend, R: SessionResource> Drop for CaptureSession<B, R> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{FrameCallback, ResourceError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Shared view of what the mock backend was asked to do.  The registered
    /// callback is kept after `stop()` so tests can deliver a late frame.
    #[derive(Clone, Default)]
    struct Probe {
        callback: Arc<Mutex<Option<FrameCallback>>>,
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    impl Probe {
        fn deliver(&self, frame: &[f32]) {
            if let Some(callback) = self.callback.lock().unwrap().as_mut() {
                callback(frame);
            }
        }

        fn take_callback(&self) -> FrameCallback {
            self.callback.lock().unwrap().take().expect("no callback registered")
        }
    }

    struct MockBackend {
        format: StreamFormat,
        start_error: Option<String>,
        probe: Probe,
    }

    impl MockBackend {
        fn mono() -> Self {
            Self::with_format(44_100.0, 1)
        }

        fn with_format(sample_rate: f64, channels: u32) -> Self {
            Self {
                format: StreamFormat {
                    sample_rate,
                    channels,
                },
                start_error: None,
                probe: Probe::default(),
            }
        }
    }

    impl CaptureBackend for MockBackend {
        type Handle = usize;

        fn native_format(&mut self) -> Result<StreamFormat, CaptureError> {
            Ok(self.format)
        }

        fn start(&mut self, on_frame: FrameCallback) -> Result<usize, CaptureError> {
            if let Some(reason) = &self.start_error {
                return Err(CaptureError::Unavailable(reason.clone()));
            }
            *self.probe.callback.lock().unwrap() = Some(on_frame);
            Ok(self.probe.starts.fetch_add(1, Ordering::SeqCst))
        }

        fn stop(&mut self, _handle: usize) {
            self.probe.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct MockResource {
        fail_activate: bool,
        fail_deactivate: bool,
        activations: Arc<AtomicUsize>,
        deactivations: Arc<AtomicUsize>,
    }

    impl SessionResource for MockResource {
        fn activate(&mut self) -> Result<(), ResourceError> {
            self.activations.fetch_add(1, Ordering::SeqCst);
            if self.fail_activate {
                return Err(ResourceError {
                    action: "activation",
                    reason: "denied".into(),
                });
            }
            Ok(())
        }

        fn deactivate(&mut self) -> Result<(), ResourceError> {
            self.deactivations.fetch_add(1, Ordering::SeqCst);
            if self.fail_deactivate {
                return Err(ResourceError {
                    action: "deactivation",
                    reason: "busy".into(),
                });
            }
            Ok(())
        }
    }

    fn audio_config(sample_capacity: usize, decimation_ratio: usize) -> AudioConfig {
        AudioConfig {
            sample_capacity,
            decimation_ratio,
            ..AudioConfig::default()
        }
    }

    fn session(
        sample_capacity: usize,
        ratio: usize,
        backend: MockBackend,
    ) -> (CaptureSession<MockBackend, MockResource>, Probe) {
        let probe = backend.probe.clone();
        let session = CaptureSession::new(
            &audio_config(sample_capacity, ratio),
            backend,
            MockResource::default(),
        )
        .expect("valid config");
        (session, probe)
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn new_session_is_idle_and_empty() {
        let (session, _) = session(1_000, 10, MockBackend::mono());
        assert_eq!(session.state(), &CaptureState::Idle);
        assert!(session.sample_snapshot().is_empty());
        assert!(session.envelope_snapshot().is_empty());
        assert_eq!(session.stream_format(), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let zero_ratio = CaptureSession::new(
            &audio_config(1_000, 0),
            MockBackend::mono(),
            MockResource::default(),
        );
        assert_eq!(zero_ratio.err(), Some(ConfigError::ZeroDecimationRatio));

        let zero_capacity = CaptureSession::new(
            &audio_config(0, 10),
            MockBackend::mono(),
            MockResource::default(),
        );
        assert_eq!(zero_capacity.err(), Some(ConfigError::ZeroCapacity));
    }

    // -----------------------------------------------------------------------
    // Frame routing
    // -----------------------------------------------------------------------

    #[test]
    fn frames_fill_both_buffers_with_eviction() {
        let (mut session, probe) = session(5, 1, MockBackend::mono());
        session.start();
        assert!(session.is_recording());

        probe.deliver(&[1.0, 2.0, 3.0]);
        probe.deliver(&[4.0, 5.0, 6.0, 7.0]);

        assert_eq!(session.sample_snapshot(), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(session.envelope_snapshot(), vec![1.5, 2.0, 2.5, 3.0, 3.5]);
        assert_eq!(session.stats().frames_accepted, 2);
    }

    #[test]
    fn envelope_is_decimated_per_frame() {
        let (mut session, probe) = session(30, 3, MockBackend::mono());
        session.start();

        probe.deliver(&[0.1, -0.2, 0.3, -0.4, 0.5]);
        probe.deliver(&[-0.6]);

        let envelope = session.envelope_snapshot();
        assert_eq!(envelope.len(), 3);
        for (got, want) in envelope.iter().zip([0.05_f32, 0.2, 0.3]) {
            assert!((got - want).abs() < 1e-6, "{envelope:?}");
        }
        assert_eq!(session.sample_snapshot().len(), 6);
    }

    #[test]
    fn envelope_capacity_is_sample_capacity_over_ratio() {
        let (mut session, probe) = session(20, 4, MockBackend::mono());
        session.start();

        probe.deliver(&[0.5; 64]);

        assert_eq!(session.sample_snapshot().len(), 20);
        assert_eq!(session.envelope_snapshot().len(), 5);
    }

    #[test]
    fn stereo_frames_use_first_channel() {
        let (mut session, probe) = session(10, 1, MockBackend::with_format(48_000.0, 2));
        session.start();

        probe.deliver(&[0.2, 0.9, -0.4, 0.9]);

        assert_eq!(session.sample_snapshot(), vec![0.2, -0.4]);
        assert_eq!(session.stream_format().map(|f| f.channels), Some(2));
    }

    #[test]
    fn bad_frames_are_skipped_without_state_change() {
        let (mut session, probe) = session(10, 1, MockBackend::with_format(48_000.0, 2));
        session.start();

        probe.deliver(&[]);
        probe.deliver(&[0.1, 0.2, 0.3]);
        probe.deliver(&[0.5, 0.0]);

        assert!(session.is_recording());
        assert_eq!(session.sample_snapshot(), vec![0.5]);
        let stats = session.stats();
        assert_eq!(stats.frames_skipped, 2);
        assert_eq!(stats.frames_accepted, 1);
    }

    // -----------------------------------------------------------------------
    // Start failures
    // -----------------------------------------------------------------------

    #[test]
    fn zero_sample_rate_moves_to_error_without_consuming_frames() {
        let (mut session, probe) = session(1_000, 10, MockBackend::with_format(0.0, 1));
        session.start();

        assert!(matches!(session.state(), CaptureState::Error(_)));
        assert_eq!(probe.starts.load(Ordering::SeqCst), 0);
        assert!(probe.callback.lock().unwrap().is_none());
        assert!(session.sample_snapshot().is_empty());
        assert!(session.envelope_snapshot().is_empty());
    }

    #[test]
    fn zero_channels_moves_to_error() {
        let (mut session, _) = session(1_000, 10, MockBackend::with_format(44_100.0, 0));
        session.start();
        assert_eq!(session.state().label(), "Error");
    }

    #[test]
    fn backend_start_failure_moves_to_error_and_closes_generation() {
        let mut backend = MockBackend::mono();
        backend.start_error = Some("permission denied".into());
        let (mut session, _) = session(10, 1, backend);

        session.start();

        assert_eq!(
            session.state().error_message(),
            Some("audio stream unavailable: permission denied")
        );
        assert!(session.sample_snapshot().is_empty());
    }

    #[test]
    fn start_is_retried_from_error() {
        let mut backend = MockBackend::mono();
        backend.start_error = Some("device busy".into());
        let (mut session, probe) = session(10, 1, backend);

        session.start();
        assert!(matches!(session.state(), CaptureState::Error(_)));

        session.backend.start_error = None;
        session.toggle();

        assert!(session.is_recording());
        probe.deliver(&[0.25]);
        assert_eq!(session.sample_snapshot(), vec![0.25]);
    }

    #[test]
    fn stop_in_error_state_is_a_no_op() {
        let (mut session, probe) = session(1_000, 10, MockBackend::with_format(0.0, 1));
        session.start();
        session.stop();

        assert!(matches!(session.state(), CaptureState::Error(_)));
        assert_eq!(probe.stops.load(Ordering::SeqCst), 0);
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    #[test]
    fn stop_clears_both_buffers_and_releases_stream() {
        let (mut session, probe) = session(100, 10, MockBackend::mono());
        session.start();
        probe.deliver(&[0.3; 50]);
        assert!(!session.sample_snapshot().is_empty());

        session.stop();

        assert_eq!(session.state(), &CaptureState::Idle);
        assert_eq!(session.reader().lens(), (0, 0));
        assert_eq!(probe.stops.load(Ordering::SeqCst), 1);
        assert_eq!(session.stream_format(), None);
    }

    #[test]
    fn stop_while_idle_is_a_no_op() {
        let (mut session, probe) = session(100, 10, MockBackend::mono());
        session.stop();
        session.stop();

        assert_eq!(session.state(), &CaptureState::Idle);
        assert_eq!(probe.stops.load(Ordering::SeqCst), 0);
        assert_eq!(session.resource.deactivations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn late_frame_after_stop_is_discarded() {
        let (mut session, probe) = session(100, 10, MockBackend::mono());
        session.start();
        probe.deliver(&[0.1; 10]);
        session.stop();

        // The platform delivers one more buffer after deregistration.
        probe.deliver(&[0.9; 10]);

        assert!(session.sample_snapshot().is_empty());
        assert!(session.envelope_snapshot().is_empty());
        assert_eq!(session.stats().frames_discarded, 1);
    }

    #[test]
    fn stale_tap_cannot_write_into_next_recording() {
        let (mut session, probe) = session(100, 1, MockBackend::mono());
        session.start();
        let mut stale = probe.take_callback();
        session.stop();

        session.start();
        stale(&[0.9; 4]);
        probe.deliver(&[0.1, 0.2]);

        assert_eq!(session.sample_snapshot(), vec![0.1, 0.2]);
    }

    #[test]
    fn activation_failure_still_starts_recording() {
        let backend = MockBackend::mono();
        let probe = backend.probe.clone();
        let resource = MockResource {
            fail_activate: true,
            ..MockResource::default()
        };
        let mut session =
            CaptureSession::new(&audio_config(100, 10), backend, resource).unwrap();

        session.start();

        assert!(session.is_recording());
        assert_eq!(session.resource.activations.load(Ordering::SeqCst), 1);
        probe.deliver(&[0.3, -0.6]);
        assert_eq!(session.sample_snapshot(), vec![0.3, -0.6]);
    }

    #[test]
    fn deactivation_failure_is_not_fatal() {
        let backend = MockBackend::mono();
        let probe = backend.probe.clone();
        let resource = MockResource {
            fail_deactivate: true,
            ..MockResource::default()
        };
        let mut session =
            CaptureSession::new(&audio_config(100, 10), backend, resource).unwrap();

        session.start();
        session.stop();

        assert_eq!(session.state(), &CaptureState::Idle);
        assert_eq!(probe.stops.load(Ordering::SeqCst), 1);
        assert!(session.sample_snapshot().is_empty());
    }

    #[test]
    fn restart_begins_with_empty_buffers() {
        let (mut session, probe) = session(100, 10, MockBackend::mono());
        session.start();
        probe.deliver(&[0.4; 30]);
        session.stop();
        session.start();

        assert!(session.sample_snapshot().is_empty());
        assert!(session.envelope_snapshot().is_empty());
        assert_eq!(probe.starts.load(Ordering::SeqCst), 2);
    }

    // -----------------------------------------------------------------------
    // Toggle / lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn toggle_alternates_between_idle_and_recording() {
        let (mut session, probe) = session(100, 10, MockBackend::mono());

        session.toggle();
        assert!(session.is_recording());
        session.toggle();
        assert_eq!(session.state(), &CaptureState::Idle);
        session.toggle();
        assert!(session.is_recording());

        assert_eq!(probe.starts.load(Ordering::SeqCst), 2);
        assert_eq!(probe.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_while_recording_is_a_no_op() {
        let (mut session, probe) = session(100, 10, MockBackend::mono());
        session.start();
        probe.deliver(&[0.5; 10]);
        session.start();

        assert_eq!(probe.starts.load(Ordering::SeqCst), 1);
        assert_eq!(session.sample_snapshot().len(), 10);
    }

    #[test]
    fn resource_is_activated_and_deactivated_once_per_recording() {
        let (mut session, _) = session(100, 10, MockBackend::mono());
        let activations = Arc::clone(&session.resource.activations);
        let deactivations = Arc::clone(&session.resource.deactivations);

        session.start();
        session.stop();

        assert_eq!(activations.load(Ordering::SeqCst), 1);
        assert_eq!(deactivations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_a_recording_session_releases_the_stream() {
        let (mut session, probe) = session(100, 10, MockBackend::mono());
        session.start();
        drop(session);
        assert_eq!(probe.stops.load(Ordering::SeqCst), 1);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    /// Snapshots taken while the producer runs are always a contiguous run
    /// of the produced sequence: no gaps, no duplicates, never over capacity.
    #[test]
    fn snapshots_are_consistent_under_concurrent_appends() {
        const CAPACITY: usize = 64;
        let (mut session, probe) = session(CAPACITY, 1, MockBackend::mono());
        session.start();
        let reader = session.reader();

        let producer = {
            let probe = probe.clone();
            thread::spawn(move || {
                for frame in 0..2_000_u32 {
                    let batch: Vec<f32> = (frame * 7..frame * 7 + 7).map(|v| v as f32).collect();
                    probe.deliver(&batch);
                }
            })
        };

        for _ in 0..500 {
            let snapshot = reader.sample_snapshot();
            assert!(snapshot.len() <= CAPACITY);
            for pair in snapshot.windows(2) {
                assert_eq!(pair[1], pair[0] + 1.0, "torn snapshot: {snapshot:?}");
            }
        }

        producer.join().unwrap();
        let last = reader.sample_snapshot();
        assert_eq!(last.len(), CAPACITY);
        assert_eq!(last.last().copied(), Some((2_000 * 7 - 1) as f32));
    }

    /// Once `stop()` returns, frames still arriving from the producer never
    /// show up in a snapshot.
    #[test]
    fn no_append_observed_after_stop_returns() {
        let (mut session, probe) = session(256, 4, MockBackend::mono());
        session.start();
        let reader = session.reader();
        let running = Arc::new(AtomicBool::new(true));

        let producer = {
            let probe = probe.clone();
            let running = Arc::clone(&running);
            thread::spawn(move || {
                while running.load(Ordering::SeqCst) {
                    probe.deliver(&[0.5; 32]);
                }
            })
        };

        while reader.lens().0 == 0 {
            thread::yield_now();
        }
        session.stop();

        for _ in 0..200 {
            assert_eq!(reader.lens(), (0, 0));
            thread::yield_now();
        }

        running.store(false, Ordering::SeqCst);
        producer.join().unwrap();
        assert_eq!(reader.lens(), (0, 0));
        assert!(reader.stats().frames_discarded > 0 || reader.stats().frames_accepted > 0);
    }
}
