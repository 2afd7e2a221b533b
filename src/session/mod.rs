//! Capture session: the state machine that owns the live input stream and
//! both rolling buffers.
//!
//! # Architecture
//!
//! ```text
//! UI thread                         audio thread
//! ─────────                         ────────────
//! CaptureSession::toggle()
//!   ├─ start(): clear sinks, open generation, backend.start(FrameTap)
//!   │                                 FrameTap::on_frame(&[f32])
//!   │                                   └─ lock SharedSinks
//!   │                                        ├─ samples.append
//!   │                                        └─ envelope.append(reduce(..))
//!   └─ stop(): close generation + clear (same lock), backend.stop(handle)
//!
//! CaptureSession::envelope_snapshot() ── lock ──▶ Vec<f32> ──▶ Renderer
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audio_recorder::audio::{CpalCapture, HostSession};
//! use audio_recorder::config::AudioConfig;
//! use audio_recorder::session::CaptureSession;
//!
//! let mut session =
//!     CaptureSession::new(&AudioConfig::default(), CpalCapture::new(), HostSession::new())
//!         .unwrap();
//! session.toggle(); // start
//! let envelope = session.envelope_snapshot();
//! session.toggle(); // stop
//! # let _ = envelope;
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{CaptureSession, CaptureStats, FrameTap, SharedSinks, SinkPair, SinkReader};
pub use state::CaptureState;
