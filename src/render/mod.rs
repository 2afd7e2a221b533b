//! Waveform rendering: envelope snapshot → canvas geometry.
//!
//! The UI polls `CaptureSession::envelope_snapshot()` on its own repaint
//! cadence and passes the result to [`Renderer::render`] (polyline) or
//! [`Renderer::render_bars`] (bars).  Nothing here holds state between
//! calls.

pub mod waveform;

pub use waveform::{Bar, Point, Renderer, WaveformPath, DEFAULT_AMPLITUDE_SCALE};
