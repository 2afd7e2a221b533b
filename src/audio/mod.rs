//! Audio pipeline: microphone capture → first channel → rolling buffers.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → FrameCallback(&[f32]) → first_channel
//!           → RollingBuffer (raw samples)
//!           → reduce (rectify + decimate) → RollingBuffer (envelope)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use audio_recorder::audio::{CaptureBackend, CpalCapture, RollingBuffer, reduce};
//! use std::sync::{Arc, Mutex};
//!
//! let envelope = Arc::new(Mutex::new(RollingBuffer::<f32>::new(100).unwrap()));
//! let sink = Arc::clone(&envelope);
//!
//! let mut capture = CpalCapture::new();
//! let format = capture.native_format().unwrap();
//! let handle = capture
//!     .start(Box::new(move |frame: &[f32]| {
//!         sink.lock().unwrap().append(&reduce(frame, 10));
//!     }))
//!     .unwrap();
//!
//! println!("capturing at {} Hz", format.sample_rate);
//! capture.stop(handle);
//! ```

pub mod buffer;
pub mod capture;
pub mod envelope;
pub mod resource;

pub use buffer::RollingBuffer;
pub use capture::{
    first_channel, to_f32_frame, CaptureBackend, CaptureError, CpalCapture, FrameCallback,
    FrameDecodeWarning, StreamFormat, StreamHandle,
};
pub use envelope::reduce;
pub use resource::{HostSession, ResourceError, SessionResource};
