//! Microphone capture-and-visualize library.
//!
//! ```text
//! cpal callback → FrameTap::on_frame → SampleSink
//!                                    → reduce → VisualizationSink → Renderer
//! ```

pub mod app;
pub mod audio;
pub mod config;
pub mod render;
pub mod session;
