//! Application entry point for Audio Recorder.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Validate it; an invalid capacity / ratio aborts startup.
//! 4. Build the [`CaptureSession`] around the default cpal input device.
//! 5. Run [`eframe::run_native`], which blocks the main thread until the window
//!    is closed.

use anyhow::Result;
use audio_recorder::{
    app::RecorderApp,
    audio::{CpalCapture, HostSession},
    config::{AppConfig, UiConfig},
    session::CaptureSession,
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &UiConfig) -> eframe::NativeOptions {
    let (width, height) = config.window_size;
    let viewport = egui::ViewportBuilder::default()
        .with_title("Audio Recorder")
        .with_inner_size([width, height])
        .with_min_inner_size([240.0, 160.0]);

    eframe::NativeOptions {
        viewport,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Audio Recorder starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Construction parameters are fatal when wrong
    if let Err(err) = config.validate() {
        log::error!("invalid configuration: {err}");
        return Err(err.into());
    }

    // 4. Capture session (the device is opened on the first Record press)
    let session = CaptureSession::new(&config.audio, CpalCapture::new(), HostSession::new())?;
    log::info!(
        "capture session ready: {} samples, ratio {}, {} envelope points",
        config.audio.sample_capacity,
        config.audio.decimation_ratio,
        config.audio.visualization_capacity()
    );

    // 5. Window
    let app = RecorderApp::new(session, config.ui.clone());
    let options = native_options(&config.ui);

    eframe::run_native(
        "Audio Recorder",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("window exited with error: {e}"))
}
