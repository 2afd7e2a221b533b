//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), the audio and UI sub-configs,
//! `AppPaths` for the platform config directory, construction-time
//! validation (`ConfigError`) and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AudioConfig, ConfigError, ThemeConfig, UiConfig, WaveformStyle};
