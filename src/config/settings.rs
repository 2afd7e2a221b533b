//! Application settings structs, defaults, validation and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Values are read once at
//! startup; nothing here is reconfigurable after the capture session exists.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AppPaths;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Invalid construction parameters.  Fatal: reported once at startup and
/// never recovered from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error("decimation ratio must be at least 1")]
    ZeroDecimationRatio,

    #[error(
        "sample capacity {capacity} is smaller than the decimation ratio {ratio}; \
         the visualization buffer would be empty"
    )]
    CapacityBelowRatio { capacity: usize, ratio: usize },

    #[error("waveform height must be positive (got {0})")]
    InvalidWaveformHeight(f32),
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for the streaming sample pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Number of raw samples kept in the rolling history.
    pub sample_capacity: usize,
    /// Keep every N-th rectified sample for the visualization buffer.
    pub decimation_ratio: usize,
    /// Preferred capture rate in Hz.  Advisory only: the rate reported by the
    /// input device always wins.
    pub preferred_sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_capacity: 1_000,
            decimation_ratio: 10,
            preferred_sample_rate: 44_100,
        }
    }
}

impl AudioConfig {
    /// Capacity of the visualization buffer: `sample_capacity / decimation_ratio`.
    ///
    /// ```
    /// use audio_recorder::config::AudioConfig;
    ///
    /// assert_eq!(AudioConfig::default().visualization_capacity(), 100);
    /// ```
    pub fn visualization_capacity(&self) -> usize {
        self.sample_capacity
            .checked_div(self.decimation_ratio)
            .unwrap_or(0)
    }

    /// Check the capacity / ratio relationship.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.decimation_ratio == 0 {
            return Err(ConfigError::ZeroDecimationRatio);
        }
        if self.sample_capacity < self.decimation_ratio {
            return Err(ConfigError::CapacityBelowRatio {
                capacity: self.sample_capacity,
                ratio: self.decimation_ratio,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WaveformStyle
// ---------------------------------------------------------------------------

/// How the envelope is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaveformStyle {
    /// A connected polyline through every envelope point.
    #[default]
    Line,
    /// One mirrored vertical bar per envelope point.
    Bars,
}

// ---------------------------------------------------------------------------
// ThemeConfig
// ---------------------------------------------------------------------------

/// Window colours as `[r, g, b]` triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub background: [u8; 3],
    /// Fill behind the waveform canvas.
    pub secondary_background: [u8; 3],
    /// Waveform stroke.
    pub accent: [u8; 3],
    /// Bar fill in the `Bars` style.
    pub secondary_accent: [u8; 3],
    pub text: [u8; 3],
    pub secondary_text: [u8; 3],
    /// Button fill while idle ("Record").
    pub record_button: [u8; 3],
    /// Button fill while recording ("Stop").
    pub stop_button: [u8; 3],
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            secondary_background: [40, 40, 40],
            accent: [52, 199, 89],
            secondary_accent: [175, 82, 222],
            text: [255, 255, 255],
            secondary_text: [142, 142, 147],
            record_button: [52, 199, 89],
            stop_button: [255, 59, 48],
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// eframe window and waveform canvas settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Initial inner window size `(width, height)` in points.
    pub window_size: (f32, f32),
    /// Height of the waveform canvas in points.
    pub waveform_height: f32,
    /// Vertical scale `k`: a point `p` is drawn `p * height * k` above the
    /// centre line.
    pub amplitude_scale: f32,
    pub style: WaveformStyle,
    /// Repaint cadence while recording, in milliseconds.
    pub repaint_interval_ms: u64,
    pub stroke_width: f32,
    pub theme: ThemeConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (360.0, 220.0),
            waveform_height: 100.0,
            amplitude_scale: 0.5,
            style: WaveformStyle::default(),
            repaint_interval_ms: 33,
            stroke_width: 2.0,
            theme: ThemeConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use audio_recorder::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Capture pipeline settings.
    pub audio: AudioConfig,
    /// Window / waveform settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate every construction parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.audio.validate()?;
        let height = self.ui.waveform_height;
        if height.is_nan() || height <= 0.0 {
            return Err(ConfigError::InvalidWaveformHeight(height));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
