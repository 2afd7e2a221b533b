//! Microphone capture via `cpal`.
//!
//! [`CaptureBackend`] is the seam between the capture session and the audio
//! host: it reports the device's native [`StreamFormat`] and drives a frame
//! callback with interleaved `f32` samples.  [`CpalCapture`] implements it
//! for the default input device; the returned [`StreamHandle`] is a RAII
//! guard; dropping it stops the underlying cpal stream.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use thiserror::Error;

// ---------------------------------------------------------------------------
// StreamFormat
// ---------------------------------------------------------------------------

/// Native format reported by the input device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamFormat {
    /// Sample rate in Hz (e.g. 44100, 48000).
    pub sample_rate: f64,
    /// Number of interleaved channels (1 = mono, 2 = stereo, …).
    pub channels: u32,
}

impl StreamFormat {
    /// Reject formats no frame could be decoded from.
    ///
    /// ```
    /// use audio_recorder::audio::StreamFormat;
    ///
    /// let ok = StreamFormat { sample_rate: 48_000.0, channels: 2 };
    /// assert!(ok.validate().is_ok());
    ///
    /// let silent = StreamFormat { sample_rate: 0.0, channels: 1 };
    /// assert!(silent.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 || self.channels == 0 {
            return Err(CaptureError::InvalidFormat {
                sample_rate: self.sample_rate,
                channels: self.channels,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// The input stream could not be opened or started.  Surfaced as
/// `CaptureState::Error`; recoverable by retrying `start()`.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("input device reported an unusable format ({sample_rate} Hz, {channels} channels)")]
    InvalidFormat { sample_rate: f64, channels: u32 },

    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("input device uses an unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio stream unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// FrameDecodeWarning
// ---------------------------------------------------------------------------

/// A delivered frame had no usable channel data.  The frame is skipped and
/// logged; the session state does not change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameDecodeWarning {
    #[error("empty frame")]
    Empty,

    #[error("frame of {len} samples is not a whole number of {channels}-channel frames")]
    Misaligned { len: usize, channels: usize },
}

/// Extract the first channel from an interleaved frame.
///
/// Mono input is returned as-is; no other channels are mixed in.
///
/// ```
/// use audio_recorder::audio::first_channel;
///
/// let left = first_channel(&[0.1, 0.9, 0.2, 0.8], 2).unwrap();
/// assert_eq!(left.as_ref(), &[0.1, 0.2]);
/// ```
pub fn first_channel(
    interleaved: &[f32],
    channels: usize,
) -> Result<std::borrow::Cow<'_, [f32]>, FrameDecodeWarning> {
    use std::borrow::Cow;

    let channels = channels.max(1);
    if interleaved.is_empty() {
        return Err(FrameDecodeWarning::Empty);
    }
    if interleaved.len() % channels != 0 {
        return Err(FrameDecodeWarning::Misaligned {
            len: interleaved.len(),
            channels,
        });
    }
    if channels == 1 {
        return Ok(Cow::Borrowed(interleaved));
    }
    Ok(Cow::Owned(interleaved.iter().step_by(channels).copied().collect()))
}

/// Convert one buffer of device samples to `f32` in `[-1.0, 1.0]`.
///
/// ```
/// use audio_recorder::audio::to_f32_frame;
///
/// assert_eq!(to_f32_frame(&[i16::MIN, 0]), vec![-1.0, 0.0]);
/// ```
pub fn to_f32_frame<T>(data: &[T]) -> Vec<f32>
where
    T: cpal::Sample,
    f32: cpal::FromSample<T>,
{
    data.iter().map(|&s| s.to_sample::<f32>()).collect()
}

// ---------------------------------------------------------------------------
// CaptureBackend
// ---------------------------------------------------------------------------

/// Per-frame callback: receives one hardware buffer of interleaved samples.
///
/// Runs on the audio host's real-time thread.
pub type FrameCallback = Box<dyn FnMut(&[f32]) + Send + 'static>;

/// Source of live input frames.
pub trait CaptureBackend {
    /// Keeps the stream alive; handed back to [`stop`](Self::stop).
    type Handle;

    /// Format of the input stream the next [`start`](Self::start) will open.
    fn native_format(&mut self) -> Result<StreamFormat, CaptureError>;

    /// Open the input stream and deliver frames to `on_frame` until the
    /// returned handle is passed to [`stop`](Self::stop).
    fn start(&mut self, on_frame: FrameCallback) -> Result<Self::Handle, CaptureError>;

    /// Release the stream.
    fn stop(&mut self, handle: Self::Handle);
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Dropping this value drops the `cpal::Stream`, which stops the underlying
/// hardware stream.
pub struct StreamHandle {
    stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CpalCapture
// ---------------------------------------------------------------------------

/// Capture backend for the system default input device.
///
/// The device is looked up again on every [`native_format`] call so a
/// retried `start()` picks up a device that appeared after a failure.
///
/// [`native_format`]: CaptureBackend::native_format
///
/// ```rust,no_run
/// use audio_recorder::audio::{CaptureBackend, CpalCapture};
///
/// let mut capture = CpalCapture::new();
/// let format = capture.native_format().unwrap();
/// let handle = capture
///     .start(Box::new(|frame: &[f32]| println!("{} samples", frame.len())))
///     .unwrap();
/// // ...
/// capture.stop(handle);
/// # let _ = format;
/// ```
#[derive(Default)]
pub struct CpalCapture {
    opened: Option<OpenedDevice>,
}

struct OpenedDevice {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
}

impl CpalCapture {
    /// Create a backend; no device is touched until `native_format()`.
    pub fn new() -> Self {
        Self::default()
    }

    fn open_default() -> Result<OpenedDevice, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        Ok(OpenedDevice {
            device,
            config,
            sample_format,
        })
    }
}

impl CaptureBackend for CpalCapture {
    type Handle = StreamHandle;

    fn native_format(&mut self) -> Result<StreamFormat, CaptureError> {
        let opened = Self::open_default()?;
        let format = StreamFormat {
            sample_rate: f64::from(opened.config.sample_rate.0),
            channels: u32::from(opened.config.channels),
        };
        self.opened = Some(opened);
        Ok(format)
    }

    fn start(&mut self, on_frame: FrameCallback) -> Result<StreamHandle, CaptureError> {
        let opened = match self.opened.take() {
            Some(opened) => opened,
            None => Self::open_default()?,
        };

        let stream = match opened.sample_format {
            cpal::SampleFormat::F32 => build_f32_stream(&opened, on_frame)?,
            cpal::SampleFormat::I16 => build_converting_stream::<i16>(&opened, on_frame)?,
            cpal::SampleFormat::U16 => build_converting_stream::<u16>(&opened, on_frame)?,
            cpal::SampleFormat::I32 => build_converting_stream::<i32>(&opened, on_frame)?,
            other => return Err(CaptureError::UnsupportedSampleFormat(format!("{other:?}"))),
        };

        stream.play()?;
        log::info!(
            "capture: input stream running ({} Hz, {} ch, {:?})",
            opened.config.sample_rate.0,
            opened.config.channels,
            opened.sample_format
        );
        Ok(StreamHandle { stream })
    }

    fn stop(&mut self, handle: StreamHandle) {
        if let Err(err) = handle.stream.pause() {
            log::debug!("capture: pause before drop failed: {err}");
        }
        drop(handle);
        log::info!("capture: input stream released");
    }
}

/// Build an input stream for an `f32` device; buffers reach `on_frame`
/// without a copy.
fn build_f32_stream(
    opened: &OpenedDevice,
    mut on_frame: FrameCallback,
) -> Result<cpal::Stream, CaptureError> {
    let stream = opened.device.build_input_stream(
        &opened.config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| on_frame(data),
        log_stream_error,
        None, // no timeout
    )?;
    Ok(stream)
}

/// Build an input stream for integer sample type `T`, converting every
/// buffer to `f32` before handing it to `on_frame`.
fn build_converting_stream<T>(
    opened: &OpenedDevice,
    mut on_frame: FrameCallback,
) -> Result<cpal::Stream, CaptureError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let stream = opened.device.build_input_stream(
        &opened.config,
        move |data: &[T], _: &cpal::InputCallbackInfo| on_frame(&to_f32_frame(data)),
        log_stream_error,
        None,
    )?;
    Ok(stream)
}

fn log_stream_error(err: cpal::StreamError) {
    log::error!("cpal stream error: {err}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
