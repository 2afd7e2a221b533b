//! Capture session state machine.
//!
//! ```text
//! Idle  ──start()──▶ Recording | Error(reason)
//! Error ──start()──▶ Recording | Error(reason)
//! Recording ──stop()──▶ Idle
//! Recording ──frame──▶ Recording      (bad frames are skipped, not errors)
//! ```
//!
//! The UI polls [`CaptureState`] on every repaint; nothing is pushed.

/// Current phase of the capture session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// No stream is open.
    #[default]
    Idle,

    /// The input stream is open and frames are flowing into the buffers.
    Recording,

    /// The last `start()` failed.  Retried by calling `start()` again.
    Error(String),
}

impl CaptureState {
    /// Returns `true` while frames are being captured.
    ///
    /// ```
    /// use audio_recorder::session::CaptureState;
    ///
    /// assert!(!CaptureState::Idle.is_recording());
    /// assert!(CaptureState::Recording.is_recording());
    /// assert!(!CaptureState::Error("no device".into()).is_recording());
    /// ```
    pub fn is_recording(&self) -> bool {
        matches!(self, CaptureState::Recording)
    }

    /// The failure reason in the `Error` state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            CaptureState::Error(reason) => Some(reason),
            _ => None,
        }
    }

    /// Short label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            CaptureState::Idle => "Idle",
            CaptureState::Recording => "Recording",
            CaptureState::Error(_) => "Error",
        }
    }

    /// Caption of the record button: what `toggle()` will do next.
    pub fn action_label(&self) -> &'static str {
        if self.is_recording() {
            "Stop"
        } else {
            "Record"
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
