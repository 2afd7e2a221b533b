//! Host audio-session resource.
//!
//! Some platforms require an audio session to be activated before input can
//! be captured and deactivated afterwards.  Failures here are never fatal:
//! the capture session logs them as warnings and carries on with the
//! start/stop transition.

use thiserror::Error;

/// Activation or deactivation of the host audio session failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("audio session {action} failed: {reason}")]
pub struct ResourceError {
    /// `"activation"` or `"deactivation"`.
    pub action: &'static str,
    pub reason: String,
}

/// Best-effort host audio session.
pub trait SessionResource {
    fn activate(&mut self) -> Result<(), ResourceError>;
    fn deactivate(&mut self) -> Result<(), ResourceError>;
}

/// Desktop audio session.
///
/// cpal hosts have no session object to configure, so this only tracks
/// whether the session is active.  Deactivating an inactive session is
/// reported as an error so mismatched calls show up in the logs.
#[derive(Debug, Default)]
pub struct HostSession {
    active: bool,
}

impl HostSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl SessionResource for HostSession {
    fn activate(&mut self) -> Result<(), ResourceError> {
        if self.active {
            log::debug!("audio session already active");
        }
        self.active = true;
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), ResourceError> {
        if !self.active {
            return Err(ResourceError {
                action: "deactivation",
                reason: "session was not active".into(),
            });
        }
        self.active = false;
        Ok(())
    }
}
