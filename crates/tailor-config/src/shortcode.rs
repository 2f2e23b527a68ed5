//! Template-callable shortcodes.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

/// A function templates can call to substitute a value into rendered output.
pub trait Shortcode: Send + Sync {
    /// Render the shortcode with the given call arguments.
    fn render(&self, args: &[Value]) -> Result<String, ShortcodeError>;
}

/// Errors that can occur while rendering a shortcode.
#[derive(Debug, thiserror::Error)]
pub enum ShortcodeError {
    #[error("System clock is set before the Unix epoch")]
    ClockBeforeEpoch,

    #[error("Shortcode failed: {0}")]
    Failed(String),
}

/// Cache-busting version stamp: the current time in milliseconds since the
/// Unix epoch, read on every call.
///
/// Two calls within the same millisecond return the same value.
#[derive(Debug, Clone, Copy)]
pub struct VersionShortcode {
    clock: fn() -> SystemTime,
}

impl VersionShortcode {
    /// Create a version shortcode backed by the system clock.
    pub fn new() -> Self {
        Self {
            clock: SystemTime::now,
        }
    }

    /// Create a version shortcode reading from `clock`.
    pub fn with_clock(clock: fn() -> SystemTime) -> Self {
        Self { clock }
    }

    /// The current version stamp.
    pub fn version(&self) -> Result<String, ShortcodeError> {
        let elapsed = (self.clock)()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ShortcodeError::ClockBeforeEpoch)?;

        Ok(elapsed.as_millis().to_string())
    }
}

impl Default for VersionShortcode {
    fn default() -> Self {
        Self::new()
    }
}

impl Shortcode for VersionShortcode {
    fn render(&self, _args: &[Value]) -> Result<String, ShortcodeError> {
        self.version()
    }
}
