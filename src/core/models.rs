//! Output configuration.

/// Controls which fields the writers include.
///
/// Sender and message text are always written.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Include timestamps in output
    pub include_timestamps: bool,
    /// Include the inferred-timestamp flag
    pub include_inferred: bool,
    /// Include sender codes and source files (debug mode records only)
    pub include_debug: bool,
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every optional field.
    pub fn all() -> Self {
        Self {
            include_timestamps: true,
            include_inferred: true,
            include_debug: true,
        }
    }

    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.include_timestamps = true;
        self
    }

    #[must_use]
    pub fn with_inferred_flag(mut self) -> Self {
        self.include_inferred = true;
        self
    }

    #[must_use]
    pub fn with_debug(mut self) -> Self {
        self.include_debug = true;
        self
    }
}
