/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Render configuration.

/// Width of the separator banner.
pub const BANNER_WIDTH: usize = 68;

/// Layout options for rendered reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Name column width at nesting level zero.
    pub base_width: usize,
    /// Extra name column width per nesting level.
    pub width_step: usize,
    /// Line printed before each message segment.
    pub banner: String,
    /// Byte shown instead of SOH in the original message text.
    pub delimiter: u8,
    /// Whether the parser validates checksums before rendering.
    pub validate_checksum: bool,
}

impl RenderConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_width: 32,
            width_step: 4,
            banner: "-".repeat(BANNER_WIDTH),
            delimiter: b'|',
            validate_checksum: false,
        }
    }

    /// Sets the name column width at level zero.
    #[must_use]
    pub const fn with_base_width(mut self, width: usize) -> Self {
        self.base_width = width;
        self
    }

    /// Sets the width added per nesting level.
    #[must_use]
    pub const fn with_width_step(mut self, step: usize) -> Self {
        self.width_step = step;
        self
    }

    /// Sets the separator banner.
    #[must_use]
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Sets the visible delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether checksums are validated.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Returns the name column width at the given nesting level.
    #[must_use]
    pub const fn width(&self, level: usize) -> usize {
        self.base_width + self.width_step * level
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}
