//! Layout extraction options and configuration.

/// Options for turning decoded spans into text blocks.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode for per-page decode failures
    pub error_mode: ErrorMode,

    /// Baselines within `font_size * y_tolerance_ratio` share a visual line
    pub y_tolerance_ratio: f32,

    /// Spans on one line merge while the horizontal gap stays below
    /// `font_size * x_gap_ratio`
    pub x_gap_ratio: f32,

    /// Identical spans whose origins differ by at most this many points are
    /// treated as overprinted duplicates
    pub dedup_tolerance: f32,

    /// Identical lines on one page closer than this many points vertically
    /// are treated as duplicates
    pub duplicate_line_tolerance: f32,

    /// Apply Unicode NFC normalization and ligature expansion to span text
    pub normalize_text: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to decode).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the vertical line-merge tolerance (fraction of font size).
    pub fn with_y_tolerance_ratio(mut self, ratio: f32) -> Self {
        self.y_tolerance_ratio = ratio;
        self
    }

    /// Set the horizontal gap tolerance (fraction of font size).
    pub fn with_x_gap_ratio(mut self, ratio: f32) -> Self {
        self.x_gap_ratio = ratio;
        self
    }

    /// Set the overprint dedup tolerance in points.
    pub fn with_dedup_tolerance(mut self, points: f32) -> Self {
        self.dedup_tolerance = points;
        self
    }

    /// Enable or disable text normalization.
    pub fn with_normalize_text(mut self, normalize: bool) -> Self {
        self.normalize_text = normalize;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            y_tolerance_ratio: 0.3,
            x_gap_ratio: 1.5,
            dedup_tolerance: 1.0,
            duplicate_line_tolerance: 2.0,
            normalize_text: true,
        }
    }
}

/// Error handling mode during span decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the document on any page error
    Strict,
    /// Skip pages that fail to decode and continue
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_error_mode(ErrorMode::Strict)
            .with_y_tolerance_ratio(0.5)
            .with_x_gap_ratio(2.0)
            .with_normalize_text(false);

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.y_tolerance_ratio, 0.5);
        assert_eq!(options.x_gap_ratio, 2.0);
        assert!(!options.normalize_text);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.normalize_text);
        assert_eq!(ExtractOptions::new().lenient().error_mode, ErrorMode::Lenient);
    }
}
