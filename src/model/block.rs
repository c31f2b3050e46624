//! Span and block types produced by the layout stage.

use serde::{Deserialize, Serialize};

/// A text span with position and style information.
///
/// Coordinates are in points with the origin at the top-left corner of the
/// page, so `y` grows downwards in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Page number (1-indexed)
    pub page: u32,
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline, measured from the top of the page)
    pub y: f32,
    /// Width of the text (0.0 when the decoder cannot measure it)
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
}

impl TextSpan {
    /// Create a new text span, inferring boldness from the font name.
    pub fn new(
        page: u32,
        text: impl Into<String>,
        x: f32,
        y: f32,
        font_size: f32,
        font_name: impl Into<String>,
    ) -> Self {
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let is_bold = lower.contains("bold")
            || lower.contains("black")
            || lower.contains("heavy");

        Self {
            page,
            text: text.into(),
            x,
            y,
            width: 0.0,
            font_size,
            font_name,
            is_bold,
        }
    }

    /// Override the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.is_bold = bold;
        self
    }

    /// Set the measured width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Width used for gap computations: measured when known, estimated otherwise.
    pub fn effective_width(&self) -> f32 {
        if self.width > 0.0 {
            self.width
        } else {
            // Assume half of the font size per character
            self.text.chars().count() as f32 * self.font_size * 0.5
        }
    }

    /// Right edge of the span.
    pub fn right(&self) -> f32 {
        self.x + self.effective_width()
    }

    /// Whether the span carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One or more adjacent spans merged on the same visual line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Page number (1-indexed)
    pub page: u32,
    /// Merged text
    pub text: String,
    /// Dominant font size of the merged spans
    pub font_size: f32,
    /// Dominant bold flag of the merged spans
    pub is_bold: bool,
    /// Minimum left X of the merged spans (indentation proxy)
    pub x: f32,
    /// Baseline Y position (from the top of the page)
    pub y: f32,
    /// Number of spans merged into this block
    pub span_count: usize,
}

impl TextBlock {
    /// Create a single-span block.
    pub fn new(
        page: u32,
        text: impl Into<String>,
        font_size: f32,
        is_bold: bool,
        x: f32,
        y: f32,
    ) -> Self {
        Self {
            page,
            text: text.into(),
            font_size,
            is_bold,
            x,
            y,
            span_count: 1,
        }
    }

    /// Share of non-whitespace characters that are alphabetic.
    pub fn alpha_ratio(&self) -> f32 {
        let visible: Vec<char> = self.text.chars().filter(|c| !c.is_whitespace()).collect();
        if visible.is_empty() {
            return 0.0;
        }
        let alpha = visible.iter().filter(|c| c.is_alphabetic()).count();
        alpha as f32 / visible.len() as f32
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
