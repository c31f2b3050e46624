//! PDF decoding and layout feature extraction.

mod backend;
mod layout;
mod normalize;
mod options;

pub use backend::{check_pdf_header, decode_text_simple, LopdfDecoder, MemorySpanSource, SpanSource};
pub use layout::LayoutExtractor;
pub use normalize::normalize_text;
pub use options::{ErrorMode, ExtractOptions};
