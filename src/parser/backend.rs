//! PDF decoder boundary.
//!
//! Provides a trait-based interface for obtaining per-page text spans,
//! isolating the concrete PDF library (lopdf) from the layout analysis logic.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::TextSpan;

/// Default page height (US Letter) when no MediaBox is found.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Abstract source of decoded text spans.
///
/// Implementations yield spans with font size, weight and position for one
/// page at a time, with `y` measured from the top of the page.
pub trait SpanSource {
    /// Page numbers available, ascending (1-indexed).
    fn page_numbers(&self) -> Vec<u32>;

    /// Decode the spans of a single page.
    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>>;

    /// Number of pages.
    fn page_count(&self) -> u32 {
        self.page_numbers().len() as u32
    }
}

/// In-memory span source, mostly useful for tests and pre-decoded input.
#[derive(Debug, Clone, Default)]
pub struct MemorySpanSource {
    pages: BTreeMap<u32, Vec<TextSpan>>,
}

impl MemorySpanSource {
    /// Group spans by their page number.
    pub fn new(spans: Vec<TextSpan>) -> Self {
        let mut pages: BTreeMap<u32, Vec<TextSpan>> = BTreeMap::new();
        for span in spans {
            pages.entry(span.page).or_default().push(span);
        }
        Self { pages }
    }

    /// Declare a page even if it carries no spans.
    pub fn with_page(mut self, page: u32) -> Self {
        self.pages.entry(page).or_default();
        self
    }
}

impl SpanSource for MemorySpanSource {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}

/// Validate the `%PDF-x.y` header.
pub fn check_pdf_header(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    let chars: Vec<char> = version.chars().collect();
    let valid = chars.len() == 3
        && chars[0].is_ascii_digit()
        && chars[1] == '.'
        && chars[2].is_ascii_digit();
    if !valid {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

// ---------------------------------------------------------------------------
// LopdfDecoder: decoder backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`SpanSource`] backed by `lopdf::Document`.
pub struct LopdfDecoder {
    doc: LopdfDocument,
}

impl LopdfDecoder {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        check_pdf_header(data)?;
        let doc = LopdfDocument::load_mem(data)?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Page height from the (possibly inherited) MediaBox.
    fn page_height(&self, page_id: ObjectId) -> f32 {
        let mut current = Some(page_id);
        // Bounded walk up the page tree
        for _ in 0..32 {
            let Some(id) = current else { break };
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };
            if let Ok(array) = dict.get(b"MediaBox").and_then(|m| m.as_array()) {
                if array.len() >= 4 {
                    let y0 = array[1].as_float().unwrap_or(0.0);
                    let y1 = array[3].as_float().unwrap_or(DEFAULT_PAGE_HEIGHT);
                    return (y1 - y0).abs();
                }
            }
            current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
        }
        DEFAULT_PAGE_HEIGHT
    }

    /// Get page content stream.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content is legal: it simply has no text
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return Ok(s
                        .decompressed_content()
                        .unwrap_or_else(|_| s.content.clone()));
                }
                Err(Error::PdfParse("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            let data = s
                                .decompressed_content()
                                .unwrap_or_else(|_| s.content.clone());
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            Object::Stream(s) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Walk the content stream and emit spans for every text-showing operator.
    fn parse_content_stream(
        &self,
        page_num: u32,
        page_height: f32,
        content: &[u8],
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    ) -> Result<Vec<TextSpan>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut current_font = String::new();
        let mut current_font_key: Vec<u8> = Vec::new();
        let mut current_font_size: f32 = 12.0;
        let mut leading: f32 = 0.0;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    text_matrix = TextMatrix::default();
                }
                "ET" => {
                    in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_key) = &op.operands[0] {
                            current_font_key = font_key.clone();
                            current_font = fonts
                                .get(font_key.as_slice())
                                .and_then(|f| f.get(b"BaseFont").ok())
                                .and_then(|o| o.as_name().ok())
                                .map(|n| String::from_utf8_lossy(n).to_string())
                                .unwrap_or_else(|| String::from_utf8_lossy(font_key).to_string());
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    leading = op.operands.first().and_then(get_number).unwrap_or(0.0);
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            leading = -ty;
                        }
                        text_matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        text_matrix.set(
                            get_number(&op.operands[0]).unwrap_or(1.0),
                            get_number(&op.operands[1]).unwrap_or(0.0),
                            get_number(&op.operands[2]).unwrap_or(0.0),
                            get_number(&op.operands[3]).unwrap_or(1.0),
                            get_number(&op.operands[4]).unwrap_or(0.0),
                            get_number(&op.operands[5]).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => {
                    text_matrix.next_line(leading, current_font_size);
                }
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        text_matrix.next_line(leading, current_font_size);
                    }
                    if !in_text_block {
                        continue;
                    }

                    let encoding = fonts
                        .get(&current_font_key)
                        .and_then(|f| f.get_font_encoding(&self.doc).ok());
                    let decode = |bytes: &[u8]| -> String {
                        match encoding {
                            Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                                .unwrap_or_else(|_| decode_text_simple(bytes)),
                            None => decode_text_simple(bytes),
                        }
                    };

                    let text = match op.operator.as_str() {
                        "TJ" => match op.operands.first() {
                            Some(Object::Array(arr)) => decode_tj_array(arr, decode),
                            _ => String::new(),
                        },
                        "\"" => match op.operands.get(2) {
                            Some(Object::String(bytes, _)) => decode(bytes),
                            _ => String::new(),
                        },
                        _ => match op.operands.first() {
                            Some(Object::String(bytes, _)) => decode(bytes),
                            _ => String::new(),
                        },
                    };

                    if text.trim().is_empty() {
                        continue;
                    }

                    let (x, y) = text_matrix.get_position();
                    let effective_size = current_font_size * text_matrix.get_scale();
                    let span = TextSpan::new(
                        page_num,
                        text,
                        x,
                        page_height - y,
                        effective_size,
                        current_font.clone(),
                    );
                    // Subsequent shows in the same BT continue to the right
                    text_matrix.advance(span.effective_width());
                    spans.push(span);
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

impl SpanSource for LopdfDecoder {
    fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    fn page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or_else(|| Error::PdfParse(format!("page {} not found", page_num)))?;

        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let content = self.page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let height = self.page_height(page_id);
        self.parse_content_stream(page_num, height, &content, &fonts)
    }
}

/// Decode a `TJ` array, inserting spaces at large negative kerning gaps.
fn decode_tj_array(arr: &[Object], decode: impl Fn(&[u8]) -> String) -> String {
    // Adjustments are in 1/1000 text space units; 200 is roughly a word space
    let space_threshold = 200.0;
    let mut combined = String::new();

    for item in arr {
        let adjustment = match item {
            Object::String(bytes, _) => {
                combined.push_str(&decode(bytes));
                continue;
            }
            Object::Integer(n) => -(*n as f32),
            Object::Real(n) => -n,
            _ => continue,
        };

        if adjustment > space_threshold
            && !combined.is_empty()
            && !combined.ends_with(' ')
            && !combined.ends_with('\u{00A0}')
        {
            if let Some(c) = combined.chars().last() {
                if !is_spaceless_script_char(c) {
                    combined.push(' ');
                }
            }
        }
    }
    combined
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    line_x: f32,
    line_y: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_x: 0.0,
            line_y: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
        self.line_x = e;
        self.line_y = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        // Td is relative to the start of the current line, not the pen position
        self.line_x += tx * self.a + ty * self.c;
        self.line_y += tx * self.b + ty * self.d;
        self.e = self.line_x;
        self.f = self.line_y;
    }

    fn next_line(&mut self, leading: f32, font_size: f32) {
        let leading = if leading > 0.0 { leading } else { font_size * 1.2 };
        self.translate(0.0, -leading);
    }

    fn advance(&mut self, width: f32) {
        self.e += width * self.a;
        self.f += width * self.b;
    }

    fn get_position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn get_scale(&self) -> f32 {
        // Vertical scale factor
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
///
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub(crate) fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
