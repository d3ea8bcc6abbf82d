/*!
 * PDF page source.
 *
 * Interprets page content streams with lopdf and reports every shown glyph
 * and every painted image XObject in user space (points, y up). Glyph
 * positions follow the text rendering matrix; advances come from the font's
 * width tables. Text is mapped through the font's ToUnicode CMap when one is
 * present and falls back to Latin-1 otherwise.
 */

use image::{DynamicImage, GrayImage, ImageOutputFormat, RgbImage};
use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::ExtractionError;

use super::geometry::{Bounds, PositionedGlyph, PositionedImage, RawPage};
use super::source::PageSource;

const MAX_FORM_DEPTH: usize = 8;
const MAX_REFERENCE_HOPS: usize = 32;
const MAX_CMAP_RANGE: u32 = 0x1_0000;

static BFCHAR_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)beginbfchar(.*?)endbfchar").expect("valid bfchar regex"));
static BFRANGE_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)beginbfrange(.*?)endbfrange").expect("valid bfrange regex"));
static CMAP_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([0-9A-Fa-f\s]*)>|\[|\]").expect("valid cmap token regex"));

/// Page source reading a PDF file
#[derive(Debug)]
pub struct PdfPageSource {
    path: Option<PathBuf>,
    document: Option<lopdf::Document>,
    page_ids: Vec<ObjectId>,
}

impl PdfPageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let document = lopdf::Document::load(path)
            .map_err(|e| ExtractionError::Open(format!("{}: {}", path.display(), e)))?;
        let mut source = Self::from_document(document)?;
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractionError> {
        let document = lopdf::Document::load_mem(bytes).map_err(|e| ExtractionError::Open(e.to_string()))?;
        Self::from_document(document)
    }

    fn from_document(document: lopdf::Document) -> Result<Self, ExtractionError> {
        if document.is_encrypted() {
            return Err(ExtractionError::Open("encrypted documents are not supported".to_string()));
        }
        // get_pages is keyed by 1-based page number, so values come out in page order
        let page_ids = document.get_pages().into_values().collect();
        Ok(Self {
            path: None,
            document: Some(document),
            page_ids,
        })
    }
}

impl PageSource for PdfPageSource {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page(&mut self, number: usize) -> Result<RawPage, ExtractionError> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| ExtractionError::Open("document already closed".to_string()))?;
        let page_id = number
            .checked_sub(1)
            .and_then(|index| self.page_ids.get(index))
            .copied()
            .ok_or_else(|| ExtractionError::Page {
                page: number,
                message: format!("page out of range (1..={})", self.page_ids.len()),
            })?;

        let page_error = |message: String| ExtractionError::Page { page: number, message };
        let content = document.get_page_content(page_id).map_err(|e| page_error(e.to_string()))?;
        let content = Content::decode(&content).map_err(|e| page_error(e.to_string()))?;

        let mut interpreter = Interpreter::new(document);
        interpreter.run(&content.operations, page_resources(document, page_id), 0);
        Ok(interpreter.finish())
    }

    fn origin(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn close(&mut self) {
        self.document = None;
        self.page_ids.clear();
    }
}

/// Affine transform in PDF row-vector convention
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self` applied first, then `other`
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }
}

/// Width and text mapping for one font resource
#[derive(Debug, Default)]
struct FontInfo {
    widths: HashMap<u32, f64>,
    default_width: f64,
    two_byte: bool,
    to_unicode: Option<HashMap<u32, String>>,
}

impl FontInfo {
    fn fallback() -> Self {
        Self {
            default_width: 500.0,
            ..Self::default()
        }
    }

    fn load(document: &lopdf::Document, font: &Dictionary) -> Self {
        let to_unicode = font
            .get(b"ToUnicode")
            .ok()
            .and_then(|obj| match resolve(document, obj) {
                Object::Stream(stream) => stream_bytes(stream),
                _ => None,
            })
            .map(|bytes| parse_to_unicode(&String::from_utf8_lossy(&bytes)));

        if name_of(font.get(b"Subtype").ok()) == Some(b"Type0".as_slice()) {
            let descendant = font
                .get(b"DescendantFonts")
                .ok()
                .and_then(|obj| match resolve(document, obj) {
                    Object::Array(fonts) => fonts.first().and_then(|f| resolve_dict(document, f)),
                    _ => None,
                });
            let default_width = descendant
                .and_then(|d| d.get(b"DW").ok())
                .and_then(|obj| number(resolve(document, obj)))
                .unwrap_or(1000.0);
            let widths = descendant
                .and_then(|d| d.get(b"W").ok())
                .map(|obj| parse_cid_widths(document, resolve(document, obj)))
                .unwrap_or_default();
            return Self {
                widths,
                default_width,
                two_byte: true,
                to_unicode,
            };
        }

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|obj| number(resolve(document, obj)))
            .unwrap_or(0.0) as u32;
        let mut widths = HashMap::new();
        if let Some(Object::Array(values)) = font.get(b"Widths").ok().map(|obj| resolve(document, obj)) {
            for (offset, value) in values.iter().enumerate() {
                let Some(code) = u32::try_from(offset).ok().and_then(|offset| first_char.checked_add(offset)) else {
                    break;
                };
                if let Some(width) = number(resolve(document, value)) {
                    widths.insert(code, width);
                }
            }
        }

        let is_monospaced = name_of(font.get(b"BaseFont").ok())
            .is_some_and(|name| String::from_utf8_lossy(name).contains("Courier"));
        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|obj| resolve_dict(document, obj))
            .and_then(|descriptor| descriptor.get(b"MissingWidth").ok())
            .and_then(|obj| number(resolve(document, obj)))
            .filter(|width| *width > 0.0);

        Self {
            widths,
            default_width: missing_width.unwrap_or(if is_monospaced { 600.0 } else { 500.0 }),
            two_byte: false,
            to_unicode,
        }
    }

    /// Split a shown string into (code, text, width in glyph units)
    fn decode(&self, bytes: &[u8]) -> Vec<(u32, String, f64)> {
        let codes: Vec<u32> = if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
                .collect()
        } else {
            bytes.iter().map(|&b| b as u32).collect()
        };

        codes
            .into_iter()
            .map(|code| {
                let text = self
                    .to_unicode
                    .as_ref()
                    .and_then(|map| map.get(&code).cloned())
                    .unwrap_or_else(|| {
                        if self.two_byte {
                            char::from_u32(code).map(String::from).unwrap_or_default()
                        } else {
                            char::from(code as u8).to_string()
                        }
                    });
                let width = self.widths.get(&code).copied().unwrap_or(self.default_width);
                (code, text, width)
            })
            .collect()
    }
}

/// Text state parameters, saved and restored with the graphics state
#[derive(Debug, Clone)]
struct TextState {
    font: Option<Arc<FontInfo>>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

struct Interpreter<'a> {
    document: &'a lopdf::Document,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_cache: HashMap<ObjectId, Arc<FontInfo>>,
    glyphs: Vec<PositionedGlyph>,
    images: Vec<PositionedImage>,
}

impl<'a> Interpreter<'a> {
    fn new(document: &'a lopdf::Document) -> Self {
        Self {
            document,
            state: GraphicsState {
                ctm: Matrix::IDENTITY,
                text: TextState::default(),
            },
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_cache: HashMap::new(),
            glyphs: Vec::new(),
            images: Vec::new(),
        }
    }

    fn finish(self) -> RawPage {
        RawPage::new(self.glyphs, self.images)
    }

    fn run(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: usize) {
        for operation in operations {
            let operands = &operation.operands;
            let numbers: Vec<f64> = operands.iter().filter_map(number).collect();

            match operation.operator.as_str() {
                "q" => self.saved.push(self.state.clone()),
                "Q" => {
                    if let Some(state) = self.saved.pop() {
                        self.state = state;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_slice(&numbers) {
                        self.state.ctm = m.then(&self.state.ctm);
                    }
                }
                "BT" => {
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let (Some(name), Some(size)) = (name_of(operands.first()), numbers.first()) {
                        self.state.text.font = Some(self.font(resources, name));
                        self.state.text.size = *size;
                    }
                }
                "Tc" => self.set_text_param(&numbers, |t, v| t.char_spacing = v),
                "Tw" => self.set_text_param(&numbers, |t, v| t.word_spacing = v),
                "Tz" => self.set_text_param(&numbers, |t, v| t.horizontal_scale = v / 100.0),
                "TL" => self.set_text_param(&numbers, |t, v| t.leading = v),
                "Ts" => self.set_text_param(&numbers, |t, v| t.rise = v),
                "Td" => {
                    if let [tx, ty] = numbers[..] {
                        self.move_line(tx, ty);
                    }
                }
                "TD" => {
                    if let [tx, ty] = numbers[..] {
                        self.state.text.leading = -ty;
                        self.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_slice(&numbers) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes);
                    }
                }
                "\"" => {
                    if let (Some(aw), Some(ac), Some(Object::String(bytes, _))) =
                        (numbers.first(), numbers.get(1), operands.get(2))
                    {
                        self.state.text.word_spacing = *aw;
                        self.state.text.char_spacing = *ac;
                        self.next_line();
                        self.show(bytes);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(elements)) = operands.first() {
                        for element in elements {
                            match element {
                                Object::String(bytes, _) => self.show(bytes),
                                other => {
                                    if let Some(adjust) = number(other) {
                                        let text = &self.state.text;
                                        let tx = -adjust / 1000.0 * text.size * text.horizontal_scale;
                                        self.text_matrix = Matrix::translate(tx, 0.0).then(&self.text_matrix);
                                    }
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(name) = name_of(operands.first()) {
                        self.paint_xobject(resources, name, depth);
                    }
                }
                _ => {}
            }
        }
    }

    fn set_text_param(&mut self, numbers: &[f64], apply: impl FnOnce(&mut TextState, f64)) {
        if let Some(value) = numbers.first() {
            apply(&mut self.state.text, *value);
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    fn font(&mut self, resources: Option<&'a Dictionary>, name: &[u8]) -> Arc<FontInfo> {
        let entry = resources
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|fonts| resolve_dict(self.document, fonts))
            .and_then(|fonts| fonts.get(name).ok());

        let Some(entry) = entry else {
            debug!("Font /{} not found in resources", String::from_utf8_lossy(name));
            return Arc::new(FontInfo::fallback());
        };

        if let Object::Reference(id) = entry {
            if let Some(font) = self.font_cache.get(id) {
                return Arc::clone(font);
            }
        }

        let font = match resolve_dict(self.document, entry) {
            Some(dict) => Arc::new(FontInfo::load(self.document, dict)),
            None => Arc::new(FontInfo::fallback()),
        };
        if let Object::Reference(id) = entry {
            self.font_cache.insert(*id, Arc::clone(&font));
        }
        font
    }

    fn show(&mut self, bytes: &[u8]) {
        let font = self
            .state
            .text
            .font
            .clone()
            .unwrap_or_else(|| Arc::new(FontInfo::fallback()));

        for (code, text, width) in font.decode(bytes) {
            let state = &self.state.text;
            let rendering = Matrix::new(state.size * state.horizontal_scale, 0.0, 0.0, state.size, 0.0, state.rise)
                .then(&self.text_matrix)
                .then(&self.state.ctm);

            let advance = width / 1000.0;
            let (start_x, baseline) = rendering.apply(0.0, 0.0);
            let (end_x, _) = rendering.apply(advance, 0.0);
            let corners = [
                rendering.apply(0.0, 0.0),
                rendering.apply(advance, 0.0),
                rendering.apply(0.0, 1.0),
                rendering.apply(advance, 1.0),
            ];

            if !text.is_empty() {
                self.glyphs.push(
                    PositionedGlyph::new(text, start_x, end_x, baseline).with_bounds(Bounds::enclosing(&corners)),
                );
            }

            let word_spacing = if !font.two_byte && code == 32 { state.word_spacing } else { 0.0 };
            let tx = (advance * state.size + state.char_spacing + word_spacing) * state.horizontal_scale;
            self.text_matrix = Matrix::translate(tx, 0.0).then(&self.text_matrix);
        }
    }

    fn paint_xobject(&mut self, resources: Option<&'a Dictionary>, name: &[u8], depth: usize) {
        let document = self.document;
        let stream = resources
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|xobjects| resolve_dict(document, xobjects))
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|obj| match resolve(document, obj) {
                Object::Stream(stream) => Some(stream),
                _ => None,
            });
        let Some(stream) = stream else {
            debug!("XObject /{} not found", String::from_utf8_lossy(name));
            return;
        };

        match name_of(stream.dict.get(b"Subtype").ok()) {
            Some(b"Image") => self.paint_image(stream),
            Some(b"Form") => self.run_form(stream, resources, depth),
            _ => {}
        }
    }

    fn paint_image(&mut self, stream: &Stream) {
        let dict = &stream.dict;
        let is_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
        if is_mask {
            return;
        }

        let ctm = self.state.ctm;
        let corners = [ctm.apply(0.0, 0.0), ctm.apply(1.0, 0.0), ctm.apply(0.0, 1.0), ctm.apply(1.0, 1.0)];
        let bounds = Bounds::enclosing(&corners);

        let dimension = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|obj| number(resolve(self.document, obj)))
                .map(|v| v as u32)
        };
        let pixel_size = dimension(b"Width").zip(dimension(b"Height"));

        let payload = image_payload(self.document, stream, pixel_size);
        let mut image = PositionedImage::new(payload, bounds, self.images.len());
        if let Some((width, height)) = pixel_size {
            image = image.with_pixel_size(width, height);
        }
        self.images.push(image);
    }

    fn run_form(&mut self, stream: &'a Stream, parent_resources: Option<&'a Dictionary>, depth: usize) {
        if depth >= MAX_FORM_DEPTH {
            warn!("Form XObject nesting deeper than {} levels, skipping", MAX_FORM_DEPTH);
            return;
        }
        let Some(content) = stream_bytes(stream) else {
            return;
        };
        let operations = match Content::decode(&content) {
            Ok(content) => content.operations,
            Err(e) => {
                warn!("Skipping undecodable form XObject: {}", e);
                return;
            }
        };

        let form_matrix = match stream.dict.get(b"Matrix") {
            Ok(Object::Array(values)) => {
                let values: Vec<f64> = values.iter().filter_map(number).collect();
                Matrix::from_slice(&values).unwrap_or(Matrix::IDENTITY)
            }
            _ => Matrix::IDENTITY,
        };
        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| resolve_dict(self.document, obj))
            .or(parent_resources);

        let saved = self.state.clone();
        self.state.ctm = form_matrix.then(&self.state.ctm);
        self.run(&operations, resources, depth + 1);
        self.state = saved;
    }
}

fn resolve<'a>(document: &'a lopdf::Document, object: &'a Object) -> &'a Object {
    let mut current = object;
    for _ in 0..MAX_REFERENCE_HOPS {
        match current {
            Object::Reference(id) => match document.get_object(*id) {
                Ok(next) => current = next,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}

fn resolve_dict<'a>(document: &'a lopdf::Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(document, object) {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(*value as f64),
        _ => None,
    }
}

fn name_of(object: Option<&Object>) -> Option<&[u8]> {
    match object {
        Some(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

/// Resources of a page, inherited through the page tree
fn page_resources(document: &lopdf::Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = document.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_REFERENCE_HOPS {
        if let Some(resources) = node.get(b"Resources").ok().and_then(|obj| resolve_dict(document, obj)) {
            return Some(resources);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = document.get_dictionary(parent).ok()?;
    }
    None
}

fn filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(names)) => names
            .iter()
            .filter_map(|obj| match obj {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Stream data with its filters undone, when lopdf can undo them
fn stream_bytes(stream: &Stream) -> Option<Vec<u8>> {
    if filters(stream).is_empty() {
        return Some(stream.content.clone());
    }
    stream.decompressed_content().ok()
}

fn color_components(document: &lopdf::Document, color_space: Option<&Object>) -> Option<u32> {
    let color_space = resolve(document, color_space?);
    match color_space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceRGB" | b"CalRGB" => Some(3),
            b"DeviceGray" | b"CalGray" => Some(1),
            _ => None,
        },
        Object::Array(parts) => match name_of(parts.first()) {
            Some(b"ICCBased") => parts
                .get(1)
                .and_then(|profile| resolve_dict(document, profile))
                .and_then(|dict| dict.get(b"N").ok())
                .and_then(number)
                .map(|n| n as u32)
                .filter(|n| *n == 1 || *n == 3),
            Some(b"CalRGB") => Some(3),
            Some(b"CalGray") => Some(1),
            _ => None,
        },
        _ => None,
    }
}

/// Bytes to carry for an image XObject.
///
/// JPEG and other self-describing encodings are passed through; 8-bit gray
/// and RGB samples are re-encoded as PNG; anything else is kept as decoded
/// (or raw) bytes.
fn image_payload(document: &lopdf::Document, stream: &Stream, pixel_size: Option<(u32, u32)>) -> Vec<u8> {
    let filters = filters(stream);
    let passthrough = filters.iter().any(|f| {
        matches!(f.as_slice(), b"DCTDecode" | b"JPXDecode" | b"JBIG2Decode" | b"CCITTFaxDecode")
    });
    if passthrough {
        return stream.content.clone();
    }

    let Some(samples) = stream_bytes(stream) else {
        return stream.content.clone();
    };

    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|obj| number(resolve(document, obj)));
    let components = color_components(document, stream.dict.get(b"ColorSpace").ok());

    match (pixel_size, bits, components) {
        (Some((width, height)), Some(bits), Some(components)) if bits == 8.0 => {
            encode_png(width, height, components, &samples).unwrap_or(samples)
        }
        _ => samples,
    }
}

fn encode_png(width: u32, height: u32, components: u32, samples: &[u8]) -> Option<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(components as usize)?;
    let samples = samples.get(..len)?.to_vec();
    let image = match components {
        1 => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, samples)?),
        3 => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, samples)?),
        _ => return None,
    };
    let mut encoded = Vec::new();
    image.write_to(&mut Cursor::new(&mut encoded), ImageOutputFormat::Png).ok()?;
    Some(encoded)
}

#[derive(Debug, PartialEq)]
enum CMapToken {
    Hex(Vec<u8>),
    Open,
    Close,
}

fn cmap_tokens(section: &str) -> Vec<CMapToken> {
    CMAP_TOKEN
        .captures_iter(section)
        .map(|caps| match caps.get(1) {
            Some(hex) => CMapToken::Hex(hex_bytes(hex.as_str())),
            None if &caps[0] == "[" => CMapToken::Open,
            None => CMapToken::Close,
        })
        .collect()
}

fn hex_bytes(hex: &str) -> Vec<u8> {
    let digits: Vec<u8> = hex
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|d| d as u8)
        .collect();
    digits
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| ((pair[0] as u16) << 8) | pair.get(1).copied().unwrap_or(0) as u16)
        .collect()
}

fn utf16_text(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Parse the bfchar and bfrange sections of a ToUnicode CMap
fn parse_to_unicode(cmap: &str) -> HashMap<u32, String> {
    let mut map = HashMap::new();

    for section in BFCHAR_SECTION.captures_iter(cmap) {
        let tokens = cmap_tokens(&section[1]);
        for pair in tokens.chunks(2) {
            if let [CMapToken::Hex(src), CMapToken::Hex(dst)] = pair {
                map.insert(code_of(src), utf16_text(&utf16_units(dst)));
            }
        }
    }

    for section in BFRANGE_SECTION.captures_iter(cmap) {
        let tokens = cmap_tokens(&section[1]);
        let mut i = 0;
        while i + 2 < tokens.len() {
            let (CMapToken::Hex(lo), CMapToken::Hex(hi)) = (&tokens[i], &tokens[i + 1]) else {
                i += 1;
                continue;
            };
            let (lo, hi) = (code_of(lo), code_of(hi));
            if hi < lo || hi - lo >= MAX_CMAP_RANGE {
                i += 3;
                continue;
            }
            match &tokens[i + 2] {
                CMapToken::Hex(dst) => {
                    let base = utf16_units(dst);
                    for (offset, code) in (lo..=hi).enumerate() {
                        let mut units = base.clone();
                        if let Some(last) = units.last_mut() {
                            *last = last.wrapping_add(offset as u16);
                        }
                        map.insert(code, utf16_text(&units));
                    }
                    i += 3;
                }
                CMapToken::Open => {
                    let mut j = i + 3;
                    let mut code = Some(lo);
                    while j < tokens.len() && tokens[j] != CMapToken::Close {
                        if let CMapToken::Hex(dst) = &tokens[j] {
                            if let Some(current) = code.filter(|current| *current <= hi) {
                                map.insert(current, utf16_text(&utf16_units(dst)));
                            }
                            code = code.and_then(|current| current.checked_add(1));
                        }
                        j += 1;
                    }
                    i = j + 1;
                }
                CMapToken::Close => i += 3,
            }
        }
    }

    map
}

/// Widths from a CIDFont /W array
fn parse_cid_widths(document: &lopdf::Document, widths: &Object) -> HashMap<u32, f64> {
    let mut map = HashMap::new();
    let Object::Array(entries) = widths else {
        return map;
    };

    let mut i = 0;
    while i < entries.len() {
        let Some(first) = number(resolve(document, &entries[i])) else {
            i += 1;
            continue;
        };
        match entries.get(i + 1).map(|obj| resolve(document, obj)) {
            Some(Object::Array(list)) => {
                for (offset, width) in list.iter().enumerate() {
                    let Some(code) = u32::try_from(offset).ok().and_then(|offset| (first as u32).checked_add(offset))
                    else {
                        break;
                    };
                    if let Some(width) = number(resolve(document, width)) {
                        map.insert(code, width);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let last = number(last);
                let width = entries.get(i + 2).and_then(|obj| number(resolve(document, obj)));
                if let (Some(last), Some(width)) = (last, width) {
                    let (first, last) = (first as u32, last as u32);
                    if last >= first && last - first < MAX_CMAP_RANGE {
                        for code in first..=last {
                            map.insert(code, width);
                        }
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    map
}
