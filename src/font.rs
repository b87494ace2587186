use crate::error::CertError;
use crate::types::Pt;
use crate::winansi;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use ttf_parser::GlyphId;

/// Width of a string set in a given face. Implementations must be pure and
/// linear in `size`; fit-to-width relies on it.
pub trait TextMeasure {
    fn measure_width(&self, text: &str, size: Pt) -> Pt;
}

/// The four faces a certificate is typeset with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontRole {
    Bold,
    Regular,
    Italic,
    Display,
}

impl FontRole {
    pub const ALL: [FontRole; 4] = [
        FontRole::Bold,
        FontRole::Regular,
        FontRole::Italic,
        FontRole::Display,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontRole::Bold => "bold",
            FontRole::Regular => "regular",
            FontRole::Italic => "italic",
            FontRole::Display => "display",
        }
    }

    /// File looked up under `<assets>/fonts/` when no override is configured.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            FontRole::Bold => "Montserrat-Bold.ttf",
            FontRole::Regular => "Montserrat-Regular.ttf",
            FontRole::Italic => "Montserrat-LightItalic.ttf",
            FontRole::Display => "Oswald-Bold.ttf",
        }
    }
}

impl fmt::Display for FontRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base-14 faces every PDF viewer provides without embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance of the glyph a viewer draws for `ch`: its cp1252 glyph, or
    /// `?` when the encoding has no code for it.
    fn advance(&self, ch: char) -> u16 {
        let table = match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        table[(winansi::drawn_code(ch) - winansi::FIRST_CODE) as usize]
    }
}

impl TextMeasure for StandardFont {
    fn measure_width(&self, text: &str, size: Pt) -> Pt {
        let total_units: i32 = text
            .chars()
            .fold(0i32, |acc, ch| acc.saturating_add(self.advance(ch) as i32));
        if total_units <= 0 {
            return Pt::ZERO;
        }
        size.mul_ratio(total_units, 1000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontProgramKind {
    TrueType,
    OpenTypeCff,
}

#[derive(Debug)]
pub(crate) struct FontMetrics {
    pub(crate) first_char: u8,
    pub(crate) last_char: u8,
    pub(crate) widths: Vec<u16>,
    pub(crate) ascent: i16,
    pub(crate) descent: i16,
    pub(crate) cap_height: i16,
    pub(crate) italic_angle: i16,
    pub(crate) stem_v: i16,
    pub(crate) bbox: (i16, i16, i16, i16),
    pub(crate) missing_width: u16,
    pub(crate) is_fixed_pitch: bool,
    pub(crate) embeddable: bool,
    symbolic: bool,
}

/// A font program read from a font file, with the metrics needed to measure
/// and embed it.
#[derive(Debug)]
pub struct EmbeddedFont {
    pub(crate) name: String,
    pub(crate) data: Arc<[u8]>,
    pub(crate) metrics: FontMetrics,
    pub(crate) program_kind: FontProgramKind,
}

impl EmbeddedFont {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TextMeasure for EmbeddedFont {
    fn measure_width(&self, text: &str, size: Pt) -> Pt {
        self.metrics.measure_text_width(size, text)
    }
}

#[derive(Debug)]
pub enum Typeface {
    Embedded(EmbeddedFont),
    Standard(StandardFont),
}

impl Typeface {
    /// Parses a TrueType or OpenType program. `source_name` is used for the
    /// font name when the file carries no name table entries.
    pub fn parse(data: Arc<[u8]>, source_name: &str) -> Result<Typeface, CertError> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|err| CertError::font_embed(source_name, err.to_string()))?;
        let name = font_name(&face, Path::new(source_name));
        let (metrics, program_kind) = FontMetrics::from_face(&face);
        drop(face);
        Ok(Typeface::Embedded(EmbeddedFont {
            name,
            data,
            metrics,
            program_kind,
        }))
    }

    pub fn standard(font: StandardFont) -> Typeface {
        Typeface::Standard(font)
    }

    pub fn name(&self) -> &str {
        match self {
            Typeface::Embedded(font) => font.name(),
            Typeface::Standard(font) => font.base_font(),
        }
    }

    pub fn is_standard(&self) -> bool {
        matches!(self, Typeface::Standard(_))
    }
}

impl TextMeasure for Typeface {
    fn measure_width(&self, text: &str, size: Pt) -> Pt {
        match self {
            Typeface::Embedded(font) => font.measure_width(text, size),
            Typeface::Standard(font) => font.measure_width(text, size),
        }
    }
}

/// Outcome of resolving one role: the configured file, or the face that
/// stands in for it.
#[derive(Debug, Clone)]
pub enum FontChoice {
    Loaded(Arc<Typeface>),
    Fallback(Arc<Typeface>),
}

impl FontChoice {
    pub fn typeface(&self) -> &Arc<Typeface> {
        match self {
            FontChoice::Loaded(face) | FontChoice::Fallback(face) => face,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FontChoice::Fallback(_))
    }
}

/// Faces for one build. Roles that fall back share the `Arc` of the face
/// they fall back to, so the renderer embeds that face once.
#[derive(Debug, Clone)]
pub struct FontSet {
    bold: FontChoice,
    regular: FontChoice,
    italic: FontChoice,
    display: FontChoice,
}

impl FontSet {
    /// Applies the role fallbacks: bold to Helvetica-Bold, regular to
    /// Helvetica, italic to regular, display to bold.
    pub fn resolve(
        bold: Option<Arc<Typeface>>,
        regular: Option<Arc<Typeface>>,
        italic: Option<Arc<Typeface>>,
        display: Option<Arc<Typeface>>,
    ) -> FontSet {
        let bold = match bold {
            Some(face) => FontChoice::Loaded(face),
            None => FontChoice::Fallback(Arc::new(Typeface::standard(StandardFont::HelveticaBold))),
        };
        let regular = match regular {
            Some(face) => FontChoice::Loaded(face),
            None => FontChoice::Fallback(Arc::new(Typeface::standard(StandardFont::Helvetica))),
        };
        let italic = match italic {
            Some(face) => FontChoice::Loaded(face),
            None => FontChoice::Fallback(regular.typeface().clone()),
        };
        let display = match display {
            Some(face) => FontChoice::Loaded(face),
            None => FontChoice::Fallback(bold.typeface().clone()),
        };
        for (role, choice) in [
            (FontRole::Bold, &bold),
            (FontRole::Regular, &regular),
            (FontRole::Italic, &italic),
            (FontRole::Display, &display),
        ] {
            if choice.is_fallback() {
                log::debug!(
                    "font role {} falls back to {}",
                    role,
                    choice.typeface().name()
                );
            }
        }
        FontSet {
            bold,
            regular,
            italic,
            display,
        }
    }

    /// All four roles on the built-in faces.
    pub fn standard() -> FontSet {
        FontSet::resolve(None, None, None, None)
    }

    pub fn choice(&self, role: FontRole) -> &FontChoice {
        match role {
            FontRole::Bold => &self.bold,
            FontRole::Regular => &self.regular,
            FontRole::Italic => &self.italic,
            FontRole::Display => &self.display,
        }
    }

    pub fn get(&self, role: FontRole) -> &Arc<Typeface> {
        self.choice(role).typeface()
    }
}

impl FontMetrics {
    fn from_face(face: &ttf_parser::Face<'_>) -> (Self, FontProgramKind) {
        let units_per_em = face.units_per_em().max(1);
        let scale = 1000.0 / units_per_em as f32;
        let first_char = winansi::FIRST_CODE;
        let last_char = winansi::LAST_CODE;
        let (symbolic, symbol_subtable) = select_symbol_subtable(face);
        let missing_width = scale_advance(face.glyph_hor_advance(GlyphId(0)).unwrap_or(0), scale);
        let widths = build_widths(face, scale, symbolic, symbol_subtable, missing_width);

        let ascent = scale_i16(face.ascender(), scale);
        let descent = scale_i16(face.descender(), scale);
        let cap_height = face
            .capital_height()
            .map(|value| scale_i16(value, scale))
            .unwrap_or(ascent);
        let bbox = face.global_bounding_box();
        let bbox = (
            scale_i16(bbox.x_min, scale),
            scale_i16(bbox.y_min, scale),
            scale_i16(bbox.x_max, scale),
            scale_i16(bbox.y_max, scale),
        );
        let italic_angle = face
            .italic_angle()
            .map(|value| value.round() as i16)
            .unwrap_or(0);

        let program_kind = if face.tables().cff.is_some() {
            FontProgramKind::OpenTypeCff
        } else {
            FontProgramKind::TrueType
        };

        (
            Self {
                first_char,
                last_char,
                widths,
                ascent,
                descent,
                cap_height,
                italic_angle,
                stem_v: 80,
                bbox,
                missing_width,
                is_fixed_pitch: face.is_monospaced(),
                embeddable: !matches!(face.permissions(), Some(ttf_parser::Permissions::Restricted)),
                symbolic,
            },
            program_kind,
        )
    }

    pub(crate) fn is_symbolic(&self) -> bool {
        self.symbolic
    }

    /// `/Widths` entry for `code`.
    pub(crate) fn width_for_code(&self, code: u8) -> u16 {
        if code < self.first_char || code > self.last_char {
            return self.missing_width;
        }
        self.widths
            .get((code - self.first_char) as usize)
            .copied()
            .unwrap_or(self.missing_width)
    }

    /// Sum of the `/Widths` entries of the drawn codes. Kerning is not
    /// applied: runs are drawn with `Tj`, which uses these advances only.
    fn measure_text_width(&self, font_size: Pt, text: &str) -> Pt {
        let total_units = text.chars().fold(0i32, |acc, ch| {
            acc.saturating_add(self.width_for_code(winansi::drawn_code(ch)) as i32)
        });
        if total_units <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(total_units, 1000)
    }
}

fn select_symbol_subtable<'a>(
    face: &'a ttf_parser::Face<'a>,
) -> (bool, Option<ttf_parser::cmap::Subtable<'a>>) {
    let Some(cmap) = face.tables().cmap else {
        return (false, None);
    };
    let mut first = None;
    let mut symbol = None;
    let mut has_unicode = false;
    for subtable in cmap.subtables {
        if first.is_none() {
            first = Some(subtable);
        }
        if subtable.platform_id == ttf_parser::name::PlatformId::Windows
            && subtable.encoding_id == 0
        {
            symbol = Some(subtable);
        }
        if subtable.is_unicode() {
            has_unicode = true;
        }
    }
    if has_unicode {
        (false, None)
    } else {
        (symbol.is_some(), symbol.or(first))
    }
}

/// Glyph a viewer picks for `code`. Unicode fonts go through the cp1252
/// character; symbolic fonts are indexed by the raw code.
fn glyph_for_code<'a>(
    face: &'a ttf_parser::Face<'a>,
    code: u8,
    symbolic: bool,
    fallback: Option<ttf_parser::cmap::Subtable<'a>>,
) -> Option<GlyphId> {
    if !symbolic {
        if let Some(id) = winansi::decode(code).and_then(|ch| face.glyph_index(ch)) {
            return Some(id);
        }
    }
    let subtable = fallback?;
    let code = code as u32;
    subtable
        .glyph_index(code)
        .or_else(|| subtable.glyph_index(code + 0xF000))
}

/// One entry per code in `FIRST_CODE..=LAST_CODE`. Codes without a glyph
/// draw `.notdef` and get its advance.
fn build_widths(
    face: &ttf_parser::Face<'_>,
    scale: f32,
    symbolic: bool,
    fallback: Option<ttf_parser::cmap::Subtable<'_>>,
    missing_width: u16,
) -> Vec<u16> {
    (winansi::FIRST_CODE..=winansi::LAST_CODE)
        .map(|code| {
            glyph_for_code(face, code, symbolic, fallback)
                .and_then(|id| face.glyph_hor_advance(id))
                .map(|advance| scale_advance(advance, scale))
                .unwrap_or(missing_width)
        })
        .collect()
}

fn scale_advance(value: u16, scale: f32) -> u16 {
    let scaled = (value as f32 * scale).round() as i32;
    scaled.clamp(0, u16::MAX as i32) as u16
}

fn scale_i16(value: i16, scale: f32) -> i16 {
    let scaled = (value as f32 * scale).round() as i32;
    scaled.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn font_name(face: &ttf_parser::Face<'_>, path: &Path) -> String {
    use ttf_parser::name::name_id;

    let mut family = None;
    let mut full = None;
    let mut post = None;
    for entry in face.names() {
        let Some(name) = entry.to_string() else {
            continue;
        };
        let slot = match entry.name_id {
            name_id::TYPOGRAPHIC_FAMILY | name_id::FAMILY => &mut family,
            name_id::FULL_NAME => &mut full,
            name_id::POST_SCRIPT_NAME => &mut post,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(name);
        }
    }

    post.or(full)
        .or(family)
        .or_else(|| {
            path.file_stem()
                .and_then(|v| v.to_str())
                .map(|v| v.to_string())
        })
        .unwrap_or_else(|| "EmbeddedFont".to_string())
}

// Adobe AFM advance widths for WinAnsi codes 0x20..=0xFF, 1000 units per
// em. Codes cp1252 leaves undefined, and 0x7F, are never drawn and hold 0.
#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0,
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];
