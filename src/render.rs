use crate::error::CertError;
use crate::font::{EmbeddedFont, FontProgramKind, FontSet, Typeface};
use crate::layout::DrawInstruction;
use crate::types::{Pt, Size};
use crate::winansi;
use lopdf::{Dictionary, Document as LoDocument, Object as LoObject, ObjectId as LoObjectId, Stream as LoStream, dictionary};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;

pub const PDF_MIME_TYPE: &str = "application/pdf";

const FONT_RESOURCE_PREFIX: &str = "CS_F";

fn template_err(err: lopdf::Error) -> CertError {
    CertError::TemplateLoad(err.to_string())
}

/// The template's first page, loaded for drawing. One canvas serves one
/// build: it is consumed by `finish` and never shared.
pub struct TemplateCanvas {
    doc: LoDocument,
    page_id: LoObjectId,
    page_size: Size,
    resources: Dictionary,
    font_resources: Dictionary,
    used_names: BTreeSet<Vec<u8>>,
    embedded: HashMap<usize, String>,
    content: String,
}

impl TemplateCanvas {
    pub fn load(template: &[u8]) -> Result<Self, CertError> {
        let doc = LoDocument::load_mem(template).map_err(template_err)?;
        if doc.is_encrypted() {
            return Err(CertError::TemplateLoad("template PDF is encrypted".to_string()));
        }
        let Some(page_id) = doc.get_pages().values().next().copied() else {
            return Err(CertError::EmptyTemplate);
        };
        let page_size = page_size(&doc, page_id);
        let resources = inherited_dict(&doc, page_id, b"Resources").unwrap_or_default();
        let font_resources = match resources.get(b"Font") {
            Ok(obj) => resolve_dict(&doc, obj).unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };
        let used_names = font_resources.iter().map(|(key, _)| key.clone()).collect();
        Ok(Self {
            doc,
            page_id,
            page_size,
            resources,
            font_resources,
            used_names,
            embedded: HashMap::new(),
            content: String::new(),
        })
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    /// Draws `instructions` over the page and serializes the document.
    pub fn render(
        mut self,
        fonts: &FontSet,
        instructions: &[DrawInstruction],
    ) -> Result<Vec<u8>, CertError> {
        for run in instructions {
            self.draw(run, fonts)?;
        }
        self.finish()
    }

    /// Queues one text run, embedding its face on first use.
    fn draw(&mut self, run: &DrawInstruction, fonts: &FontSet) -> Result<(), CertError> {
        let resource = self.ensure_font(fonts.get(run.role))?;
        let encoded = encode_winansi_pdf_string(&run.text);
        if encoded.replaced > 0 {
            log::warn!(
                "{} character(s) of {:?} are outside WinAnsi and were drawn as '?'",
                encoded.replaced,
                run.text
            );
        }
        let _ = write!(
            self.content,
            "BT\n/{} {} Tf\n{} {} {} rg\n1 0 0 1 {} {} Tm\n({}) Tj\nET\n",
            resource,
            run.size,
            run.color.r,
            run.color.g,
            run.color.b,
            run.x,
            run.y,
            encoded.text
        );
        Ok(())
    }

    /// Writes the queued runs over the template page and serializes the
    /// document.
    fn finish(mut self) -> Result<Vec<u8>, CertError> {
        let mut contents = vec![LoObject::Reference(
            self.doc.add_object(LoStream::new(dictionary! {}, b"q\n".to_vec())),
        )];
        contents.extend(existing_contents(&self.doc, self.page_id));
        let overlay = format!("Q\nq\n{}Q\n", self.content).into_bytes();
        contents.push(LoObject::Reference(
            self.doc.add_object(LoStream::new(dictionary! {}, overlay)),
        ));

        self.resources
            .set("Font", LoObject::Dictionary(self.font_resources));
        let page = self
            .doc
            .get_object_mut(self.page_id)
            .and_then(LoObject::as_dict_mut)
            .map_err(template_err)?;
        page.set("Contents", LoObject::Array(contents));
        page.set("Resources", LoObject::Dictionary(self.resources));

        self.doc.compress();
        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|err| CertError::Io(std::io::Error::other(err.to_string())))?;
        Ok(out)
    }

    fn ensure_font(&mut self, face: &Arc<Typeface>) -> Result<String, CertError> {
        // Roles that fall back share one Arc, so identity is the pointer.
        let key = Arc::as_ptr(face) as usize;
        if let Some(name) = self.embedded.get(&key) {
            return Ok(name.clone());
        }
        let font_id = match &**face {
            Typeface::Standard(standard) => self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => standard.base_font(),
                "Encoding" => "WinAnsiEncoding",
            }),
            Typeface::Embedded(font) => self.embed_font_program(font)?,
        };
        let name = self.next_resource_name();
        self.font_resources
            .set(name.as_bytes().to_vec(), LoObject::Reference(font_id));
        self.embedded.insert(key, name.clone());
        log::debug!("embedded font {} as /{}", face.name(), name);
        Ok(name)
    }

    fn embed_font_program(&mut self, font: &EmbeddedFont) -> Result<LoObjectId, CertError> {
        if !font.metrics.embeddable {
            return Err(CertError::font_embed(
                font.name(),
                "licence forbids embedding (OS/2 fsType restricted)",
            ));
        }
        if font.metrics.widths.is_empty() {
            return Err(CertError::font_embed(font.name(), "no glyph widths"));
        }
        let base = sanitize_font_name(font.name());
        let metrics = &font.metrics;

        let mut file_dict = dictionary! { "Length1" => font.data.len() as i64 };
        if font.program_kind == FontProgramKind::OpenTypeCff {
            file_dict.set("Subtype", "OpenType");
        }
        let file_id = self
            .doc
            .add_object(LoStream::new(file_dict, font.data.to_vec()));

        let mut flags: i64 = if metrics.is_symbolic() { 4 } else { 32 };
        if metrics.is_fixed_pitch {
            flags |= 1;
        }
        let file_key = match font.program_kind {
            FontProgramKind::OpenTypeCff => "FontFile3",
            FontProgramKind::TrueType => "FontFile2",
        };
        let mut descriptor = dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base.as_str(),
            "Flags" => flags,
            "FontBBox" => vec![
                LoObject::Integer(metrics.bbox.0 as i64),
                LoObject::Integer(metrics.bbox.1 as i64),
                LoObject::Integer(metrics.bbox.2 as i64),
                LoObject::Integer(metrics.bbox.3 as i64),
            ],
            "ItalicAngle" => metrics.italic_angle as i64,
            "Ascent" => metrics.ascent as i64,
            "Descent" => metrics.descent as i64,
            "CapHeight" => metrics.cap_height as i64,
            "StemV" => metrics.stem_v as i64,
            "MissingWidth" => metrics.missing_width as i64,
        };
        descriptor.set(file_key, LoObject::Reference(file_id));
        let descriptor_id = self.doc.add_object(descriptor);

        let subtype = match font.program_kind {
            FontProgramKind::OpenTypeCff => "Type1",
            FontProgramKind::TrueType => "TrueType",
        };
        let widths: Vec<LoObject> = metrics
            .widths
            .iter()
            .map(|w| LoObject::Integer(*w as i64))
            .collect();
        let mut font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => subtype,
            "BaseFont" => base.as_str(),
            "FirstChar" => metrics.first_char as i64,
            "LastChar" => metrics.last_char as i64,
            "Widths" => widths,
            "FontDescriptor" => descriptor_id,
        };
        if !metrics.is_symbolic() {
            font_dict.set("Encoding", "WinAnsiEncoding");
        }
        Ok(self.doc.add_object(font_dict))
    }

    fn next_resource_name(&mut self) -> String {
        let mut index = self.used_names.len() + 1;
        loop {
            let candidate = format!("{FONT_RESOURCE_PREFIX}{index}");
            if self.used_names.insert(candidate.as_bytes().to_vec()) {
                return candidate;
            }
            index += 1;
        }
    }
}

/// Draws `instructions` onto the first page of `template`.
pub fn render(
    template: &[u8],
    fonts: &FontSet,
    instructions: &[DrawInstruction],
) -> Result<Vec<u8>, CertError> {
    TemplateCanvas::load(template)?.render(fonts, instructions)
}

fn resolve_dict(doc: &LoDocument, obj: &LoObject) -> Option<Dictionary> {
    match obj {
        LoObject::Dictionary(d) => Some(d.clone()),
        LoObject::Reference(id) => doc
            .get_object(*id)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .cloned(),
        _ => None,
    }
}

/// Looks `key` up on the page, then up the page tree.
fn inherited_attribute(doc: &LoDocument, page_id: LoObjectId, key: &[u8]) -> Option<LoObject> {
    let mut node = doc.get_object(page_id).ok()?.as_dict().ok()?;
    // Bounded walk; malformed trees can be cyclic.
    for _ in 0..32 {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(LoObject::as_reference).ok()?;
        node = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

fn inherited_dict(doc: &LoDocument, page_id: LoObjectId, key: &[u8]) -> Option<Dictionary> {
    resolve_dict(doc, &inherited_attribute(doc, page_id, key)?)
}

fn number(doc: &LoDocument, obj: &LoObject) -> Option<f32> {
    match obj {
        LoObject::Integer(v) => Some(*v as f32),
        LoObject::Real(v) => Some(*v as f32),
        LoObject::Reference(id) => number(doc, doc.get_object(*id).ok()?),
        _ => None,
    }
}

fn page_size(doc: &LoDocument, page_id: LoObjectId) -> Size {
    for key in [&b"MediaBox"[..], &b"CropBox"[..]] {
        let Some(obj) = inherited_attribute(doc, page_id, key) else {
            continue;
        };
        let obj = match obj {
            LoObject::Reference(id) => match doc.get_object(id) {
                Ok(o) => o.clone(),
                Err(_) => continue,
            },
            other => other,
        };
        let Ok(values) = obj.as_array() else {
            continue;
        };
        let coords: Vec<f32> = values.iter().filter_map(|v| number(doc, v)).collect();
        if let [llx, lly, urx, ury] = coords[..] {
            return Size {
                width: Pt::from_f32((urx - llx).abs()),
                height: Pt::from_f32((ury - lly).abs()),
            };
        }
    }
    Size::letter()
}

fn existing_contents(doc: &LoDocument, page_id: LoObjectId) -> Vec<LoObject> {
    let Ok(page) = doc.get_object(page_id).and_then(LoObject::as_dict) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(LoObject::Reference(id)) => match doc.get_object(*id) {
            Ok(LoObject::Array(items)) => items.clone(),
            _ => vec![LoObject::Reference(*id)],
        },
        Ok(LoObject::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn sanitize_font_name(name: &str) -> String {
    let out: String = name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect();
    if out.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        out
    }
}

struct WinAnsiEncoded {
    text: String,
    replaced: usize,
}

fn encode_winansi_pdf_string(input: &str) -> WinAnsiEncoded {
    let mut out = String::new();
    let mut replaced = 0usize;
    for ch in input.chars() {
        let byte = winansi::encode(ch).unwrap_or_else(|| {
            replaced += 1;
            winansi::REPLACEMENT
        });

        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b if b < 0x20 || b >= 0x7f => {
                let _ = write!(out, "\\{:03o}", b);
            }
            b => out.push(b as char),
        }
    }
    WinAnsiEncoded {
        text: out,
        replaced,
    }
}
