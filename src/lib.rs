//! Stamps a student's name, CEFR level and issue date onto a single-page
//! PDF certificate template.
//!
//! ```no_run
//! use certstamp::{CertificateEngine, CertificateRequest};
//!
//! let engine = CertificateEngine::builder().assets_root("assets").build()?;
//! let request = CertificateRequest::new("Barbara Andrea Arias Buroz", "B1", "2026-02-16")?;
//! let pdf = engine.issue(&request)?;
//! std::fs::write("certificate.pdf", pdf)?;
//! # Ok::<(), certstamp::CertError>(())
//! ```

mod assets;
mod engine;
mod error;
mod fit;
mod font;
mod layout;
mod name;
mod render;
mod request;
#[cfg(test)]
mod test_fonts;
mod types;
mod winansi;

pub use assets::{
    ASSETS_ENV_VAR, AssetKind, AssetLocator, AssetRecord, AssetStore, DEFAULT_TEMPLATE_FILE,
    sha256_hex,
};
pub use engine::{CertificateEngine, CertificateEngineBuilder, IssuedCertificate};
pub use error::{CertError, ErrorClass};
pub use fit::fit_size;
pub use font::{FontChoice, FontRole, FontSet, StandardFont, TextMeasure, Typeface};
pub use layout::{
    CAPTION_INK, CERTIFICATE_LAYOUT, DrawInstruction, LayoutConfig, NAME_INK, PageGrid, layout,
    level_caption,
};
pub use name::{NameLines, segment_name};
pub use render::{PDF_MIME_TYPE, TemplateCanvas, render};
pub use request::{CertificateRequest, IsoDate, Level};
pub use types::{Color, Pt, Size};
