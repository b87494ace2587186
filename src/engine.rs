use crate::assets::{AssetLocator, AssetStore};
use crate::error::CertError;
use crate::font::FontRole;
use crate::layout::{CERTIFICATE_LAYOUT, DrawInstruction, layout};
use crate::name::{NameLines, segment_name};
use crate::render::TemplateCanvas;
use crate::request::CertificateRequest;
use crate::types::Size;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Issues certificates from one asset store. Cheap to clone; clones share
/// the store.
#[derive(Debug, Clone)]
pub struct CertificateEngine {
    assets: Arc<AssetStore>,
}

#[derive(Debug, Clone, Default)]
pub struct CertificateEngineBuilder {
    assets_root: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    template_file: Option<PathBuf>,
    font_files: BTreeMap<FontRole, PathBuf>,
}

/// What was laid out for one certificate, alongside the rendered bytes.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub lines: NameLines,
    pub page_size: Size,
    pub instructions: Vec<DrawInstruction>,
    pub pdf: Vec<u8>,
}

impl CertificateEngineBuilder {
    /// Use this directory as the assets root, skipping discovery.
    pub fn assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = Some(root.into());
        self
    }

    /// Directory discovery starts from; defaults to the working directory.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn template_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_file = Some(path.into());
        self
    }

    pub fn font_file(mut self, role: FontRole, path: impl Into<PathBuf>) -> Self {
        self.font_files.insert(role, path.into());
        self
    }

    pub fn build(self) -> Result<CertificateEngine, CertError> {
        let locator = match self.base_dir {
            Some(dir) => AssetLocator::new(dir),
            None => AssetLocator::from_current_dir()?,
        };
        let locator = match self.assets_root {
            Some(root) => locator.with_explicit_root(root),
            None => locator,
        };
        let root = locator.locate();
        log::debug!("assets root: {}", root.display());

        let mut store = AssetStore::new(root);
        if let Some(template) = self.template_file {
            store = store.with_template_file(template);
        }
        for (role, path) in self.font_files {
            store = store.with_font_file(role, path);
        }
        Ok(CertificateEngine::new(Arc::new(store)))
    }
}

impl CertificateEngine {
    pub fn builder() -> CertificateEngineBuilder {
        CertificateEngineBuilder::default()
    }

    pub fn new(assets: Arc<AssetStore>) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Renders one certificate and returns the PDF bytes.
    pub fn issue(&self, request: &CertificateRequest) -> Result<Vec<u8>, CertError> {
        self.compose(request).map(|issued| issued.pdf)
    }

    /// Like `issue`, also returning the name split and the draw
    /// instructions that went onto the page.
    pub fn compose(&self, request: &CertificateRequest) -> Result<IssuedCertificate, CertError> {
        let started = Instant::now();
        let template = self.assets.template_bytes()?;
        let fonts = self.assets.font_set()?;

        let lines = segment_name(request.student_name());
        let canvas = TemplateCanvas::load(&template)?;
        let page_size = canvas.page_size();
        let grid = CERTIFICATE_LAYOUT.resolve(page_size.height);
        let instructions = layout(&lines, request.level(), request.date(), &grid, &fonts);
        let pdf = canvas.render(&fonts, &instructions)?;

        log::info!(
            "issued {} certificate for {:?} / {:?}: {} bytes in {:.1} ms",
            request.level(),
            lines.first_line,
            lines.second_line,
            pdf.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(IssuedCertificate {
            lines,
            page_size,
            instructions,
            pdf,
        })
    }

    /// Issues every request on the rayon pool. Results keep input order and
    /// one failure does not stop the others.
    pub fn issue_batch(&self, requests: &[CertificateRequest]) -> Vec<Result<Vec<u8>, CertError>> {
        requests.par_iter().map(|request| self.issue(request)).collect()
    }
}
