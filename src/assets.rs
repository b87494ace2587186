use crate::error::CertError;
use crate::font::{FontRole, FontSet, Typeface};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

pub const ASSETS_ENV_VAR: &str = "CERTSTAMP_ASSETS";
pub const DEFAULT_TEMPLATE_FILE: &str = "templates/certificate-template.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Template,
    Font(FontRole),
}

impl AssetKind {
    pub fn label(&self) -> String {
        match self {
            AssetKind::Template => "template".to_string(),
            AssetKind::Font(role) => format!("font.{role}"),
        }
    }
}

/// Finds the assets directory: an explicit root, else `$CERTSTAMP_ASSETS`,
/// else `src/assets` under the base directory when it exists, else `assets`
/// under the base directory.
#[derive(Debug, Clone)]
pub struct AssetLocator {
    explicit: Option<PathBuf>,
    base_dir: PathBuf,
}

impl AssetLocator {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit: None,
            base_dir: base_dir.into(),
        }
    }

    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn with_explicit_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.explicit = Some(root.into());
        self
    }

    pub fn locate(&self) -> PathBuf {
        if let Some(root) = &self.explicit {
            return root.clone();
        }
        if let Some(root) = std::env::var_os(ASSETS_ENV_VAR).filter(|v| !v.is_empty()) {
            return PathBuf::from(root);
        }
        let local = self.base_dir.join("src").join("assets");
        if local.is_dir() {
            return local;
        }
        self.base_dir.join("assets")
    }
}

/// One row of `AssetStore::manifest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub present: bool,
    pub bytes_len: usize,
    pub sha256: Option<String>,
}

/// Read-only cache of the template and font files.
///
/// A file that exists is read at most once and its bytes or parsed face are
/// shared by every build afterwards. Absent files are not remembered, so an
/// asset deployed after start-up is picked up by the next build. Nothing is
/// mutated once initialised, so the store can be shared across threads by
/// reference.
#[derive(Debug)]
pub struct AssetStore {
    root: PathBuf,
    template_path: PathBuf,
    font_paths: BTreeMap<FontRole, PathBuf>,
    template: OnceLock<Arc<[u8]>>,
    fonts: BTreeMap<FontRole, OnceLock<Result<Arc<Typeface>, String>>>,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let font_paths = FontRole::ALL
            .into_iter()
            .map(|role| (role, root.join("fonts").join(role.default_file_name())))
            .collect();
        Self {
            template_path: root.join(DEFAULT_TEMPLATE_FILE),
            root,
            font_paths,
            template: OnceLock::new(),
            fonts: FontRole::ALL.into_iter().map(|role| (role, OnceLock::new())).collect(),
        }
    }

    /// Overrides the template location; relative paths resolve under the
    /// assets root.
    pub fn with_template_file(mut self, path: impl AsRef<Path>) -> Self {
        self.template_path = self.root.join(path);
        self
    }

    /// Overrides the file for one role; relative paths resolve under
    /// `<root>/fonts`.
    pub fn with_font_file(mut self, role: FontRole, path: impl AsRef<Path>) -> Self {
        let resolved = self.root.join("fonts").join(path);
        self.font_paths.insert(role, resolved);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn font_path(&self, role: FontRole) -> &Path {
        &self.font_paths[&role]
    }

    pub fn template_bytes(&self) -> Result<Arc<[u8]>, CertError> {
        if let Some(bytes) = self.template.get() {
            return Ok(bytes.clone());
        }
        let bytes = read_optional(&self.template_path)
            .ok_or_else(|| CertError::MissingTemplate(self.template_path.clone()))?;
        Ok(self.template.get_or_init(|| bytes).clone())
    }

    /// Face for `role`, `None` when its file does not exist. A file that
    /// exists but does not parse is an error, reported on every call.
    pub fn load_font(&self, role: FontRole) -> Result<Option<Arc<Typeface>>, CertError> {
        let path = self.font_path(role);
        let slot = &self.fonts[&role];
        let cached = match slot.get() {
            Some(cached) => cached,
            None => {
                let Some(data) = read_optional(path) else {
                    log::debug!("font {} not found at {}", role, path.display());
                    return Ok(None);
                };
                slot.get_or_init(|| match Typeface::parse(data, &path.display().to_string()) {
                    Ok(face) => Ok(Arc::new(face)),
                    Err(CertError::FontEmbed { reason, .. }) => Err(reason),
                    Err(other) => Err(other.to_string()),
                })
            }
        };
        cached
            .clone()
            .map(Some)
            .map_err(|reason| CertError::font_embed(path.display().to_string(), reason))
    }

    /// Resolves all four roles and applies the fallbacks.
    pub fn font_set(&self) -> Result<FontSet, CertError> {
        Ok(FontSet::resolve(
            self.load_font(FontRole::Bold)?,
            self.load_font(FontRole::Regular)?,
            self.load_font(FontRole::Italic)?,
            self.load_font(FontRole::Display)?,
        ))
    }

    /// Presence, size and SHA-256 of every asset, read fresh from disk.
    pub fn manifest(&self) -> Vec<AssetRecord> {
        let mut entries = vec![(AssetKind::Template, self.template_path.clone())];
        entries.extend(
            self.font_paths
                .iter()
                .map(|(role, path)| (AssetKind::Font(*role), path.clone())),
        );
        entries
            .into_iter()
            .map(|(kind, path)| match fs::read(&path) {
                Ok(data) => AssetRecord {
                    kind,
                    present: true,
                    bytes_len: data.len(),
                    sha256: Some(sha256_hex(&data)),
                    path,
                },
                Err(_) => AssetRecord {
                    kind,
                    present: false,
                    bytes_len: 0,
                    sha256: None,
                    path,
                },
            })
            .collect()
    }
}

fn read_optional(path: &Path) -> Option<Arc<[u8]>> {
    match fs::read(path) {
        Ok(data) => {
            log::debug!("loaded {} ({} bytes)", path.display(), data.len());
            Some(Arc::from(data))
        }
        Err(err) => {
            log::debug!("cannot read {}: {}", path.display(), err);
            None
        }
    }
}

pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}
