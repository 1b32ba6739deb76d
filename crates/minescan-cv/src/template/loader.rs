//! Template loading utilities

use super::Template;
use crate::utils::image::ImageUtils;
use crate::Result;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};

/// File stem of the mine marker template.
pub const MINE_TEMPLATE: &str = "mine";
/// File stem of the opened-square anchor template.
pub const OPEN_SQUARE_TEMPLATE: &str = "blank_square";

/// Loads templates by file stem from a template directory.
pub struct TemplateLoader {
    template_dir: PathBuf,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    pub fn new<P: AsRef<Path>>(template_dir: P) -> Self {
        Self {
            template_dir: template_dir.as_ref().to_path_buf(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add supported extension
    pub fn add_extension(mut self, ext: impl Into<String>) -> Self {
        self.supported_extensions.push(ext.into());
        self
    }

    /// Load a template by file stem, trying each supported extension in
    /// order.
    pub fn load(&self, stem: &str) -> Result<Template> {
        for ext in &self.supported_extensions {
            let path = self.template_dir.join(format!("{stem}.{ext}"));
            if path.is_file() {
                let image = ImageUtils::load_gray(&path)
                    .with_context(|| format!("Failed to load template: {}", path.display()))?;
                log::debug!("loaded template '{stem}' from {}", path.display());
                return Ok(Template::new(stem, image));
            }
        }
        bail!(
            "template '{stem}' not found in {} (tried extensions: {})",
            self.template_dir.display(),
            self.supported_extensions.join(", ")
        )
    }
}

/// The two process-wide marker templates, loaded once at startup and
/// shared read-only by every match call afterwards.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub mine: Template,
    pub open_square: Template,
}

impl TemplateSet {
    /// Load both required templates from `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<TemplateSet> {
        let loader = TemplateLoader::new(dir);
        Ok(TemplateSet {
            mine: loader.load(MINE_TEMPLATE)?,
            open_square: loader.load(OPEN_SQUARE_TEMPLATE)?,
        })
    }
}
