//! View rendering behind a narrow interface
//!
//! Controllers hand a template name and a plain key/value context to the
//! renderer and never inspect the output, so tests can swap the whole layer
//! for a mock.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Rendering interface consumed by the controllers
#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> AppResult<String>;
}

/// Liquid-backed renderer; templates are parsed once at startup
pub struct LiquidRenderer {
    templates: HashMap<String, liquid::Template>,
}

impl LiquidRenderer {
    /// Parse every `*.liquid` file in `dir`, keyed by file stem
    pub fn load(dir: impl AsRef<Path>) -> AppResult<Self> {
        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| AppError::Template(e.to_string()))?;

        let mut templates = HashMap::new();
        let entries =
            fs::read_dir(dir.as_ref()).map_err(|e| AppError::Template(e.to_string()))?;

        for entry in entries {
            let path = entry.map_err(|e| AppError::Template(e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("liquid") {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            let source =
                fs::read_to_string(&path).map_err(|e| AppError::Template(e.to_string()))?;
            let template = parser
                .parse(&source)
                .map_err(|e| AppError::Template(format!("{}: {}", name, e)))?;
            templates.insert(name, template);
        }

        Ok(Self { templates })
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl Renderer for LiquidRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> AppResult<String> {
        let template = self
            .templates
            .get(template)
            .ok_or_else(|| AppError::Template(format!("unknown template '{}'", template)))?;

        let mut globals = liquid::Object::new();
        if let Some(entries) = context.as_object() {
            for (key, value) in entries {
                let value = liquid::model::to_value(value)
                    .map_err(|e| AppError::Template(e.to_string()))?;
                globals.insert(key.clone().into(), value);
            }
        }

        template
            .render(&globals)
            .map_err(|e| AppError::Template(e.to_string()))
    }
}
