//! Template rendering for generated project files
//!
//! Uses Tera templates embedded at compile time.

use anyhow::Result;
use camino::Utf8Path;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

/// Name of the connection-configuration template
pub const ENV_TEMPLATE: &str = "env";

/// Values substituted into the env file template
#[derive(Debug, Clone, Serialize)]
pub struct EnvTemplateContext {
    pub database_url: String,
    pub direct_url: String,
    pub include_optional_keys: bool,
}

/// Template registry holding all embedded templates
pub struct TemplateRegistry {
    tera: Tera,
}

impl TemplateRegistry {
    /// Create a new template registry with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(ENV_TEMPLATE, include_str!("env.tera"))?;
        Ok(Self { tera })
    }

    /// Render a template with any serializable context
    pub fn render<C: Serialize>(&self, template_name: &str, context: &C) -> Result<String> {
        debug!("Rendering template: {}", template_name);
        let tera_context = Context::from_serialize(context)?;
        let rendered = self.tera.render(template_name, &tera_context)?;
        Ok(rendered)
    }

    /// Render a template and write to a file
    pub fn render_to_file<C: Serialize>(
        &self,
        template_name: &str,
        context: &C,
        output_path: &Utf8Path,
    ) -> Result<()> {
        let content = self.render(template_name, context)?;
        if let Some(parent) = output_path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output_path, content)?;
        debug!("Wrote template to: {}", output_path);
        Ok(())
    }
}
