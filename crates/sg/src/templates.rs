use crate::error::Result;
use crate::types::RenderContext;
use log::debug;
use std::path::Path;
use tera::Tera;

pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Loads every `*.html` template below `template_dir`.
    ///
    /// Autoescaping is off: `content` is already HTML and is inserted as is.
    pub fn from_directory(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**").join("*.html");
        let pattern_str = pattern.to_string_lossy();

        let mut tera = Tera::new(&pattern_str)?;
        tera.autoescape_on(vec![]);

        debug!(
            "Loaded {} templates from {}",
            tera.get_template_names().count(),
            template_dir.display()
        );

        Ok(Self { tera })
    }

    pub fn from_raw(templates: &[(&str, &str)]) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())?;
        tera.autoescape_on(vec![]);

        Ok(Self { tera })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|template| template == name)
    }

    pub fn render(&self, template_name: &str, context: &RenderContext) -> Result<String> {
        Ok(self.tera.render(template_name, &context.to_tera())?)
    }
}
