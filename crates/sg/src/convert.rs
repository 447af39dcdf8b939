use crate::error::{IoContext, Result};
use crate::parsing::{MarkdownRenderer, extract_frontmatter};
use crate::templates::TemplateEngine;
use crate::types::{
    ArticleRecord, ContentKind, ContentMetadata, ConvertibleEntry, PageRecord, RenderContext,
    RenderedContent,
};
use log::debug;
use std::fs;

/// Rendered entries split by kind, each in input order.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub pages: Vec<PageRecord>,
    pub articles: Vec<ArticleRecord>,
}

pub struct Converter {
    templates: TemplateEngine,
    renderer: MarkdownRenderer,
    template_name: String,
}

impl Converter {
    pub fn new(
        templates: TemplateEngine,
        renderer: MarkdownRenderer,
        template_name: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            renderer,
            template_name: template_name.into(),
        }
    }

    pub fn convert_all(&self, entries: &[ConvertibleEntry]) -> Result<Conversion> {
        let mut conversion = Conversion::default();

        for entry in entries {
            let rendered = self.convert(entry)?;
            match rendered.kind {
                ContentKind::Page => conversion.pages.push(rendered),
                ContentKind::Article => conversion.articles.push(rendered),
            }
        }

        Ok(conversion)
    }

    pub fn convert(&self, entry: &ConvertibleEntry) -> Result<RenderedContent> {
        debug!("Processing {}", entry.source.display());

        let file_content =
            fs::read_to_string(&entry.source).io_context("reading content", &entry.source)?;
        let (raw, body) = extract_frontmatter(&file_content);
        let content = self.renderer.render(&body);
        let metadata = ContentMetadata::normalize(&raw);
        let kind = ContentKind::of(&metadata);

        let context = RenderContext { content, metadata };
        let rendered = self.templates.render(self.template_for(kind), &context)?;

        if let Some(parent) = entry.destination.parent() {
            fs::create_dir_all(parent).io_context("creating directory", parent)?;
        }
        fs::write(&entry.destination, rendered).io_context("writing page", &entry.destination)?;

        Ok(RenderedContent {
            source: entry.source.clone(),
            destination: entry.destination.clone(),
            kind,
            context,
        })
    }

    // Pages and articles share a template until a page layout exists.
    fn template_for(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Page | ContentKind::Article => &self.template_name,
        }
    }
}
