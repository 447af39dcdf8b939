use crate::convert::Converter;
use crate::error::Result;
use crate::feeds::write_feed;
use crate::parsing::MarkdownRenderer;
use crate::templates::TemplateEngine;
use crate::types::{BuildConfig, FeedConfig};
use crate::walk::walk_input;
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub copied: usize,
    pub pages: usize,
    pub articles: usize,
    pub feed_path: PathBuf,
}

pub struct SiteBuilder {
    config: BuildConfig,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new(BuildConfig::default())
    }
}

impl SiteBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.input_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn template_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.template_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn feed(mut self, feed: FeedConfig) -> Self {
        self.config.feed = feed;
        self
    }

    /// Copies assets, renders every markdown file and writes the feed.
    /// The first failure aborts the build; files written before it stay.
    pub fn build(&self) -> Result<BuildSummary> {
        let start = Instant::now();
        let config = &self.config;

        let templates = TemplateEngine::from_directory(&config.template_dir)?;
        if !templates.has_template(&config.template) {
            return Err(tera::Error::template_not_found(&config.template).into());
        }
        let renderer = MarkdownRenderer::with_theme(&config.syntax_theme)?;

        let walk = walk_input(&config.input_dir, &config.output_dir)?;

        let converter = Converter::new(templates, renderer, config.template.as_str());
        let conversion = converter.convert_all(&walk.entries)?;

        let feed_path = write_feed(&conversion.articles, &config.feed)?;

        let summary = BuildSummary {
            copied: walk.copied,
            pages: conversion.pages.len(),
            articles: conversion.articles.len(),
            feed_path,
        };

        info!(
            "Built {} pages, {} articles and copied {} files to {} in {:.2?}",
            summary.pages,
            summary.articles,
            summary.copied,
            config.output_dir.display(),
            start.elapsed()
        );

        Ok(summary)
    }
}
