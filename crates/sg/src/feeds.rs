use crate::error::{IoContext, Result, SgError};
use crate::parsing::parse_iso8601;
use crate::types::{ArticleRecord, FeedConfig, MetadataValue};
use atom_syndication::{
    ContentBuilder, Entry, EntryBuilder, Feed, FeedBuilder, FixedDateTime, Generator, LinkBuilder,
    Text,
};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Builds the Atom feed in memory. Every article must carry a `title` and an
/// ISO-8601 `date`; the first one that does not fails the whole feed.
pub fn build_feed(articles: &[ArticleRecord], config: &FeedConfig) -> Result<Feed> {
    let mut entries = Vec::with_capacity(articles.len());
    let mut updated: Option<FixedDateTime> = None;

    for article in articles {
        let (entry, published) = build_entry(article)?;
        updated = Some(updated.map_or(published, |latest| latest.max(published)));
        entries.push(entry);
    }

    let updated = updated.unwrap_or_else(|| chrono::Utc::now().fixed_offset());

    let mut generator = Generator::default();
    generator.set_value(env!("CARGO_PKG_NAME"));
    generator.set_version(Some(env!("CARGO_PKG_VERSION").to_string()));

    let feed = FeedBuilder::default()
        .title(config.title.as_str())
        .subtitle(Some(Text::plain(config.description.as_str())))
        .id(config.link.as_str())
        .links(vec![
            LinkBuilder::default()
                .href(config.link.as_str())
                .rel("alternate")
                .build(),
        ])
        .updated(updated)
        .generator(Some(generator))
        .entries(entries)
        .build();

    Ok(feed)
}

// The link is the local output path and the summary repeats the title; both
// stand in until articles get public URLs and excerpts.
fn build_entry(article: &ArticleRecord) -> Result<(Entry, FixedDateTime)> {
    let metadata = &article.context.metadata;

    let title = metadata
        .get("title")
        .map(MetadataValue::joined)
        .ok_or_else(|| SgError::MissingField {
            field: "title".to_string(),
            path: article.source.clone(),
        })?;

    let date_value = metadata.get("date").ok_or_else(|| SgError::MissingField {
        field: "date".to_string(),
        path: article.source.clone(),
    })?;
    let published = date_value
        .as_str()
        .and_then(parse_iso8601)
        .ok_or_else(|| SgError::InvalidDate {
            value: date_value.joined(),
            path: article.source.clone(),
        })?;

    let link = article.destination.to_string_lossy().to_string();

    let entry = EntryBuilder::default()
        .title(title.as_str())
        .id(link.as_str())
        .links(vec![
            LinkBuilder::default()
                .href(link.as_str())
                .rel("alternate")
                .build(),
        ])
        .summary(Some(Text::html(title.as_str())))
        .content(Some(
            ContentBuilder::default()
                .value(Some(article.context.content.clone()))
                .content_type(Some("html".to_string()))
                .build(),
        ))
        .published(Some(published))
        .updated(published)
        .build();

    Ok((entry, published))
}

/// Builds the feed and writes it as UTF-8 to `config.output_path`. Nothing is
/// written when any article is rejected.
pub fn write_feed(articles: &[ArticleRecord], config: &FeedConfig) -> Result<PathBuf> {
    let feed = build_feed(articles, config)?;
    let path = config.output_path.clone();

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).io_context("creating directory", parent)?;
    }

    let file = File::create(&path).io_context("creating feed", &path)?;
    let mut writer = feed.write_to(BufWriter::new(file))?;
    writer.flush().io_context("writing feed", &path)?;

    debug!("Feed has {} entries", feed.entries().len());
    info!("Wrote feed to {}", path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentKind, ContentMetadata, RawMetadata, RenderContext};
    use chrono::Datelike;
    use tempfile::TempDir;

    fn article(name: &str, fields: &[(&str, &str)]) -> ArticleRecord {
        let raw: RawMetadata = fields
            .iter()
            .map(|(key, value)| (key.to_string(), vec![value.to_string()]))
            .collect();
        ArticleRecord {
            source: PathBuf::from(format!("/site/content/{name}.md")),
            destination: PathBuf::from(format!("/site/build/{name}.html")),
            kind: ContentKind::Article,
            context: RenderContext {
                content: "<h1>Hello</h1>".to_string(),
                metadata: ContentMetadata::normalize(&raw),
            },
        }
    }

    fn config(dir: &TempDir) -> FeedConfig {
        FeedConfig {
            output_path: dir.path().join("atom.xml"),
            ..FeedConfig::default()
        }
    }

    #[test]
    fn test_feed_entry_fields() {
        let dir = TempDir::new().unwrap();
        let articles = vec![article("post", &[("title", "Hi"), ("date", "2023-01-01")])];

        let feed = build_feed(&articles, &config(&dir)).unwrap();

        assert_eq!(feed.title().as_str(), "my title");
        assert_eq!(feed.entries().len(), 1);
        let entry = &feed.entries()[0];
        assert_eq!(entry.title().as_str(), "Hi");
        assert_eq!(entry.links()[0].href(), "/site/build/post.html");
        assert_eq!(entry.summary().map(|text| text.as_str()), Some("Hi"));
        assert_eq!(
            entry.content().and_then(|content| content.value()),
            Some("<h1>Hello</h1>")
        );
        let published = entry.published().unwrap();
        assert_eq!(
            (published.year(), published.month(), published.day()),
            (2023, 1, 1)
        );
    }

    #[test]
    fn test_feed_updated_is_newest_article() {
        let dir = TempDir::new().unwrap();
        let articles = vec![
            article("old", &[("title", "Old"), ("date", "2021-05-01")]),
            article("new", &[("title", "New"), ("date", "2024-02-03T08:00:00")]),
        ];

        let feed = build_feed(&articles, &config(&dir)).unwrap();

        assert_eq!(feed.updated().year(), 2024);
    }

    #[test]
    fn test_list_title_is_joined() {
        let dir = TempDir::new().unwrap();
        let articles = vec![article(
            "post",
            &[("title", "Cats, dogs"), ("date", "2023-01-01")],
        )];

        let feed = build_feed(&articles, &config(&dir)).unwrap();

        assert_eq!(feed.entries()[0].title().as_str(), "Cats, dogs");
    }

    #[test]
    fn test_missing_fields() {
        let dir = TempDir::new().unwrap();

        let result = build_feed(&[article("post", &[("date", "2023-01-01")])], &config(&dir));
        assert!(matches!(result, Err(SgError::MissingField { ref field, .. }) if field == "title"));

        let result = build_feed(&[article("post", &[("title", "Hi")])], &config(&dir));
        assert!(matches!(result, Err(SgError::MissingField { ref field, .. }) if field == "date"));
    }

    #[test]
    fn test_invalid_date_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let articles = vec![
            article("good", &[("title", "Good"), ("date", "2023-01-01")]),
            article("bad", &[("title", "Bad"), ("date", "Jan 1, 2023")]),
        ];

        let result = write_feed(&articles, &config);

        assert!(matches!(result, Err(SgError::InvalidDate { .. })));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_write_feed() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let articles = vec![article(
            "post",
            &[("title", "Fish & <Chips>"), ("date", "2023-01-01")],
        )];

        let path = write_feed(&articles, &config).unwrap();

        let xml = std::fs::read_to_string(path).unwrap();
        assert!(xml.contains("<feed xmlns=\"http://www.w3.org/2005/Atom\""));
        assert!(xml.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(xml.contains("2023-01-01T00:00:00"));
        assert!(xml.contains("https://venthur.de"));
    }

    #[test]
    fn test_empty_feed() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        write_feed(&[], &config).unwrap();

        let xml = std::fs::read_to_string(&config.output_path).unwrap();
        assert!(xml.contains("my title"));
        assert!(!xml.contains("<entry>"));
    }
}
