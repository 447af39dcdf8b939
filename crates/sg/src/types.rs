use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A markdown source waiting to be converted, with the `.html` path it renders to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConvertibleEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Front-matter exactly as written: every key maps to the lines given for it.
pub type RawMetadata = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Single(String),
    List(Vec<String>),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Single(value) => Some(value),
            MetadataValue::List(_) => None,
        }
    }

    /// The value as written, with list items joined back by `", "`.
    pub fn joined(&self) -> String {
        match self {
            MetadataValue::Single(value) => value.clone(),
            MetadataValue::List(values) => values.join(", "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentMetadata {
    #[serde(flatten)]
    pub values: BTreeMap<String, MetadataValue>,
}

impl ContentMetadata {
    /// Joins each key's lines with newlines, splits the result on commas and
    /// trims every piece. One piece stays a plain string, several become a list.
    /// Pieces that trim to nothing are dropped, so a trailing comma does not
    /// add an empty list item; a value made only of those is `""`.
    pub fn normalize(raw: &RawMetadata) -> Self {
        let values = raw
            .iter()
            .map(|(key, lines)| (key.clone(), normalize_value(lines)))
            .collect();
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.values.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(MetadataValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.values.iter()
    }
}

fn normalize_value(lines: &[String]) -> MetadataValue {
    let joined = lines.join("\n");
    let mut pieces: Vec<String> = joined
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect();

    match pieces.len() {
        0 => MetadataValue::Single(String::new()),
        1 => MetadataValue::Single(pieces.remove(0)),
        _ => MetadataValue::List(pieces),
    }
}

/// Pages and articles currently share one template; the split is kept so a
/// dedicated page template can be added without touching callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Page,
    Article,
}

impl ContentKind {
    pub fn of(metadata: &ContentMetadata) -> Self {
        if metadata.is_empty() {
            ContentKind::Page
        } else {
            ContentKind::Article
        }
    }
}

/// The variable namespace handed to the template: `content` plus every
/// metadata key. Metadata is inserted last, so a `content` key in the
/// front-matter shadows the rendered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub content: String,
    pub metadata: ContentMetadata,
}

impl RenderContext {
    pub fn to_tera(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("content", &self.content);
        for (key, value) in self.metadata.iter() {
            context.insert(key.as_str(), value);
        }
        context
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: ContentKind,
    pub context: RenderContext,
}

/// A rendered entry without front-matter.
pub type PageRecord = RenderedContent;

/// A rendered entry with front-matter; these feed the syndication feed.
pub type ArticleRecord = RenderedContent;

pub const DEFAULT_INPUT_DIR: &str = "content";
pub const DEFAULT_OUTPUT_DIR: &str = "build";
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub const DEFAULT_TEMPLATE: &str = "article.html";
pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

pub const DEFAULT_FEED_LINK: &str = "https://venthur.de";
pub const DEFAULT_FEED_TITLE: &str = "my title";
pub const DEFAULT_FEED_DESCRIPTION: &str = "basti\"s blag";
pub const DEFAULT_FEED_PATH: &str = "atom.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub link: String,
    pub title: String,
    pub description: String,
    /// Resolved against the working directory, not the output directory.
    pub output_path: PathBuf,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            link: DEFAULT_FEED_LINK.to_string(),
            title: DEFAULT_FEED_TITLE.to_string(),
            description: DEFAULT_FEED_DESCRIPTION.to_string(),
            output_path: PathBuf::from(DEFAULT_FEED_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub template: String,
    pub syntax_theme: String,
    pub feed: FeedConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            template: DEFAULT_TEMPLATE.to_string(),
            syntax_theme: DEFAULT_SYNTAX_THEME.to_string(),
            feed: FeedConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, &[&str])]) -> RawMetadata {
        entries
            .iter()
            .map(|(key, lines)| {
                (
                    key.to_string(),
                    lines.iter().map(|line| line.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_normalize_single_value_stays_string() {
        let metadata = ContentMetadata::normalize(&raw(&[("title", &["Hello"])]));
        assert_eq!(
            metadata.get("title"),
            Some(&MetadataValue::Single("Hello".to_string()))
        );
    }

    #[test]
    fn test_normalize_commas_become_list() {
        let metadata = ContentMetadata::normalize(&raw(&[("tags", &["a, b, c"])]));
        assert_eq!(
            metadata.get("tags"),
            Some(&MetadataValue::List(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
    }

    #[test]
    fn test_normalize_continuation_lines_split_on_commas() {
        let metadata = ContentMetadata::normalize(&raw(&[("authors", &["Ann,", "Bob"])]));
        assert_eq!(
            metadata.get("authors"),
            Some(&MetadataValue::List(vec![
                "Ann".to_string(),
                "Bob".to_string()
            ]))
        );
    }

    #[test]
    fn test_normalize_continuation_without_comma_keeps_newline() {
        let metadata =
            ContentMetadata::normalize(&raw(&[("summary", &["first line", "second line"])]));
        assert_eq!(
            metadata.get_string("summary"),
            Some("first line\nsecond line")
        );
    }

    #[test]
    fn test_normalize_drops_empty_pieces_including_trailing_comma() {
        let metadata = ContentMetadata::normalize(&raw(&[("tags", &["a, , b,"])]));
        assert_eq!(
            metadata.get("tags"),
            Some(&MetadataValue::List(vec!["a".to_string(), "b".to_string()]))
        );

        let metadata = ContentMetadata::normalize(&raw(&[("tags", &["rust,"])]));
        assert_eq!(metadata.get_string("tags"), Some("rust"));
    }

    #[test]
    fn test_normalize_empty_value_is_empty_string() {
        let metadata = ContentMetadata::normalize(&raw(&[("draft", &[""])]));
        assert_eq!(metadata.get_string("draft"), Some(""));
        assert_eq!(ContentKind::of(&metadata), ContentKind::Article);
    }

    #[test]
    fn test_normalize_leaves_input_untouched() {
        let input = raw(&[("tags", &["a, b"])]);
        let before = input.clone();
        let _ = ContentMetadata::normalize(&input);
        assert_eq!(input, before);
    }

    #[test]
    fn test_content_kind() {
        assert_eq!(
            ContentKind::of(&ContentMetadata::default()),
            ContentKind::Page
        );
        let metadata = ContentMetadata::normalize(&raw(&[("title", &["Hi"])]));
        assert_eq!(ContentKind::of(&metadata), ContentKind::Article);
    }

    #[test]
    fn test_metadata_values_reach_templates_untagged() {
        let metadata = ContentMetadata::normalize(&raw(&[
            ("title", &["Hi"]),
            ("tags", &["a, b"]),
        ]));
        let context = RenderContext {
            content: String::new(),
            metadata,
        };
        let rendered = tera::Tera::one_off(
            "{{ title }}|{{ tags | join(sep=\"+\") }}",
            &context.to_tera(),
            false,
        )
        .unwrap();
        assert_eq!(rendered, "Hi|a+b");
    }

    #[test]
    fn test_render_context_metadata_shadows_content() {
        let context = RenderContext {
            content: "<p>body</p>".to_string(),
            metadata: ContentMetadata::normalize(&raw(&[("content", &["override"])])),
        };
        let rendered = tera::Tera::one_off("{{ content }}", &context.to_tera(), false).unwrap();
        assert_eq!(rendered, "override");
    }

    #[test]
    fn test_metadata_list_joined() {
        let value = MetadataValue::List(vec!["Jan 1".to_string(), "2023".to_string()]);
        assert_eq!(value.joined(), "Jan 1, 2023");
        assert_eq!(value.as_str(), None);
    }

    #[test]
    fn test_default_config() {
        let config = BuildConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("content"));
        assert_eq!(config.output_dir, PathBuf::from("build"));
        assert_eq!(config.template_dir, PathBuf::from("templates"));
        assert_eq!(config.template, "article.html");
        assert_eq!(config.feed.output_path, PathBuf::from("atom.xml"));
    }
}
