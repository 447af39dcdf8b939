use crate::error::{Result, SgError};
use crate::types::{DEFAULT_SYNTAX_THEME, RawMetadata};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Weekday};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

const TAB_WIDTH: usize = 4;
const MAX_KEY_INDENT: usize = 3;

pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: DEFAULT_SYNTAX_THEME.to_string(),
        }
    }

    pub fn with_theme(theme_name: &str) -> Result<Self> {
        let renderer = Self {
            theme_name: theme_name.to_string(),
            ..Self::new()
        };

        if !renderer.theme_set.themes.contains_key(theme_name) {
            return Err(SgError::UnknownSyntaxTheme {
                name: theme_name.to_string(),
            });
        }

        Ok(renderer)
    }

    pub fn render(&self, content: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        let mut events = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(String::from)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        events.push(Event::Html(self.highlight(lang.as_deref(), &code).into()));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    fn highlight(&self, lang: Option<&str>, code: &str) -> String {
        let Some(lang) = lang else {
            return format!("<pre><code>{}</code></pre>\n", escape_html(code));
        };

        let syntax = self.syntax_set.find_syntax_by_token(lang);
        let theme = self.theme_set.themes.get(&self.theme_name);

        let highlighted = match (syntax, theme) {
            (Some(syntax), Some(theme)) => {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
            }
            _ => None,
        };

        highlighted.unwrap_or_else(|| {
            format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                escape_html(lang),
                escape_html(code)
            )
        })
    }
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn parse_markdown(content: &str) -> String {
    MarkdownRenderer::new().render(content)
}

/// Splits a leading `Key: value` block off the document.
///
/// The block may open with a `---` line and ends at the first blank line or
/// at a `---`/`...` line. Keys are lowercased and a key given twice collects
/// both lines. Lines indented four or more columns continue the previous key.
/// The first line that fits none of these rules starts the body.
pub fn extract_frontmatter(content: &str) -> (RawMetadata, String) {
    let content = content.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = content.split('\n').collect();

    let mut index = 0;
    if lines.first().is_some_and(|line| line.starts_with("---")) {
        index = 1;
    }

    let mut raw = RawMetadata::new();
    let mut current_key: Option<String> = None;

    while let Some(line) = lines.get(index) {
        if line.trim().is_empty() || line.starts_with("---") || line.starts_with("...") {
            index += 1;
            break;
        }

        if let Some((key, value)) = parse_key_line(line) {
            raw.entry(key.clone()).or_default().push(value);
            current_key = Some(key);
        } else if let (Some(key), Some(value)) = (&current_key, parse_continuation(line)) {
            raw.entry(key.clone()).or_default().push(value);
        } else {
            break;
        }

        index += 1;
    }

    let body = lines.get(index..).unwrap_or_default().join("\n");
    (raw, body)
}

fn leading_width(line: &str) -> (usize, usize) {
    let mut width = 0;
    for (offset, character) in line.char_indices() {
        match character {
            ' ' => width += 1,
            '\t' => width += TAB_WIDTH - width % TAB_WIDTH,
            _ => return (width, offset),
        }
    }
    (width, line.len())
}

fn parse_key_line(line: &str) -> Option<(String, String)> {
    let (width, offset) = leading_width(line);
    if width > MAX_KEY_INDENT {
        return None;
    }

    let rest = &line[offset..];
    let key_len = rest
        .find(|character: char| {
            !(character.is_ascii_alphanumeric() || character == '_' || character == '-')
        })
        .unwrap_or(rest.len());

    if key_len == 0 {
        return None;
    }

    let value = rest[key_len..].strip_prefix(':')?;
    Some((rest[..key_len].to_ascii_lowercase(), value.trim().to_string()))
}

fn parse_continuation(line: &str) -> Option<String> {
    let (width, offset) = leading_width(line);
    (width >= TAB_WIDTH).then(|| line[offset..].trim().to_string())
}

/// Parses a front-matter `date` written in ISO-8601.
///
/// The date is calendar (`2023-01-01`, `20230101`) or week based
/// (`2023-W01-1`, `2023W011`, `2023-W01`). A time may follow after any single
/// separator character: `HH`, `HH:MM`, `HH:MM:SS` or their basic forms, with
/// an optional `.`/`,` fraction on the seconds. The offset is `Z`, `±HH`,
/// `±HH:MM`, `±HHMM` or with seconds. Values without an offset are UTC.
pub fn parse_iso8601(value: &str) -> Option<DateTime<FixedOffset>> {
    let (date, rest) = parse_iso_date(value)?;

    let mut remainder = rest.chars();
    if remainder.next().is_none() {
        return Some(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }

    let (time, offset) = parse_iso_time(remainder.as_str())?;
    let naive = date.and_time(time);
    match offset {
        Some(offset) => naive.and_local_timezone(offset).single(),
        None => Some(naive.and_utc().fixed_offset()),
    }
}

fn parse_iso_date(value: &str) -> Option<(NaiveDate, &str)> {
    let bytes = value.as_bytes();
    let year = ascii_number(bytes.get(..4)?)? as i32;

    let (date, consumed) = match bytes.get(4) {
        Some(b'-') if bytes.get(5) == Some(&b'W') => {
            let week = ascii_number(bytes.get(6..8)?)?;
            if bytes.get(8) == Some(&b'-') {
                let day = ascii_number(bytes.get(9..10)?)?;
                (week_date(year, week, day)?, 10)
            } else {
                (week_date(year, week, 1)?, 8)
            }
        }
        Some(b'-') => {
            if bytes.get(7) != Some(&b'-') {
                return None;
            }
            let month = ascii_number(bytes.get(5..7)?)?;
            let day = ascii_number(bytes.get(8..10)?)?;
            (NaiveDate::from_ymd_opt(year, month, day)?, 10)
        }
        Some(b'W') => {
            let week = ascii_number(bytes.get(5..7)?)?;
            match bytes.get(7) {
                Some(day) if day.is_ascii_digit() => {
                    (week_date(year, week, u32::from(day - b'0'))?, 8)
                }
                _ => (week_date(year, week, 1)?, 7),
            }
        }
        _ => {
            let month = ascii_number(bytes.get(4..6)?)?;
            let day = ascii_number(bytes.get(6..8)?)?;
            (NaiveDate::from_ymd_opt(year, month, day)?, 8)
        }
    };

    Some((date, value.get(consumed..)?))
}

fn week_date(year: i32, week: u32, day: u32) -> Option<NaiveDate> {
    let weekday = match day {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        7 => Weekday::Sun,
        _ => return None,
    };
    NaiveDate::from_isoywd_opt(year, week, weekday)
}

fn parse_iso_time(text: &str) -> Option<(NaiveTime, Option<FixedOffset>)> {
    let split = text.find(['+', '-', 'Z']).unwrap_or(text.len());
    let (clock, zone) = text.split_at(split);

    let (hour, minute, second, nanos) = parse_clock(clock)?;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;

    let sign = match zone.as_bytes().first() {
        None => return Some((time, None)),
        Some(b'Z') if zone.len() == 1 => return Some((time, FixedOffset::east_opt(0))),
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return None,
    };

    // Sub-second offsets are accepted but truncated to whole seconds.
    let (hours, minutes, seconds, _) = parse_clock(&zone[1..])?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    let total = (hours * 3600 + minutes * 60 + seconds) as i32;
    Some((time, Some(FixedOffset::east_opt(sign * total)?)))
}

/// `HH[:MM[:SS[.f]]]` or `HH[MM[SS[.f]]]`, returned as hour, minute, second
/// and nanoseconds.
fn parse_clock(text: &str) -> Option<(u32, u32, u32, u32)> {
    let (main, fraction) = match text.find(['.', ',']) {
        Some(index) => (&text[..index], Some(&text[index + 1..])),
        None => (text, None),
    };

    let fields: Vec<u32> = if main.contains(':') {
        main.split(':')
            .map(|field| two_digits(field.as_bytes()))
            .collect::<Option<_>>()?
    } else {
        if main.len() % 2 != 0 {
            return None;
        }
        main.as_bytes()
            .chunks(2)
            .map(two_digits)
            .collect::<Option<_>>()?
    };

    if fields.is_empty() || fields.len() > 3 {
        return None;
    }

    let nanos = match fraction {
        None => 0,
        Some(digits)
            if fields.len() == 3
                && !digits.is_empty()
                && digits.bytes().all(|byte| byte.is_ascii_digit()) =>
        {
            format!("{:0<9}", &digits[..digits.len().min(9)])
                .parse()
                .ok()?
        }
        Some(_) => return None,
    };

    Some((
        fields[0],
        fields.get(1).copied().unwrap_or(0),
        fields.get(2).copied().unwrap_or(0),
        nanos,
    ))
}

fn two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    ascii_number(bytes)
}

fn ascii_number(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |number, byte| {
        byte.is_ascii_digit()
            .then(|| number * 10 + u32::from(byte - b'0'))
    })
}
