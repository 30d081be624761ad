/*!
 * Markup conversion between the three dialects a sentence passes through.
 *
 * Sentences arrive with the focus span in emphasis markup (`**word**`). The
 * source-language sentence is displayed with underline markup
 * (`<u>word</u>`) and the study-facing target sentence uses cloze-deletion
 * markup (`{{c1::word}}`).
 *
 * Span matching is greedy and non-nested: the first opening marker opens a
 * span and the next closing marker of the same dialect closes it. Every span
 * in a line is converted independently.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::errors::MarkupError;

static EMPHASIS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*(.*?)\*\*").expect("Invalid emphasis regex")
});

static UNDERLINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<u>(.*?)</u>").expect("Invalid underline regex")
});

// Hints (`{{c1::word::hint}}`) are dropped on conversion
static CLOZE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{c\d+::(.*?)(?:::.*?)?\}\}").expect("Invalid cloze regex")
});

/// Captures the number of each cloze deletion
pub static CLOZE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{c(\d+)::").expect("Invalid cloze number regex")
});

/// A markup convention for delimiting the focus span of a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `**word**`
    Emphasis,
    /// `<u>word</u>`
    Underline,
    /// `{{c1::word}}`
    Cloze,
}

impl Dialect {
    /// Name used in configuration and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Emphasis => "emphasis",
            Self::Underline => "underline",
            Self::Cloze => "cloze",
        }
    }

    /// Replacement template wrapping the captured inner text
    fn template(&self) -> &'static str {
        match self {
            Self::Emphasis => "**${1}**",
            Self::Underline => "<u>${1}</u>",
            Self::Cloze => "{{c1::${1}}}",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Self::Emphasis => &EMPHASIS_REGEX,
            Self::Underline => &UNDERLINE_REGEX,
            Self::Cloze => &CLOZE_REGEX,
        }
    }

    /// Whether every opening marker in `text` has a closing partner
    pub fn is_balanced(&self, text: &str) -> bool {
        match self {
            Self::Emphasis => text.matches("**").count() % 2 == 0,
            Self::Underline => text.matches("<u>").count() == text.matches("</u>").count(),
            Self::Cloze => text.matches("{{").count() == text.matches("}}").count(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dialect {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "emphasis" | "bold" => Ok(Self::Emphasis),
            "underline" => Ok(Self::Underline),
            "cloze" => Ok(Self::Cloze),
            _ => Err(MarkupError::UnsupportedDialect(s.to_string())),
        }
    }
}

/// Stateless converter between markup dialects
pub struct MarkupTransformer;

impl MarkupTransformer {
    /// Convert every emphasis span of `text` into the `target` dialect.
    ///
    /// Text without markers is returned unchanged.
    pub fn convert(text: &str, target: Dialect) -> String {
        Self::convert_between(text, Dialect::Emphasis, target)
    }

    /// Convert every `from` span of `text` into the `to` dialect
    pub fn convert_between(text: &str, from: Dialect, to: Dialect) -> String {
        if from == to {
            return text.to_string();
        }
        from.pattern().replace_all(text, to.template()).into_owned()
    }

    /// Convert using a dialect name, rejecting unknown names up front
    pub fn convert_named(text: &str, target: &str) -> Result<String, MarkupError> {
        let dialect = target.parse::<Dialect>()?;
        Ok(Self::convert(text, dialect))
    }

    /// Inner texts of all spans of `dialect` in `text`, in order
    pub fn spans<'a>(text: &'a str, dialect: Dialect) -> Vec<&'a str> {
        dialect
            .pattern()
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Number of spans of `dialect` in `text`
    pub fn span_count(text: &str, dialect: Dialect) -> usize {
        dialect.pattern().find_iter(text).count()
    }

    /// Whether `text` holds at least one complete, non-blank span
    pub fn has_complete_span(text: &str, dialect: Dialect) -> bool {
        dialect.is_balanced(text)
            && Self::spans(text, dialect)
                .iter()
                .any(|span| !span.trim().is_empty())
    }
}
