/*!
 * Selection policy for raw source lines.
 *
 * A source hands over its lines in document order; only lines holding exactly
 * one complete emphasis span become `MarkedLine`s, and selection stops once
 * the requested number of lines has been accepted.
 */

use log::warn;
use std::fmt;

use crate::errors::SourceError;
use crate::markup::{Dialect, MarkupTransformer};

/// A source line with exactly one complete `**…**` span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedLine(String);

/// Why a line was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRejection {
    /// No complete marker pair
    NoMarkedSpan,
    /// An opening marker without a closing partner
    Unbalanced,
    /// More than one marked span
    MultipleSpans,
}

impl fmt::Display for LineRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMarkedSpan => write!(f, "no **bold** text found"),
            Self::Unbalanced => write!(f, "unbalanced ** markers"),
            Self::MultipleSpans => write!(f, "more than one **bold** span"),
        }
    }
}

impl MarkedLine {
    /// Validate and wrap a raw line
    pub fn parse(raw: &str) -> Result<Self, LineRejection> {
        let line = raw.trim();
        if !Dialect::Emphasis.is_balanced(line) {
            return Err(LineRejection::Unbalanced);
        }
        if !MarkupTransformer::has_complete_span(line, Dialect::Emphasis) {
            return Err(LineRejection::NoMarkedSpan);
        }
        if MarkupTransformer::span_count(line, Dialect::Emphasis) > 1 {
            return Err(LineRejection::MultipleSpans);
        }
        Ok(Self(line.to_string()))
    }

    /// The full line, markers included
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text inside the marker pair
    pub fn focus(&self) -> &str {
        MarkupTransformer::spans(&self.0, Dialect::Emphasis)
            .first()
            .copied()
            .unwrap_or_default()
    }
}

impl fmt::Display for MarkedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MarkedLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Content selector applying the line acceptance rule
pub struct ContentSelector;

impl ContentSelector {
    /// Accept up to `max_count` marked lines from `lines`, in order.
    ///
    /// Blank lines are ignored silently, other rejected lines are logged.
    /// `topic` is only used for error reporting.
    pub fn select<S: AsRef<str>>(
        topic: &str,
        lines: &[S],
        max_count: usize,
    ) -> Result<Vec<MarkedLine>, SourceError> {
        if max_count == 0 {
            return Err(SourceError::InvalidCount);
        }

        let mut accepted = Vec::new();
        for raw in lines {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }

            match MarkedLine::parse(raw) {
                Ok(line) => {
                    accepted.push(line);
                    if accepted.len() == max_count {
                        break;
                    }
                }
                Err(reason) => warn!("Skipping sentence ({}): {}", reason, raw.trim()),
            }
        }

        if accepted.is_empty() {
            return Err(SourceError::PageEmpty(topic.to_string()));
        }

        Ok(accepted)
    }
}
