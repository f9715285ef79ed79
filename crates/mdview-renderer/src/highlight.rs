//! Code block highlighting.
//!
//! [`RegexHighlighter`] is a small language-agnostic tokenizer that colors
//! comments, strings, numbers, keywords, and punctuation. Hosts that need
//! real grammars implement [`SyntaxHighlighter`] themselves.

use std::sync::LazyLock;

use regex::Regex;

use crate::render::TextSpan;
use crate::style::{Color, TextStyle};

/// Formats the raw text of a code block as styled runs.
pub trait SyntaxHighlighter: Send + Sync {
    /// Format `code` into a span tree.
    fn format(&self, code: &str) -> TextSpan;
}

/// Token classes, matched left to right.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<comment>//[^\n]*|(?m:^[ \t]*#(?:[ \t][^\n]*)?$)|/\*(?s:.*?)\*/)",
        r#"|(?P<string>"(?:[^"\\]|\\.)*"|'(?:[^'\\\n]|\\.)')"#,
        r"|(?P<number>\b\d[\d_]*(?:\.\d+)?\b)",
        r"|(?P<keyword>\b(?:as|async|await|break|case|class|const|continue|def|else|enum|export|false|fn|for|func|function|if|impl|import|in|interface|let|loop|match|mod|mut|new|null|pub|return|self|static|struct|switch|this|trait|true|type|use|var|void|where|while)\b)",
        r"|(?P<punctuation>[{}()\[\];,.:<>=+\-*/&|!?%^~])",
    ))
    .unwrap()
});

/// Colors for each token class.
///
/// Font, size and base color of a code block come from the `code` bundle of
/// the style sheet; tokens only override the color.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlighterStyle {
    /// Comment color.
    pub comment: Color,
    /// String literal color.
    pub string: Color,
    /// Number literal color.
    pub number: Color,
    /// Keyword color.
    pub keyword: Color,
    /// Punctuation color.
    pub punctuation: Color,
}

impl HighlighterStyle {
    /// Colors for light backgrounds.
    #[must_use]
    pub fn light() -> Self {
        Self {
            comment: Color(0xFF9E_9E9E),
            string: Color(0xFF43_A047),
            number: Color(0xFF15_65C0),
            keyword: Color(0xFF9C_27B0),
            punctuation: Color(0xFF61_6161),
        }
    }
}

impl Default for HighlighterStyle {
    fn default() -> Self {
        Self::light()
    }
}

/// Regex-based highlighter.
#[derive(Clone, Debug, Default)]
pub struct RegexHighlighter {
    style: HighlighterStyle,
}

impl RegexHighlighter {
    /// Create a highlighter with the given colors.
    #[must_use]
    pub fn new(style: HighlighterStyle) -> Self {
        Self { style }
    }

    fn token_color(&self, caps: &regex::Captures<'_>) -> Color {
        if caps.name("comment").is_some() {
            self.style.comment
        } else if caps.name("string").is_some() {
            self.style.string
        } else if caps.name("number").is_some() {
            self.style.number
        } else if caps.name("keyword").is_some() {
            self.style.keyword
        } else {
            self.style.punctuation
        }
    }
}

impl SyntaxHighlighter for RegexHighlighter {
    fn format(&self, code: &str) -> TextSpan {
        let mut children = Vec::new();
        let mut last = 0;

        for caps in TOKEN_RE.captures_iter(code) {
            let Some(token) = caps.get(0) else { continue };
            if token.start() > last {
                children.push(TextSpan::new(&code[last..token.start()], TextStyle::new()));
            }
            children.push(TextSpan::new(
                token.as_str(),
                TextStyle::new().color(self.token_color(&caps)),
            ));
            last = token.end();
        }
        if last < code.len() {
            children.push(TextSpan::new(&code[last..], TextStyle::new()));
        }

        TextSpan::group(children)
    }
}
