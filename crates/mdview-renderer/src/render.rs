//! Render tree produced by the tree builder.
//!
//! Nodes are plain layout and paint primitives; the host UI layer interprets
//! them. [`RenderNode::outline`] dumps a tree as indented text.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use crate::delegate::LinkHandler;
use crate::style::{Decoration, EdgeInsets, FontStyle, FontWeight, TextStyle};

/// Horizontal alignment of a text block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Leading edge.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Trailing edge.
    End,
}

/// A styled run of text, optionally with child runs.
///
/// A span with children is a composite run; its own `text` precedes the
/// children when laid out.
#[derive(Clone, Debug, Default)]
pub struct TextSpan {
    /// Text of this run.
    pub text: String,
    /// Style of this run. Children inherit it.
    pub style: TextStyle,
    /// Child runs in order.
    pub children: Vec<TextSpan>,
    /// Link activated by tapping this run.
    pub handler: Option<Arc<dyn LinkHandler>>,
}

impl TextSpan {
    /// Create a leaf run.
    #[must_use]
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            children: Vec::new(),
            handler: None,
        }
    }

    /// Create a composite run that only groups `children`.
    #[must_use]
    pub fn group(children: Vec<TextSpan>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    /// Attach a link handler.
    #[must_use]
    pub fn with_handler(mut self, handler: Option<Arc<dyn LinkHandler>>) -> Self {
        self.handler = handler;
        self
    }

    /// Concatenated text of this run and all child runs.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.plain_text());
        }
        out
    }
}

/// A block of rich text.
#[derive(Clone, Debug, Default)]
pub struct RichText {
    /// Root run.
    pub span: TextSpan,
    /// Horizontal alignment.
    pub align: TextAlign,
}

impl RichText {
    /// Create a start-aligned text block.
    #[must_use]
    pub fn new(span: TextSpan) -> Self {
        Self {
            span,
            align: TextAlign::Start,
        }
    }

    /// Set the alignment.
    #[must_use]
    pub fn aligned(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// Where image bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// `http` or `https` URL.
    Network(String),
    /// Decoded `data:` URI payload.
    Data {
        /// Media type, e.g. `image/png`.
        media_type: String,
        /// Encoded image bytes.
        bytes: Vec<u8>,
    },
    /// Bundled asset name (the part after `resource:`).
    Asset(String),
    /// Local file.
    File(PathBuf),
}

/// Explicit image dimensions. `None` means natural size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImageSize {
    /// Width in logical pixels.
    pub width: Option<f32>,
    /// Height in logical pixels.
    pub height: Option<f32>,
}

impl ImageSize {
    /// Natural size.
    pub const NATURAL: Self = Self {
        width: None,
        height: None,
    };

    /// Explicit width and height.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }
}

/// Image descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageNode {
    /// Image location.
    pub source: ImageSource,
    /// Requested size.
    pub size: ImageSize,
}

/// A node of the render tree.
#[derive(Clone, Debug)]
pub enum RenderNode {
    /// Styled text.
    Text(RichText),
    /// Image.
    Image(ImageNode),
    /// Children stacked vertically, stretched to full width.
    Column(Vec<RenderNode>),
    /// Children laid out horizontally.
    Row(Vec<RenderNode>),
    /// Inline children flowing and wrapping across lines.
    Wrap(Vec<RenderNode>),
    /// Child filling the remaining space of a row.
    Expanded(Box<RenderNode>),
    /// Child inset by padding.
    Padding {
        /// Insets.
        padding: EdgeInsets,
        /// Inset child.
        child: Box<RenderNode>,
    },
    /// Child painted over a decoration.
    Decorated {
        /// Background decoration.
        decoration: Decoration,
        /// Decorated child.
        child: Box<RenderNode>,
    },
    /// Fixed-size box, used for spacers and empty placeholders.
    SizedBox {
        /// Width, or unconstrained.
        width: Option<f32>,
        /// Height, or unconstrained.
        height: Option<f32>,
        /// Optional child.
        child: Option<Box<RenderNode>>,
    },
    /// Region that activates a link when tapped.
    Tappable {
        /// Activated link.
        handler: Arc<dyn LinkHandler>,
        /// Tappable child.
        child: Box<RenderNode>,
    },
}

impl RenderNode {
    /// Empty placeholder with no size and no child.
    #[must_use]
    pub fn empty() -> Self {
        Self::SizedBox {
            width: None,
            height: None,
            child: None,
        }
    }

    /// Vertical spacer.
    #[must_use]
    pub fn spacer(height: f32) -> Self {
        Self::SizedBox {
            width: None,
            height: Some(height),
            child: None,
        }
    }

    /// Check whether this is an empty placeholder.
    #[must_use]
    pub fn is_empty_placeholder(&self) -> bool {
        matches!(
            self,
            Self::SizedBox {
                width: None,
                height: None,
                child: None
            }
        )
    }

    /// Dump the tree as indented text, one node per line.
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match self {
            Self::Text(text) => {
                let _ = write!(out, "{indent}Text");
                if text.align != TextAlign::Start {
                    let _ = write!(out, " align={:?}", text.align);
                }
                out.push('\n');
                write_span(&text.span, depth + 1, out);
            }
            Self::Image(image) => {
                let _ = write!(out, "{indent}Image ");
                match &image.source {
                    ImageSource::Network(url) => {
                        let _ = write!(out, "network {url}");
                    }
                    ImageSource::Data { media_type, bytes } => {
                        let _ = write!(out, "data {media_type} {} bytes", bytes.len());
                    }
                    ImageSource::Asset(name) => {
                        let _ = write!(out, "asset {name}");
                    }
                    ImageSource::File(path) => {
                        let _ = write!(out, "file {}", path.display());
                    }
                }
                match (image.size.width, image.size.height) {
                    (Some(w), Some(h)) => {
                        let _ = writeln!(out, " {w}x{h}");
                    }
                    _ => out.push('\n'),
                }
            }
            Self::Column(children) | Self::Row(children) | Self::Wrap(children) => {
                let name = match self {
                    Self::Column(_) => "Column",
                    Self::Row(_) => "Row",
                    _ => "Wrap",
                };
                let _ = writeln!(out, "{indent}{name}");
                for child in children {
                    child.write_outline(depth + 1, out);
                }
            }
            Self::Expanded(child) => {
                let _ = writeln!(out, "{indent}Expanded");
                child.write_outline(depth + 1, out);
            }
            Self::Padding { padding, child } => {
                let _ = writeln!(
                    out,
                    "{indent}Padding {} {} {} {}",
                    padding.left, padding.top, padding.right, padding.bottom
                );
                child.write_outline(depth + 1, out);
            }
            Self::Decorated { decoration, child } => {
                let _ = write!(out, "{indent}Decorated");
                if let Some(color) = decoration.color {
                    let _ = write!(out, " fill={color}");
                }
                if let Some(border) = decoration.border_top {
                    let _ = write!(out, " top={}/{}", border.color, border.width);
                }
                out.push('\n');
                child.write_outline(depth + 1, out);
            }
            Self::SizedBox {
                width,
                height,
                child,
            } => {
                let _ = write!(out, "{indent}SizedBox");
                if let Some(width) = width {
                    let _ = write!(out, " w={width}");
                }
                if let Some(height) = height {
                    let _ = write!(out, " h={height}");
                }
                out.push('\n');
                if let Some(child) = child {
                    child.write_outline(depth + 1, out);
                }
            }
            Self::Tappable { handler, child } => {
                let _ = writeln!(out, "{indent}Tappable {}", handler.href());
                child.write_outline(depth + 1, out);
            }
        }
    }
}

fn write_span(span: &TextSpan, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    if span.text.is_empty() && !span.children.is_empty() {
        let _ = write!(out, "{indent}group");
    } else {
        let _ = write!(out, "{indent}{:?}", span.text);
    }
    let style = &span.style;
    if style.font_weight.is_some_and(|w| w >= FontWeight::BOLD) {
        out.push_str(" bold");
    }
    if style.font_style == Some(FontStyle::Italic) {
        out.push_str(" italic");
    }
    if style.font_family.as_deref() == Some("monospace") {
        out.push_str(" mono");
    }
    if let Some(handler) = &span.handler {
        let _ = write!(out, " link={}", handler.href());
    }
    out.push('\n');
    for child in &span.children {
        write_span(child, depth + 1, out);
    }
}

/// Dump a sequence of root nodes as indented text.
#[must_use]
pub fn outline(nodes: &[RenderNode]) -> String {
    nodes.iter().map(RenderNode::outline).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::delegate::TapLinkHandler;

    #[test]
    fn test_empty_placeholder() {
        assert!(RenderNode::empty().is_empty_placeholder());
        assert!(!RenderNode::spacer(8.0).is_empty_placeholder());
    }

    #[test]
    fn test_plain_text_concatenates_children() {
        let span = TextSpan::group(vec![
            TextSpan::new("Hello ", TextStyle::new()),
            TextSpan::new("world", TextStyle::new().italic()),
        ]);
        assert_eq!(span.plain_text(), "Hello world");
    }

    #[test]
    fn test_outline_nested() {
        let tree = RenderNode::Column(vec![
            RenderNode::Wrap(vec![RenderNode::Text(RichText::new(TextSpan::new(
                "hi",
                TextStyle::new().bold(),
            )))]),
            RenderNode::spacer(8.0),
            RenderNode::Image(ImageNode {
                source: ImageSource::Network("https://example.com/a.png".to_owned()),
                size: ImageSize::new(100.0, 50.0),
            }),
        ]);

        assert_eq!(
            tree.outline(),
            "\
Column
  Wrap
    Text
      \"hi\" bold
  SizedBox h=8
  Image network https://example.com/a.png 100x50
"
        );
    }

    #[test]
    fn test_outline_link_span() {
        let handler: Arc<dyn LinkHandler> = Arc::new(TapLinkHandler::new("/docs", None));
        let text = RenderNode::Text(RichText::new(
            TextSpan::new("docs", TextStyle::new()).with_handler(Some(handler.clone())),
        ));
        let tappable = RenderNode::Tappable {
            handler,
            child: Box::new(RenderNode::empty()),
        };

        assert_eq!(
            outline(&[text, tappable]),
            "\
Text
  \"docs\" link=/docs
Tappable /docs
  SizedBox
"
        );
    }

    #[test]
    fn test_outline_group_span() {
        let text = RenderNode::Text(
            RichText::new(TextSpan::group(vec![
                TextSpan::new("a", TextStyle::new()),
                TextSpan::new("b", TextStyle::new().family("monospace")),
            ]))
            .aligned(TextAlign::End),
        );

        assert_eq!(
            text.outline(),
            "\
Text align=End
  group
    \"a\"
    \"b\" mono
"
        );
    }
}
