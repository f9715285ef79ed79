//! Adapter from `pulldown-cmark` events to parsed nodes.
//!
//! Only the constructs the tree builder understands are mapped to elements.
//! HTML blocks become paragraphs of raw text. Everything else (tables,
//! footnotes) is flattened into its content.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};

use crate::node::{Element, ParsedNode};

/// Parse markdown into the node tree consumed by [`TreeBuilder`](crate::TreeBuilder).
///
/// Line endings are normalized to `\n` first. Parsing follows CommonMark
/// without extensions.
///
/// # Example
///
/// ```
/// use mdview_renderer::{ParsedNode, parse_markdown};
///
/// let nodes = parse_markdown("Hello *world*");
/// assert!(matches!(&nodes[0], ParsedNode::Element(p) if p.tag == "p"));
/// ```
#[must_use]
pub fn parse_markdown(text: &str) -> Vec<ParsedNode> {
    let text = normalize_line_endings(text);
    let mut tree = TreeSink::default();
    for event in Parser::new(&text) {
        tree.process_event(event);
    }
    tree.finish()
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Heading tag for a level.
fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Builds the node tree from a flat event stream.
///
/// Each `Start` pushes one entry; `None` marks a flattened construct whose
/// children go to the nearest mapped ancestor.
#[derive(Default)]
struct TreeSink {
    roots: Vec<ParsedNode>,
    open: Vec<Option<Element>>,
}

impl TreeSink {
    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => self.push_text(&text),
            Event::Code(code) => {
                let element = Element::new("code").with_children(vec![ParsedNode::text(code.as_ref())]);
                self.push_node(element.into());
            }
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            Event::Rule => self.push_node(ParsedNode::element("hr", Vec::new())),
            Event::TaskListMarker(checked) => self.push_text(if checked { "[x] " } else { "[ ] " }),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        let element = match tag {
            // Raw HTML blocks are shown as paragraph text.
            Tag::Paragraph | Tag::HtmlBlock => Some(Element::new("p")),
            Tag::Heading { level, .. } => Some(Element::new(heading_tag(level))),
            Tag::BlockQuote(_) => Some(Element::new("blockquote")),
            Tag::CodeBlock(kind) => {
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    let language = info.split_whitespace().next().unwrap_or_default();
                    if !language.is_empty() {
                        code = code.with_attribute("class", format!("language-{language}"));
                    }
                }
                // Text accumulates in `pre`; it is moved under `code` on close.
                Some(Element::new("pre").with_children(vec![code.into()]))
            }
            Tag::List(Some(start)) => {
                let list = Element::new("ol");
                Some(if start == 1 {
                    list
                } else {
                    list.with_attribute("start", start.to_string())
                })
            }
            Tag::List(None) => Some(Element::new("ul")),
            Tag::Item => Some(Element::new("li")),
            Tag::Emphasis => Some(Element::new("em")),
            Tag::Strong => Some(Element::new("strong")),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Element::new("a").with_attribute("href", dest_url.as_ref());
                if !title.is_empty() {
                    link = link.with_attribute("title", title.as_ref());
                }
                Some(link)
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut image = Element::new("img").with_attribute("src", dest_url.as_ref());
                if !title.is_empty() {
                    image = image.with_attribute("title", title.as_ref());
                }
                Some(image)
            }
            _ => None,
        };
        self.open.push(element);
    }

    fn end_tag(&mut self, tag: TagEnd) {
        let Some(entry) = self.open.pop() else {
            tracing::warn!(tag = ?tag, "Unbalanced end tag");
            return;
        };
        let Some(mut element) = entry else {
            return;
        };

        match element.tag.as_str() {
            "pre" => {
                let mut code = element.children.remove(0);
                let source: String = element
                    .children
                    .drain(..)
                    .filter_map(|child| match child {
                        ParsedNode::Text(text) => Some(text),
                        ParsedNode::Element(_) => None,
                    })
                    .collect();
                if let ParsedNode::Element(code) = &mut code {
                    code.children = vec![ParsedNode::Text(source)];
                }
                element.children = vec![code];
            }
            "img" => {
                let alt = element.text_content();
                element.children.clear();
                if !alt.is_empty() {
                    element = element.with_attribute("alt", alt);
                }
            }
            "p" if tag == TagEnd::HtmlBlock => {
                if let Some(ParsedNode::Text(text)) = element.children.last_mut() {
                    text.truncate(text.trim_end_matches('\n').len());
                }
            }
            _ => {}
        }

        self.push_node(element.into());
    }

    /// Children list of the nearest mapped open element, or the roots.
    fn target(&mut self) -> &mut Vec<ParsedNode> {
        match self.open.iter_mut().rev().find_map(Option::as_mut) {
            Some(element) => &mut element.children,
            None => &mut self.roots,
        }
    }

    fn push_node(&mut self, node: ParsedNode) {
        self.target().push(node);
    }

    /// Append text, merging with a preceding text leaf.
    fn push_text(&mut self, text: &str) {
        let children = self.target();
        if let Some(ParsedNode::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(ParsedNode::text(text));
        }
    }

    fn finish(mut self) -> Vec<ParsedNode> {
        // Close anything left open by a truncated stream.
        while !self.open.is_empty() {
            if let Some(Some(element)) = self.open.pop() {
                self.push_node(element.into());
            }
        }
        self.roots
    }
}
