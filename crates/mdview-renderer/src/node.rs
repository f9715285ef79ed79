//! Parsed document tree consumed by the tree builder.
//!
//! The tree is produced by a grammar layer (see [`parse_markdown`](crate::parse_markdown)
//! for the bundled `pulldown-cmark` adapter). Each node is either a text leaf or
//! a named element with attributes and children.

use std::collections::HashMap;

/// Tags that always occupy their own vertical slot.
const BLOCK_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "blockquote",
    "pre",
    "ol",
    "ul",
    "hr",
];

/// Check whether a tag is block-level.
///
/// Every tag outside the fixed block set is inline.
#[must_use]
pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Check whether a tag opens a list.
#[must_use]
pub fn is_list_tag(tag: &str) -> bool {
    matches!(tag, "ul" | "ol")
}

/// A node of the parsed document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedNode {
    /// Text leaf.
    Text(String),
    /// Named element with attributes and children.
    Element(Element),
}

impl ParsedNode {
    /// Create a text leaf.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create an element node with children and no attributes.
    #[must_use]
    pub fn element(tag: impl Into<String>, children: Vec<Self>) -> Self {
        Self::Element(Element::new(tag).with_children(children))
    }
}

impl From<Element> for ParsedNode {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Element node of the parsed tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name (e.g., `p`, `em`, `img`).
    pub tag: String,
    /// Element attributes (e.g., `href` for links, `src` for images).
    pub attributes: HashMap<String, String>,
    /// Child nodes in document order.
    pub children: Vec<ParsedNode>,
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<ParsedNode>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Concatenated text of all descendant text leaves.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[ParsedNode], out: &mut String) {
    for node in nodes {
        match node {
            ParsedNode::Text(text) => out.push_str(text),
            ParsedNode::Element(element) => collect_text(&element.children, out),
        }
    }
}
