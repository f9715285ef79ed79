//! Tree builder: parsed nodes to render nodes.
//!
//! The builder walks the parsed tree depth-first with two stacks. Block
//! frames collect vertically stacked children; inline frames collect text
//! runs and images flowing inside the innermost block. When a block boundary
//! is crossed, pending inline content is wrapped into an anonymous [`Wrap`]
//! block, with adjacent text runs coalesced into one composite run.
//!
//! [`Wrap`]: RenderNode::Wrap

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::delegate::{BuilderDelegate, DefaultDelegate, DefaultImageLoader, ImageLoader};
use crate::error::BuildError;
use crate::image::{ImageLocator, load_image};
use crate::node::{Element, ParsedNode, is_block_tag, is_list_tag};
use crate::render::{RenderNode, RichText, TextAlign, TextSpan};
use crate::state::{BlockFrame, BuildState, InlineFrame, ListKind};
use crate::style::{EdgeInsets, StyleSheet};

/// Glyph marking unordered list items.
const BULLET_GLYPH: &str = "\u{2022}";

/// Left inset of ordered list numerals.
const NUMERAL_INSET: f32 = 5.0;

/// Builds render trees from parsed markdown nodes.
///
/// All traversal state lives in a single call to [`build`](Self::build), so a
/// builder can be shared between threads and reused.
///
/// # Example
///
/// ```
/// use mdview_renderer::{ParsedNode, StyleSheet, TreeBuilder};
///
/// let nodes = vec![ParsedNode::element("p", vec![ParsedNode::text("Hello")])];
/// let tree = TreeBuilder::new(StyleSheet::default()).build(&nodes).unwrap();
/// assert_eq!(tree.len(), 1);
/// ```
#[derive(Clone)]
pub struct TreeBuilder {
    delegate: Arc<dyn BuilderDelegate>,
    image_loader: Arc<dyn ImageLoader>,
    style_sheet: StyleSheet,
    image_directory: Option<PathBuf>,
}

impl TreeBuilder {
    /// Create a builder with the default delegate and image loader.
    #[must_use]
    pub fn new(style_sheet: StyleSheet) -> Self {
        Self {
            delegate: Arc::new(DefaultDelegate::new()),
            image_loader: Arc::new(DefaultImageLoader),
            style_sheet,
            image_directory: None,
        }
    }

    /// Use `delegate` for links and code blocks.
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn BuilderDelegate>) -> Self {
        self.delegate = delegate;
        self
    }

    /// Use `loader` for images.
    #[must_use]
    pub fn with_image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.image_loader = loader;
        self
    }

    /// Resolve relative image paths against `directory`.
    #[must_use]
    pub fn with_image_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.image_directory = Some(directory.into());
        self
    }

    /// Style sheet used for every build.
    #[must_use]
    pub fn style_sheet(&self) -> &StyleSheet {
        &self.style_sheet
    }

    /// Build the render tree for a sequence of top-level nodes.
    ///
    /// Returns the children of the root block. Text and inline elements that
    /// are not inside any block are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Delegate`] if the delegate or image loader fails.
    ///
    /// # Panics
    ///
    /// Panics if a block element is nested inside an inline element, which
    /// leaves more than one inline frame open at a block boundary.
    pub fn build(&self, nodes: &[ParsedNode]) -> Result<Vec<RenderNode>, BuildError> {
        let mut state = BuildState::new();

        for node in nodes {
            assert_eq!(state.blocks.len(), 1, "top-level node visited with open blocks");
            assert!(
                state.inlines.is_empty(),
                "top-level node visited with open inline elements"
            );
            self.visit(&mut state, node)?;
        }

        assert!(
            state.inlines.is_empty(),
            "inline elements left open after build: {:?}",
            state.inlines.iter().map(|f| f.tag.as_str()).collect::<Vec<_>>()
        );

        let root = state.blocks.swap_remove(0);
        tracing::debug!(
            nodes = nodes.len(),
            blocks = root.children.len(),
            "Built render tree"
        );
        Ok(root.children)
    }

    fn visit(&self, state: &mut BuildState, node: &ParsedNode) -> Result<(), BuildError> {
        match node {
            ParsedNode::Text(text) => self.visit_text(state, text),
            ParsedNode::Element(element) => {
                if self.element_before(state, element)? {
                    for child in &element.children {
                        self.visit(state, child)?;
                    }
                    self.element_after(state, element)?;
                }
                Ok(())
            }
        }
    }

    fn visit_text(&self, state: &mut BuildState, text: &str) -> Result<(), BuildError> {
        let in_code_block = match state.current_block_tag() {
            None => return Ok(()),
            Some(tag) => tag == "pre",
        };
        self.ensure_parent_inline(state);

        let span = if in_code_block {
            self.delegate.format_code(&self.style_sheet, text)?
        } else {
            let style = state
                .inlines
                .last()
                .map(|frame| frame.style.clone())
                .unwrap_or_default();
            TextSpan::new(text, style).with_handler(state.current_link())
        };

        if let Some(frame) = state.inlines.last_mut() {
            frame.children.push(RenderNode::Text(RichText::new(span)));
        }
        Ok(())
    }

    /// Returns whether the children of `element` should be visited.
    fn element_before(&self, state: &mut BuildState, element: &Element) -> Result<bool, BuildError> {
        let tag = element.tag.as_str();

        if is_block_tag(tag) {
            self.flush_inline(state);
            if is_list_tag(tag) {
                state.lists.push(list_kind(element));
            }
            state.blocks.push(BlockFrame::new(tag));
            return Ok(true);
        }

        if state.current_block_tag().is_none() {
            tracing::debug!(tag = %tag, "Skipping inline element outside any block");
            return Ok(false);
        }

        let handler = if tag == "a" {
            let href = element.attribute("href").unwrap_or_default();
            Some(self.delegate.create_link(href)?)
        } else {
            None
        };

        self.ensure_parent_inline(state);
        let style = state
            .inlines
            .last()
            .map(|parent| parent.style.merge(self.style_sheet.resolve(tag)))
            .unwrap_or_default();
        state.inlines.push(InlineFrame::new(tag, style));

        if let Some(handler) = handler {
            state.links.push(handler);
        }
        Ok(true)
    }

    fn element_after(&self, state: &mut BuildState, element: &Element) -> Result<(), BuildError> {
        let tag = element.tag.as_str();

        if is_block_tag(tag) {
            self.flush_inline(state);
            let frame = state.pop_block();
            let mut child = if frame.children.is_empty() {
                RenderNode::empty()
            } else {
                RenderNode::Column(frame.children)
            };

            let layout = &self.style_sheet.layout;
            if is_list_tag(tag) {
                state.lists.pop();
            } else {
                match tag {
                    "li" => {
                        if let Some(kind) = state.lists.last().copied() {
                            let bullet = self.build_bullet(kind, state.current_block().next_list_index);
                            child = RenderNode::Row(vec![
                                RenderNode::SizedBox {
                                    width: Some(layout.list_indent),
                                    height: None,
                                    child: Some(Box::new(bullet)),
                                },
                                RenderNode::Expanded(Box::new(child)),
                            ]);
                        }
                    }
                    "blockquote" => {
                        child = RenderNode::Decorated {
                            decoration: layout.blockquote_decoration.clone(),
                            child: Box::new(RenderNode::Padding {
                                padding: EdgeInsets::all(layout.blockquote_padding),
                                child: Box::new(child),
                            }),
                        };
                    }
                    "pre" => {
                        child = RenderNode::Decorated {
                            decoration: layout.codeblock_decoration.clone(),
                            child: Box::new(RenderNode::Padding {
                                padding: EdgeInsets::all(layout.codeblock_padding),
                                child: Box::new(child),
                            }),
                        };
                    }
                    "hr" => {
                        child = RenderNode::Decorated {
                            decoration: layout.horizontal_rule_decoration.clone(),
                            child: Box::new(child),
                        };
                    }
                    _ => {}
                }
            }

            state.current_block().push_block(child, layout.block_spacing);
            return Ok(());
        }

        let mut frame = state
            .inlines
            .pop()
            .expect("inline element closed without an open frame");

        if tag == "img" {
            let src = element.attribute("src").unwrap_or_default();
            frame.children.push(self.build_image(state, src)?);
        } else if tag == "a" {
            state.links.pop();
        }

        if !frame.children.is_empty() {
            let parent = state
                .inlines
                .last_mut()
                .expect("inline element closed without a parent frame");
            parent.children.append(&mut frame.children);
        }
        Ok(())
    }

    /// Open an inline frame for the innermost block if none is pending.
    fn ensure_parent_inline(&self, state: &mut BuildState) {
        if !state.inlines.is_empty() {
            return;
        }
        let Some(tag) = state.current_block_tag() else {
            return;
        };
        let style = self.style_sheet.resolve(tag).cloned().unwrap_or_default();
        let frame = InlineFrame::new(tag, style);
        state.inlines.push(frame);
    }

    /// Wrap pending inline content into an anonymous block.
    ///
    /// The inline stack is always left empty, even when the pending frame
    /// collected nothing.
    fn flush_inline(&self, state: &mut BuildState) {
        assert!(
            state.inlines.len() <= 1,
            "block boundary crossed inside inline elements: {:?}",
            state.inlines.iter().map(|f| f.tag.as_str()).collect::<Vec<_>>()
        );
        let Some(frame) = state.inlines.pop() else {
            return;
        };
        if frame.children.is_empty() {
            return;
        }
        let wrap = RenderNode::Wrap(coalesce_runs(frame.children));
        state
            .current_block()
            .push_block(wrap, self.style_sheet.layout.block_spacing);
    }

    fn build_bullet(&self, kind: ListKind, index: usize) -> RenderNode {
        let style = self.style_sheet.styles.bullet.clone();
        match kind {
            ListKind::Unordered => RenderNode::Text(
                RichText::new(TextSpan::new(BULLET_GLYPH, style)).aligned(TextAlign::Center),
            ),
            ListKind::Ordered { start } => {
                let numeral = start.saturating_add(index as u64);
                RenderNode::Padding {
                    padding: EdgeInsets::left(NUMERAL_INSET),
                    child: Box::new(RenderNode::Text(
                        RichText::new(TextSpan::new(format!("{numeral}."), style))
                            .aligned(TextAlign::End),
                    )),
                }
            }
        }
    }

    fn build_image(&self, state: &BuildState, src: &str) -> Result<RenderNode, BuildError> {
        let locator = ImageLocator::parse(src);
        if locator.path.is_empty() {
            tracing::debug!(src = %src, "Image without locator");
            return Ok(RenderNode::empty());
        }

        let image = load_image(
            &locator,
            self.image_loader.as_ref(),
            self.image_directory.as_deref(),
        )?;

        Ok(match state.current_link() {
            Some(handler) => RenderNode::Tappable {
                handler,
                child: Box::new(image),
            },
            None => image,
        })
    }
}

impl fmt::Debug for TreeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("style_sheet", &self.style_sheet)
            .field("image_directory", &self.image_directory)
            .finish_non_exhaustive()
    }
}

fn list_kind(element: &Element) -> ListKind {
    if element.tag == "ol" {
        let start = element
            .attribute("start")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1);
        ListKind::Ordered { start }
    } else {
        ListKind::Unordered
    }
}

/// Merge each run of consecutive text nodes into one composite text node.
///
/// Non-text nodes break runs and are kept in place.
fn coalesce_runs(children: Vec<RenderNode>) -> Vec<RenderNode> {
    let mut merged = Vec::with_capacity(children.len());
    let mut run = Vec::new();

    for child in children {
        match child {
            RenderNode::Text(text) => run.push(text.span),
            other => {
                push_run(&mut run, &mut merged);
                merged.push(other);
            }
        }
    }
    push_run(&mut run, &mut merged);
    merged
}

fn push_run(run: &mut Vec<TextSpan>, merged: &mut Vec<RenderNode>) {
    let span = match run.len() {
        0 => return,
        1 => run.remove(0),
        _ => TextSpan::group(std::mem::take(run)),
    };
    merged.push(RenderNode::Text(RichText::new(span)));
}
