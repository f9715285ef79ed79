//! Per-build state of the tree builder.

use std::sync::Arc;

use crate::delegate::LinkHandler;
use crate::render::RenderNode;
use crate::style::TextStyle;

/// An open block-level element collecting child blocks.
#[derive(Debug)]
pub(crate) struct BlockFrame {
    /// Tag of the block, `None` for the root.
    pub tag: Option<String>,
    pub children: Vec<RenderNode>,
    /// Incremented once per block child appended; numbers list items.
    pub next_list_index: usize,
}

impl BlockFrame {
    pub fn root() -> Self {
        Self {
            tag: None,
            children: Vec::new(),
            next_list_index: 0,
        }
    }

    pub fn new(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_owned()),
            ..Self::root()
        }
    }

    /// Append a child block, preceded by a spacer unless it is the first.
    pub fn push_block(&mut self, child: RenderNode, spacing: f32) {
        if !self.children.is_empty() {
            self.children.push(RenderNode::spacer(spacing));
        }
        self.children.push(child);
        self.next_list_index += 1;
    }
}

/// An open inline element collecting inline render nodes.
#[derive(Debug)]
pub(crate) struct InlineFrame {
    pub tag: String,
    /// Parent style merged with the style of `tag`.
    pub style: TextStyle,
    pub children: Vec<RenderNode>,
}

impl InlineFrame {
    pub fn new(tag: &str, style: TextStyle) -> Self {
        Self {
            tag: tag.to_owned(),
            style,
            children: Vec::new(),
        }
    }
}

/// Kind of an open list, deciding how its items are marked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ListKind {
    /// `ul`: glyph bullets.
    Unordered,
    /// `ol`: numerals counting from `start`.
    Ordered { start: u64 },
}

/// Stacks owned by a single build.
#[derive(Debug)]
pub(crate) struct BuildState {
    /// Never empty; the bottom frame is the root.
    pub blocks: Vec<BlockFrame>,
    pub inlines: Vec<InlineFrame>,
    pub links: Vec<Arc<dyn LinkHandler>>,
    pub lists: Vec<ListKind>,
}

impl BuildState {
    pub fn new() -> Self {
        Self {
            blocks: vec![BlockFrame::root()],
            inlines: Vec::new(),
            links: Vec::new(),
            lists: Vec::new(),
        }
    }

    /// Innermost open block.
    pub fn current_block(&mut self) -> &mut BlockFrame {
        self.blocks
            .last_mut()
            .expect("block stack always holds the root frame")
    }

    /// Close the innermost block.
    ///
    /// # Panics
    ///
    /// Panics if only the root frame is open.
    pub fn pop_block(&mut self) -> BlockFrame {
        assert!(self.blocks.len() > 1, "attempted to pop the root block");
        self.blocks
            .pop()
            .expect("block stack always holds the root frame")
    }

    /// Tag of the innermost open block, `None` at the root.
    pub fn current_block_tag(&self) -> Option<&str> {
        self.blocks.last().and_then(|frame| frame.tag.as_deref())
    }

    /// Handler of the innermost open link.
    pub fn current_link(&self) -> Option<Arc<dyn LinkHandler>> {
        self.links.last().map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_block_spacing() {
        let mut frame = BlockFrame::new("ul");
        frame.push_block(RenderNode::empty(), 8.0);
        frame.push_block(RenderNode::empty(), 8.0);

        assert_eq!(frame.children.len(), 3);
        assert!(matches!(
            frame.children[1],
            RenderNode::SizedBox {
                height: Some(h),
                ..
            } if (h - 8.0).abs() < f32::EPSILON
        ));
        assert_eq!(frame.next_list_index, 2);
    }

    #[test]
    fn test_new_state_has_root() {
        let state = BuildState::new();
        assert_eq!(state.blocks.len(), 1);
        assert_eq!(state.current_block_tag(), None);
        assert!(state.inlines.is_empty());
        assert!(state.current_link().is_none());
    }
}
