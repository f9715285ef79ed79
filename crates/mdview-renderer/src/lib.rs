//! Markdown to render-tree builder.
//!
//! This crate turns a parsed markdown tree into a tree of layout and paint
//! primitives ([`RenderNode`]) that a host UI layer can lay out and draw.
//!
//! # Architecture
//!
//! - [`StyleSheet`]: maps element tags to text styles and carries layout constants
//! - [`TreeBuilder`]: walks [`ParsedNode`] trees and produces render nodes
//! - [`BuilderDelegate`] and [`ImageLoader`]: host hooks for links, code
//!   blocks, and images
//! - [`parse_markdown`]: `pulldown-cmark` adapter producing [`ParsedNode`] trees
//!
//! # Example
//!
//! ```
//! use mdview_renderer::{StyleSheet, TreeBuilder, outline, parse_markdown};
//!
//! let nodes = parse_markdown("# Title\n\nSome *emphasis*.");
//! let tree = TreeBuilder::new(StyleSheet::default()).build(&nodes).unwrap();
//! assert!(outline(&tree).contains("\"emphasis\" italic"));
//! ```

mod builder;
mod delegate;
mod error;
mod highlight;
mod image;
mod node;
mod parse;
mod render;
mod state;
mod style;

pub use builder::TreeBuilder;
pub use delegate::{
    BuilderDelegate, DefaultDelegate, DefaultImageLoader, ImageLoader, LinkHandler, TapCallback,
    TapLinkHandler,
};
pub use error::{BuildError, DelegateError};
pub use highlight::{HighlighterStyle, RegexHighlighter, SyntaxHighlighter};
pub use image::{ImageKind, ImageLocator, decode_data_uri};
pub use node::{Element, ParsedNode, is_block_tag, is_list_tag};
pub use parse::parse_markdown;
pub use render::{
    ImageNode, ImageSize, ImageSource, RenderNode, RichText, TextAlign, TextSpan, outline,
};
pub use style::{
    BorderSide, Color, Decoration, EdgeInsets, FontStyle, FontWeight, Layout, StyleSheet,
    TextDecoration, TextStyle, TextStyles, Theme,
};
