//! Collaborator traits consulted by the tree builder.
//!
//! The builder never decides what a link does or where image bytes come
//! from. It asks a [`BuilderDelegate`] for link handlers and code formatting,
//! and an [`ImageLoader`] for image nodes.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::DelegateError;
use crate::highlight::SyntaxHighlighter;
use crate::image::decode_data_uri;
use crate::render::{ImageNode, ImageSize, ImageSource, RenderNode, TextSpan};
use crate::style::StyleSheet;

/// Interaction handler attached to link text and images.
///
/// One handler is created per `a` element and shared by every run and image
/// inside it.
pub trait LinkHandler: fmt::Debug + Send + Sync {
    /// Link target the handler was created for.
    fn href(&self) -> &str;

    /// Activate the link.
    fn activate(&self);
}

/// Callback invoked with the link target on activation.
pub type TapCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Link handler that forwards activation to a callback.
#[derive(Clone)]
pub struct TapLinkHandler {
    href: String,
    on_tap: Option<TapCallback>,
}

impl TapLinkHandler {
    /// Create a handler for `href`.
    ///
    /// Without a callback, activation does nothing.
    #[must_use]
    pub fn new(href: impl Into<String>, on_tap: Option<TapCallback>) -> Self {
        Self {
            href: href.into(),
            on_tap,
        }
    }
}

impl fmt::Debug for TapLinkHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapLinkHandler")
            .field("href", &self.href)
            .field("on_tap", &self.on_tap.is_some())
            .finish()
    }
}

impl LinkHandler for TapLinkHandler {
    fn href(&self) -> &str {
        &self.href
    }

    fn activate(&self) {
        if let Some(on_tap) = &self.on_tap {
            on_tap(&self.href);
        }
    }
}

/// Hooks for link creation and code formatting.
pub trait BuilderDelegate: Send + Sync {
    /// Create the handler for a link.
    ///
    /// `href` is empty when the `a` element has no `href` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DelegateError::Link`] if the handler cannot be created.
    fn create_link(&self, href: &str) -> Result<Arc<dyn LinkHandler>, DelegateError>;

    /// Format the raw text of a code block.
    ///
    /// The default renders the text as a single run in the `code` style.
    ///
    /// # Errors
    ///
    /// Returns [`DelegateError::Highlight`] if formatting fails.
    fn format_code(&self, sheet: &StyleSheet, code: &str) -> Result<TextSpan, DelegateError> {
        Ok(TextSpan::new(
            code,
            sheet.resolve("code").cloned().unwrap_or_default(),
        ))
    }
}

/// Delegate with an optional tap callback and syntax highlighter.
#[derive(Clone, Default)]
pub struct DefaultDelegate {
    on_tap_link: Option<TapCallback>,
    highlighter: Option<Arc<dyn SyntaxHighlighter>>,
}

impl DefaultDelegate {
    /// Create a delegate whose links do nothing and whose code is unhighlighted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke `callback` with the link target when a link is activated.
    #[must_use]
    pub fn with_tap_callback(mut self, callback: TapCallback) -> Self {
        self.on_tap_link = Some(callback);
        self
    }

    /// Format code blocks with `highlighter`.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Arc<dyn SyntaxHighlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }
}

impl fmt::Debug for DefaultDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultDelegate")
            .field("on_tap_link", &self.on_tap_link.is_some())
            .field("highlighter", &self.highlighter.is_some())
            .finish()
    }
}

impl BuilderDelegate for DefaultDelegate {
    fn create_link(&self, href: &str) -> Result<Arc<dyn LinkHandler>, DelegateError> {
        Ok(Arc::new(TapLinkHandler::new(href, self.on_tap_link.clone())))
    }

    fn format_code(&self, sheet: &StyleSheet, code: &str) -> Result<TextSpan, DelegateError> {
        let code_style = sheet.resolve("code").cloned().unwrap_or_default();
        match &self.highlighter {
            Some(highlighter) => {
                // Token colors stay on the children; the root carries the code bundle
                let mut span = highlighter.format(code);
                span.style = code_style.merge(Some(&span.style));
                Ok(span)
            }
            None => Ok(TextSpan::new(code, code_style)),
        }
    }
}

/// Produces image nodes, one method per locator scheme.
///
/// Every method has a default that emits an [`ImageNode`] descriptor.
/// [`data`](Self::data) decodes base64 image payloads and yields an empty
/// placeholder for anything else.
pub trait ImageLoader: Send + Sync {
    /// Load an `http` or `https` image.
    ///
    /// # Errors
    ///
    /// Returns [`DelegateError::Image`] if the image cannot be loaded.
    fn network(&self, url: &str, size: ImageSize) -> Result<RenderNode, DelegateError> {
        Ok(RenderNode::Image(ImageNode {
            source: ImageSource::Network(url.to_owned()),
            size,
        }))
    }

    /// Load a `data:` URI image.
    ///
    /// # Errors
    ///
    /// Returns [`DelegateError::Image`] if the image cannot be decoded.
    fn data(&self, uri: &str, size: ImageSize) -> Result<RenderNode, DelegateError> {
        let Some((media_type, bytes)) = decode_data_uri(uri) else {
            tracing::debug!("Unsupported data URI payload, using placeholder");
            return Ok(RenderNode::empty());
        };
        Ok(RenderNode::Image(ImageNode {
            source: ImageSource::Data {
                media_type: media_type.to_owned(),
                bytes,
            },
            size,
        }))
    }

    /// Load a bundled asset by name.
    ///
    /// # Errors
    ///
    /// Returns [`DelegateError::Image`] if the asset cannot be loaded.
    fn asset(&self, name: &str, size: ImageSize) -> Result<RenderNode, DelegateError> {
        Ok(RenderNode::Image(ImageNode {
            source: ImageSource::Asset(name.to_owned()),
            size,
        }))
    }

    /// Load a local file.
    ///
    /// # Errors
    ///
    /// Returns [`DelegateError::Image`] if the file cannot be loaded.
    fn file(&self, path: &Path, size: ImageSize) -> Result<RenderNode, DelegateError> {
        Ok(RenderNode::Image(ImageNode {
            source: ImageSource::File(path.to_path_buf()),
            size,
        }))
    }
}

/// Image loader that emits plain descriptors.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultImageLoader;

impl ImageLoader for DefaultImageLoader {}
