//! Image locator parsing and loader dispatch.
//!
//! A locator is `path[#WxH]`. The scheme of `path` selects the
//! [`ImageLoader`] method; the optional `WxH` suffix requests an explicit size.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::delegate::ImageLoader;
use crate::error::DelegateError;
use crate::render::{ImageSize, RenderNode};

/// Prefix stripped from asset locators.
const RESOURCE_PREFIX_LEN: usize = "resource:".len();

/// Image locator split into its path and requested size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageLocator<'a> {
    /// Locator without the size suffix.
    pub path: &'a str,
    /// Requested size; natural unless the suffix parsed.
    pub size: ImageSize,
}

impl<'a> ImageLocator<'a> {
    /// Parse a `src` attribute.
    ///
    /// Splits on the first `#`. The suffix gives an explicit size only when it
    /// has the form `WxH` and both parts parse as numbers; anything else falls
    /// back to natural size.
    #[must_use]
    pub fn parse(src: &'a str) -> Self {
        let (path, suffix) = match src.split_once('#') {
            Some((path, suffix)) => (path, Some(suffix)),
            None => (src, None),
        };
        let size = suffix.and_then(parse_size).unwrap_or(ImageSize::NATURAL);
        Self { path, size }
    }

    /// Classify the path by scheme.
    #[must_use]
    pub fn kind(&self) -> ImageKind<'a> {
        let path = self.path;
        match scheme(path).map(str::to_ascii_lowercase).as_deref() {
            Some("http" | "https") => ImageKind::Network(path),
            Some("data") => ImageKind::Data(path),
            Some("resource") => ImageKind::Asset(path.get(RESOURCE_PREFIX_LEN..).unwrap_or_default()),
            Some("file") => {
                let stripped = path.get("file:".len()..).unwrap_or_default();
                ImageKind::File(stripped.strip_prefix("//").unwrap_or(stripped))
            }
            _ => ImageKind::File(path),
        }
    }
}

/// Loader selected by the locator scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind<'a> {
    /// `http`/`https` URL.
    Network(&'a str),
    /// `data:` URI.
    Data(&'a str),
    /// Asset name with the `resource:` prefix removed.
    Asset(&'a str),
    /// File path, possibly relative.
    File(&'a str),
}

fn parse_size(suffix: &str) -> Option<ImageSize> {
    let (width, height) = suffix.split_once('x')?;
    let width = width.trim().parse::<f32>().ok()?;
    let height = height.trim().parse::<f32>().ok()?;
    (width.is_finite() && height.is_finite()).then_some(ImageSize::new(width, height))
}

/// Extract a URI scheme (`ALPHA *(ALPHA / DIGIT / "+" / "-" / ".")` before `:`).
///
/// Single-letter schemes are rejected so that Windows drive paths stay paths.
fn scheme(path: &str) -> Option<&str> {
    let (scheme, _) = path.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = scheme.len() > 1
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Resolve a file path against the base image directory.
fn resolve_file(path: &str, image_directory: Option<&Path>) -> PathBuf {
    let path = Path::new(path);
    match image_directory {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

/// Decode a base64 `data:` URI holding an image.
///
/// Returns the media type and the decoded bytes, or `None` when the media
/// type is not `image/*`, the payload is not base64, or it fails to decode.
#[must_use]
pub fn decode_data_uri(uri: &str) -> Option<(&str, Vec<u8>)> {
    let rest = uri
        .get(..5)
        .filter(|prefix| prefix.eq_ignore_ascii_case("data:"))
        .and_then(|_| uri.get(5..))?;
    let (meta, payload) = rest.split_once(',')?;
    let media_type = meta.strip_suffix(";base64")?.split(';').next()?.trim();
    if !media_type
        .get(..6)
        .is_some_and(|kind| kind.eq_ignore_ascii_case("image/"))
    {
        return None;
    }
    let bytes = BASE64_STANDARD.decode(payload.trim()).ok()?;
    Some((media_type, bytes))
}

/// Load an image through the loader method its scheme selects.
pub(crate) fn load_image(
    locator: &ImageLocator<'_>,
    loader: &dyn ImageLoader,
    image_directory: Option<&Path>,
) -> Result<RenderNode, DelegateError> {
    let size = locator.size;
    match locator.kind() {
        ImageKind::Network(url) => loader.network(url, size),
        ImageKind::Data(uri) => loader.data(uri, size),
        ImageKind::Asset(name) => loader.asset(name, size),
        ImageKind::File(path) => loader.file(&resolve_file(path, image_directory), size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::DefaultImageLoader;
    use crate::render::ImageSource;

    #[test]
    fn test_parse_explicit_size() {
        let locator = ImageLocator::parse("photo.png#100x50");
        assert_eq!(locator.path, "photo.png");
        assert_eq!(locator.size, ImageSize::new(100.0, 50.0));
    }

    #[test]
    fn test_parse_fractional_size() {
        let locator = ImageLocator::parse("photo.png#12.5x7");
        assert_eq!(locator.size, ImageSize::new(12.5, 7.0));
    }

    #[test]
    fn test_parse_malformed_size_is_natural() {
        for src in ["photo.png#bad", "photo.png#100x", "photo.png#x50", "photo.png#1x2x3", "photo.png#"] {
            let locator = ImageLocator::parse(src);
            assert_eq!(locator.path, "photo.png", "{src}");
            assert_eq!(locator.size, ImageSize::NATURAL, "{src}");
        }
    }

    #[test]
    fn test_parse_splits_on_first_hash() {
        let locator = ImageLocator::parse("a.png#10x10#extra");
        assert_eq!(locator.path, "a.png");
        assert_eq!(locator.size, ImageSize::NATURAL);
    }

    #[test]
    fn test_parse_empty() {
        let locator = ImageLocator::parse("#10x10");
        assert_eq!(locator.path, "");
        assert_eq!(locator.size, ImageSize::new(10.0, 10.0));
    }

    #[test]
    fn test_kind_by_scheme() {
        let kind = |src| ImageLocator::parse(src).kind();
        assert_eq!(kind("http://x/a.png"), ImageKind::Network("http://x/a.png"));
        assert_eq!(kind("HTTPS://x/a.png"), ImageKind::Network("HTTPS://x/a.png"));
        assert_eq!(kind("data:image/png;base64,AA"), ImageKind::Data("data:image/png;base64,AA"));
        assert_eq!(kind("resource:icons/logo"), ImageKind::Asset("icons/logo"));
        assert_eq!(kind("file:///tmp/a.png"), ImageKind::File("/tmp/a.png"));
        assert_eq!(kind("img/a.png"), ImageKind::File("img/a.png"));
        assert_eq!(kind("C:\\img\\a.png"), ImageKind::File("C:\\img\\a.png"));
    }

    #[test]
    fn test_load_relative_file_joins_directory() {
        let locator = ImageLocator::parse("img/a.png");
        let node = load_image(&locator, &DefaultImageLoader, Some(Path::new("/docs"))).unwrap();
        let RenderNode::Image(image) = node else {
            panic!("expected image node");
        };
        assert_eq!(image.source, ImageSource::File(PathBuf::from("/docs/img/a.png")));
    }

    #[test]
    fn test_load_absolute_file_ignores_directory() {
        let locator = ImageLocator::parse("/abs/a.png");
        let node = load_image(&locator, &DefaultImageLoader, Some(Path::new("/docs"))).unwrap();
        let RenderNode::Image(image) = node else {
            panic!("expected image node");
        };
        assert_eq!(image.source, ImageSource::File(PathBuf::from("/abs/a.png")));
    }

    #[test]
    fn test_load_data_uri_decodes_image() {
        let locator = ImageLocator::parse("data:image/png;base64,iVBORw==#16x16");
        let node = load_image(&locator, &DefaultImageLoader, None).unwrap();

        assert_eq!(node.outline(), "Image data image/png 4 bytes 16x16\n");
        let RenderNode::Image(image) = node else {
            panic!("expected image node");
        };
        assert_eq!(
            image.source,
            ImageSource::Data {
                media_type: "image/png".to_owned(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            }
        );
    }

    #[test]
    fn test_load_invalid_data_uri_is_placeholder() {
        for src in [
            "data:image/gif;base64,R0lGOD",
            "data:text/plain;base64,aGk=",
            "data:image/svg+xml,<svg/>",
        ] {
            let node = load_image(&ImageLocator::parse(src), &DefaultImageLoader, None).unwrap();
            assert!(node.is_empty_placeholder(), "{src}");
        }
    }

    #[test]
    fn test_decode_data_uri_parameters() {
        assert_eq!(
            decode_data_uri("DATA:image/gif;name=dot.gif;base64,AAAA"),
            Some(("image/gif", vec![0, 0, 0]))
        );
        assert_eq!(decode_data_uri("data:;base64,AAAA"), None);
        assert_eq!(decode_data_uri("data:image/png;base64"), None);
    }
}
