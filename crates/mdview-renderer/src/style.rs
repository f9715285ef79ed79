//! Text styles, decorations, and the tag-to-style resolver.
//!
//! [`StyleSheet`] maps element tags to [`TextStyle`] bundles and carries the
//! layout constants used by the tree builder (block spacing, list indent,
//! container paddings, and decorations).

use std::fmt;

/// ARGB color.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Color(pub u32);

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);
    /// Black at 87% opacity (primary text on light backgrounds).
    pub const BLACK87: Self = Self(0xDD00_0000);
    /// Material blue 500.
    pub const BLUE: Self = Self(0xFF21_96F3);
    /// Material grey 100.
    pub const GREY_100: Self = Self(0xFFF5_F5F5);
    /// Material grey 300.
    pub const GREY_300: Self = Self(0xFFE0_E0E0);
    /// Material grey 700.
    pub const GREY_700: Self = Self(0xFF61_6161);

    /// Create a color from 8-bit channels.
    #[must_use]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Alpha channel.
    #[must_use]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Parse `#RRGGBB` or `#AARRGGBB` (leading `#` optional).
    ///
    /// Six-digit colors are opaque.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self(0xFF00_0000 | value)),
            8 => Some(Self(value)),
            _ => None,
        }
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({self})")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid color `{value}`"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Font weight on the CSS 100-900 scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Regular weight (400).
    pub const NORMAL: Self = Self(400);
    /// Medium weight (500).
    pub const MEDIUM: Self = Self(500);
    /// Bold weight (700).
    pub const BOLD: Self = Self(700);
}

/// Slant of the glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FontStyle {
    /// Upright glyphs.
    Normal,
    /// Italic glyphs.
    Italic,
}

/// Line drawn near the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TextDecoration {
    /// No decoration.
    None,
    /// Line below the text.
    Underline,
    /// Line through the middle of the text.
    LineThrough,
}

/// A bundle of optional text attributes.
///
/// Unset attributes are inherited from the enclosing style when merged.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct TextStyle {
    /// Foreground color.
    pub color: Option<Color>,
    /// Font size in logical pixels.
    pub font_size: Option<f32>,
    /// Font family name.
    pub font_family: Option<String>,
    /// Font weight.
    pub font_weight: Option<FontWeight>,
    /// Font slant.
    pub font_style: Option<FontStyle>,
    /// Text decoration line.
    pub decoration: Option<TextDecoration>,
    /// Line height as a multiple of the font size.
    pub height: Option<f32>,
}

impl TextStyle {
    /// Create an empty style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the font size.
    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set the font family.
    #[must_use]
    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Set the font weight.
    #[must_use]
    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = Some(weight);
        self
    }

    /// Use bold weight.
    #[must_use]
    pub fn bold(self) -> Self {
        self.weight(FontWeight::BOLD)
    }

    /// Use italic glyphs.
    #[must_use]
    pub fn italic(mut self) -> Self {
        self.font_style = Some(FontStyle::Italic);
        self
    }

    /// Set the decoration line.
    #[must_use]
    pub fn decoration(mut self, decoration: TextDecoration) -> Self {
        self.decoration = Some(decoration);
        self
    }

    /// Merge another style on top of this one.
    ///
    /// Attributes set in `other` win; unset attributes fall through to `self`.
    /// Merging `None` returns a copy of `self`.
    #[must_use]
    pub fn merge(&self, other: Option<&Self>) -> Self {
        let Some(other) = other else {
            return self.clone();
        };
        Self {
            color: other.color.or(self.color),
            font_size: other.font_size.or(self.font_size),
            font_family: other
                .font_family
                .clone()
                .or_else(|| self.font_family.clone()),
            font_weight: other.font_weight.or(self.font_weight),
            font_style: other.font_style.or(self.font_style),
            decoration: other.decoration.or(self.decoration),
            height: other.height.or(self.height),
        }
    }
}

/// Insets on each side of a box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeInsets {
    /// Left inset.
    pub left: f32,
    /// Top inset.
    pub top: f32,
    /// Right inset.
    pub right: f32,
    /// Bottom inset.
    pub bottom: f32,
}

impl EdgeInsets {
    /// Same inset on every side.
    #[must_use]
    pub const fn all(value: f32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    /// Inset on the left side only.
    #[must_use]
    pub const fn left(value: f32) -> Self {
        Self {
            left: value,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
        }
    }
}

/// A single border line.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderSide {
    /// Line color.
    pub color: Color,
    /// Line width.
    pub width: f32,
}

/// Background painted behind a container.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Decoration {
    /// Fill color.
    pub color: Option<Color>,
    /// Corner radius.
    pub border_radius: f32,
    /// Border along the top edge.
    pub border_top: Option<BorderSide>,
}

/// Typography of a host theme.
///
/// The slot names follow the Material 2014 type scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    /// Default body text.
    pub body1: TextStyle,
    /// Emphasized body text.
    pub body2: TextStyle,
    /// Small headings.
    pub subhead: TextStyle,
    /// Medium headings.
    pub title: TextStyle,
    /// Large headings.
    pub headline: TextStyle,
    /// Accent color used for links.
    pub accent: Color,
}

impl Theme {
    /// Light theme with the Material 2014 type scale.
    #[must_use]
    pub fn light() -> Self {
        let base = TextStyle::new().color(Color::BLACK87);
        Self {
            body1: base.clone().size(14.0).weight(FontWeight::NORMAL),
            body2: base.clone().size(14.0).weight(FontWeight::MEDIUM),
            subhead: base.clone().size(16.0).weight(FontWeight::NORMAL),
            title: base.clone().size(20.0).weight(FontWeight::MEDIUM),
            headline: base.size(24.0).weight(FontWeight::NORMAL),
            accent: Color::BLUE,
        }
    }

    /// Apply a font family to every text slot.
    #[must_use]
    pub fn with_font_family(mut self, family: &str) -> Self {
        for style in [
            &mut self.body1,
            &mut self.body2,
            &mut self.subhead,
            &mut self.title,
            &mut self.headline,
        ] {
            style.font_family = Some(family.to_owned());
        }
        self
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

/// Named style bundles, one per styled element kind.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyles {
    /// Links (`a`).
    pub a: TextStyle,
    /// Paragraphs, list containers, list items, and code blocks.
    pub p: TextStyle,
    /// Inline code (`code`).
    pub code: TextStyle,
    /// Level 1 heading.
    pub h1: TextStyle,
    /// Level 2 heading.
    pub h2: TextStyle,
    /// Level 3 heading.
    pub h3: TextStyle,
    /// Level 4 heading.
    pub h4: TextStyle,
    /// Level 5 heading.
    pub h5: TextStyle,
    /// Level 6 heading.
    pub h6: TextStyle,
    /// Emphasis (`em`).
    pub em: TextStyle,
    /// Strong emphasis (`strong`).
    pub strong: TextStyle,
    /// Blockquotes.
    pub blockquote: TextStyle,
    /// Images (`img`).
    pub img: TextStyle,
    /// List bullets and numerals.
    pub bullet: TextStyle,
}

impl TextStyles {
    /// Look up a bundle by its name for modification.
    ///
    /// Names are the field names of this struct.
    pub fn bundle_mut(&mut self, name: &str) -> Option<&mut TextStyle> {
        Some(match name {
            "a" => &mut self.a,
            "p" => &mut self.p,
            "code" => &mut self.code,
            "h1" => &mut self.h1,
            "h2" => &mut self.h2,
            "h3" => &mut self.h3,
            "h4" => &mut self.h4,
            "h5" => &mut self.h5,
            "h6" => &mut self.h6,
            "em" => &mut self.em,
            "strong" => &mut self.strong,
            "blockquote" => &mut self.blockquote,
            "img" => &mut self.img,
            "bullet" => &mut self.bullet,
            _ => return None,
        })
    }
}

/// Layout constants used by the tree builder.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Vertical gap inserted between sibling blocks.
    pub block_spacing: f32,
    /// Width reserved for list bullets and numerals.
    pub list_indent: f32,
    /// Padding inside blockquotes.
    pub blockquote_padding: f32,
    /// Background of blockquotes.
    pub blockquote_decoration: Decoration,
    /// Padding inside code blocks.
    pub codeblock_padding: f32,
    /// Background of code blocks.
    pub codeblock_decoration: Decoration,
    /// Decoration that draws horizontal rules.
    pub horizontal_rule_decoration: Decoration,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            block_spacing: 8.0,
            list_indent: 32.0,
            blockquote_padding: 8.0,
            blockquote_decoration: Decoration {
                border_radius: 2.0,
                ..Decoration::default()
            },
            codeblock_padding: 8.0,
            codeblock_decoration: Decoration {
                color: Some(Color::GREY_100),
                border_radius: 2.0,
                border_top: None,
            },
            horizontal_rule_decoration: Decoration {
                border_top: Some(BorderSide {
                    color: Color::GREY_300,
                    width: 5.0,
                }),
                ..Decoration::default()
            },
        }
    }
}

/// Resolves element tags to text styles.
///
/// List items and list containers share the paragraph style, as do code
/// blocks (`pre`); their contents are formatted separately.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSheet {
    /// Named style bundles.
    pub styles: TextStyles,
    /// Layout constants.
    pub layout: Layout,
}

/// Body font size assumed when the theme leaves it unset.
const DEFAULT_BODY_SIZE: f32 = 14.0;

/// Inline code is rendered at this fraction of the body size.
const CODE_SIZE_FACTOR: f32 = 0.85;

impl StyleSheet {
    /// Create a style sheet from explicit bundles and layout constants.
    #[must_use]
    pub fn new(styles: TextStyles, layout: Layout) -> Self {
        Self { styles, layout }
    }

    /// Derive a full style sheet from a host theme.
    #[must_use]
    pub fn from_theme(theme: &Theme) -> Self {
        let body_size = theme.body1.font_size.unwrap_or(DEFAULT_BODY_SIZE);
        let styles = TextStyles {
            a: TextStyle::new().color(theme.accent),
            p: theme.body1.clone(),
            code: TextStyle::new()
                .color(Color::GREY_700)
                .size(body_size * CODE_SIZE_FACTOR)
                .family("monospace"),
            h1: theme.headline.clone(),
            h2: theme.title.clone(),
            h3: theme.subhead.clone(),
            h4: theme.body2.clone(),
            h5: theme.body2.clone(),
            h6: theme.body2.clone(),
            em: TextStyle::new().italic(),
            strong: TextStyle::new().bold(),
            blockquote: theme.body1.clone(),
            img: theme.body1.clone(),
            bullet: theme.body1.clone(),
        };
        Self::new(styles, Layout::default())
    }

    /// Merge an explicit override onto a named bundle.
    ///
    /// Returns `false` if `name` does not name a bundle.
    pub fn apply_override(&mut self, name: &str, style: &TextStyle) -> bool {
        match self.styles.bundle_mut(name) {
            Some(bundle) => {
                *bundle = bundle.merge(Some(style));
                true
            }
            None => false,
        }
    }

    /// Builder form of [`apply_override`](Self::apply_override).
    ///
    /// Unknown bundle names are ignored.
    #[must_use]
    pub fn with_override(mut self, name: &str, style: &TextStyle) -> Self {
        self.apply_override(name, style);
        self
    }

    /// Resolve the style for an element tag.
    ///
    /// Returns `None` for tags without a style; callers inherit the parent
    /// style unchanged in that case.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<&TextStyle> {
        let styles = &self.styles;
        Some(match tag {
            "a" => &styles.a,
            "p" | "li" | "pre" | "ul" | "ol" => &styles.p,
            "code" => &styles.code,
            "h1" => &styles.h1,
            "h2" => &styles.h2,
            "h3" => &styles.h3,
            "h4" => &styles.h4,
            "h5" => &styles.h5,
            "h6" => &styles.h6,
            "em" => &styles.em,
            "strong" => &styles.strong,
            "blockquote" => &styles.blockquote,
            "img" => &styles.img,
            _ => return None,
        })
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#2196f3"), Some(Color::BLUE));
        assert_eq!(Color::from_hex("dd000000"), Some(Color::BLACK87));
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
        assert_eq!(Color::from_hex("+12345"), None);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::GREY_300.to_string(), "#ffe0e0e0");
        assert_eq!(Color::from_argb(0x80, 1, 2, 3).alpha(), 0x80);
    }

    #[test]
    fn test_merge_right_biased() {
        let parent = TextStyle::new().color(Color::BLACK).size(14.0);
        let child = TextStyle::new().color(Color::BLUE).italic();

        let merged = parent.merge(Some(&child));

        assert_eq!(merged.color, Some(Color::BLUE));
        assert_eq!(merged.font_size, Some(14.0));
        assert_eq!(merged.font_style, Some(FontStyle::Italic));
    }

    #[test]
    fn test_merge_none_is_identity() {
        let style = TextStyle::new().size(12.0).family("serif");
        assert_eq!(style.merge(None), style);
    }

    #[test]
    fn test_from_theme_code_style() {
        let sheet = StyleSheet::from_theme(&Theme::light());
        let code = sheet.resolve("code").unwrap();
        assert_eq!(code.font_family.as_deref(), Some("monospace"));
        assert!((code.font_size.unwrap() - 14.0 * 0.85).abs() < f32::EPSILON);
        assert_eq!(code.color, Some(Color::GREY_700));
    }

    #[test]
    fn test_from_theme_emphasis() {
        let sheet = StyleSheet::default();
        assert_eq!(sheet.resolve("em").unwrap().font_style, Some(FontStyle::Italic));
        assert_eq!(
            sheet.resolve("strong").unwrap().font_weight,
            Some(FontWeight::BOLD)
        );
        assert_eq!(sheet.resolve("a").unwrap().color, Some(Color::BLUE));
    }

    #[test]
    fn test_from_theme_headings() {
        let theme = Theme::light();
        let sheet = StyleSheet::from_theme(&theme);
        assert_eq!(sheet.resolve("h1"), Some(&theme.headline));
        assert_eq!(sheet.resolve("h2"), Some(&theme.title));
        assert_eq!(sheet.resolve("h3"), Some(&theme.subhead));
        assert_eq!(sheet.resolve("h6"), Some(&theme.body2));
    }

    #[test]
    fn test_lists_share_paragraph_style() {
        let sheet = StyleSheet::default();
        let p = sheet.resolve("p");
        assert_eq!(sheet.resolve("li"), p);
        assert_eq!(sheet.resolve("ul"), p);
        assert_eq!(sheet.resolve("ol"), p);
        assert_eq!(sheet.resolve("pre"), p);
    }

    #[test]
    fn test_resolve_unknown_tag() {
        let sheet = StyleSheet::default();
        assert_eq!(sheet.resolve("span"), None);
        assert_eq!(sheet.resolve("hr"), None);
    }

    #[test]
    fn test_apply_override() {
        let mut sheet = StyleSheet::default();
        let applied = sheet.apply_override("h1", &TextStyle::new().size(32.0));
        assert!(applied);
        let h1 = sheet.resolve("h1").unwrap();
        assert_eq!(h1.font_size, Some(32.0));
        // Untouched attributes keep the theme value
        assert_eq!(h1.color, Some(Color::BLACK87));

        assert!(!sheet.apply_override("table", &TextStyle::new()));
    }

    #[test]
    fn test_theme_font_family() {
        let theme = Theme::light().with_font_family("Avenir");
        assert_eq!(theme.body1.font_family.as_deref(), Some("Avenir"));
        assert_eq!(theme.headline.font_family.as_deref(), Some("Avenir"));
    }

    #[test]
    fn test_default_layout() {
        let layout = Layout::default();
        assert!((layout.block_spacing - 8.0).abs() < f32::EPSILON);
        assert!((layout.list_indent - 32.0).abs() < f32::EPSILON);
        assert_eq!(layout.codeblock_decoration.color, Some(Color::GREY_100));
        assert_eq!(
            layout.horizontal_rule_decoration.border_top,
            Some(BorderSide {
                color: Color::GREY_300,
                width: 5.0
            })
        );
    }
}
