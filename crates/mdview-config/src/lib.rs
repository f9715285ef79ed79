//! Configuration management for mdview.
//!
//! Parses `mdview.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. The loaded
//! configuration converts into a [`StyleSheet`] for the tree builder.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `theme.font_family`
//! - `images.directory` (also expands a leading `~`)
//!
//! ## Example
//!
//! ```toml
//! [theme]
//! font_family = "${MDVIEW_FONT:-Helvetica}"
//! accent = "#2196f3"
//!
//! [layout]
//! list_indent = 24
//!
//! [styles.h1]
//! font_size = 30
//! font_weight = 700
//!
//! [images]
//! directory = "assets"
//! ```

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mdview_renderer::{
    Color, FontStyle, FontWeight, StyleSheet, TextDecoration, TextStyle, Theme,
};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override base directory for relative image paths.
    pub image_directory: Option<PathBuf>,
    /// Override syntax highlighting flag.
    pub highlight: Option<bool>,
    /// Override preview worker thread count.
    pub threads: Option<usize>,
    /// Override theme font family.
    pub font_family: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdview.toml";

/// Upper bound for layout lengths.
const MAX_LENGTH: f32 = 1000.0;

/// Upper bound for preview worker threads.
const MAX_THREADS: usize = 64;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Theme configuration.
    pub theme: ThemeConfig,
    /// Layout constants.
    pub layout: LayoutConfig,
    /// Per-bundle style overrides, keyed by bundle name (`h1`, `code`, `bullet`, ...).
    pub styles: BTreeMap<String, StyleOverride>,
    /// Image configuration (paths are relative strings from TOML).
    images: ImagesConfigRaw,
    /// Code block highlighting.
    pub highlight: HighlightConfig,
    /// Preview worker configuration.
    pub preview: PreviewConfig,

    /// Resolved base directory for relative image paths (set after loading).
    #[serde(skip)]
    pub image_directory: Option<PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            layout: LayoutConfig::default(),
            styles: BTreeMap::new(),
            images: ImagesConfigRaw::default(),
            highlight: HighlightConfig::default(),
            preview: PreviewConfig::default(),
            image_directory: None,
            config_path: None,
        }
    }
}

/// Theme configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Font family applied to every text slot.
    pub font_family: Option<String>,
    /// Link color as `#RRGGBB` or `#AARRGGBB`.
    pub accent: Option<String>,
    /// Body text size; headings keep their theme sizes.
    pub body_size: Option<f32>,
}

/// Layout constants.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Vertical gap between sibling blocks.
    pub block_spacing: f32,
    /// Width reserved for list bullets.
    pub list_indent: f32,
    /// Padding inside blockquotes.
    pub blockquote_padding: f32,
    /// Padding inside code blocks.
    pub codeblock_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let layout = mdview_renderer::Layout::default();
        Self {
            block_spacing: layout.block_spacing,
            list_indent: layout.list_indent,
            blockquote_padding: layout.blockquote_padding,
            codeblock_padding: layout.codeblock_padding,
        }
    }
}

/// Style override for one bundle.
///
/// Set fields replace the theme-derived value; unset fields keep it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOverride {
    /// Text color as `#RRGGBB` or `#AARRGGBB`.
    pub color: Option<String>,
    /// Font size.
    pub font_size: Option<f32>,
    /// Font family.
    pub font_family: Option<String>,
    /// Font weight (100-900).
    pub font_weight: Option<FontWeight>,
    /// `normal` or `italic`.
    pub font_style: Option<FontStyle>,
    /// `none`, `underline`, or `line_through`.
    pub decoration: Option<TextDecoration>,
    /// Line height multiplier.
    pub height: Option<f32>,
}

impl StyleOverride {
    /// Convert to a text style, parsing the color.
    fn to_text_style(&self, bundle: &str) -> Result<TextStyle, ConfigError> {
        let color = self
            .color
            .as_deref()
            .map(|value| parse_color(value, &format!("styles.{bundle}.color")))
            .transpose()?;
        Ok(TextStyle {
            color,
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            font_weight: self.font_weight,
            font_style: self.font_style,
            decoration: self.decoration,
            height: self.height,
        })
    }
}

/// Raw image configuration as parsed from TOML (paths as strings).
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ImagesConfigRaw {
    directory: Option<String>,
}

/// Code block highlighting configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    /// Whether code blocks are syntax highlighted.
    pub enabled: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Preview worker configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Number of worker threads building documents.
    pub threads: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`images.directory`").
        field: String,
        /// Error message (e.g., "${`ASSETS`} not set").
        message: String,
    },
    /// Invalid color value.
    #[error("Invalid color in {field}: `{value}` (expected #RRGGBB or #AARRGGBB)")]
    Color {
        /// Config field path (e.g., "`theme.accent`").
        field: String,
        /// Rejected value.
        value: String,
    },
}

fn parse_color(value: &str, field: &str) -> Result<Color, ConfigError> {
    Color::from_hex(value).ok_or_else(|| ConfigError::Color {
        field: field.to_owned(),
        value: value.to_owned(),
    })
}

/// Require a length to be finite and within `0..=MAX_LENGTH`.
fn require_length(value: f32, field: &str) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    if value > MAX_LENGTH {
        return Err(ConfigError::Validation(format!(
            "{field} cannot exceed {MAX_LENGTH}"
        )));
    }
    Ok(())
}

/// Require a font size to be finite and positive.
fn require_font_size(value: f32, field: &str) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdview.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(directory) = &settings.image_directory {
            self.image_directory = Some(directory.clone());
        }
        if let Some(highlight) = settings.highlight {
            self.highlight.enabled = highlight;
        }
        if let Some(threads) = settings.threads {
            self.preview.threads = threads;
        }
        if let Some(font_family) = &settings.font_family {
            self.theme.font_family = Some(font_family.clone());
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks layout lengths, font sizes, colors, style bundle names, and the
    /// worker thread count. Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` or `ConfigError::Color` if any check fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_layout()?;
        self.validate_preview()?;
        self.style_sheet()?;
        Ok(())
    }

    fn validate_layout(&self) -> Result<(), ConfigError> {
        require_length(self.layout.block_spacing, "layout.block_spacing")?;
        require_length(self.layout.list_indent, "layout.list_indent")?;
        require_length(self.layout.blockquote_padding, "layout.blockquote_padding")?;
        require_length(self.layout.codeblock_padding, "layout.codeblock_padding")?;
        if let Some(size) = self.theme.body_size {
            require_font_size(size, "theme.body_size")?;
        }
        for (name, style) in &self.styles {
            if let Some(size) = style.font_size {
                require_font_size(size, &format!("styles.{name}.font_size"))?;
            }
        }
        Ok(())
    }

    fn validate_preview(&self) -> Result<(), ConfigError> {
        let threads = self.preview.threads;
        if threads == 0 {
            return Err(ConfigError::Validation(
                "preview.threads must be greater than 0".to_owned(),
            ));
        }
        if threads > MAX_THREADS {
            return Err(ConfigError::Validation(format!(
                "preview.threads cannot exceed {MAX_THREADS}"
            )));
        }
        Ok(())
    }

    /// Build the theme described by the `[theme]` section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Color` if the accent color is malformed.
    pub fn theme(&self) -> Result<Theme, ConfigError> {
        let mut theme = Theme::light();
        if let Some(family) = &self.theme.font_family {
            theme = theme.with_font_family(family);
        }
        if let Some(accent) = &self.theme.accent {
            theme.accent = parse_color(accent, "theme.accent")?;
        }
        if let Some(size) = self.theme.body_size {
            theme.body1.font_size = Some(size);
            theme.body2.font_size = Some(size);
        }
        Ok(theme)
    }

    /// Build the style sheet: theme defaults, then layout, then overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Color` for malformed colors and
    /// `ConfigError::Validation` for unknown style bundle names.
    pub fn style_sheet(&self) -> Result<StyleSheet, ConfigError> {
        let mut sheet = StyleSheet::from_theme(&self.theme()?);

        let layout = &mut sheet.layout;
        layout.block_spacing = self.layout.block_spacing;
        layout.list_indent = self.layout.list_indent;
        layout.blockquote_padding = self.layout.blockquote_padding;
        layout.codeblock_padding = self.layout.codeblock_padding;

        for (name, style) in &self.styles {
            let style = style.to_text_style(name)?;
            if !sheet.apply_override(name, &style) {
                return Err(ConfigError::Validation(format!(
                    "unknown style bundle [styles.{name}]"
                )));
            }
        }
        Ok(sheet)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref family) = self.theme.font_family {
            self.theme.font_family = Some(expand::expand_env(family, "theme.font_family")?);
        }
        if let Some(ref directory) = self.images.directory {
            self.images.directory = Some(expand::expand_path(directory, "images.directory")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.image_directory = self
            .images
            .directory
            .as_deref()
            .map(|directory| config_dir.join(directory));
    }
}

/// Search for a config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
