//! `mdview styles` command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use mdview_config::{CliSettings, Config};
use mdview_renderer::{Decoration, FontStyle, StyleSheet, TextDecoration, TextStyle};

use crate::error::CliError;
use crate::output::Output;

/// Tags listed by the styles command, in document order of appearance.
const TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "ul", "ol", "pre", "blockquote", "a", "em",
    "strong", "code", "img",
];

/// Arguments for the styles command.
#[derive(Args)]
pub(crate) struct StylesArgs {
    /// Path to configuration file (default: auto-discover mdview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Body font family (overrides config).
    #[arg(long)]
    font_family: Option<String>,
}

impl StylesArgs {
    /// Execute the styles command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails to load or validate.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            font_family: self.font_family,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let sheet = config.style_sheet()?;

        output.heading("Styles")?;
        output.print(&describe_styles(&sheet))?;
        output.heading("Layout")?;
        output.print(&describe_layout(&sheet))?;
        Ok(())
    }
}

fn describe_styles(sheet: &StyleSheet) -> String {
    let mut out = String::new();
    for tag in TAGS {
        let description = sheet
            .resolve(tag)
            .map_or_else(|| "-".to_owned(), describe_style);
        let _ = writeln!(out, "  {tag:<11}{description}");
    }
    out
}

fn describe_layout(sheet: &StyleSheet) -> String {
    let layout = &sheet.layout;
    let mut out = String::new();
    let _ = writeln!(out, "  block_spacing       {}", layout.block_spacing);
    let _ = writeln!(out, "  list_indent         {}", layout.list_indent);
    let _ = writeln!(out, "  blockquote_padding  {}", layout.blockquote_padding);
    let _ = writeln!(
        out,
        "  blockquote          {}",
        describe_decoration(&layout.blockquote_decoration)
    );
    let _ = writeln!(out, "  codeblock_padding   {}", layout.codeblock_padding);
    let _ = writeln!(
        out,
        "  codeblock           {}",
        describe_decoration(&layout.codeblock_decoration)
    );
    let _ = writeln!(
        out,
        "  hr                  {}",
        describe_decoration(&layout.horizontal_rule_decoration)
    );
    out
}

fn describe_style(style: &TextStyle) -> String {
    let mut parts = Vec::new();
    if let Some(size) = style.font_size {
        parts.push(format!("size={size}"));
    }
    if let Some(weight) = style.font_weight {
        parts.push(format!("weight={}", weight.0));
    }
    if style.font_style == Some(FontStyle::Italic) {
        parts.push("italic".to_owned());
    }
    if let Some(family) = &style.font_family {
        parts.push(format!("family={family}"));
    }
    if let Some(color) = style.color {
        parts.push(format!("color={color}"));
    }
    match style.decoration {
        Some(TextDecoration::Underline) => parts.push("underline".to_owned()),
        Some(TextDecoration::LineThrough) => parts.push("line-through".to_owned()),
        Some(TextDecoration::None) | None => {}
    }
    if let Some(height) = style.height {
        parts.push(format!("height={height}"));
    }

    if parts.is_empty() {
        "inherit".to_owned()
    } else {
        parts.join(" ")
    }
}

fn describe_decoration(decoration: &Decoration) -> String {
    let mut parts = Vec::new();
    if let Some(color) = decoration.color {
        parts.push(format!("fill={color}"));
    }
    if decoration.border_radius > 0.0 {
        parts.push(format!("radius={}", decoration.border_radius));
    }
    if let Some(border) = decoration.border_top {
        parts.push(format!("top={}/{}", border.color, border.width));
    }

    if parts.is_empty() {
        "none".to_owned()
    } else {
        parts.join(" ")
    }
}
