//! `mdview render` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use mdview_config::{CliSettings, Config};
use mdview_preview::{DocumentRenderer, Rendered};
use mdview_renderer::{DefaultDelegate, RegexHighlighter, TreeBuilder, outline};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover mdview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory for relative image paths (default: the file's directory).
    #[arg(long, env = "MDVIEW_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Disable syntax highlighting of code blocks.
    #[arg(long)]
    no_highlight: bool,

    /// Worker threads used for building (overrides config).
    #[arg(long)]
    threads: Option<usize>,

    /// Body font family (overrides config).
    #[arg(long)]
    font_family: Option<String>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the file cannot be read, or
    /// the document fails to build.
    pub(crate) fn execute(self, verbose: bool) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            image_directory: self.image_dir,
            highlight: self.no_highlight.then_some(false),
            threads: self.threads,
            font_family: self.font_family,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if verbose {
            match &config.config_path {
                Some(path) => output.info(&format!("Config: {}", path.display())),
                None => output.info("Config: defaults"),
            }
        }

        let rendered = render_file(&config, &self.file)?;

        if verbose {
            output.info(&format!(
                "Built {} root nodes in {:.2?}",
                rendered.nodes.len(),
                rendered.elapsed
            ));
        }

        output.print(&outline(&rendered.nodes))?;
        Ok(())
    }
}

/// Read and build `file` on a background renderer, waiting for the result.
fn render_file(config: &Config, file: &Path) -> Result<Rendered, CliError> {
    let markdown = std::fs::read_to_string(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;

    let builder = tree_builder(config, file)?;
    let (renderer, deliveries) = DocumentRenderer::new(builder, config.preview.threads)?;
    renderer.submit(markdown);
    // Dropping the renderer closes the channel once the build finishes
    drop(renderer);

    deliveries
        .recv()
        .ok_or_else(|| CliError::Build(file.to_path_buf()))
}

fn tree_builder(config: &Config, file: &Path) -> Result<TreeBuilder, CliError> {
    let mut delegate = DefaultDelegate::new();
    if config.highlight.enabled {
        delegate = delegate.with_highlighter(Arc::new(RegexHighlighter::default()));
    }

    let mut builder = TreeBuilder::new(config.style_sheet()?).with_delegate(Arc::new(delegate));
    if let Some(directory) = image_directory(config, file) {
        builder = builder.with_image_directory(directory);
    }
    Ok(builder)
}

/// Configured image directory, falling back to the markdown file's directory.
fn image_directory(config: &Config, file: &Path) -> Option<PathBuf> {
    config.image_directory.clone().or_else(|| {
        file.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_image_directory_defaults_to_file_parent() {
        let config = Config::default();

        assert_eq!(
            image_directory(&config, Path::new("docs/guide.md")),
            Some(PathBuf::from("docs"))
        );
        assert_eq!(image_directory(&config, Path::new("guide.md")), None);
    }

    #[test]
    fn test_image_directory_prefers_config() {
        let mut config = Config::default();
        config.image_directory = Some(PathBuf::from("/srv/images"));

        assert_eq!(
            image_directory(&config, Path::new("docs/guide.md")),
            Some(PathBuf::from("/srv/images"))
        );
    }

    #[test]
    fn test_render_file_resolves_relative_images() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.md");
        std::fs::write(&file, "# Title\n\n![logo](img/logo.png#64x32)\n").unwrap();

        let rendered = render_file(&Config::default(), &file).unwrap();
        let tree = outline(&rendered.nodes);

        let expected = format!("Image file {} 64x32", dir.path().join("img/logo.png").display());
        assert!(tree.contains(&expected), "{tree}");
        assert!(tree.contains("\"Title\""));
    }

    #[test]
    fn test_render_file_highlights_code() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("code.md");
        std::fs::write(&file, "```rust\nlet x = 1;\n```\n").unwrap();

        let highlighted = render_file(&Config::default(), &file).unwrap();
        let mut config = Config::default();
        config.highlight.enabled = false;
        let plain = render_file(&config, &file).unwrap();

        assert!(outline(&highlighted.nodes).contains("\"let\""));
        assert!(!outline(&plain.nodes).contains("\"let\""));
    }

    #[test]
    fn test_render_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_file(&Config::default(), &dir.path().join("absent.md")).unwrap_err();

        assert!(matches!(err, CliError::Read { .. }));
        assert!(err.to_string().contains("absent.md"));
    }
}
