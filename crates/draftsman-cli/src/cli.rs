//! Command-line interface for the draftsman utility
//!
//! Renders diagrams written in the draft language or JSON (or taken from the
//! built-in catalog) as DOT source, Graphviz images or a terminal preview.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::tty::IsTty;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::colorizer::colorize_output;
use draftsman::catalog;
use draftsman::core::logging::init_logging;
use draftsman::core::{CharacterSet, Database, NodeKind, OutputFormat};
use draftsman::model::DiagramDatabase;
use draftsman::plugins::{Backend, Orchestrator};
use draftsman::render::{open_path, DotRenderer, GraphvizBackend, GraphvizConfig, RenderConfig};

/// Draftsman - diagrams as code
#[derive(Parser)]
#[command(name = "draftsman")]
#[command(about = "Render architecture diagrams to DOT, images or terminal previews")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Where a diagram comes from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Source {
    /// Input file in draft or JSON format (use - for stdin)
    #[arg(short, long, conflicts_with = "catalog")]
    pub input: Option<PathBuf>,

    /// Use a built-in diagram instead of an input file
    #[arg(long)]
    pub catalog: Option<String>,
}

/// Graphviz backend options
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// Directory image files are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Graphviz `dot` executable (default: $DRAFTSMAN_DOT or `dot`)
    #[arg(long)]
    pub dot_binary: Option<PathBuf>,

    /// Directory holding provider icons (default: $DRAFTSMAN_ICON_ROOT)
    #[arg(long)]
    pub icon_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a diagram in one format
    Render {
        #[command(flatten)]
        source: Source,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatChoice::Ascii)]
        format: FormatChoice,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        backend: BackendArgs,

        /// Character set of the terminal preview
        #[arg(long, value_enum, default_value_t = CharsetChoice::Unicode)]
        charset: CharsetChoice,

        /// Max label width in the terminal preview (0 = no wrap)
        #[arg(long, default_value_t = 20)]
        max_label_width: usize,

        /// When to use colors in the terminal preview
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,

        /// Open the written file with the platform viewer
        #[arg(long)]
        open: bool,
    },

    /// Render every output format the diagram declares
    Build {
        #[command(flatten)]
        source: Source,

        #[command(flatten)]
        backend: BackendArgs,

        /// Open the written files with the platform viewer
        #[arg(long)]
        open: bool,
    },

    /// Detect the input format
    Detect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check that a diagram parses and is well-formed
    Validate {
        #[command(flatten)]
        source: Source,
    },

    /// List the built-in diagrams
    Catalog {
        /// Show in JSON format
        #[arg(long)]
        json: bool,

        /// Print the draft source of one diagram
        #[arg(long)]
        source: Option<String>,
    },

    /// List the node kinds
    Kinds {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Output formats of the render command
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum FormatChoice {
    Ascii,
    Dot,
    Json,
    Png,
    Jpg,
    Svg,
    Pdf,
}

impl FormatChoice {
    /// Text backend, when the format does not need Graphviz
    fn text_backend(&self) -> Option<Backend> {
        match self {
            FormatChoice::Ascii => Some(Backend::Ascii),
            FormatChoice::Dot => Some(Backend::Dot),
            FormatChoice::Json => Some(Backend::Json),
            _ => None,
        }
    }

    fn image_format(&self) -> Option<OutputFormat> {
        match self {
            FormatChoice::Png => Some(OutputFormat::Png),
            FormatChoice::Jpg => Some(OutputFormat::Jpg),
            FormatChoice::Svg => Some(OutputFormat::Svg),
            FormatChoice::Pdf => Some(OutputFormat::Pdf),
            _ => None,
        }
    }
}

/// Supported preview character sets
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum CharsetChoice {
    Ascii,
    Unicode,
}

impl From<CharsetChoice> for CharacterSet {
    fn from(value: CharsetChoice) -> Self {
        match value {
            CharsetChoice::Ascii => CharacterSet::Ascii,
            CharsetChoice::Unicode => CharacterSet::Unicode,
        }
    }
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Main CLI application
pub struct DraftsmanApp {
    orchestrator: Orchestrator,
}

impl DraftsmanApp {
    /// Create a new application instance with the default detectors
    pub fn new() -> Self {
        Self {
            orchestrator: Orchestrator::with_default_detectors(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over the flag defaults
        let log_level = std::env::var("DRAFTSMAN_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("DRAFTSMAN_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Draftsman v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Render {
                source,
                format,
                output,
                backend,
                charset,
                max_label_width,
                color,
                open,
            } => {
                let config = RenderConfig {
                    charset: charset.into(),
                    max_label_width,
                };
                self.render_command(
                    &source, format, output, &backend, config, color, open, cli.verbose,
                )
            }
            Commands::Build {
                source,
                backend,
                open,
            } => self.build_command(&source, &backend, open, cli.verbose),
            Commands::Detect { input } => self.detect_command(input, cli.verbose),
            Commands::Validate { source } => self.validate_command(&source, cli.verbose),
            Commands::Catalog { json, source } => self.catalog_command(json, source),
            Commands::Kinds { json } => self.kinds_command(json),
        }
    }

    /// Load the diagram named by `--catalog` or read from `--input`
    pub fn load(&self, source: &Source, verbose: bool) -> Result<DiagramDatabase> {
        if let Some(name) = &source.catalog {
            if verbose {
                eprintln!("Building catalog diagram '{}'", name);
            }
            return catalog::build(name);
        }
        let content = self.read_input(source.input.clone())?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        self.orchestrator.load(&content)
    }

    fn graphviz_backend(backend: &BackendArgs) -> GraphvizBackend {
        let mut config = GraphvizConfig::from_env();
        if let Some(dir) = &backend.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(dot) = &backend.dot_binary {
            config = config.with_dot_binary(dot);
        }
        if let Some(root) = &backend.icon_root {
            config = config.with_icon_root(root);
        }
        GraphvizBackend::new(config)
    }

    /// Handle the render command
    #[allow(clippy::too_many_arguments)]
    fn render_command(
        &self,
        source: &Source,
        format: FormatChoice,
        output: Option<PathBuf>,
        backend: &BackendArgs,
        config: RenderConfig,
        color: ColorChoice,
        open: bool,
        verbose: bool,
    ) -> Result<()> {
        let database = self.load(source, verbose)?;
        let graphviz = Self::graphviz_backend(backend);

        if let Some(text_backend) = format.text_backend() {
            let dot_renderer = match &graphviz.config().icon_root {
                Some(root) => DotRenderer::with_icon_root(root.clone()),
                None => DotRenderer::new(),
            };
            let orchestrator = Orchestrator::new()
                .with_render_config(config)
                .with_dot_renderer(dot_renderer);
            let text = orchestrator.render_database(&database, text_backend)?;
            let text = if text_backend == Backend::Ascii && self.should_colorize(&output, color) {
                colorize_output(&text)
            } else {
                text
            };
            self.write_output(output.clone(), &text)?;
            if open {
                if let Some(path) = output.as_deref().filter(|p| !is_stdout(p)) {
                    open_path(path)?;
                }
            }
            return Ok(());
        }

        let image = format
            .image_format()
            .ok_or_else(|| anyhow!("Unsupported format {:?}", format))?;
        match output {
            Some(path) if is_stdout(&path) => {
                if image.is_binary() && io::stdout().is_tty() {
                    return Err(anyhow!(
                        "Refusing to write binary {} output to a terminal; use --output FILE",
                        image
                    ));
                }
                let bytes = graphviz.render_bytes(&database, image)?;
                let mut stdout = io::stdout();
                stdout.write_all(&bytes)?;
                stdout.flush()?;
            }
            Some(path) => {
                let bytes = graphviz.render_bytes(&database, image)?;
                fs::write(&path, bytes).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
                if verbose {
                    eprintln!("Wrote {}", path.display());
                }
                if open {
                    open_path(&path)?;
                }
            }
            None => {
                let path = graphviz.write_format(&database, image)?;
                println!("{}", path.display());
                if open {
                    open_path(&path)?;
                }
            }
        }
        Ok(())
    }

    /// Handle the build command
    fn build_command(
        &self,
        source: &Source,
        backend: &BackendArgs,
        open: bool,
        verbose: bool,
    ) -> Result<()> {
        let mut database = self.load(source, verbose)?;
        if open {
            database.settings_mut().show = true;
        }
        let written = Self::graphviz_backend(backend).build(&database)?;
        for path in written {
            println!("{}", path.display());
        }
        Ok(())
    }

    /// Handle the detect command
    fn detect_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.orchestrator.detect_input_format(&content) {
            Ok(format) => {
                println!("{}", format);
                Ok(())
            }
            Err(e) => {
                eprintln!("Could not detect input format: {}", e);
                Err(e)
            }
        }
    }

    /// Handle the validate command
    fn validate_command(&self, source: &Source, verbose: bool) -> Result<()> {
        match self.load(source, verbose) {
            Ok(database) => {
                println!(
                    "✓ Valid diagram '{}' ({} nodes, {} edges, {} clusters)",
                    database.name(),
                    database.node_count(),
                    database.edge_count(),
                    database.clusters().len()
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid diagram: {}", e);
                Err(e)
            }
        }
    }

    /// Handle the catalog command
    fn catalog_command(&self, json: bool, source: Option<String>) -> Result<()> {
        if let Some(name) = source {
            let entry = catalog::lookup(&name)
                .ok_or_else(|| anyhow!("Unknown catalog diagram '{}'", name))?;
            print!("{}", entry.source);
            return Ok(());
        }

        if json {
            let listing = serde_json::json!({
                "diagrams": catalog::entries(),
                "total": catalog::entries().len(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Built-in diagrams:");
            for entry in catalog::entries() {
                println!("  {:<14} {} - {}", entry.name, entry.title, entry.description);
            }
        }
        Ok(())
    }

    /// Handle the kinds command
    fn kinds_command(&self, json: bool) -> Result<()> {
        if json {
            let kinds: Vec<_> = NodeKind::ALL
                .iter()
                .map(|kind| {
                    serde_json::json!({
                        "name": kind.qualified_name(),
                        "class": kind.class_name(),
                        "icon": kind.icon_path(),
                        "shape": kind.fallback_shape(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&kinds)?);
        } else {
            println!("Node kinds:");
            for kind in NodeKind::ALL {
                println!("  {:<42} {}", kind.qualified_name(), kind.fallback_shape());
            }
        }
        Ok(())
    }

    /// Determine if we should colorize the output based on color choice and output destination
    fn should_colorize(&self, output: &Option<PathBuf>, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if std::env::var_os("NO_COLOR").is_some() {
                    return false;
                }
                match output {
                    None => io::stdout().is_tty(),
                    Some(p) if is_stdout(p) => io::stdout().is_tty(),
                    Some(_) => false,
                }
            }
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if !is_stdout(&path) => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                debug!("Reading diagram from stdin");
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write text output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if !is_stdout(&path) => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }

    /// Get a reference to the orchestrator (for testing)
    #[cfg(test)]
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}

impl Default for DraftsmanApp {
    fn default() -> Self {
        Self::new()
    }
}

/// `-` stands for stdin/stdout
fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}
