//! External Graphviz backend
//!
//! Pipes DOT source through the `dot` executable and writes the resulting
//! files next to each other as `<filename>.<ext>`.

use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, span, trace, warn, Level};

use super::DotRenderer;
use crate::core::{DiagramError, OutputFormat, Renderer};
use crate::model::DiagramDatabase;

/// Environment variable naming the `dot` executable
pub const DOT_BINARY_ENV: &str = "DRAFTSMAN_DOT";
/// Environment variable naming the icon root directory
pub const ICON_ROOT_ENV: &str = "DRAFTSMAN_ICON_ROOT";

/// Graphviz backend configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphvizConfig {
    /// `dot` executable, looked up on `PATH` when relative
    pub dot_binary: PathBuf,
    /// Directory holding `<provider>/<category>/<icon>.png` images
    pub icon_root: Option<PathBuf>,
    /// Directory rendered files are written to
    pub output_dir: PathBuf,
}

impl Default for GraphvizConfig {
    fn default() -> Self {
        Self {
            dot_binary: PathBuf::from("dot"),
            icon_root: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl GraphvizConfig {
    /// Defaults overridden by `DRAFTSMAN_DOT` and `DRAFTSMAN_ICON_ROOT`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dot) = std::env::var_os(DOT_BINARY_ENV).filter(|v| !v.is_empty()) {
            config.dot_binary = PathBuf::from(dot);
        }
        if let Some(root) = std::env::var_os(ICON_ROOT_ENV).filter(|v| !v.is_empty()) {
            config.icon_root = Some(PathBuf::from(root));
        }
        config
    }

    pub fn with_dot_binary(mut self, dot_binary: impl Into<PathBuf>) -> Self {
        self.dot_binary = dot_binary.into();
        self
    }

    pub fn with_icon_root(mut self, icon_root: impl Into<PathBuf>) -> Self {
        self.icon_root = Some(icon_root.into());
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

/// Renders diagrams through the Graphviz `dot` executable
#[derive(Debug, Clone, Default)]
pub struct GraphvizBackend {
    config: GraphvizConfig,
}

impl GraphvizBackend {
    pub fn new(config: GraphvizConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GraphvizConfig {
        &self.config
    }

    fn dot_renderer(&self) -> DotRenderer {
        match &self.config.icon_root {
            Some(root) => DotRenderer::with_icon_root(root.clone()),
            None => DotRenderer::new(),
        }
    }

    /// DOT source as handed to Graphviz
    pub fn dot_source(&self, db: &DiagramDatabase) -> Result<String> {
        self.dot_renderer().render(db)
    }

    /// Render one format into memory
    pub fn render_bytes(&self, db: &DiagramDatabase, format: OutputFormat) -> Result<Vec<u8>> {
        let source = self.dot_source(db)?;
        match format {
            OutputFormat::Dot => Ok(source.into_bytes()),
            _ => Ok(self.run_dot(&source, format)?),
        }
    }

    /// Run `dot -T<format>` over `source`
    pub fn run_dot(&self, source: &str, format: OutputFormat) -> Result<Vec<u8>, DiagramError> {
        let binary = self.config.dot_binary.display().to_string();
        let dot_span = span!(Level::DEBUG, "run_dot", binary = %binary, format = %format);
        let _enter = dot_span.enter();

        let mut child = Command::new(&self.config.dot_binary)
            .arg(format!("-T{}", format.extension()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DiagramError::backend_error(format!("failed to run '{}': {}", binary, e))
            })?;

        // stdin is dropped before waiting so dot sees EOF; a failed write still
        // waits for the child to collect its status and stderr.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(source.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output().map_err(|e| {
            DiagramError::backend_error(format!("failed to wait for '{}': {}", binary, e))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "dot failed");
            return Err(DiagramError::backend_error(format!(
                "'{}' exited with {}: {}",
                binary,
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| {
            DiagramError::backend_error(format!("failed to write to '{}': {}", binary, e))
        })?;

        trace!(bytes = output.stdout.len(), "dot finished");
        Ok(output.stdout)
    }

    /// Render one format to `<output_dir>/<filename>.<ext>`
    pub fn write_format(&self, db: &DiagramDatabase, format: OutputFormat) -> Result<PathBuf> {
        let bytes = self.render_bytes(db, format)?;
        let path = self
            .config
            .output_dir
            .join(format!("{}.{}", db.output_filename(), format.extension()));
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).map_err(|e| {
            DiagramError::backend_error(format!("failed to create '{}': {}", dir.display(), e))
        })?;
        std::fs::write(&path, bytes).map_err(|e| {
            DiagramError::backend_error(format!("failed to write '{}': {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Wrote diagram");
        Ok(path)
    }

    /// Render every declared output format, opening the files when `show` is set
    pub fn build(&self, db: &DiagramDatabase) -> Result<Vec<PathBuf>> {
        let build_span = span!(Level::INFO, "graphviz_build", name = %db.name());
        let _enter = build_span.enter();

        db.validate()?;
        let mut written = Vec::with_capacity(db.settings().outformats.len());
        for format in &db.settings().outformats {
            written.push(self.write_format(db, *format)?);
        }

        if db.settings().show {
            for path in &written {
                open_path(path)?;
            }
        }

        info!(files = written.len(), "Build completed");
        Ok(written)
    }
}

/// Open a file with the platform's default viewer
pub fn open_path(path: &Path) -> Result<(), DiagramError> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    };
    debug!(program, path = %path.display(), "Opening rendered file");
    Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| DiagramError::backend_error(format!("failed to run '{}': {}", program, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeKind;
    use crate::model::DiagramBuilder;

    fn sample() -> DiagramDatabase {
        let mut d = DiagramBuilder::new("Backend Test").outformats([OutputFormat::Dot]);
        let a = d.node(NodeKind::User, "a");
        let b = d.node(NodeKind::Database, "b");
        (d.chain(&a) >> &b).end().unwrap();
        d.finish().unwrap()
    }

    #[cfg(unix)]
    fn fake_dot(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-dot");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = GraphvizConfig::default();
        assert_eq!(config.dot_binary, PathBuf::from("dot"));
        assert!(config.icon_root.is_none());
    }

    #[test]
    fn test_dot_format_skips_the_executable() {
        let dir = tempfile::tempdir().unwrap();
        let backend = GraphvizBackend::new(
            GraphvizConfig::default()
                .with_dot_binary(dir.path().join("missing-dot"))
                .with_output_dir(dir.path()),
        );
        let written = backend.build(&sample()).unwrap();
        assert_eq!(written, vec![dir.path().join("backend_test.dot")]);
        let source = std::fs::read_to_string(&written[0]).unwrap();
        assert!(source.starts_with("digraph \"Backend Test\""));
    }

    #[test]
    fn test_missing_binary_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = GraphvizBackend::new(
            GraphvizConfig::default().with_dot_binary(dir.path().join("missing-dot")),
        );
        let err = backend.run_dot("digraph {}", OutputFormat::Png).unwrap_err();
        assert!(matches!(err, DiagramError::BackendError { .. }));
        assert!(err.to_string().contains("failed to run"));
    }

    #[cfg(unix)]
    #[test]
    fn test_source_is_piped_to_dot() {
        let dir = tempfile::tempdir().unwrap();
        let dot = fake_dot(dir.path(), "cat");
        let backend = GraphvizBackend::new(
            GraphvizConfig::default()
                .with_dot_binary(dot)
                .with_icon_root("/icons")
                .with_output_dir(dir.path().join("out")),
        );
        let path = backend.write_format(&sample(), OutputFormat::Svg).unwrap();
        assert_eq!(path, dir.path().join("out").join("backend_test.svg"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("image=\"/icons/onprem/client/user.png\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_dot_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let dot = fake_dot(dir.path(), "cat > /dev/null\necho 'syntax error in line 1' >&2\nexit 3");
        let backend = GraphvizBackend::new(GraphvizConfig::default().with_dot_binary(dot));
        let err = backend.run_dot("digraph {", OutputFormat::Png).unwrap_err();
        assert!(err.to_string().contains("syntax error in line 1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dot_exiting_before_reading_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let dot = fake_dot(dir.path(), "echo 'unsupported input' >&2\nexit 2");
        let backend = GraphvizBackend::new(GraphvizConfig::default().with_dot_binary(dot));
        // Larger than a pipe buffer, so the write fails once dot is gone
        let source = format!("digraph {{\n{}}}\n", "a -> b;\n".repeat(200_000));
        let err = backend.run_dot(&source, OutputFormat::Png).unwrap_err();
        assert!(matches!(err, DiagramError::BackendError { .. }));
        assert!(err.to_string().contains("unsupported input"));
        assert!(err.to_string().contains("exited with"));
    }

    #[test]
    fn test_unwritable_output_dir_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let backend = GraphvizBackend::new(
            GraphvizConfig::default().with_output_dir(blocker.join("sub")),
        );
        let err = backend.build(&sample()).unwrap_err();
        match err.downcast_ref::<DiagramError>() {
            Some(DiagramError::BackendError { message }) => {
                assert!(message.contains("failed to create"));
                assert!(message.contains("not-a-dir"));
            }
            other => panic!("expected a backend error, got {:?}", other),
        }
    }
}
