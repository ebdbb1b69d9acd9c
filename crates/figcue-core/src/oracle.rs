use crate::error::FigcueError;
use crate::features::FeaturedBody;
use crate::tools::ToolCommand;
use std::io::Write;
use std::path::PathBuf;

/// A trained sequence model that labels feature text.
///
/// Input is newline-delimited feature lines. Output has one line per input
/// line, the label in the last whitespace-separated column.
pub trait SequenceLabeler: Send + Sync {
    fn label(&self, feature_text: &str) -> Result<String, FigcueError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Labeler backed by an external CRF tagger, e.g.
/// `crf_test -m {model} {input}`.
///
/// The feature text is written to a temporary file that is passed as
/// `{input}`; the labeled text is read from stdout.
pub struct CommandLabeler {
    command: ToolCommand,
    model: PathBuf,
}

impl CommandLabeler {
    pub fn new(command: ToolCommand, model: impl Into<PathBuf>) -> Self {
        CommandLabeler {
            command,
            model: model.into(),
        }
    }
}

impl SequenceLabeler for CommandLabeler {
    fn label(&self, feature_text: &str) -> Result<String, FigcueError> {
        let mut tmpfile = tempfile::NamedTempFile::new()?;
        tmpfile.write_all(feature_text.as_bytes())?;
        tmpfile.flush()?;

        let input = tmpfile.path().to_string_lossy().to_string();
        let model = self.model.to_string_lossy().to_string();
        let output = self.command.run(
            "labeler",
            &[("model", model.as_str()), ("input", input.as_str())],
        )?;

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn backend_name(&self) -> &str {
        &self.command.program
    }
}

/// Run `labeler` over an encoded body. An empty body is never sent.
pub fn label_body(body: &FeaturedBody, labeler: &dyn SequenceLabeler) -> Result<String, FigcueError> {
    if body.is_empty() {
        return Ok(String::new());
    }
    tracing::debug!(
        backend = labeler.backend_name(),
        records = body.len(),
        "labeling figure body"
    );
    labeler.label(&body.feature_text())
}
