use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FigcueError {
    #[error("failed to parse vector file: {0}")]
    VecParse(String),

    #[error("primitive <{tag}> has invalid or missing attribute '{attribute}'")]
    InvalidAttribute { tag: String, attribute: String },

    #[error("zone key '{0}' does not embed a page number (expected 'p<digits>')")]
    ZoneKey(String),

    #[error("invalid zone range {start}..{end}: {reason}")]
    InvalidRange {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("{tool} not found. Check the program configured for it")]
    ToolNotFound { tool: String },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("labeler returned {actual} line(s) for {expected} feature line(s)")]
    MisalignedLabels { expected: usize, actual: usize },

    #[error("labeler output line {line} does not start with token '{expected}': {found}")]
    LabelMismatch {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl FigcueError {
    /// True for failures of an external collaborator (rasterizer or labeler).
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            FigcueError::ToolNotFound { .. }
                | FigcueError::ToolFailed { .. }
                | FigcueError::MisalignedLabels { .. }
                | FigcueError::LabelMismatch { .. }
        )
    }
}
