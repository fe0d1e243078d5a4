//! Error types for Toolsmith.

use thiserror::Error;

/// Library-level error type for Toolsmith operations.
#[derive(Error, Debug)]
pub enum ToolsmithError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown model provider: {0}")]
    UnknownProvider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for Toolsmith operations.
pub type Result<T> = std::result::Result<T, ToolsmithError>;

/// Category of a tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// A path, section or variable does not exist.
    NotFound,
    /// A directory was required but the path is something else.
    NotADirectory,
    /// The file is not a markdown document.
    NotMarkdown,
    /// The arguments were malformed or missing.
    InvalidArgument,
    /// A page or line index falls outside the document.
    OutOfRange,
    /// A subprocess exceeded its time limit and was killed.
    Timeout,
    /// A subprocess could not be spawned or awaited.
    Process,
    /// The underlying filesystem call failed.
    Io,
}

/// Failure of a single tool invocation.
///
/// The message is already phrased for the model; [`ToolError::render`]
/// is what ends up in the conversation.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    pub fn not_a_directory(path: &str) -> Self {
        Self::new(
            ToolErrorKind::NotADirectory,
            format!("'{}' is not a directory", path),
        )
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArgument, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::OutOfRange, message)
    }

    /// Wrap an IO failure as `Error <action>: <cause>`.
    pub fn io(action: &str, err: impl std::fmt::Display) -> Self {
        Self::new(ToolErrorKind::Io, format!("Error {}: {}", action, err))
    }

    /// Wrap a subprocess failure as `Error <action>: <cause>`.
    pub fn process(action: &str, err: impl std::fmt::Display) -> Self {
        Self::new(ToolErrorKind::Process, format!("Error {}: {}", action, err))
    }

    /// Text handed back to the model.
    pub fn render(&self) -> String {
        self.message.clone()
    }
}

/// Result of a tool invocation.
pub type ToolResult = std::result::Result<String, ToolError>;
