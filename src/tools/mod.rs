//! Tool definitions, registries and dispatch.
//!
//! Every tool has a [`ToolKind`] (name, description and JSON schema shown to
//! the model) and a [`ToolCall`] variant carrying its typed arguments. An
//! assistant exposes an ordered [`Toolset`] built from the registries below.

pub mod bash;
pub mod file;
pub mod markdown;
pub mod paper;

use crate::agent::EventWriter;
use crate::config::Settings;
use crate::error::{Result, ToolResult, ToolsmithError};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Every tool known to the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ReadFile,
    WriteFile,
    ListDirectory,
    CreateDirectory,
    DeleteFileOrPath,
    CopyFileOrPath,
    MoveFileOrPath,
    GetFileInfo,
    SearchFiles,
    GetCurrentWorkingDirectory,
    ChangeWorkingDirectory,
    ExecuteCommand,
    ExecuteCommandWithCwd,
    ExecuteInteractiveCommand,
    CheckCommandExists,
    GetEnvironmentVariable,
    SetEnvironmentVariable,
    ListEnvironmentVariables,
    GetCurrentUser,
    ReadMarkdownFile,
    ReadMarkdownLines,
    ReadMarkdownPages,
    ReadMarkdownSections,
    SearchMarkdownContent,
}

/// File system tools.
pub const FILE_TOOLS: &[ToolKind] = &[
    ToolKind::ReadFile,
    ToolKind::WriteFile,
    ToolKind::ListDirectory,
    ToolKind::CreateDirectory,
    ToolKind::DeleteFileOrPath,
    ToolKind::CopyFileOrPath,
    ToolKind::MoveFileOrPath,
    ToolKind::GetFileInfo,
    ToolKind::SearchFiles,
    ToolKind::GetCurrentWorkingDirectory,
    ToolKind::ChangeWorkingDirectory,
];

/// Shell, environment and user tools.
pub const BASH_TOOLS: &[ToolKind] = &[
    ToolKind::ExecuteCommand,
    ToolKind::ExecuteCommandWithCwd,
    ToolKind::ExecuteInteractiveCommand,
    ToolKind::CheckCommandExists,
    ToolKind::GetEnvironmentVariable,
    ToolKind::SetEnvironmentVariable,
    ToolKind::ListEnvironmentVariables,
    ToolKind::GetCurrentUser,
];

/// Paged markdown readers. `read_markdown_file` is opt-in, see [`Toolset`].
pub const PAPER_TOOLS: &[ToolKind] = &[
    ToolKind::ReadMarkdownLines,
    ToolKind::ReadMarkdownPages,
    ToolKind::ReadMarkdownSections,
    ToolKind::SearchMarkdownContent,
];

impl ToolKind {
    /// All tools in registry order.
    pub fn all() -> impl Iterator<Item = ToolKind> {
        FILE_TOOLS
            .iter()
            .chain(BASH_TOOLS)
            .chain(std::iter::once(&ToolKind::ReadMarkdownFile))
            .chain(PAPER_TOOLS)
            .copied()
    }

    /// Look up a tool by its wire name.
    pub fn from_name(name: &str) -> Option<ToolKind> {
        Self::all().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::ReadFile => "read_file",
            ToolKind::WriteFile => "write_file",
            ToolKind::ListDirectory => "list_directory",
            ToolKind::CreateDirectory => "create_directory",
            ToolKind::DeleteFileOrPath => "delete_file_or_path",
            ToolKind::CopyFileOrPath => "copy_file_or_path",
            ToolKind::MoveFileOrPath => "move_file_or_path",
            ToolKind::GetFileInfo => "get_file_info",
            ToolKind::SearchFiles => "search_files",
            ToolKind::GetCurrentWorkingDirectory => "get_current_working_directory",
            ToolKind::ChangeWorkingDirectory => "change_working_directory",
            ToolKind::ExecuteCommand => "execute_command",
            ToolKind::ExecuteCommandWithCwd => "execute_command_with_cwd",
            ToolKind::ExecuteInteractiveCommand => "execute_interactive_command",
            ToolKind::CheckCommandExists => "check_command_exists",
            ToolKind::GetEnvironmentVariable => "get_environment_variable",
            ToolKind::SetEnvironmentVariable => "set_environment_variable",
            ToolKind::ListEnvironmentVariables => "list_environment_variables",
            ToolKind::GetCurrentUser => "get_current_user",
            ToolKind::ReadMarkdownFile => "read_markdown_file",
            ToolKind::ReadMarkdownLines => "read_markdown_lines",
            ToolKind::ReadMarkdownPages => "read_markdown_pages",
            ToolKind::ReadMarkdownSections => "read_markdown_sections",
            ToolKind::SearchMarkdownContent => "search_markdown_content",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::ReadFile => "Read the contents of a file.",
            ToolKind::WriteFile => {
                "Write content to a file, replacing it. Parent directories are created as needed."
            }
            ToolKind::ListDirectory => {
                "List the contents of a directory, showing sub-directories and files with their sizes."
            }
            ToolKind::CreateDirectory => "Create a new directory, including missing parents.",
            ToolKind::DeleteFileOrPath => {
                "Delete a file or a directory. Directories are removed recursively."
            }
            ToolKind::CopyFileOrPath => {
                "Copy a file or directory from source to destination. Directories are copied recursively."
            }
            ToolKind::MoveFileOrPath => "Move or rename a file or directory.",
            ToolKind::GetFileInfo => {
                "Get detailed information about a file or directory (type, size, timestamps)."
            }
            ToolKind::SearchFiles => {
                "Search a directory recursively for files whose names match a wildcard pattern such as '*.py'."
            }
            ToolKind::GetCurrentWorkingDirectory => "Get the current working directory.",
            ToolKind::ChangeWorkingDirectory => {
                "Change the current working directory for all following tool calls."
            }
            ToolKind::ExecuteCommand => {
                "Execute a shell command and return its stdout, stderr and exit code. \
                Supports pipes and redirection. Times out after 30 seconds."
            }
            ToolKind::ExecuteCommandWithCwd => {
                "Execute a shell command in a specific working directory and return its stdout, \
                stderr and exit code."
            }
            ToolKind::ExecuteInteractiveCommand => {
                "Execute a command that may prompt for input. Empty input is sent and the command \
                is stopped after 10 seconds. Truly interactive programs (editors, pagers) are not supported."
            }
            ToolKind::CheckCommandExists => {
                "Check whether a command is available on the PATH. Only the first word is checked."
            }
            ToolKind::GetEnvironmentVariable => "Get the value of an environment variable.",
            ToolKind::SetEnvironmentVariable => {
                "Set an environment variable for the current process and the commands it starts. \
                The system environment is not modified permanently."
            }
            ToolKind::ListEnvironmentVariables => "List all environment variables, sorted by name.",
            ToolKind::GetCurrentUser => {
                "Get information about the current user: username, home directory and working directory."
            }
            ToolKind::ReadMarkdownFile => {
                "Read an entire markdown file with a short header giving its line count and size."
            }
            ToolKind::ReadMarkdownLines => {
                "Read a range of lines from a markdown file. Line numbers are 1-based and inclusive; \
                omit end_line to read to the end of the file."
            }
            ToolKind::ReadMarkdownPages => {
                "Read a markdown file in pages. Without page_num, returns the page layout of the file; \
                with page_num, returns that page with line numbers."
            }
            ToolKind::ReadMarkdownSections => {
                "Read a markdown file by header sections. Without section_name, returns the outline of \
                all headers; with section_name, returns the first section whose title contains it (case-insensitive)."
            }
            ToolKind::SearchMarkdownContent => {
                "Search a markdown file for a term (case-insensitive) and show each match with \
                surrounding lines."
            }
        }
    }

    /// JSON schema of the tool's arguments.
    pub fn parameters(&self) -> Value {
        match self {
            ToolKind::ReadFile => object(json!({ "file_path": string("The path to the file to read") }), &["file_path"]),
            ToolKind::WriteFile => object(
                json!({
                    "file_path": string("The path to the file to write"),
                    "content": string("The content to write to the file")
                }),
                &["file_path", "content"],
            ),
            ToolKind::ListDirectory => object(json!({ "dir_path": string("The path to the directory to list") }), &["dir_path"]),
            ToolKind::CreateDirectory => object(json!({ "dir_path": string("The path to the directory to create") }), &["dir_path"]),
            ToolKind::DeleteFileOrPath => object(json!({ "path": string("The path to the file or directory to delete") }), &["path"]),
            ToolKind::CopyFileOrPath | ToolKind::MoveFileOrPath => object(
                json!({
                    "src": string("The source path"),
                    "dst": string("The destination path")
                }),
                &["src", "dst"],
            ),
            ToolKind::GetFileInfo => object(json!({ "file_path": string("The path to the file or directory") }), &["file_path"]),
            ToolKind::SearchFiles => object(
                json!({
                    "dir_path": string("The directory to search in"),
                    "pattern": string("Wildcard pattern matched against file names, e.g. '*.rs' or 'test_?.py'")
                }),
                &["dir_path", "pattern"],
            ),
            ToolKind::GetCurrentWorkingDirectory
            | ToolKind::ListEnvironmentVariables
            | ToolKind::GetCurrentUser => object(json!({}), &[]),
            ToolKind::ChangeWorkingDirectory => object(json!({ "dir_path": string("The directory to change to") }), &["dir_path"]),
            ToolKind::ExecuteCommand | ToolKind::ExecuteInteractiveCommand => {
                object(json!({ "command": string("The shell command to execute") }), &["command"])
            }
            ToolKind::ExecuteCommandWithCwd => object(
                json!({
                    "command": string("The shell command to execute"),
                    "working_dir": string("The directory in which to execute the command")
                }),
                &["command", "working_dir"],
            ),
            ToolKind::CheckCommandExists => object(json!({ "command": string("The command to check (arguments are ignored)") }), &["command"]),
            ToolKind::GetEnvironmentVariable => object(json!({ "var_name": string("The name of the environment variable") }), &["var_name"]),
            ToolKind::SetEnvironmentVariable => object(
                json!({
                    "var_name": string("The name of the environment variable"),
                    "value": string("The value to set")
                }),
                &["var_name", "value"],
            ),
            ToolKind::ReadMarkdownFile => object(json!({ "file_path": string("The path to the markdown file to read") }), &["file_path"]),
            ToolKind::ReadMarkdownLines => object(
                json!({
                    "file_path": string("The path to the markdown file to read"),
                    "start_line": integer("The starting line number (1-based)"),
                    "end_line": integer("The ending line number (1-based, inclusive). Omit to read to the end of the file")
                }),
                &["file_path", "start_line"],
            ),
            ToolKind::ReadMarkdownPages => object(
                json!({
                    "file_path": string("The path to the markdown file to read"),
                    "page_num": integer("The page number to read (1-based). Omit to get the page layout"),
                    "lines_per_page": integer("Number of lines per page (default: 50)")
                }),
                &["file_path"],
            ),
            ToolKind::ReadMarkdownSections => object(
                json!({
                    "file_path": string("The path to the markdown file to read"),
                    "section_name": string("Part of the section title to read. Omit to list all sections")
                }),
                &["file_path"],
            ),
            ToolKind::SearchMarkdownContent => object(
                json!({
                    "file_path": string("The path to the markdown file to search"),
                    "search_term": string("The term to search for"),
                    "context_lines": integer("Number of lines to show before and after each match (default: 3)")
                }),
                &["file_path", "search_term"],
            ),
        }
    }

    /// OpenAI function/tool definition.
    pub fn definition(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: self.name().to_string(),
                description: Some(self.description().to_string()),
                parameters: Some(self.parameters()),
                strict: None,
            },
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn integer(description: &str) -> Value {
    json!({ "type": "integer", "description": description })
}

/// A tool invocation with typed arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    ReadFile { file_path: String },
    WriteFile { file_path: String, content: String },
    ListDirectory { dir_path: String },
    CreateDirectory { dir_path: String },
    DeleteFileOrPath { path: String },
    CopyFileOrPath { src: String, dst: String },
    MoveFileOrPath { src: String, dst: String },
    GetFileInfo { file_path: String },
    SearchFiles { dir_path: String, pattern: String },
    GetCurrentWorkingDirectory,
    ChangeWorkingDirectory { dir_path: String },
    ExecuteCommand { command: String },
    ExecuteCommandWithCwd { command: String, working_dir: String },
    ExecuteInteractiveCommand { command: String },
    CheckCommandExists { command: String },
    GetEnvironmentVariable { var_name: String },
    SetEnvironmentVariable { var_name: String, value: String },
    ListEnvironmentVariables,
    GetCurrentUser,
    ReadMarkdownFile { file_path: String },
    ReadMarkdownLines {
        file_path: String,
        start_line: usize,
        #[serde(default)]
        end_line: Option<usize>,
    },
    ReadMarkdownPages {
        file_path: String,
        #[serde(default)]
        page_num: Option<usize>,
        #[serde(default)]
        lines_per_page: Option<usize>,
    },
    ReadMarkdownSections {
        file_path: String,
        #[serde(default)]
        section_name: Option<String>,
    },
    SearchMarkdownContent {
        file_path: String,
        search_term: String,
        #[serde(default)]
        context_lines: Option<usize>,
    },
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::ReadFile { .. } => ToolKind::ReadFile,
            ToolCall::WriteFile { .. } => ToolKind::WriteFile,
            ToolCall::ListDirectory { .. } => ToolKind::ListDirectory,
            ToolCall::CreateDirectory { .. } => ToolKind::CreateDirectory,
            ToolCall::DeleteFileOrPath { .. } => ToolKind::DeleteFileOrPath,
            ToolCall::CopyFileOrPath { .. } => ToolKind::CopyFileOrPath,
            ToolCall::MoveFileOrPath { .. } => ToolKind::MoveFileOrPath,
            ToolCall::GetFileInfo { .. } => ToolKind::GetFileInfo,
            ToolCall::SearchFiles { .. } => ToolKind::SearchFiles,
            ToolCall::GetCurrentWorkingDirectory => ToolKind::GetCurrentWorkingDirectory,
            ToolCall::ChangeWorkingDirectory { .. } => ToolKind::ChangeWorkingDirectory,
            ToolCall::ExecuteCommand { .. } => ToolKind::ExecuteCommand,
            ToolCall::ExecuteCommandWithCwd { .. } => ToolKind::ExecuteCommandWithCwd,
            ToolCall::ExecuteInteractiveCommand { .. } => ToolKind::ExecuteInteractiveCommand,
            ToolCall::CheckCommandExists { .. } => ToolKind::CheckCommandExists,
            ToolCall::GetEnvironmentVariable { .. } => ToolKind::GetEnvironmentVariable,
            ToolCall::SetEnvironmentVariable { .. } => ToolKind::SetEnvironmentVariable,
            ToolCall::ListEnvironmentVariables => ToolKind::ListEnvironmentVariables,
            ToolCall::GetCurrentUser => ToolKind::GetCurrentUser,
            ToolCall::ReadMarkdownFile { .. } => ToolKind::ReadMarkdownFile,
            ToolCall::ReadMarkdownLines { .. } => ToolKind::ReadMarkdownLines,
            ToolCall::ReadMarkdownPages { .. } => ToolKind::ReadMarkdownPages,
            ToolCall::ReadMarkdownSections { .. } => ToolKind::ReadMarkdownSections,
            ToolCall::SearchMarkdownContent { .. } => ToolKind::SearchMarkdownContent,
        }
    }
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    if ToolKind::from_name(name).is_none() {
        return Err(ToolsmithError::Agent(format!("Unknown tool: {}", name)));
    }

    let mut args: Value = if arguments.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| ToolsmithError::Agent(format!("Invalid tool arguments: {}", e)))?
    };

    let map = args.as_object_mut().ok_or_else(|| {
        ToolsmithError::Agent("Tool arguments must be a JSON object".to_string())
    })?;
    map.insert("name".to_string(), Value::String(name.to_string()));

    serde_json::from_value(args)
        .map_err(|e| ToolsmithError::Agent(format!("Invalid arguments for '{}': {}", name, e)))
}

/// Ordered set of tools exposed to one assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolset {
    tools: Vec<ToolKind>,
}

impl Toolset {
    /// Concatenate registries in order, skipping repeats.
    pub fn new(groups: &[&[ToolKind]]) -> Self {
        let mut tools: Vec<ToolKind> = Vec::new();
        for kind in groups.iter().flat_map(|group| group.iter()) {
            if !tools.contains(kind) {
                tools.push(*kind);
            }
        }
        Self { tools }
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.tools.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = ToolKind> + '_ {
        self.tools.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions in registry order.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        self.tools.iter().map(ToolKind::definition).collect()
    }

    /// Parse a call, rejecting tools this assistant was not given.
    pub fn parse(&self, name: &str, arguments: &str) -> Result<ToolCall> {
        let call = parse_tool_call(name, arguments)?;
        if !self.contains(call.kind()) {
            return Err(ToolsmithError::Agent(format!(
                "Tool '{}' is not available to this assistant",
                name
            )));
        }
        Ok(call)
    }
}

/// Per-run configuration handed to every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Name of the assistant making the call.
    pub assistant: String,
    /// Model identifier driving the assistant.
    pub model: String,
    /// Timeout for regular shell commands (default 30 s).
    pub command_timeout: Duration,
    /// Timeout for interactive commands (default 10 s).
    pub interactive_timeout: Duration,
    /// Default page size of `read_markdown_pages` (default 50).
    pub lines_per_page: usize,
    /// Default context of `search_markdown_content` (default 3).
    pub search_context_lines: usize,
    events: Option<EventWriter>,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            assistant: String::new(),
            model: String::new(),
            command_timeout: Duration::from_secs(30),
            interactive_timeout: Duration::from_secs(10),
            lines_per_page: 50,
            search_context_lines: 3,
            events: None,
        }
    }
}

impl ToolContext {
    /// Build a context from the tool settings.
    pub fn from_settings(settings: &Settings, assistant: &str, model: &str) -> Self {
        Self {
            assistant: assistant.to_string(),
            model: model.to_string(),
            command_timeout: Duration::from_secs(settings.tools.command_timeout_secs),
            interactive_timeout: Duration::from_secs(settings.tools.interactive_timeout_secs),
            lines_per_page: settings.tools.lines_per_page,
            search_context_lines: settings.tools.search_context_lines,
            events: None,
        }
    }

    /// Copy of this context that emits custom events to `writer`.
    pub fn with_events(&self, writer: EventWriter) -> Self {
        Self {
            events: Some(writer),
            ..self.clone()
        }
    }

    /// Emit a custom event if anyone is listening.
    pub async fn emit(&self, payload: Value) {
        if let Some(writer) = &self.events {
            writer.custom(payload).await;
        }
    }

    /// Execute a tool call.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        debug!("Executing tool {:?}", call);

        match call {
            ToolCall::ReadFile { file_path } => file::read_file(file_path),
            ToolCall::WriteFile { file_path, content } => file::write_file(file_path, content),
            ToolCall::ListDirectory { dir_path } => file::list_directory(dir_path),
            ToolCall::CreateDirectory { dir_path } => file::create_directory(dir_path),
            ToolCall::DeleteFileOrPath { path } => file::delete_file_or_path(path),
            ToolCall::CopyFileOrPath { src, dst } => file::copy_file_or_path(src, dst),
            ToolCall::MoveFileOrPath { src, dst } => file::move_file_or_path(src, dst),
            ToolCall::GetFileInfo { file_path } => file::get_file_info(file_path),
            ToolCall::SearchFiles { dir_path, pattern } => file::search_files(dir_path, pattern),
            ToolCall::GetCurrentWorkingDirectory => file::get_current_working_directory(),
            ToolCall::ChangeWorkingDirectory { dir_path } => {
                file::change_working_directory(dir_path)
            }
            ToolCall::ExecuteCommand { command } => bash::execute_command(self, command).await,
            ToolCall::ExecuteCommandWithCwd {
                command,
                working_dir,
            } => bash::execute_command_with_cwd(self, command, working_dir).await,
            ToolCall::ExecuteInteractiveCommand { command } => {
                bash::execute_interactive_command(self, command).await
            }
            ToolCall::CheckCommandExists { command } => bash::check_command_exists(command),
            ToolCall::GetEnvironmentVariable { var_name } => {
                bash::get_environment_variable(var_name)
            }
            ToolCall::SetEnvironmentVariable { var_name, value } => {
                bash::set_environment_variable(var_name, value)
            }
            ToolCall::ListEnvironmentVariables => bash::list_environment_variables(),
            ToolCall::GetCurrentUser => bash::get_current_user(),
            ToolCall::ReadMarkdownFile { file_path } => paper::read_markdown_file(file_path),
            ToolCall::ReadMarkdownLines {
                file_path,
                start_line,
                end_line,
            } => paper::read_markdown_lines(file_path, *start_line, *end_line),
            ToolCall::ReadMarkdownPages {
                file_path,
                page_num,
                lines_per_page,
            } => paper::read_markdown_pages(
                file_path,
                *page_num,
                lines_per_page.unwrap_or(self.lines_per_page),
            ),
            ToolCall::ReadMarkdownSections {
                file_path,
                section_name,
            } => paper::read_markdown_sections(file_path, section_name.as_deref()),
            ToolCall::SearchMarkdownContent {
                file_path,
                search_term,
                context_lines,
            } => paper::search_markdown_content(
                file_path,
                search_term,
                context_lines.unwrap_or(self.search_context_lines),
            ),
        }
    }

    /// Execute a tool call and flatten the outcome to the text the model sees.
    pub async fn invoke(&self, call: &ToolCall) -> String {
        match self.execute(call).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool {} failed ({:?}): {}", call.kind(), e.kind, e);
                e.render()
            }
        }
    }
}
