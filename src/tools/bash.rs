//! Shell command, environment and user tools.

use super::ToolContext;
use crate::error::{ToolError, ToolErrorKind, ToolResult};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::info;

/// How a command's standard input is wired.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Input {
    /// No input at all.
    Null,
    /// A pipe that is closed immediately, answering prompts with EOF.
    Empty,
}

enum RunError {
    TimedOut,
    Spawn(std::io::Error),
}

fn shell_command(command: &str) -> Command {
    let (shell, flag) = if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };

    let mut cmd = Command::new(shell);
    cmd.arg(flag)
        .arg(command)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

async fn run_shell(
    command: &str,
    working_dir: Option<&Path>,
    input: Input,
    timeout: Duration,
) -> std::result::Result<Output, RunError> {
    let mut cmd = shell_command(command);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }
    cmd.stdin(match input {
        Input::Null => Stdio::null(),
        Input::Empty => Stdio::piped(),
    });

    let mut child = cmd.spawn().map_err(RunError::Spawn)?;
    // Closing the pipe sends EOF to anything waiting on a prompt.
    drop(child.stdin.take());

    // On timeout the child is dropped, and kill_on_drop terminates it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(RunError::Spawn),
        Err(_) => Err(RunError::TimedOut),
    }
}

/// Exit code, or the negated signal number for killed processes.
fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

fn format_streams(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let mut text = String::new();
    if !stdout.is_empty() {
        text.push_str(&format!("STDOUT:\n{}", stdout));
    }
    if !stderr.is_empty() {
        text.push_str(&format!("\nSTDERR:\n{}", stderr));
    }
    text
}

async fn run_reported(
    ctx: &ToolContext,
    tool: &str,
    command: &str,
    working_dir: Option<&Path>,
    input: Input,
    timeout: Duration,
) -> std::result::Result<Output, RunError> {
    info!("Executing command: {}", command);
    ctx.emit(json!({ "tool": tool, "status": "started", "command": command }))
        .await;

    let result = run_shell(command, working_dir, input, timeout).await;

    let status = match &result {
        Ok(output) => json!({
            "tool": tool,
            "status": "finished",
            "command": command,
            "exit_code": exit_code(&output.status)
        }),
        Err(RunError::TimedOut) => json!({ "tool": tool, "status": "timed_out", "command": command }),
        Err(RunError::Spawn(e)) => json!({
            "tool": tool,
            "status": "failed",
            "command": command,
            "error": e.to_string()
        }),
    };
    ctx.emit(status).await;

    result
}

pub async fn execute_command(ctx: &ToolContext, command: &str) -> ToolResult {
    let timeout = ctx.command_timeout;
    let output = run_reported(ctx, "execute_command", command, None, Input::Null, timeout)
        .await
        .map_err(|e| match e {
            RunError::TimedOut => ToolError::new(
                ToolErrorKind::Timeout,
                format!(
                    "Command timed out after {} seconds: {}",
                    timeout.as_secs(),
                    command
                ),
            ),
            RunError::Spawn(e) => ToolError::process("executing command", e),
        })?;

    let mut text = format_streams(&output);
    if text.is_empty() {
        text.push_str("Command executed successfully with no output");
    }
    text.push_str(&format!("\n\nExit code: {}", exit_code(&output.status)));
    Ok(text)
}

pub async fn execute_command_with_cwd(
    ctx: &ToolContext,
    command: &str,
    working_dir: &str,
) -> ToolResult {
    let dir = Path::new(working_dir);
    if !dir.exists() {
        return Err(ToolError::not_found(format!(
            "Working directory '{}' does not exist",
            working_dir
        )));
    }
    if !dir.is_dir() {
        return Err(ToolError::not_a_directory(working_dir));
    }

    let timeout = ctx.command_timeout;
    let output = run_reported(
        ctx,
        "execute_command_with_cwd",
        command,
        Some(dir),
        Input::Null,
        timeout,
    )
    .await
    .map_err(|e| match e {
        RunError::TimedOut => ToolError::new(
            ToolErrorKind::Timeout,
            format!(
                "Command timed out after {} seconds: {}",
                timeout.as_secs(),
                command
            ),
        ),
        RunError::Spawn(e) => ToolError::process("executing command", e),
    })?;

    let mut text = format!("Command executed in directory: {}\n\n", working_dir);
    let streams = format_streams(&output);
    if streams.is_empty() {
        text.push_str("Command executed successfully with no output");
    } else {
        text.push_str(&streams);
    }
    text.push_str(&format!("\n\nExit code: {}", exit_code(&output.status)));
    Ok(text)
}

pub async fn execute_interactive_command(ctx: &ToolContext, command: &str) -> ToolResult {
    let timeout = ctx.interactive_timeout;
    let output = run_reported(
        ctx,
        "execute_interactive_command",
        command,
        None,
        Input::Empty,
        timeout,
    )
    .await
    .map_err(|e| match e {
        RunError::TimedOut => ToolError::new(
            ToolErrorKind::Timeout,
            format!(
                "Interactive command timed out after {} seconds: {}",
                timeout.as_secs(),
                command
            ),
        ),
        RunError::Spawn(e) => ToolError::process("executing interactive command", e),
    })?;

    let mut text = format_streams(&output);
    if text.is_empty() {
        text.push_str("Command executed with no output");
    }
    text.push_str(&format!("\n\nExit code: {}", exit_code(&output.status)));
    Ok(text)
}

/// First word of a command line, without surrounding quotes.
fn command_name(command: &str) -> Option<&str> {
    command
        .split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c| c == '"' || c == '\''))
        .filter(|word| !word.is_empty())
}

pub fn check_command_exists(command: &str) -> ToolResult {
    let name = command_name(command).ok_or_else(|| ToolError::invalid("No command provided"))?;

    match which::which(name) {
        Ok(path) => Ok(format!(
            "Command '{}' exists at: {}",
            name,
            path.display()
        )),
        Err(_) => Ok(format!("Command '{}' not found in PATH", name)),
    }
}

fn valid_var_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.contains('\0')
}

pub fn get_environment_variable(var_name: &str) -> ToolResult {
    let value = if valid_var_name(var_name) {
        std::env::var_os(var_name)
    } else {
        None
    };

    match value {
        Some(value) => Ok(format!("{}={}", var_name, value.to_string_lossy())),
        None => Err(ToolError::not_found(format!(
            "Environment variable '{}' is not set",
            var_name
        ))),
    }
}

pub fn set_environment_variable(var_name: &str, value: &str) -> ToolResult {
    // set_var panics on these instead of returning an error
    if !valid_var_name(var_name) {
        return Err(ToolError::invalid(format!(
            "Error setting environment variable: invalid name '{}'",
            var_name
        )));
    }
    if value.contains('\0') {
        return Err(ToolError::invalid(
            "Error setting environment variable: value contains a NUL byte",
        ));
    }

    std::env::set_var(var_name, value);
    Ok(format!("Successfully set {}={}", var_name, value))
}

pub fn list_environment_variables() -> ToolResult {
    let vars: BTreeMap<String, String> = std::env::vars_os()
        .map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        })
        .collect();

    let mut result = String::from("Environment Variables:\n\n");
    for (name, value) in vars {
        result.push_str(&format!("{}={}\n", name, value));
    }
    Ok(result)
}

pub fn get_current_user() -> ToolResult {
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .or_else(|| dirs::home_dir().map(|p| p.display().to_string()))
        .unwrap_or_else(|| "unknown".to_string());
    let cwd = std::env::current_dir()
        .map_err(|e| ToolError::io("getting user information", e))?;

    Ok(format!(
        "Current User Information:\n\nUsername: {}\nHome Directory: {}\nCurrent Working Directory: {}\n",
        username,
        home,
        cwd.display()
    ))
}
