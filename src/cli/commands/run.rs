//! Assistant run command: drive an agent and print its event stream.

use crate::agent::{event_channel, AgentEvent, Assistant, MODEL_NODE};
use crate::cli::output::preview;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use serde_json::json;
use std::io::Write;
use tokio::sync::mpsc;

/// Events buffered between the agent loop and the printer.
const EVENT_BUFFER: usize = 256;

/// Longest tool result echoed to the terminal.
const TOOL_PREVIEW_CHARS: usize = 400;

/// Run an assistant on `message`, or on its default task.
pub async fn run_assistant(
    assistant: Assistant,
    message: Option<String>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    let model = model.unwrap_or_else(|| assistant.model(&settings).to_string());

    if let Err(e) = preflight::check(&settings, assistant, &model) {
        Output::error(&format!("{}", e));
        Output::info("Run 'toolsmith doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let agent = assistant.build(&settings, Some(&model))?;
    let task = message.unwrap_or_else(|| assistant.default_task().to_string());

    Output::header(&format!("{} assistant", assistant));
    Output::kv("Model", &model);
    Output::kv("Tools", &agent.toolset().len().to_string());
    Output::kv("Task", &task);
    println!();

    let (writer, rx) = event_channel(EVENT_BUFFER);
    let (result, ()) = tokio::join!(agent.run(&task, writer), print_events(rx));

    match result {
        Ok(response) => {
            println!();
            Output::success(&format!(
                "Completed in {} iteration(s), {} tool call(s)",
                response.iterations,
                response.tool_calls.len()
            ));
            Ok(())
        }
        Err(e) => {
            println!();
            Output::error(&format!("Assistant failed: {}", e));
            Err(e.into())
        }
    }
}

async fn print_events(mut rx: mpsc::Receiver<AgentEvent>) {
    let mut printer = EventPrinter::default();
    let mut stdout = std::io::stdout();
    while let Some(event) = rx.recv().await {
        let text = printer.render(&event);
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// Turns events into terminal text, keeping streamed tokens on one line.
#[derive(Debug, Default)]
struct EventPrinter {
    mid_line: bool,
}

impl EventPrinter {
    fn render(&mut self, event: &AgentEvent) -> String {
        let mut out = String::new();
        match event {
            AgentEvent::Message { node, content } if node == MODEL_NODE => {
                out.push_str(content);
                self.mid_line = !content.ends_with('\n');
                return out;
            }
            AgentEvent::Message { node, content } => {
                self.break_line(&mut out);
                out.push_str(&format!(
                    "{} {}\n",
                    Output::label_style().apply_to(format!("[{}]", node)),
                    Output::dim_style().apply_to(preview(content, TOOL_PREVIEW_CHARS))
                ));
            }
            AgentEvent::Update { node, update } => {
                self.break_line(&mut out);
                let line = json!({ event.mode(): { node.as_str(): update } });
                out.push_str(&format!("{}\n", Output::dim_style().apply_to(line)));
            }
            AgentEvent::Custom(payload) => {
                self.break_line(&mut out);
                let line = json!({ event.mode(): payload });
                out.push_str(&format!("{}\n", Output::dim_style().apply_to(line)));
            }
        }
        out
    }

    fn break_line(&mut self, out: &mut String) {
        if self.mid_line {
            out.push('\n');
            self.mid_line = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::TOOLS_NODE;

    fn plain(text: String) -> String {
        console::strip_ansi_codes(&text).into_owned()
    }

    #[test]
    fn test_model_tokens_stay_inline() {
        let mut printer = EventPrinter::default();
        let a = printer.render(&AgentEvent::Message {
            node: MODEL_NODE.to_string(),
            content: "Hel".to_string(),
        });
        let b = printer.render(&AgentEvent::Message {
            node: MODEL_NODE.to_string(),
            content: "lo".to_string(),
        });
        assert_eq!(a + &b, "Hello");
        assert!(printer.mid_line);
    }

    #[test]
    fn test_update_breaks_streamed_line() {
        let mut printer = EventPrinter::default();
        printer.render(&AgentEvent::Message {
            node: MODEL_NODE.to_string(),
            content: "partial".to_string(),
        });
        let text = plain(printer.render(&AgentEvent::Update {
            node: TOOLS_NODE.to_string(),
            update: json!({"ok": true}),
        }));
        assert_eq!(text, "\n{\"updates\":{\"tools\":{\"ok\":true}}}\n");
        assert!(!printer.mid_line);
    }

    #[test]
    fn test_custom_and_tool_message() {
        let mut printer = EventPrinter::default();
        let custom = plain(printer.render(&AgentEvent::Custom(json!({"status": "started"}))));
        assert_eq!(custom, "{\"custom\":{\"status\":\"started\"}}\n");

        let tool = plain(printer.render(&AgentEvent::Message {
            node: TOOLS_NODE.to_string(),
            content: "line one\nline two".to_string(),
        }));
        assert_eq!(tool, "[tools] line one line two\n");
    }

    #[tokio::test]
    async fn test_print_events_ends_when_writer_drops() {
        let (writer, rx) = event_channel(4);
        writer.custom(json!({"status": "finished"})).await;
        drop(writer);
        print_events(rx).await;
    }
}
