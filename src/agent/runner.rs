//! Agent runner with a streaming tool calling loop.

use super::events::{EventWriter, MODEL_NODE, TOOLS_NODE};
use crate::error::{Result, ToolsmithError};
use crate::tools::{ToolContext, Toolset};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionMessageToolCallChunk,
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionToolType,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, FunctionCall,
};
use async_openai::Client;
use futures::StreamExt;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Agent that answers a task by calling tools in a loop.
pub struct Agent {
    client: Client<OpenAIConfig>,
    model: String,
    toolset: Toolset,
    context: ToolContext,
    max_iterations: usize,
    system_prompt: String,
}

impl Agent {
    /// Create a new agent. `model` is the name sent to the API, without provider prefix.
    pub fn new(client: Client<OpenAIConfig>, model: &str, toolset: Toolset, context: ToolContext) -> Self {
        Self {
            client,
            model: model.to_string(),
            toolset,
            context,
            max_iterations: 25,
            system_prompt: String::new(),
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn toolset(&self) -> &Toolset {
        &self.toolset
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run the agent on a task, streaming events to `events`.
    ///
    /// The writer is dropped when the run ends, which closes the stream.
    pub async fn run(&self, task: &str, events: EventWriter) -> Result<AgentResponse> {
        let context = self.context.with_events(events.clone());

        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();
        if !self.system_prompt.is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_prompt.clone())
                    .build()
                    .map_err(|e| ToolsmithError::Agent(e.to_string()))?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(task)
                .build()
                .map_err(|e| ToolsmithError::Agent(e.to_string()))?
                .into(),
        );

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(ToolsmithError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}, {} messages", iterations, messages.len());

            let request = self.build_request(&messages)?;
            let step = self.stream_step(request, &events).await?;

            events
                .update(
                    MODEL_NODE,
                    json!({
                        "messages": [{
                            "role": "assistant",
                            "content": step.content,
                            "tool_calls": step.tool_calls.iter().map(|call| json!({
                                "id": call.id,
                                "name": call.function.name,
                                "arguments": call.function.arguments,
                            })).collect::<Vec<_>>(),
                        }]
                    }),
                )
                .await;

            if step.tool_calls.is_empty() {
                return Ok(AgentResponse {
                    content: step.content,
                    tool_calls: tool_calls_made,
                    iterations,
                });
            }

            let mut assistant_msg = ChatCompletionRequestAssistantMessageArgs::default();
            if !step.content.is_empty() {
                assistant_msg.content(step.content.clone());
            }
            assistant_msg.tool_calls(step.tool_calls.clone());
            messages.push(
                assistant_msg
                    .build()
                    .map_err(|e| ToolsmithError::Agent(e.to_string()))?
                    .into(),
            );

            for tool_call in &step.tool_calls {
                let record = self.execute_tool_call(&context, tool_call).await;

                events.message(TOOLS_NODE, record.result.clone()).await;
                events
                    .update(
                        TOOLS_NODE,
                        json!({
                            "messages": [{
                                "role": "tool",
                                "name": record.name,
                                "tool_call_id": tool_call.id,
                                "content": record.result,
                            }]
                        }),
                    )
                    .await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| ToolsmithError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    fn build_request(&self, messages: &[ChatCompletionRequestMessage]) -> Result<CreateChatCompletionRequest> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages.to_vec());
        if !self.toolset.is_empty() {
            args.tools(self.toolset.definitions());
        }
        args.build().map_err(|e| ToolsmithError::Agent(e.to_string()))
    }

    /// Stream one model step, forwarding text deltas as they arrive.
    async fn stream_step(
        &self,
        request: CreateChatCompletionRequest,
        events: &EventWriter,
    ) -> Result<StepOutput> {
        let mut stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| ToolsmithError::OpenAI(format!("Agent API error: {}", e)))?;

        let mut content = String::new();
        let mut tool_calls = ToolCallAccumulator::default();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ToolsmithError::OpenAI(format!("Agent stream error: {}", e)))?;
            for choice in chunk.choices {
                if let Some(delta) = choice.delta.content.filter(|d| !d.is_empty()) {
                    content.push_str(&delta);
                    events.message(MODEL_NODE, delta).await;
                }
                for tool_chunk in choice.delta.tool_calls.unwrap_or_default() {
                    tool_calls.absorb(tool_chunk);
                }
            }
        }

        Ok(StepOutput {
            content,
            tool_calls: tool_calls.finish(),
        })
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(
        &self,
        context: &ToolContext,
        tool_call: &ChatCompletionMessageToolCall,
    ) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match self.toolset.parse(name, arguments) {
            Ok(call) => context.invoke(&call).await,
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

struct StepOutput {
    content: String,
    tool_calls: Vec<ChatCompletionMessageToolCall>,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Reassembles tool calls that arrive split across stream chunks.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    calls: BTreeMap<u32, PartialToolCall>,
}

impl ToolCallAccumulator {
    fn absorb(&mut self, chunk: ChatCompletionMessageToolCallChunk) {
        let call = self.calls.entry(chunk.index).or_default();
        if let Some(id) = chunk.id.filter(|id| !id.is_empty()) {
            call.id = id;
        }
        if let Some(function) = chunk.function {
            if let Some(name) = function.name.filter(|n| !n.is_empty()) {
                if call.name.is_empty() {
                    call.name = name;
                }
            }
            if let Some(arguments) = function.arguments {
                call.arguments.push_str(&arguments);
            }
        }
    }

    fn finish(self) -> Vec<ChatCompletionMessageToolCall> {
        self.calls
            .into_iter()
            .filter(|(_, call)| !call.name.is_empty())
            .map(|(index, call)| ChatCompletionMessageToolCall {
                id: if call.id.is_empty() {
                    format!("call_{}", index)
                } else {
                    call.id
                },
                r#type: ChatCompletionToolType::Function,
                function: FunctionCall {
                    name: call.name,
                    arguments: call.arguments,
                },
            })
            .collect()
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
