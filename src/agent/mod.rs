//! Agent assemblies and the streaming tool calling loop.
//!
//! An [`Assistant`] picks a tool set, a system prompt and a model from the
//! settings and builds an [`Agent`]. Running the agent streams
//! [`AgentEvent`]s to the caller while it works.

mod assembly;
mod events;
mod runner;

pub use assembly::Assistant;
pub use events::{event_channel, AgentEvent, EventWriter, MODEL_NODE, TOOLS_NODE};
pub use runner::{Agent, AgentResponse, ToolCallRecord};
