//! Agent system for LLM-driven tool calling over the sample databases.
//!
//! Implements the classic dispatch loop: send the transcript to the model,
//! execute any tools it requests, append the results, and repeat until the
//! model returns a plain answer. Three prompting strategies (direct, ReAct,
//! planning) share the same loop.

mod runner;
mod tools;

pub use runner::{Agent, AgentMode, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext};
