//! Agent runner with tool calling loop.

use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::config::Prompts;
use crate::db::Domain;
use crate::error::{OmbudError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use tracing::{debug, info};

/// Agent prompting strategy. Modes differ only in prompting: the dispatch
/// loop and tool catalog are identical across all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentMode {
    /// Plain system prompt, no reasoning scaffold.
    Direct,
    /// Think/act/observe guidance appended to the system prompt.
    #[default]
    React,
    /// A numbered plan is requested from the model before the loop starts.
    Planning,
}

impl std::str::FromStr for AgentMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(AgentMode::Direct),
            "react" => Ok(AgentMode::React),
            "planning" | "plan" => Ok(AgentMode::Planning),
            _ => Err(format!(
                "Unknown agent mode: {} (expected 'direct', 'react', or 'planning')",
                s
            )),
        }
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentMode::Direct => write!(f, "direct"),
            AgentMode::React => write!(f, "react"),
            AgentMode::Planning => write!(f, "planning"),
        }
    }
}

/// Agent that answers a task by calling database tools in a loop.
pub struct Agent {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    domain: Domain,
    mode: AgentMode,
    tools: ToolContext,
    prompts: Prompts,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent for the given domain and mode.
    pub fn new(
        tools: ToolContext,
        domain: Domain,
        mode: AgentMode,
        model: &str,
        prompts: Prompts,
    ) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            domain,
            mode,
            tools,
            prompts,
            max_iterations: 10,
        }
    }

    /// Set maximum iterations (model calls) for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Replace the client with one using a custom request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.client = crate::openai::create_client_with_timeout(timeout);
        self
    }

    /// Resolve the system prompt for this domain and mode.
    fn system_prompt(&self) -> String {
        let domain_prompts = match self.domain {
            Domain::Support => &self.prompts.support,
            Domain::Inventory => &self.prompts.inventory,
        };

        match self.mode {
            AgentMode::Direct | AgentMode::Planning => domain_prompts.system.clone(),
            AgentMode::React => {
                format!("{}\n\n{}", domain_prompts.system, domain_prompts.react)
            }
        }
    }

    /// One-line-per-tool catalog for the planning prompt.
    fn tool_catalog(&self) -> String {
        tool_definitions(self.domain)
            .iter()
            .map(|t| {
                format!(
                    "- {}: {}",
                    t.function.name,
                    t.function.description.as_deref().unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ask the model for a numbered plan, with no tools offered.
    async fn request_plan(&self, task: &str) -> Result<String> {
        let mut vars = std::collections::HashMap::new();
        vars.insert("task".to_string(), task.to_string());
        vars.insert("tools".to_string(), self.tool_catalog());

        let request_text = self
            .prompts
            .render_with_custom(&self.prompts.planning.request, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.planning.system.clone())
                .build()
                .map_err(|e| OmbudError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request_text)
                .build()
                .map_err(|e| OmbudError::Agent(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| OmbudError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| OmbudError::OpenAI(format!("Plan API error: {}", e)))?;

        let plan = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| OmbudError::Agent("No plan from model".to_string()))?;

        info!("Plan:\n{}", plan);
        Ok(plan)
    }

    /// Run the agent with a user task.
    pub async fn run(&self, task: &str) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt())
                .build()
                .map_err(|e| OmbudError::Agent(e.to_string()))?
                .into(),
        ];

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(task.to_string())
                .build()
                .map_err(|e| OmbudError::Agent(e.to_string()))?
                .into(),
        );

        // Planning mode: enumerate a plan before the dispatch loop begins and
        // carry it in the transcript as an assistant turn.
        let plan = match self.mode {
            AgentMode::Planning => {
                let plan = self.request_plan(task).await?;
                messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(format!("Plan:\n{}", plan))
                        .build()
                        .map_err(|e| OmbudError::Agent(e.to_string()))?
                        .into(),
                );
                Some(plan)
            }
            _ => None,
        };

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(OmbudError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            // Call LLM with the domain's tool catalog
            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(messages.clone())
                .tools(tool_definitions(self.domain))
                .build()
                .map_err(|e| OmbudError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| OmbudError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| OmbudError::Agent("No response from model".to_string()))?;

            // Check if LLM wants to call tools
            if let Some(ref tool_calls) = choice.message.tool_calls {
                if tool_calls.is_empty() {
                    // No tool calls, treat as final response
                    return build_response(&choice.message.content, plan, tool_calls_made, iterations);
                }

                // Add assistant message with tool calls to history
                let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                    .tool_calls(tool_calls.clone())
                    .build()
                    .map_err(|e| OmbudError::Agent(e.to_string()))?;
                messages.push(assistant_msg.into());

                // Execute each tool call
                for tool_call in tool_calls {
                    let record = self.execute_tool_call(tool_call);

                    // Add tool result to messages
                    let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(&tool_call.id)
                        .content(record.result.clone())
                        .build()
                        .map_err(|e| OmbudError::Agent(e.to_string()))?;
                    messages.push(tool_msg.into());

                    tool_calls_made.push(record);
                }
            } else {
                // No tool calls - LLM is done, return final response
                return build_response(&choice.message.content, plan, tool_calls_made, iterations);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Unknown tools and execution failures become error text in the
    /// tool-result slot; the model sees them and may retry within the loop.
    fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool) {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

/// Build the final agent response.
fn build_response(
    content: &Option<String>,
    plan: Option<String>,
    tool_calls: Vec<ToolCallRecord>,
    iterations: usize,
) -> Result<AgentResponse> {
    Ok(AgentResponse {
        content: content.clone().unwrap_or_default(),
        plan,
        tool_calls,
        iterations,
    })
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// The upfront plan, if the agent ran in planning mode.
    pub plan: Option<String>,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used by the dispatch loop.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InventoryStore, SupportStore};

    fn test_agent(domain: Domain, mode: AgentMode) -> (tempfile::TempDir, Agent) {
        let dir = tempfile::tempdir().unwrap();
        let support = SupportStore::open(&dir.path().join("customer_support.db"));
        let inventory = InventoryStore::open(&dir.path().join("inventory.db"));
        let tools = ToolContext::new(support, inventory);
        let prompts = Prompts::load(None, None).unwrap();
        let agent = Agent::new(tools, domain, mode, "gpt-4o-mini", prompts);
        (dir, agent)
    }

    #[test]
    fn test_agent_mode_from_str() {
        assert_eq!("react".parse::<AgentMode>().unwrap(), AgentMode::React);
        assert_eq!("Plan".parse::<AgentMode>().unwrap(), AgentMode::Planning);
        assert!("freestyle".parse::<AgentMode>().is_err());
    }

    #[test]
    fn test_system_prompt_varies_by_mode() {
        let (_dir, direct) = test_agent(Domain::Support, AgentMode::Direct);
        let (_dir2, react) = test_agent(Domain::Support, AgentMode::React);

        let direct_prompt = direct.system_prompt();
        let react_prompt = react.system_prompt();

        assert!(react_prompt.starts_with(&direct_prompt));
        assert!(react_prompt.contains("OBSERVE"));
        assert!(!direct_prompt.contains("OBSERVE"));
    }

    #[test]
    fn test_tool_catalog_lists_domain_tools() {
        let (_dir, agent) = test_agent(Domain::Inventory, AgentMode::Planning);
        let catalog = agent.tool_catalog();
        assert!(catalog.contains("- check_stock:"));
        assert!(catalog.contains("- create_purchase_order:"));
        assert!(!catalog.contains("lookup_customer"));
    }

    #[test]
    fn test_execute_tool_call_reports_unknown_tool_to_model() {
        use async_openai::types::{ChatCompletionMessageToolCall, ChatCompletionToolType, FunctionCall};

        let (_dir, agent) = test_agent(Domain::Support, AgentMode::Direct);
        let record = agent.execute_tool_call(&ChatCompletionMessageToolCall {
            id: "call_1".to_string(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: "teleport_package".to_string(),
                arguments: "{}".to_string(),
            },
        });

        // The record carries error text back to the model instead of failing the run
        assert!(record.result.contains("Unknown tool"));
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "check_stock".to_string(),
            arguments: r#"{"product_id": "PROD002"}"#.to_string(),
            result: "{...}".to_string(),
        };
        assert_eq!(format!("{}", record), r#"check_stock({"product_id": "PROD002"})"#);
    }
}
