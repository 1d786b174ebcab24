//! Interactive chat command with tool calling support.

use crate::agent::{parse_tool_call, tool_definitions, ToolContext};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::db::{Domain, InventoryStore, SupportStore};
use crate::error::{OmbudError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use console::style;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Extra guidance appended to the domain system prompt for chat sessions.
const CHAT_ADDENDUM: &str = "Be conversational and helpful. Remember context from earlier in the conversation.";

/// Run the interactive chat command.
pub async fn run_chat(domain: &str, model: Option<String>, settings: Settings) -> anyhow::Result<()> {
    let domain: Domain = domain.parse().map_err(anyhow::Error::msg)?;

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Agent(domain), &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ombud doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let model = model.unwrap_or_else(|| settings.llm.model.clone());

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let tools = ToolContext::new(
        SupportStore::open(&settings.support_db_path()),
        InventoryStore::open(&settings.inventory_db_path()),
    );

    let mut chat = ChatSession::new(
        tools,
        domain,
        &model,
        &prompts,
        Duration::from_secs(settings.llm.timeout_seconds),
    );

    println!("\n{}", style(format!("Ombud Chat ({})", domain)).bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        stdin.lock().read_line(&mut input)?;

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            chat.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        match chat.send_message(input).await {
            Ok(response) => {
                println!("\n{} {}\n", style("Ombud:").cyan().bold(), response);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}

/// Interactive chat session with tool calling support.
struct ChatSession {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    domain: Domain,
    tools: ToolContext,
    messages: Vec<ChatCompletionRequestMessage>,
    max_tool_iterations: usize,
}

impl ChatSession {
    /// Create a new chat session.
    fn new(
        tools: ToolContext,
        domain: Domain,
        model: &str,
        prompts: &Prompts,
        timeout: Duration,
    ) -> Self {
        let domain_prompts = match domain {
            Domain::Support => &prompts.support,
            Domain::Inventory => &prompts.inventory,
        };
        let system_prompt = format!("{}\n\n{}", domain_prompts.system, CHAT_ADDENDUM);

        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .expect("Failed to build system message");

        Self {
            client: create_client_with_timeout(timeout),
            model: model.to_string(),
            domain,
            tools,
            messages: vec![system_message.into()],
            max_tool_iterations: 10,
        }
    }

    /// Clear conversation history (keeps system prompt).
    fn clear_history(&mut self) {
        self.messages.truncate(1); // Keep system message
    }

    /// Send a message and get a response, handling tool calls.
    async fn send_message(&mut self, user_input: &str) -> Result<String> {
        // Add user message to history
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(user_input)
            .build()
            .map_err(|e| OmbudError::Agent(e.to_string()))?;
        self.messages.push(user_message.into());

        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_tool_iterations {
                return Err(OmbudError::Agent("Too many tool iterations".to_string()));
            }

            debug!("Chat iteration {}, {} messages", iterations, self.messages.len());

            // Call LLM with tools
            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(self.messages.clone())
                .tools(tool_definitions(self.domain))
                .build()
                .map_err(|e| OmbudError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| OmbudError::OpenAI(format!("Chat API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| OmbudError::Agent("No response from model".to_string()))?;

            // Check if LLM wants to call tools
            if let Some(ref tool_calls) = choice.message.tool_calls {
                if tool_calls.is_empty() {
                    // No tool calls, this is the final response
                    let content = choice.message.content.clone().unwrap_or_default();
                    self.add_assistant_message(&content)?;
                    return Ok(content);
                }

                // Add assistant message with tool calls
                let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                    .tool_calls(tool_calls.clone())
                    .build()
                    .map_err(|e| OmbudError::Agent(e.to_string()))?;
                self.messages.push(assistant_msg.into());

                // Execute each tool call
                for tool_call in tool_calls {
                    let name = &tool_call.function.name;
                    let arguments = &tool_call.function.arguments;

                    info!("Chat calling tool: {} with args: {}", name, arguments);
                    print!("{}", style(format!("  [{}] ", name)).dim());
                    io::stdout().flush().ok();

                    let result = match parse_tool_call(name, arguments) {
                        Ok(tool) => match self.tools.execute(&tool) {
                            Ok(output) => {
                                println!("{}", style("✓").green());
                                output
                            }
                            Err(e) => {
                                println!("{}", style("✗").red());
                                format!("Tool error: {}", e)
                            }
                        },
                        Err(e) => {
                            println!("{}", style("✗").red());
                            format!("Failed to parse tool call: {}", e)
                        }
                    };

                    // Add tool result to messages
                    let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(&tool_call.id)
                        .content(result)
                        .build()
                        .map_err(|e| OmbudError::Agent(e.to_string()))?;
                    self.messages.push(tool_msg.into());
                }
            } else {
                // No tool calls - final response
                let content = choice.message.content.clone().unwrap_or_default();
                self.add_assistant_message(&content)?;

                // Trim history if too long (keep system + last N exchanges)
                self.trim_history(30);

                return Ok(content);
            }
        }
    }

    /// Add an assistant text message to history.
    fn add_assistant_message(&mut self, content: &str) -> Result<()> {
        let msg = ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| OmbudError::Agent(e.to_string()))?;
        self.messages.push(msg.into());
        Ok(())
    }

    /// Trim conversation history to keep it manageable.
    ///
    /// Keeps the system message (index 0) and roughly the last N-1 messages.
    /// A tool result is only valid directly after the assistant message that
    /// requested it, so the cut skips past any tool results it would orphan.
    fn trim_history(&mut self, max_messages: usize) {
        if self.messages.len() <= max_messages {
            return;
        }

        let mut start = self.messages.len() - (max_messages - 1);
        while start < self.messages.len()
            && matches!(self.messages[start], ChatCompletionRequestMessage::Tool(_))
        {
            start += 1;
        }

        let mut trimmed = vec![self.messages[0].clone()];
        trimmed.extend(self.messages[start..].iter().cloned());
        self.messages = trimmed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InventoryStore, SupportStore};

    fn session() -> (tempfile::TempDir, ChatSession) {
        let dir = tempfile::tempdir().unwrap();
        let tools = ToolContext::new(
            SupportStore::open(&dir.path().join("customer_support.db")),
            InventoryStore::open(&dir.path().join("inventory.db")),
        );
        let prompts = Prompts::load(None, None).unwrap();
        let chat = ChatSession::new(
            tools,
            Domain::Support,
            "gpt-4o-mini",
            &prompts,
            Duration::from_secs(1),
        );
        (dir, chat)
    }

    fn user_msg(text: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .unwrap()
            .into()
    }

    fn tool_msg(id: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(id)
            .content("{}")
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn test_trim_history_keeps_system_message() {
        let (_dir, mut chat) = session();
        for i in 0..40 {
            chat.messages.push(user_msg(&format!("message {}", i)));
        }

        chat.trim_history(30);

        assert_eq!(chat.messages.len(), 30);
        assert!(matches!(
            chat.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
    }

    #[test]
    fn test_trim_history_skips_orphaned_tool_results() {
        let (_dir, mut chat) = session();
        // 40 messages after the system prompt; the naive cut for a cap of 30
        // lands at index 12, in the middle of this pair of tool results
        for i in 0..40 {
            if i == 11 || i == 12 {
                chat.messages.push(tool_msg(&format!("call_{}", i)));
            } else {
                chat.messages.push(user_msg(&format!("message {}", i)));
            }
        }

        chat.trim_history(30);

        // Both tool results were cut along with the assistant turn that
        // requested them; the kept history does not start with an orphan
        assert!(!matches!(
            chat.messages[1],
            ChatCompletionRequestMessage::Tool(_)
        ));
        assert_eq!(chat.messages.len(), 28);
    }
}
