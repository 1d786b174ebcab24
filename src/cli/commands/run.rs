//! Run command - one-shot agent task.

use crate::agent::{Agent, AgentMode, ToolContext};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::db::{Domain, InventoryStore, SupportStore};
use anyhow::Result;
use std::time::Duration;

/// Run the agent on a one-shot task.
pub async fn run_task(
    task: &str,
    domain: &str,
    mode: Option<String>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    let domain: Domain = domain.parse().map_err(anyhow::Error::msg)?;

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Agent(domain), &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ombud doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let mode: AgentMode = mode
        .as_deref()
        .unwrap_or(&settings.agent.mode)
        .parse()
        .map_err(anyhow::Error::msg)?;
    let model = model.unwrap_or_else(|| settings.llm.model.clone());

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let tools = ToolContext::new(
        SupportStore::open(&settings.support_db_path()),
        InventoryStore::open(&settings.inventory_db_path()),
    );

    let agent = Agent::new(tools, domain, mode, &model, prompts)
        .with_max_iterations(settings.agent.max_iterations)
        .with_timeout(Duration::from_secs(settings.llm.timeout_seconds));

    let spinner = Output::spinner(&format!("Agent working ({} mode)...", mode));

    match agent.run(task).await {
        Ok(response) => {
            spinner.finish_and_clear();

            if let Some(plan) = &response.plan {
                Output::header("Plan");
                println!("{}\n", plan);
            }

            // Show the agent's response
            println!("\n{}\n", response.content);

            // Show tool calls summary
            if !response.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
                for call in &response.tool_calls {
                    Output::tool_call(&call.name, &call.arguments);
                }
                println!();
            }

            Output::info(&format!(
                "Completed in {} iteration(s)",
                response.iterations
            ));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
