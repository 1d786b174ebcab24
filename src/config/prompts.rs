//! Prompt templates for Ombud agents.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub support: AgentPrompts,
    pub inventory: AgentPrompts,
    pub planning: PlanningPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// System prompts for one agent domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    /// Base system prompt (direct mode).
    pub system: String,
    /// Addendum appended to the system prompt in ReAct mode.
    pub react: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        // Placeholder; real defaults come from the domain-specific constructors.
        Self {
            system: String::new(),
            react: REACT_ADDENDUM.to_string(),
        }
    }
}

const REACT_ADDENDUM: &str = r#"Work through the request step by step:
1. THINK: state what information you still need
2. ACT: call exactly the tool that provides it
3. OBSERVE: read the tool result before deciding the next step

Repeat until you can answer, then give your final response without calling more tools."#;

fn support_prompts() -> AgentPrompts {
    AgentPrompts {
        system: r#"You are a customer support assistant for an online electronics store.

You have tools to look up customers, check orders, and process refunds.

Guidelines:
- Use 'lookup_customer' when you have a customer ID, or 'lookup_customer_by_name' when you only have a name
- Use 'check_order_status' to get the status and details of a specific order
- Use 'get_customer_orders' to see everything a customer has ordered
- Use 'process_refund' only for delivered orders, and always record the customer's reason
- Never invent order or customer details; if a record is not found, say so

Be polite and concise. Quote IDs, amounts, and tracking numbers exactly as the tools return them."#
            .to_string(),
        react: REACT_ADDENDUM.to_string(),
    }
}

fn inventory_prompts() -> AgentPrompts {
    AgentPrompts {
        system: r#"You are an inventory management assistant for a small warehouse.

You have tools to check stock levels, search the catalog, analyze sales trends, and create purchase orders.

Guidelines:
- Use 'check_stock' for a single product's current level and status
- Use 'search_inventory' to filter by category or find items below their reorder point
- Use 'get_sales_trend' before recommending a reorder; it includes a stockout estimate
- Use 'create_purchase_order' only when restocking is justified; size the order from average daily sales and the 5-7 day supplier lead time
- Never invent stock numbers; if a product is not found, say so

Report quantities, costs, and PO numbers exactly as the tools return them."#
            .to_string(),
        react: REACT_ADDENDUM.to_string(),
    }
}

/// Prompts for the planning pre-pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningPrompts {
    /// System prompt for the plan request (no tools offered).
    pub system: String,
    /// User template for the plan request; {{task}} is substituted.
    pub request: String,
}

impl Default for PlanningPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a planner. You will be given a task and a list of tools that will be available later.
Produce a short numbered plan of the tool calls needed to complete the task.
Do not call any tools and do not answer the task itself; output only the plan."#
                .to_string(),

            request: r#"Task: {{task}}

Available tools:
{{tools}}

Write a numbered plan (3-6 steps) describing which tools to call, in what order, and why."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts {
            support: support_prompts(),
            inventory: inventory_prompts(),
            planning: PlanningPrompts::default(),
            variables: Default::default(),
        };

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load support prompts if file exists
            let support_path = custom_path.join("support.toml");
            if support_path.exists() {
                let content = std::fs::read_to_string(&support_path)?;
                prompts.support = toml::from_str(&content)?;
            }

            // Load inventory prompts if file exists
            let inventory_path = custom_path.join("inventory.toml");
            if inventory_path.exists() {
                let content = std::fs::read_to_string(&inventory_path)?;
                prompts.inventory = toml::from_str(&content)?;
            }

            // Load planning prompts if file exists
            let planning_path = custom_path.join("planning.toml");
            if planning_path.exists() {
                let content = std::fs::read_to_string(&planning_path)?;
                prompts.planning = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::load(None, None).unwrap();
        assert!(prompts.support.system.contains("process_refund"));
        assert!(prompts.inventory.system.contains("check_stock"));
        assert!(!prompts.planning.request.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Task: {{task}} with {{count}} tools.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("task".to_string(), "refund ORD12347".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Task: refund ORD12347 with 5 tools.");
    }

    #[test]
    fn test_render_with_custom_precedence() {
        let mut prompts = Prompts::load(None, None).unwrap();
        prompts
            .variables
            .insert("store".to_string(), "Main Street".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("store".to_string(), "Warehouse B".to_string());

        let result = prompts.render_with_custom("Store: {{store}}", &vars);
        assert_eq!(result, "Store: Warehouse B");
    }
}
