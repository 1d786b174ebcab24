//! Ombud - LLM agents over sample databases
//!
//! A CLI for running LLM tool-calling agents against two small sample SQLite
//! databases: customer support (customers, orders, refunds) and inventory
//! (products, sales history, purchase orders).
//!
//! The name "Ombud" comes from the Scandinavian word for "representative" -
//! one who acts on your behalf.
//!
//! # Overview
//!
//! Ombud allows you to:
//! - Seed and explore the two sample databases
//! - Run one-shot agent tasks with direct, ReAct, or planning prompting
//! - Hold an interactive chat session where the model calls database tools
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `db` - Sample database stores (support, inventory)
//! - `agent` - Tool registry and the dispatch loop
//! - `openai` - LLM client construction
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use ombud::agent::{Agent, AgentMode, ToolContext};
//! use ombud::config::{Prompts, Settings};
//! use ombud::db::{Domain, InventoryStore, SupportStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let prompts = Prompts::load(None, None)?;
//!
//!     let tools = ToolContext::new(
//!         SupportStore::open(&settings.support_db_path()),
//!         InventoryStore::open(&settings.inventory_db_path()),
//!     );
//!
//!     let agent = Agent::new(tools, Domain::Support, AgentMode::React, "gpt-4o-mini", prompts);
//!     let response = agent.run("What is the status of order ORD12345?").await?;
//!     println!("{}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod openai;

pub use error::{OmbudError, Result};
