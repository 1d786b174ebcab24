//! Configuration module for Ombud.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, PlanningPrompts, Prompts};
pub use settings::{
    AgentSettings, DatabaseSettings, GeneralSettings, LlmSettings, PromptSettings, Settings,
};
