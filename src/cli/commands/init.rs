//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use crate::db::{InventoryStore, SupportStore};
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Ombud Setup");
    println!();
    println!("Welcome to Ombud! Let's get the sample databases and configuration ready.\n");

    // Step 1: Check API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  Ombud requires an API key for an OpenAI-compatible chat endpoint.");
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
        println!("  To use a different provider, also set {}.", style("OPENAI_API_BASE").bold());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'ombud init' again.");
            return Ok(());
        }
    } else {
        Output::success("OpenAI API key is configured!");
    }

    println!();

    // Step 2: Seed databases
    println!("{}", style("Step 2: Seeding sample databases").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    }

    SupportStore::open(&settings.support_db_path()).init()?;
    Output::success(&format!(
        "Customer support database ready: {}",
        settings.support_db_path().display()
    ));
    Output::kv("customers", "4");
    Output::kv("orders", "5");

    InventoryStore::open(&settings.inventory_db_path()).init()?;
    Output::success(&format!(
        "Inventory database ready: {}",
        settings.inventory_db_path().display()
    ));
    Output::kv("products", "5 across 3 categories");
    Output::kv("sales history", "7 days");

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("ombud config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("ombud doctor").cyan());
    println!(
        "  {} Ask the support agent about an order",
        style("ombud run \"Where is order ORD12345?\"").cyan()
    );
    println!(
        "  {} Let the inventory agent plan a restock",
        style("ombud run --domain inventory --mode planning \"What needs reordering?\"").cyan()
    );
    println!();
    println!("For more help: {}", style("ombud --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
