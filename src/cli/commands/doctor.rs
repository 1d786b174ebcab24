//! Doctor command - verify API configuration and database state.

use crate::cli::Output;
use crate::config::Settings;
use crate::db::{self, Domain};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Ombud Doctor");
    println!();
    println!("Checking API configuration and database state...\n");

    let mut checks = Vec::new();

    // Check API configuration
    println!("{}", style("API Configuration").bold());
    let api_check = check_api_key();
    api_check.print();
    checks.push(api_check);
    let base_check = check_api_base();
    base_check.print();
    checks.push(base_check);

    println!();

    // Check databases
    println!("{}", style("Sample Databases").bold());
    for domain in Domain::ALL {
        let check = check_database(domain, settings);
        check.print();
        checks.push(check);
    }

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Warning)
        .count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Ombud.",
            errors
        ));
    } else if warnings > 0 {
        Output::warning(&format!("{} warning(s) found. Ombud should still work.", warnings));
    } else {
        Output::success("All checks passed!");
    }

    Ok(())
}

fn check_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => CheckResult::ok("OPENAI_API_KEY", "configured"),
        _ => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set it with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_api_base() -> CheckResult {
    match std::env::var("OPENAI_API_BASE") {
        Ok(base) if !base.is_empty() => CheckResult::ok("OPENAI_API_BASE", &base),
        _ => CheckResult::ok("OPENAI_API_BASE", "not set (using api.openai.com)"),
    }
}

fn check_database(domain: Domain, settings: &Settings) -> CheckResult {
    let path = match domain {
        Domain::Support => settings.support_db_path(),
        Domain::Inventory => settings.inventory_db_path(),
    };
    let name = format!("{} database", domain);

    if !path.exists() {
        return CheckResult::warning(
            &name,
            "not seeded",
            "Seed the sample databases with: ombud db init",
        );
    }

    match db::explore(&path) {
        Ok(tables) => {
            let rows: i64 = tables.iter().map(|t| t.row_count).sum();
            CheckResult::ok(&name, &format!("{} tables, {} rows", tables.len(), rows))
        }
        Err(e) => CheckResult::error(
            &name,
            &format!("unreadable: {}", e),
            "Re-seed with: ombud db reset",
        ),
    }
}

fn check_config_file() -> CheckResult {
    let path = Settings::default_config_path();
    if path.exists() {
        CheckResult::ok("config file", &path.display().to_string())
    } else {
        CheckResult::warning(
            "config file",
            "not found (using defaults)",
            "Create one with: ombud init",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_database_missing() {
        let mut settings = Settings::default();
        settings.database.support_path = "/nonexistent/customer_support.db".to_string();

        let check = check_database(Domain::Support, &settings);
        assert_eq!(check.status, CheckStatus::Warning);
    }

    #[test]
    fn test_check_database_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customer_support.db");
        crate::db::SupportStore::open(&path).init().unwrap();

        let mut settings = Settings::default();
        settings.database.support_path = path.display().to_string();

        let check = check_database(Domain::Support, &settings);
        assert_eq!(check.status, CheckStatus::Ok);
        assert!(check.message.contains("3 tables"));
    }
}
