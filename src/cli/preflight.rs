//! Pre-flight checks before expensive operations.
//!
//! Validates that the API key and sample databases are available before
//! starting an agent session that would otherwise fail midway.

use crate::config::Settings;
use crate::db::Domain;
use crate::error::{OmbudError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Agent sessions require an API key and a seeded database.
    Agent(Domain),
    /// Database management has no external requirements.
    Db,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Agent(domain) => {
            check_api_key()?;
            check_database(domain, settings)?;
        }
        Operation::Db => {
            // No external requirements for database management
        }
    }
    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(OmbudError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(OmbudError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that the domain's database file has been seeded.
fn check_database(domain: Domain, settings: &Settings) -> Result<()> {
    let path = match domain {
        Domain::Support => settings.support_db_path(),
        Domain::Inventory => settings.inventory_db_path(),
    };

    if path.exists() {
        Ok(())
    } else {
        Err(OmbudError::NotInitialized(format!(
            "{} ({})",
            domain,
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_db_no_requirements() {
        let settings = Settings::default();
        assert!(check(Operation::Db, &settings).is_ok());
    }

    #[test]
    fn test_check_database_missing_file() {
        let mut settings = Settings::default();
        settings.database.support_path = "/nonexistent/customer_support.db".to_string();

        let err = check_database(Domain::Support, &settings).unwrap_err();
        assert!(err.to_string().contains("ombud db init"));
    }
}
