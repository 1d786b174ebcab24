//! Database management command: init, reset, explore.

use crate::cli::{DbAction, Output};
use crate::config::Settings;
use crate::db::{self, Domain, InventoryStore, SupportStore};
use anyhow::Result;

/// Run the db command.
pub fn run_db(action: &DbAction, settings: &Settings) -> Result<()> {
    match action {
        DbAction::Init { domain } => {
            for domain in resolve_domains(domain.as_deref())? {
                init_domain(domain, settings)?;
            }
        }

        DbAction::Reset { domain } => {
            for domain in resolve_domains(domain.as_deref())? {
                let path = db_path(domain, settings);
                db::remove_db_file(&path)?;
                init_domain(domain, settings)?;
                Output::success(&format!("Reset {} database", domain));
            }
        }

        DbAction::Explore { domain } => {
            let domain: Domain = domain.parse().map_err(anyhow::Error::msg)?;
            let path = db_path(domain, settings);

            if !path.exists() {
                Output::error(&format!(
                    "No {} database at {}. Run 'ombud db init' first.",
                    domain,
                    path.display()
                ));
                return Ok(());
            }

            let tables = db::explore(&path)?;
            Output::header(&format!("Database: {}", path.display()));
            for table in &tables {
                Output::table_info(&table.name, &table.columns, table.row_count);
            }
            println!();
        }
    }

    Ok(())
}

/// Parse an optional domain argument; None means all domains.
fn resolve_domains(domain: Option<&str>) -> Result<Vec<Domain>> {
    match domain {
        Some(d) => Ok(vec![d.parse().map_err(anyhow::Error::msg)?]),
        None => Ok(Domain::ALL.to_vec()),
    }
}

fn db_path(domain: Domain, settings: &Settings) -> std::path::PathBuf {
    match domain {
        Domain::Support => settings.support_db_path(),
        Domain::Inventory => settings.inventory_db_path(),
    }
}

fn init_domain(domain: Domain, settings: &Settings) -> Result<()> {
    let path = db_path(domain, settings);
    match domain {
        Domain::Support => SupportStore::open(&path).init()?,
        Domain::Inventory => InventoryStore::open(&path).init()?,
    }
    Output::success(&format!("Seeded {} database at {}", domain, path.display()));
    Ok(())
}
