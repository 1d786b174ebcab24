//! Sample database helpers.
//!
//! Two small SQLite databases back the agent tools: customer support
//! (customers, orders, refunds) and inventory (products, sales history,
//! purchase orders). Connections are opened per operation and closed when
//! it completes; there is no pooling and no migration logic.

mod inventory;
mod support;

pub use inventory::{InventoryStore, ProductSummary, PurchaseOrder, SalesTrend, StockLevel};
pub use support::{Customer, OrderDetails, OrderSummary, RefundOutcome, SupportStore};

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

/// Which sample database an agent session operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Support,
    Inventory,
}

impl Domain {
    /// All known domains.
    pub const ALL: [Domain; 2] = [Domain::Support, Domain::Inventory];

    /// Conventional database file name for this domain.
    pub fn db_file_name(&self) -> &'static str {
        match self {
            Domain::Support => "customer_support.db",
            Domain::Inventory => "inventory.db",
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "support" | "customer_support" => Ok(Domain::Support),
            "inventory" => Ok(Domain::Inventory),
            _ => Err(format!(
                "Unknown domain: {} (expected 'support' or 'inventory')",
                s
            )),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Support => write!(f, "support"),
            Domain::Inventory => write!(f, "inventory"),
        }
    }
}

/// Schema and row count for one table, as reported by `explore`.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub name: String,
    /// Column name and declared type pairs.
    pub columns: Vec<(String, String)>,
    pub row_count: i64,
}

/// List tables, columns, and row counts for a database file.
pub fn explore(path: &Path) -> Result<Vec<TableInfo>> {
    let conn = Connection::open(path)?;

    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let names: Vec<String> = names.filter_map(|n| n.ok()).collect();

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let mut col_stmt = conn.prepare(&format!("PRAGMA table_info({})", name))?;
        let columns = col_stmt.query_map([], |row| {
            let col_name: String = row.get(1)?;
            let col_type: String = row.get(2)?;
            Ok((col_name, col_type))
        })?;
        let columns: Vec<(String, String)> = columns.filter_map(|c| c.ok()).collect();

        let row_count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", name), [], |row| {
                row.get(0)
            })?;

        tables.push(TableInfo {
            name,
            columns,
            row_count,
        });
    }

    Ok(tables)
}

/// Delete a database file if present. Used by `db reset` before re-seeding.
pub fn remove_db_file(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_from_str() {
        assert_eq!("support".parse::<Domain>().unwrap(), Domain::Support);
        assert_eq!("Inventory".parse::<Domain>().unwrap(), Domain::Inventory);
        assert!("warehouse".parse::<Domain>().is_err());
    }

    #[test]
    fn test_explore_seeded_support_db() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customer_support.db");
        let store = SupportStore::open(&path);
        store.init().unwrap();

        let tables = explore(&path).unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["customers", "orders", "refunds"]);

        let customers = tables.iter().find(|t| t.name == "customers").unwrap();
        assert_eq!(customers.row_count, 4);
        assert!(customers
            .columns
            .iter()
            .any(|(name, _)| name == "customer_id"));
    }
}
