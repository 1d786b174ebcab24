//! Customer support database store.
//!
//! Backs the support-domain agent tools: customer lookup, order status,
//! order history, and refund processing.

use crate::error::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A customer record.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub tier: String,
    pub balance: f64,
}

/// Full order details including the owning customer's name.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub status: String,
    pub items: String,
    pub total: f64,
    pub tracking: Option<String>,
    pub estimated_delivery: Option<String>,
}

/// A single order in a customer's history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub status: String,
    pub items: String,
    pub total: f64,
    pub estimated_delivery: Option<String>,
}

/// Outcome of a refund request. Rejections are ordinary results, not errors;
/// the agent relays them to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum RefundOutcome {
    Approved {
        refund_id: String,
        order_id: String,
        amount: f64,
    },
    OrderNotFound,
    /// Only delivered orders are refundable.
    NotDelivered {
        status: String,
    },
    AlreadyRefunded,
}

/// Store over the customer support database.
pub struct SupportStore {
    path: PathBuf,
}

/// Seed customers: (id, name, email, tier, balance).
const SEED_CUSTOMERS: &[(&str, &str, &str, &str, f64)] = &[
    ("CUST001", "Sarah Johnson", "sarah.j@email.com", "premium", 150.00),
    ("CUST002", "Mike Chen", "mike.c@email.com", "standard", 0.00),
    ("CUST003", "Emma Williams", "emma.w@email.com", "premium", -25.00),
    ("CUST004", "David Brown", "david.b@email.com", "standard", 75.00),
];

/// Seed orders: (id, customer, status, items, total, tracking, estimated delivery).
#[allow(clippy::type_complexity)]
const SEED_ORDERS: &[(&str, &str, &str, &str, f64, Option<&str>, Option<&str>)] = &[
    ("ORD12345", "CUST001", "shipped", "Laptop, Mouse", 1299.99, Some("TRK789456123"), Some("2025-01-25")),
    ("ORD12346", "CUST002", "processing", "Headphones", 199.99, None, Some("2025-01-28")),
    ("ORD12347", "CUST003", "delivered", "Keyboard, Webcam", 249.99, Some("TRK789456124"), Some("2025-01-20")),
    ("ORD12348", "CUST001", "delivered", "Monitor", 399.99, Some("TRK789456125"), Some("2025-01-15")),
    ("ORD12349", "CUST004", "cancelled", "Mouse Pad", 15.99, None, None),
];

impl SupportStore {
    /// Create a store for the database at `path`. The file is not touched
    /// until an operation runs.
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Whether the database file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Create tables and seed sample data. Idempotent.
    pub fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = self.connect()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                customer_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                tier TEXT NOT NULL,
                balance REAL DEFAULT 0.0,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS orders (
                order_id TEXT PRIMARY KEY,
                customer_id TEXT NOT NULL,
                status TEXT NOT NULL,
                items TEXT NOT NULL,
                total REAL NOT NULL,
                tracking TEXT,
                estimated_delivery TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (customer_id) REFERENCES customers (customer_id)
            );

            CREATE TABLE IF NOT EXISTS refunds (
                refund_id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL,
                amount REAL NOT NULL,
                reason TEXT,
                status TEXT DEFAULT 'pending',
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (order_id) REFERENCES orders (order_id)
            );
            "#,
        )?;

        for (id, name, email, tier, balance) in SEED_CUSTOMERS {
            conn.execute(
                r#"
                INSERT OR IGNORE INTO customers (customer_id, name, email, tier, balance)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![id, name, email, tier, balance],
            )?;
        }

        for (id, customer, status, items, total, tracking, delivery) in SEED_ORDERS {
            conn.execute(
                r#"
                INSERT OR IGNORE INTO orders
                (order_id, customer_id, status, items, total, tracking, estimated_delivery)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![id, customer, status, items, total, tracking, delivery],
            )?;
        }

        info!("Initialized customer support database at {:?}", self.path);
        Ok(())
    }

    /// Look up a customer by ID.
    pub fn lookup_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        let conn = self.connect()?;

        let customer = conn.query_row(
            r#"
            SELECT customer_id, name, email, tier, balance
            FROM customers
            WHERE customer_id = ?1
            "#,
            params![customer_id],
            |row| {
                Ok(Customer {
                    customer_id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    tier: row.get(3)?,
                    balance: row.get(4)?,
                })
            },
        );

        match customer {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up customers by name (case-insensitive partial match).
    pub fn lookup_customer_by_name(&self, name: &str) -> Result<Vec<Customer>> {
        let conn = self.connect()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT customer_id, name, email, tier, balance
            FROM customers
            WHERE LOWER(name) LIKE LOWER(?1)
            "#,
        )?;

        let pattern = format!("%{}%", name);
        let customers = stmt.query_map(params![pattern], |row| {
            Ok(Customer {
                customer_id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                tier: row.get(3)?,
                balance: row.get(4)?,
            })
        })?;

        let result: Vec<Customer> = customers.filter_map(|c| c.ok()).collect();
        debug!("Name lookup '{}' matched {} customers", name, result.len());
        Ok(result)
    }

    /// Get the status and details of an order, joined with the customer name.
    pub fn order_status(&self, order_id: &str) -> Result<Option<OrderDetails>> {
        let conn = self.connect()?;

        let order = conn.query_row(
            r#"
            SELECT o.order_id, o.customer_id, o.status, o.items, o.total,
                   o.tracking, o.estimated_delivery, c.name
            FROM orders o
            JOIN customers c ON o.customer_id = c.customer_id
            WHERE o.order_id = ?1
            "#,
            params![order_id],
            |row| {
                Ok(OrderDetails {
                    order_id: row.get(0)?,
                    customer_id: row.get(1)?,
                    status: row.get(2)?,
                    items: row.get(3)?,
                    total: row.get(4)?,
                    tracking: row.get(5)?,
                    estimated_delivery: row.get(6)?,
                    customer_name: row.get(7)?,
                })
            },
        );

        match order {
            Ok(o) => Ok(Some(o)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get all orders for a customer, newest first. Returns the customer name
    /// and their orders, or None if the customer does not exist.
    pub fn customer_orders(&self, customer_id: &str) -> Result<Option<(String, Vec<OrderSummary>)>> {
        let conn = self.connect()?;

        let name = conn.query_row(
            "SELECT name FROM customers WHERE customer_id = ?1",
            params![customer_id],
            |row| row.get::<_, String>(0),
        );

        let name = match name {
            Ok(n) => n,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT order_id, status, items, total, estimated_delivery
            FROM orders
            WHERE customer_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;

        let orders = stmt.query_map(params![customer_id], |row| {
            Ok(OrderSummary {
                order_id: row.get(0)?,
                status: row.get(1)?,
                items: row.get(2)?,
                total: row.get(3)?,
                estimated_delivery: row.get(4)?,
            })
        })?;

        let orders: Vec<OrderSummary> = orders.filter_map(|o| o.ok()).collect();
        Ok(Some((name, orders)))
    }

    /// Process a refund for a delivered order.
    ///
    /// The refund id is derived from the order id (ORD12347 -> REF12347),
    /// the refund is created as approved for the full order total, and the
    /// order status flips to 'refunded'. Both writes happen in one transaction.
    pub fn process_refund(&self, order_id: &str, reason: &str) -> Result<RefundOutcome> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let order = tx.query_row(
            "SELECT order_id, status, total FROM orders WHERE order_id = ?1",
            params![order_id],
            |row| {
                let id: String = row.get(0)?;
                let status: String = row.get(1)?;
                let total: f64 = row.get(2)?;
                Ok((id, status, total))
            },
        );

        let (order_id, status, total) = match order {
            Ok(o) => o,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(RefundOutcome::OrderNotFound),
            Err(e) => return Err(e.into()),
        };

        if status != "delivered" {
            return Ok(RefundOutcome::NotDelivered { status });
        }

        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM refunds WHERE order_id = ?1",
            params![&order_id],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(RefundOutcome::AlreadyRefunded);
        }

        // ORDxxxxx -> REFxxxxx
        let refund_id = format!("REF{}", &order_id[3.min(order_id.len())..]);

        tx.execute(
            r#"
            INSERT INTO refunds (refund_id, order_id, amount, reason, status)
            VALUES (?1, ?2, ?3, ?4, 'approved')
            "#,
            params![&refund_id, &order_id, total, reason],
        )?;

        tx.execute(
            "UPDATE orders SET status = 'refunded' WHERE order_id = ?1",
            params![&order_id],
        )?;

        tx.commit()?;
        info!("Approved refund {} for order {}", refund_id, order_id);

        Ok(RefundOutcome::Approved {
            refund_id,
            order_id,
            amount: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> (tempfile::TempDir, SupportStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SupportStore::open(&dir.path().join("customer_support.db"));
        store.init().unwrap();
        (dir, store)
    }

    #[test]
    fn test_lookup_customer_found() {
        let (_dir, store) = seeded_store();
        let customer = store.lookup_customer("CUST001").unwrap().unwrap();
        assert_eq!(customer.name, "Sarah Johnson");
        assert_eq!(customer.tier, "premium");
        assert_eq!(customer.balance, 150.00);
    }

    #[test]
    fn test_lookup_customer_missing_is_none() {
        let (_dir, store) = seeded_store();
        assert!(store.lookup_customer("CUST999").unwrap().is_none());
    }

    #[test]
    fn test_lookup_customer_by_name_partial() {
        let (_dir, store) = seeded_store();
        let matches = store.lookup_customer_by_name("chen").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].customer_id, "CUST002");

        assert!(store.lookup_customer_by_name("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_order_status_joins_customer_name() {
        let (_dir, store) = seeded_store();
        let order = store.order_status("ORD12345").unwrap().unwrap();
        assert_eq!(order.status, "shipped");
        assert_eq!(order.customer_name, "Sarah Johnson");
        assert_eq!(order.tracking.as_deref(), Some("TRK789456123"));

        assert!(store.order_status("ORD99999").unwrap().is_none());
    }

    #[test]
    fn test_customer_orders() {
        let (_dir, store) = seeded_store();
        let (name, orders) = store.customer_orders("CUST001").unwrap().unwrap();
        assert_eq!(name, "Sarah Johnson");
        assert_eq!(orders.len(), 2);

        assert!(store.customer_orders("CUST999").unwrap().is_none());
    }

    #[test]
    fn test_refund_delivered_order() {
        let (_dir, store) = seeded_store();
        let outcome = store.process_refund("ORD12347", "arrived damaged").unwrap();
        match outcome {
            RefundOutcome::Approved {
                refund_id, amount, ..
            } => {
                assert_eq!(refund_id, "REF12347");
                assert_eq!(amount, 249.99);
            }
            other => panic!("Expected approval, got {:?}", other),
        }

        // Order status flipped
        let order = store.order_status("ORD12347").unwrap().unwrap();
        assert_eq!(order.status, "refunded");
    }

    #[test]
    fn test_refund_rejections() {
        let (_dir, store) = seeded_store();

        assert_eq!(
            store.process_refund("ORD99999", "whatever").unwrap(),
            RefundOutcome::OrderNotFound
        );

        assert_eq!(
            store.process_refund("ORD12346", "changed my mind").unwrap(),
            RefundOutcome::NotDelivered {
                status: "processing".to_string()
            }
        );
    }

    #[test]
    fn test_refund_twice_rejected() {
        let (_dir, store) = seeded_store();
        store.process_refund("ORD12348", "wrong size").unwrap();

        // Second attempt fails: the order is now 'refunded', no longer 'delivered'
        assert_eq!(
            store.process_refund("ORD12348", "again").unwrap(),
            RefundOutcome::NotDelivered {
                status: "refunded".to_string()
            }
        );
    }

    #[test]
    fn test_refund_existing_refund_row_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customer_support.db");
        let store = SupportStore::open(&path);
        store.init().unwrap();

        // A refund row without the status flip still blocks a second refund
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "INSERT INTO refunds (refund_id, order_id, amount, reason, status)
             VALUES ('REF12347', 'ORD12347', 249.99, 'manual', 'approved')",
            [],
        )
        .unwrap();

        assert_eq!(
            store.process_refund("ORD12347", "again").unwrap(),
            RefundOutcome::AlreadyRefunded
        );
    }

    #[test]
    fn test_init_is_idempotent() {
        let (_dir, store) = seeded_store();
        store.process_refund("ORD12347", "damaged").unwrap();
        store.init().unwrap();

        // Re-seeding must not clobber mutated rows
        let order = store.order_status("ORD12347").unwrap().unwrap();
        assert_eq!(order.status, "refunded");
    }
}
