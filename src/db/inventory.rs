//! Inventory database store.
//!
//! Backs the inventory-domain agent tools: stock checks, catalog search,
//! sales trend analysis, and purchase order creation.

use crate::error::Result;
use chrono::{Duration, Local};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stock level goes `low` at or below the reorder point, `out_of_stock` at zero.
pub fn stock_status(stock: i64, reorder_point: i64) -> &'static str {
    if stock == 0 {
        "out_of_stock"
    } else if stock <= reorder_point {
        "low"
    } else {
        "healthy"
    }
}

/// Current stock level for one product.
#[derive(Debug, Clone, Serialize)]
pub struct StockLevel {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub price: f64,
    pub current_stock: i64,
    pub reorder_point: i64,
    pub stock_status: String,
    pub supplier: String,
}

/// One product in a catalog search result.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub reorder_point: i64,
    pub stock_status: String,
}

/// Sales trend analysis with a stockout estimate.
#[derive(Debug, Clone, Serialize)]
pub struct SalesTrend {
    pub product_id: String,
    pub product_name: String,
    pub last_7_days_sales: Vec<i64>,
    pub average_daily_sales: f64,
    /// "increasing", "decreasing", "stable", or "no_data".
    pub trend: String,
    pub current_stock: i64,
    pub reorder_point: i64,
    pub estimated_days_until_stockout: i64,
    pub recommendation: String,
}

/// A created purchase order.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrder {
    pub purchase_order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub supplier: String,
    pub reason: String,
    pub estimated_delivery: String,
}

/// Store over the inventory database.
pub struct InventoryStore {
    path: PathBuf,
}

/// Days-until-stockout value when there is no meaningful sales rate.
const NO_STOCKOUT_ESTIMATE: i64 = 999;

/// Wholesale cost assumption: 60% of retail price.
const COST_RATIO: f64 = 0.6;

/// Seed products: (id, name, category, price, stock, reorder point, supplier).
#[allow(clippy::type_complexity)]
const SEED_PRODUCTS: &[(&str, &str, &str, f64, i64, i64, &str)] = &[
    ("PROD001", "Wireless Mouse", "Electronics", 29.99, 45, 20, "TechCorp"),
    ("PROD002", "USB-C Cable", "Electronics", 12.99, 8, 15, "TechCorp"),
    ("PROD003", "Notebook Pack", "Office Supplies", 8.99, 150, 50, "OfficeMax"),
    ("PROD004", "Desk Lamp", "Furniture", 45.00, 12, 10, "HomeGoods"),
    ("PROD005", "Ergonomic Chair", "Furniture", 299.99, 3, 5, "HomeGoods"),
];

impl InventoryStore {
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
    ///
    /// Seeds 7 days of sales history ending today. PROD002 sells fast against
    /// low stock (the reorder scenario); PROD005 sells slowly but is also low.
    pub fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = self.connect()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                product_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                price REAL NOT NULL,
                stock INTEGER NOT NULL,
                reorder_point INTEGER NOT NULL,
                supplier TEXT NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS sales_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id TEXT NOT NULL,
                date TEXT NOT NULL,
                quantity_sold INTEGER NOT NULL,
                FOREIGN KEY (product_id) REFERENCES products (product_id)
            );

            CREATE TABLE IF NOT EXISTS purchase_orders (
                po_id TEXT PRIMARY KEY,
                product_id TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                unit_cost REAL,
                total_cost REAL,
                reason TEXT,
                status TEXT DEFAULT 'pending',
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (product_id) REFERENCES products (product_id)
            );
            "#,
        )?;

        for (id, name, category, price, stock, reorder, supplier) in SEED_PRODUCTS {
            conn.execute(
                r#"
                INSERT OR IGNORE INTO products
                (product_id, name, category, price, stock, reorder_point, supplier)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![id, name, category, price, stock, reorder, supplier],
            )?;
        }

        // Only seed history into a fresh database; re-running init must not
        // duplicate rows (sales_history has no natural key).
        let history_rows: i64 =
            conn.query_row("SELECT COUNT(*) FROM sales_history", [], |row| row.get(0))?;
        if history_rows == 0 {
            for day in 0..7i64 {
                let date = (Local::now() - Duration::days(6 - day))
                    .format("%Y-%m-%d")
                    .to_string();

                let sales: [(&str, i64); 5] = [
                    ("PROD001", 5 + day % 3),
                    ("PROD002", 10 + day * 2),
                    ("PROD003", 2 + day % 3),
                    ("PROD004", day % 2),
                    ("PROD005", if day % 3 == 0 { 0 } else { 1 }),
                ];

                for (product_id, quantity) in sales {
                    conn.execute(
                        r#"
                        INSERT INTO sales_history (product_id, date, quantity_sold)
                        VALUES (?1, ?2, ?3)
                        "#,
                        params![product_id, date, quantity],
                    )?;
                }
            }
        }

        info!("Initialized inventory database at {:?}", self.path);
        Ok(())
    }

    /// Check the current stock level for a product.
    pub fn check_stock(&self, product_id: &str) -> Result<Option<StockLevel>> {
        let conn = self.connect()?;

        let level = conn.query_row(
            r#"
            SELECT product_id, name, stock, reorder_point, supplier, category, price
            FROM products
            WHERE product_id = ?1
            "#,
            params![product_id],
            |row| {
                let stock: i64 = row.get(2)?;
                let reorder_point: i64 = row.get(3)?;
                Ok(StockLevel {
                    product_id: row.get(0)?,
                    product_name: row.get(1)?,
                    current_stock: stock,
                    reorder_point,
                    stock_status: stock_status(stock, reorder_point).to_string(),
                    supplier: row.get(4)?,
                    category: row.get(5)?,
                    price: row.get(6)?,
                })
            },
        );

        match level {
            Ok(l) => Ok(Some(l)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search the catalog, optionally filtered by category and/or low stock.
    pub fn search_inventory(
        &self,
        category: Option<&str>,
        low_stock_only: bool,
    ) -> Result<Vec<ProductSummary>> {
        let conn = self.connect()?;

        let mut query = String::from(
            "SELECT product_id, name, category, price, stock, reorder_point FROM products WHERE 1=1",
        );
        let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::new();

        if let Some(cat) = category.as_ref() {
            query.push_str(" AND category = ?1");
            params_vec.push(cat);
        }
        if low_stock_only {
            query.push_str(" AND stock <= reorder_point");
        }

        let mut stmt = conn.prepare(&query)?;
        let products = stmt.query_map(params_vec.as_slice(), |row| {
            let stock: i64 = row.get(4)?;
            let reorder_point: i64 = row.get(5)?;
            Ok(ProductSummary {
                product_id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                price: row.get(3)?,
                stock,
                reorder_point,
                stock_status: stock_status(stock, reorder_point).to_string(),
            })
        })?;

        let result: Vec<ProductSummary> = products.filter_map(|p| p.ok()).collect();
        debug!(
            "Inventory search (category={:?}, low_stock_only={}) matched {} products",
            category,
            low_stock_only,
            result.len()
        );
        Ok(result)
    }

    /// Analyze the last 7 days of sales for a product and estimate stockout.
    pub fn sales_trend(&self, product_id: &str) -> Result<Option<SalesTrend>> {
        let conn = self.connect()?;

        let product = conn.query_row(
            "SELECT name, stock, reorder_point FROM products WHERE product_id = ?1",
            params![product_id],
            |row| {
                let name: String = row.get(0)?;
                let stock: i64 = row.get(1)?;
                let reorder_point: i64 = row.get(2)?;
                Ok((name, stock, reorder_point))
            },
        );

        let (product_name, current_stock, reorder_point) = match product {
            Ok(p) => p,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            r#"
            SELECT quantity_sold
            FROM sales_history
            WHERE product_id = ?1
            ORDER BY date ASC
            LIMIT 7
            "#,
        )?;
        let quantities = stmt.query_map(params![product_id], |row| row.get::<_, i64>(0))?;
        let quantities: Vec<i64> = quantities.filter_map(|q| q.ok()).collect();

        if quantities.is_empty() {
            return Ok(Some(SalesTrend {
                product_id: product_id.to_string(),
                product_name,
                last_7_days_sales: Vec::new(),
                average_daily_sales: 0.0,
                trend: "no_data".to_string(),
                current_stock,
                reorder_point,
                estimated_days_until_stockout: NO_STOCKOUT_ESTIMATE,
                recommendation: "No sales data available".to_string(),
            }));
        }

        let total: i64 = quantities.iter().sum();
        let avg_daily = total as f64 / quantities.len() as f64;

        let days_remaining = if avg_daily > 0.0 {
            (current_stock as f64 / avg_daily) as i64
        } else {
            NO_STOCKOUT_ESTIMATE
        };

        // Trend: second half of the window vs first half, with a 20% band
        let trend = if quantities.len() >= 4 {
            let mid = quantities.len() / 2;
            let first: i64 = quantities[..mid].iter().sum();
            let second: i64 = quantities[mid..].iter().sum();
            let first_avg = first as f64 / mid as f64;
            let second_avg = second as f64 / (quantities.len() - mid) as f64;

            if second_avg > first_avg * 1.2 {
                "increasing"
            } else if second_avg < first_avg * 0.8 {
                "decreasing"
            } else {
                "stable"
            }
        } else {
            "stable"
        };

        let recommendation = if current_stock <= reorder_point && days_remaining <= 7 {
            format!(
                "URGENT: Reorder needed. Only {} days of stock remaining.",
                days_remaining
            )
        } else if current_stock <= reorder_point {
            "Reorder recommended. Stock below reorder point.".to_string()
        } else if days_remaining <= 7 {
            format!(
                "Monitor closely. Will run out in approximately {} days.",
                days_remaining
            )
        } else {
            "Stock levels adequate.".to_string()
        };

        Ok(Some(SalesTrend {
            product_id: product_id.to_string(),
            product_name,
            last_7_days_sales: quantities,
            average_daily_sales: (avg_daily * 100.0).round() / 100.0,
            trend: trend.to_string(),
            current_stock,
            reorder_point,
            estimated_days_until_stockout: days_remaining,
            recommendation,
        }))
    }

    /// Create a pending purchase order for a product restock.
    pub fn create_purchase_order(
        &self,
        product_id: &str,
        quantity: i64,
        reason: &str,
    ) -> Result<Option<PurchaseOrder>> {
        let conn = self.connect()?;

        let product = conn.query_row(
            "SELECT name, price, supplier FROM products WHERE product_id = ?1",
            params![product_id],
            |row| {
                let name: String = row.get(0)?;
                let price: f64 = row.get(1)?;
                let supplier: String = row.get(2)?;
                Ok((name, price, supplier))
            },
        );

        let (product_name, retail_price, supplier) = match product {
            Ok(p) => p,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let unit_cost = retail_price * COST_RATIO;
        let total_cost = unit_cost * quantity as f64;
        let po_id = format!("PO{}", Local::now().format("%Y%m%d%H%M%S"));

        conn.execute(
            r#"
            INSERT INTO purchase_orders (po_id, product_id, quantity, unit_cost, total_cost, reason, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending')
            "#,
            params![&po_id, product_id, quantity, unit_cost, total_cost, reason],
        )?;

        info!("Created purchase order {} for {}", po_id, product_id);

        Ok(Some(PurchaseOrder {
            purchase_order_id: po_id,
            product_id: product_id.to_string(),
            product_name,
            quantity,
            unit_cost: round2(unit_cost),
            total_cost: round2(total_cost),
            supplier,
            reason: reason.to_string(),
            estimated_delivery: "5-7 business days".to_string(),
        }))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> (tempfile::TempDir, InventoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = InventoryStore::open(&dir.path().join("inventory.db"));
        store.init().unwrap();
        (dir, store)
    }

    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(stock_status(45, 20), "healthy");
        assert_eq!(stock_status(20, 20), "low");
        assert_eq!(stock_status(8, 15), "low");
        assert_eq!(stock_status(0, 15), "out_of_stock");
    }

    #[test]
    fn test_check_stock() {
        let (_dir, store) = seeded_store();

        let level = store.check_stock("PROD002").unwrap().unwrap();
        assert_eq!(level.product_name, "USB-C Cable");
        assert_eq!(level.current_stock, 8);
        assert_eq!(level.stock_status, "low");
        assert_eq!(level.supplier, "TechCorp");

        assert!(store.check_stock("PROD999").unwrap().is_none());
    }

    #[test]
    fn test_search_inventory_filters() {
        let (_dir, store) = seeded_store();

        let all = store.search_inventory(None, false).unwrap();
        assert_eq!(all.len(), 5);

        let electronics = store.search_inventory(Some("Electronics"), false).unwrap();
        assert_eq!(electronics.len(), 2);

        // PROD002 (8 <= 15) and PROD005 (3 <= 5) are at or below reorder point
        let low = store.search_inventory(None, true).unwrap();
        let ids: Vec<&str> = low.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["PROD002", "PROD005"]);
    }

    #[test]
    fn test_sales_trend_high_demand_product() {
        let (_dir, store) = seeded_store();

        // PROD002 sells 10,12,..,22 over the week against 8 in stock
        let trend = store.sales_trend("PROD002").unwrap().unwrap();
        assert_eq!(trend.last_7_days_sales, vec![10, 12, 14, 16, 18, 20, 22]);
        assert_eq!(trend.average_daily_sales, 16.0);
        assert_eq!(trend.trend, "increasing");
        assert_eq!(trend.estimated_days_until_stockout, 0);
        assert!(trend.recommendation.starts_with("URGENT"));
    }

    #[test]
    fn test_sales_trend_steady_product() {
        let (_dir, store) = seeded_store();

        // PROD001 sells 5,6,7,5,6,7,5 against 45 in stock
        let trend = store.sales_trend("PROD001").unwrap().unwrap();
        assert_eq!(trend.last_7_days_sales, vec![5, 6, 7, 5, 6, 7, 5]);
        assert_eq!(trend.trend, "stable");
        // 45 / (41/7) truncates to 7 days: above reorder point but worth watching
        assert_eq!(trend.estimated_days_until_stockout, 7);
        assert!(trend.recommendation.starts_with("Monitor closely"));

        // PROD003 has deep stock and slow sales
        let trend = store.sales_trend("PROD003").unwrap().unwrap();
        assert_eq!(trend.recommendation, "Stock levels adequate.");
    }

    #[test]
    fn test_sales_trend_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");
        let store = InventoryStore::open(&path);
        store.init().unwrap();

        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "INSERT INTO products (product_id, name, category, price, stock, reorder_point, supplier)
             VALUES ('PROD100', 'New Widget', 'Electronics', 9.99, 30, 10, 'TechCorp')",
            [],
        )
        .unwrap();

        let trend = store.sales_trend("PROD100").unwrap().unwrap();
        assert_eq!(trend.trend, "no_data");
        assert_eq!(trend.estimated_days_until_stockout, 999);
        assert!(trend.last_7_days_sales.is_empty());
    }

    #[test]
    fn test_sales_trend_missing_product() {
        let (_dir, store) = seeded_store();
        assert!(store.sales_trend("PROD999").unwrap().is_none());
    }

    #[test]
    fn test_create_purchase_order() {
        let (_dir, store) = seeded_store();

        let po = store
            .create_purchase_order("PROD002", 100, "Low stock - high demand")
            .unwrap()
            .unwrap();
        assert!(po.purchase_order_id.starts_with("PO"));
        assert_eq!(po.quantity, 100);
        // 60% of $12.99, rounded to cents
        assert!((po.unit_cost - 7.79).abs() < 1e-9);
        assert!((po.total_cost - 779.40).abs() < 1e-9);
        assert_eq!(po.supplier, "TechCorp");

        assert!(store
            .create_purchase_order("PROD999", 10, "test")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_init_does_not_duplicate_history() {
        let (_dir, store) = seeded_store();
        store.init().unwrap();

        let trend = store.sales_trend("PROD001").unwrap().unwrap();
        assert_eq!(trend.last_7_days_sales.len(), 7);
    }
}
