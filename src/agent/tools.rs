//! Tool definitions and implementations for the agent system.
//!
//! Each tool performs exactly one database operation. Missing records come
//! back as structured "not found" results so the model can react to them,
//! never as errors.

use crate::db::{Domain, InventoryStore, RefundOutcome, SupportStore};
use crate::error::{OmbudError, Result};
use serde_json::json;

/// Available tools across both domains.
#[derive(Debug, Clone)]
pub enum ToolCall {
    /// Look up a customer by ID.
    LookupCustomer { customer_id: String },

    /// Look up customers by name (partial, case-insensitive).
    LookupCustomerByName { name: String },

    /// Check the status and details of an order.
    CheckOrderStatus { order_id: String },

    /// Get all orders for a customer.
    GetCustomerOrders { customer_id: String },

    /// Process a refund for a delivered order.
    ProcessRefund { order_id: String, reason: String },

    /// Check current stock level for a product.
    CheckStock { product_id: String },

    /// Search inventory by category and/or low stock.
    SearchInventory {
        category: Option<String>,
        low_stock_only: bool,
    },

    /// Sales trend analysis and stockout estimate for a product.
    GetSalesTrend { product_id: String },

    /// Create a purchase order to restock a product.
    CreatePurchaseOrder {
        product_id: String,
        quantity: i64,
        reason: String,
    },
}

/// Tool execution context with access to both sample databases.
pub struct ToolContext {
    support: SupportStore,
    inventory: InventoryStore,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(support: SupportStore, inventory: InventoryStore) -> Self {
        Self { support, inventory }
    }

    /// Execute a tool call and return the result as a JSON string.
    pub fn execute(&self, tool: &ToolCall) -> Result<String> {
        let value = match tool {
            ToolCall::LookupCustomer { customer_id } => {
                match self.support.lookup_customer(customer_id)? {
                    Some(customer) => json!({"status": "found", "customer": customer}),
                    None => json!({"status": "not_found", "message": "Customer not found"}),
                }
            }

            ToolCall::LookupCustomerByName { name } => {
                let customers = self.support.lookup_customer_by_name(name)?;
                if customers.is_empty() {
                    json!({"status": "not_found", "message": "No customers found with that name"})
                } else {
                    json!({
                        "status": "found",
                        "count": customers.len(),
                        "customers": customers,
                    })
                }
            }

            ToolCall::CheckOrderStatus { order_id } => {
                match self.support.order_status(order_id)? {
                    Some(order) => json!({"status": "found", "order": order}),
                    None => json!({"status": "not_found", "message": "Order not found"}),
                }
            }

            ToolCall::GetCustomerOrders { customer_id } => {
                match self.support.customer_orders(customer_id)? {
                    Some((customer_name, orders)) => json!({
                        "status": "success",
                        "customer_name": customer_name,
                        "total_orders": orders.len(),
                        "orders": orders,
                    }),
                    None => json!({"status": "error", "message": "Customer not found"}),
                }
            }

            ToolCall::ProcessRefund { order_id, reason } => {
                match self.support.process_refund(order_id, reason)? {
                    RefundOutcome::Approved {
                        refund_id,
                        order_id,
                        amount,
                    } => json!({
                        "status": "success",
                        "refund_id": refund_id,
                        "order_id": order_id,
                        "amount": amount,
                        "message": format!(
                            "Refund of ${} approved. Refund ID: {}. Amount will appear in 3-5 business days.",
                            amount, refund_id
                        ),
                    }),
                    RefundOutcome::OrderNotFound => {
                        json!({"status": "error", "message": "Order not found"})
                    }
                    RefundOutcome::NotDelivered { status } => json!({
                        "status": "error",
                        "message": format!(
                            "Cannot refund order with status: {}. Order must be delivered.",
                            status
                        ),
                    }),
                    RefundOutcome::AlreadyRefunded => json!({
                        "status": "error",
                        "message": "This order has already been refunded",
                    }),
                }
            }

            ToolCall::CheckStock { product_id } => match self.inventory.check_stock(product_id)? {
                Some(level) => {
                    let mut value = serde_json::to_value(level)?;
                    value["status"] = json!("success");
                    value
                }
                None => json!({
                    "status": "error",
                    "message": format!("Product {} not found", product_id),
                }),
            },

            ToolCall::SearchInventory {
                category,
                low_stock_only,
            } => {
                let products = self
                    .inventory
                    .search_inventory(category.as_deref(), *low_stock_only)?;
                serde_json::to_value(products)?
            }

            ToolCall::GetSalesTrend { product_id } => {
                match self.inventory.sales_trend(product_id)? {
                    Some(trend) => {
                        let mut value = serde_json::to_value(trend)?;
                        value["status"] = json!("success");
                        value
                    }
                    None => json!({
                        "status": "error",
                        "message": format!("Product {} not found", product_id),
                    }),
                }
            }

            ToolCall::CreatePurchaseOrder {
                product_id,
                quantity,
                reason,
            } => {
                if *quantity <= 0 {
                    return Err(OmbudError::InvalidInput(
                        "Purchase order quantity must be positive".to_string(),
                    ));
                }
                match self
                    .inventory
                    .create_purchase_order(product_id, *quantity, reason)?
                {
                    Some(po) => {
                        let message =
                            format!("Purchase order {} created successfully", po.purchase_order_id);
                        let mut value = serde_json::to_value(po)?;
                        value["status"] = json!("success");
                        value["message"] = json!(message);
                        value
                    }
                    None => json!({
                        "status": "error",
                        "message": format!("Product {} not found", product_id),
                    }),
                }
            }
        };

        Ok(value.to_string())
    }
}

/// Get OpenAI function/tool definitions for one domain.
pub fn tool_definitions(domain: Domain) -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    let function = |name: &str, description: &str, parameters: serde_json::Value| {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: name.to_string(),
                description: Some(description.to_string()),
                parameters: Some(parameters),
                strict: None,
            },
        }
    };

    match domain {
        Domain::Support => vec![
            function(
                "lookup_customer",
                "Look up customer information by customer ID",
                json!({
                    "type": "object",
                    "properties": {
                        "customer_id": {
                            "type": "string",
                            "description": "The customer ID (e.g., CUST001)"
                        }
                    },
                    "required": ["customer_id"]
                }),
            ),
            function(
                "lookup_customer_by_name",
                "Look up customers by name. Supports partial, case-insensitive matches.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Full or partial customer name"
                        }
                    },
                    "required": ["name"]
                }),
            ),
            function(
                "check_order_status",
                "Check the status and details of a specific order",
                json!({
                    "type": "object",
                    "properties": {
                        "order_id": {
                            "type": "string",
                            "description": "The order ID (e.g., ORD12345)"
                        }
                    },
                    "required": ["order_id"]
                }),
            ),
            function(
                "get_customer_orders",
                "Get all orders for a specific customer",
                json!({
                    "type": "object",
                    "properties": {
                        "customer_id": {
                            "type": "string",
                            "description": "The customer ID"
                        }
                    },
                    "required": ["customer_id"]
                }),
            ),
            function(
                "process_refund",
                "Process a refund for a delivered order",
                json!({
                    "type": "object",
                    "properties": {
                        "order_id": {
                            "type": "string",
                            "description": "The order ID to refund"
                        },
                        "reason": {
                            "type": "string",
                            "description": "Reason for the refund"
                        }
                    },
                    "required": ["order_id", "reason"]
                }),
            ),
        ],

        Domain::Inventory => vec![
            function(
                "check_stock",
                "Check current stock level for a specific product. Returns stock quantity, \
                 reorder point, stock status, and supplier information.",
                json!({
                    "type": "object",
                    "properties": {
                        "product_id": {
                            "type": "string",
                            "description": "Product ID (e.g., PROD001)"
                        }
                    },
                    "required": ["product_id"]
                }),
            ),
            function(
                "search_inventory",
                "Search inventory by category or find low stock items. Can filter by category \
                 (Electronics, Office Supplies, Furniture) and/or show only items below reorder point.",
                json!({
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Filter by product category: 'Electronics', 'Office Supplies', or 'Furniture'. Leave empty to search all categories."
                        },
                        "low_stock_only": {
                            "type": "boolean",
                            "description": "If true, only return items where current stock is at or below the reorder point. Default is false."
                        }
                    }
                }),
            ),
            function(
                "get_sales_trend",
                "Get sales trend analysis and stockout prediction for a product. Returns last \
                 7 days of sales data, average daily sales, trend direction, and estimated days \
                 until stockout. Includes a recommendation on whether to reorder.",
                json!({
                    "type": "object",
                    "properties": {
                        "product_id": {
                            "type": "string",
                            "description": "Product ID (e.g., PROD002)"
                        }
                    },
                    "required": ["product_id"]
                }),
            ),
            function(
                "create_purchase_order",
                "Create a purchase order to restock a product. This will generate a PO with the \
                 supplier, calculate costs, and track the order. Use this when a product needs \
                 to be restocked.",
                json!({
                    "type": "object",
                    "properties": {
                        "product_id": {
                            "type": "string",
                            "description": "Product ID to reorder (e.g., PROD002)"
                        },
                        "quantity": {
                            "type": "integer",
                            "description": "Number of units to order. Consider average daily sales and lead time (5-7 days) when deciding quantity."
                        },
                        "reason": {
                            "type": "string",
                            "description": "Reason for the purchase order (e.g., 'Low stock - high demand', 'Approaching stockout', 'Routine reorder')"
                        }
                    },
                    "required": ["product_id", "quantity", "reason"]
                }),
            ),
        ],
    }
}

/// Parse a tool call from the OpenAI response format.
///
/// This is the single validation point between the model's free-form tool
/// requests and execution: unknown names and malformed arguments are rejected
/// here with recoverable errors.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| OmbudError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let required_str = |key: &str| -> Result<String> {
        args[key]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| OmbudError::Agent(format!("Missing '{}' argument", key)))
    };

    match name {
        "lookup_customer" => Ok(ToolCall::LookupCustomer {
            customer_id: required_str("customer_id")?,
        }),
        "lookup_customer_by_name" => Ok(ToolCall::LookupCustomerByName {
            name: required_str("name")?,
        }),
        "check_order_status" => Ok(ToolCall::CheckOrderStatus {
            order_id: required_str("order_id")?,
        }),
        "get_customer_orders" => Ok(ToolCall::GetCustomerOrders {
            customer_id: required_str("customer_id")?,
        }),
        "process_refund" => Ok(ToolCall::ProcessRefund {
            order_id: required_str("order_id")?,
            reason: required_str("reason")?,
        }),
        "check_stock" => Ok(ToolCall::CheckStock {
            product_id: required_str("product_id")?,
        }),
        "search_inventory" => Ok(ToolCall::SearchInventory {
            category: args["category"].as_str().map(|s| s.to_string()),
            low_stock_only: args["low_stock_only"].as_bool().unwrap_or(false),
        }),
        "get_sales_trend" => Ok(ToolCall::GetSalesTrend {
            product_id: required_str("product_id")?,
        }),
        "create_purchase_order" => {
            let quantity = args["quantity"]
                .as_i64()
                .ok_or_else(|| OmbudError::Agent("Missing 'quantity' argument".to_string()))?;
            Ok(ToolCall::CreatePurchaseOrder {
                product_id: required_str("product_id")?,
                quantity,
                reason: required_str("reason")?,
            })
        }
        _ => Err(OmbudError::UnknownTool(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_context() -> (tempfile::TempDir, ToolContext) {
        let dir = tempfile::tempdir().unwrap();
        let support = SupportStore::open(&dir.path().join("customer_support.db"));
        let inventory = InventoryStore::open(&dir.path().join("inventory.db"));
        support.init().unwrap();
        inventory.init().unwrap();
        (dir, ToolContext::new(support, inventory))
    }

    #[test]
    fn test_parse_lookup_customer() {
        let tool = parse_tool_call("lookup_customer", r#"{"customer_id": "CUST001"}"#).unwrap();
        match tool {
            ToolCall::LookupCustomer { customer_id } => assert_eq!(customer_id, "CUST001"),
            _ => panic!("Expected LookupCustomer tool"),
        }
    }

    #[test]
    fn test_parse_lookup_customer_by_name() {
        let tool = parse_tool_call("lookup_customer_by_name", r#"{"name": "Sarah"}"#).unwrap();
        match tool {
            ToolCall::LookupCustomerByName { name } => assert_eq!(name, "Sarah"),
            _ => panic!("Expected LookupCustomerByName tool"),
        }
    }

    #[test]
    fn test_parse_search_inventory_defaults() {
        let tool = parse_tool_call("search_inventory", "{}").unwrap();
        match tool {
            ToolCall::SearchInventory {
                category,
                low_stock_only,
            } => {
                assert!(category.is_none());
                assert!(!low_stock_only);
            }
            _ => panic!("Expected SearchInventory tool"),
        }
    }

    #[test]
    fn test_parse_missing_argument() {
        let err = parse_tool_call("process_refund", r#"{"order_id": "ORD12347"}"#).unwrap_err();
        assert!(err.to_string().contains("reason"));
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = parse_tool_call("delete_all_orders", "{}").unwrap_err();
        match err {
            OmbudError::UnknownTool(name) => assert_eq!(name, "delete_all_orders"),
            other => panic!("Expected UnknownTool, got {}", other),
        }
    }

    #[test]
    fn test_execute_lookup_found() {
        let (_dir, ctx) = seeded_context();
        let result = ctx
            .execute(&ToolCall::LookupCustomer {
                customer_id: "CUST001".to_string(),
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["status"], "found");
        assert_eq!(value["customer"]["name"], "Sarah Johnson");
    }

    #[test]
    fn test_execute_lookup_missing_is_not_found_result() {
        let (_dir, ctx) = seeded_context();
        let result = ctx
            .execute(&ToolCall::CheckOrderStatus {
                order_id: "ORD99999".to_string(),
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["status"], "not_found");
    }

    #[test]
    fn test_execute_refund_flow() {
        let (_dir, ctx) = seeded_context();
        let result = ctx
            .execute(&ToolCall::ProcessRefund {
                order_id: "ORD12347".to_string(),
                reason: "arrived damaged".to_string(),
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["refund_id"], "REF12347");
    }

    #[test]
    fn test_execute_check_stock() {
        let (_dir, ctx) = seeded_context();
        let result = ctx
            .execute(&ToolCall::CheckStock {
                product_id: "PROD002".to_string(),
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["stock_status"], "low");
        assert_eq!(value["current_stock"], 8);
    }

    #[test]
    fn test_execute_search_inventory_low_stock() {
        let (_dir, ctx) = seeded_context();
        let result = ctx
            .execute(&ToolCall::SearchInventory {
                category: None,
                low_stock_only: true,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&result).unwrap();
        let products = value.as_array().unwrap();
        assert_eq!(products.len(), 2);
    }

    #[test]
    fn test_execute_rejects_nonpositive_quantity() {
        let (_dir, ctx) = seeded_context();
        let err = ctx
            .execute(&ToolCall::CreatePurchaseOrder {
                product_id: "PROD002".to_string(),
                quantity: 0,
                reason: "test".to_string(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_tool_definitions_per_domain() {
        let support_names: Vec<String> = tool_definitions(Domain::Support)
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(
            support_names,
            vec![
                "lookup_customer",
                "lookup_customer_by_name",
                "check_order_status",
                "get_customer_orders",
                "process_refund",
            ]
        );

        let inventory_names: Vec<String> = tool_definitions(Domain::Inventory)
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(
            inventory_names,
            vec![
                "check_stock",
                "search_inventory",
                "get_sales_trend",
                "create_purchase_order",
            ]
        );
    }

    #[test]
    fn test_every_defined_tool_parses() {
        for domain in Domain::ALL {
            for def in tool_definitions(domain) {
                // Minimal plausible arguments for each declared tool
                let args = match def.function.name.as_str() {
                    "lookup_customer" | "get_customer_orders" => r#"{"customer_id": "CUST001"}"#,
                    "lookup_customer_by_name" => r#"{"name": "Sarah"}"#,
                    "check_order_status" => r#"{"order_id": "ORD12345"}"#,
                    "process_refund" => r#"{"order_id": "ORD12347", "reason": "damaged"}"#,
                    "check_stock" | "get_sales_trend" => r#"{"product_id": "PROD001"}"#,
                    "search_inventory" => r#"{}"#,
                    "create_purchase_order" => {
                        r#"{"product_id": "PROD002", "quantity": 50, "reason": "low stock"}"#
                    }
                    other => panic!("Unhandled tool in test: {}", other),
                };
                assert!(
                    parse_tool_call(&def.function.name, args).is_ok(),
                    "tool {} failed to parse",
                    def.function.name
                );
            }
        }
    }
}
