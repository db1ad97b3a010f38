//! MCP Tools for Opine
//!
//! This module organizes the MCP tools into categories:
//! - Deals: deal lookup and enrichment
//! - Pipeline: sales process configuration
//! - Tickets: ticket listing, creation, and updates
//! - Evaluations: buyer evaluations

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde_json::{json, Value};

/// Tool names as they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListDeals,
    GetDeal,
    GetSalesforceDeal,
    DescribeDealSalesProcess,
    CreateDealNote,
    ListSalesProcesses,
    ListSalesProcessStages,
    ListTickets,
    UpdateTicket,
    CreateTicket,
    ListEvaluations,
}

impl ToolName {
    pub const ALL: [Self; 11] = [
        Self::ListDeals,
        Self::GetDeal,
        Self::GetSalesforceDeal,
        Self::DescribeDealSalesProcess,
        Self::CreateDealNote,
        Self::ListSalesProcesses,
        Self::ListSalesProcessStages,
        Self::ListTickets,
        Self::UpdateTicket,
        Self::CreateTicket,
        Self::ListEvaluations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListDeals => "list_deals",
            Self::GetDeal => "get_deal",
            Self::GetSalesforceDeal => "get_salesforce_deal",
            Self::DescribeDealSalesProcess => "describe_deal_sales_process",
            Self::CreateDealNote => "create_deal_note",
            Self::ListSalesProcesses => "list_sales_processes",
            Self::ListSalesProcessStages => "list_sales_process_stages",
            Self::ListTickets => "list_tickets",
            Self::UpdateTicket => "update_ticket",
            Self::CreateTicket => "create_ticket",
            Self::ListEvaluations => "list_evaluations",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ListDeals => "List deals from Opine CRM",
            Self::GetDeal => "Get a specific deal by ID",
            Self::GetSalesforceDeal => {
                "Get a specific deal by Salesforce ID (automatically converts 15-char to 18-char and prepends \"eid:\" prefix)"
            }
            Self::DescribeDealSalesProcess => {
                "Get a deal along with resolved sales process and stage metadata"
            }
            Self::CreateDealNote => "Create a note on a deal",
            Self::ListSalesProcesses => "List sales processes configured in Opine",
            Self::ListSalesProcessStages => "List sales process stages from Opine",
            Self::ListTickets => "List tickets/requests from Opine",
            Self::UpdateTicket => "Update fields on an existing ticket",
            Self::CreateTicket => "Create a new ticket, optionally linked to deals",
            Self::ListEvaluations => "List evaluations from Opine",
        }
    }

    pub fn input_schema(&self) -> JsonObject {
        match self {
            Self::ListDeals => object_schema(
                with_pagination(json!({
                    "includeSummary": include_summary(),
                    "includeDeleted": { "type": "boolean", "description": "Include deleted deals" }
                })),
                &[],
            ),
            Self::GetDeal => object_schema(
                json!({
                    "id": {
                        "type": "string",
                        "description": "Deal ID (Opine ID or external service ID)",
                        "pattern": "^.+$"
                    },
                    "includeSummary": include_summary()
                }),
                &["id"],
            ),
            Self::GetSalesforceDeal => object_schema(
                json!({
                    "id": {
                        "type": "string",
                        "description": "Salesforce deal ID (15 or 18 characters, will be converted to 18-char format and prefixed with \"eid:\")",
                        "pattern": "^.+$"
                    },
                    "includeSummary": include_summary()
                }),
                &["id"],
            ),
            Self::DescribeDealSalesProcess => object_schema(
                json!({
                    "id": {
                        "type": "string",
                        "description": "Deal ID. If this is a Salesforce ID (15 or 18 characters), set isSalesforceId to true.",
                        "pattern": "^.+$"
                    },
                    "isSalesforceId": {
                        "type": "boolean",
                        "description": "Treat the id as a Salesforce ID (15 or 18 chars); it will be normalized and prefixed with \"eid:\"."
                    },
                    "includeSummary": include_summary()
                }),
                &["id"],
            ),
            Self::CreateDealNote => object_schema(
                json!({
                    "dealId": {
                        "type": "string",
                        "description": "Deal ID (Opine ID or eid:-prefixed external ID)",
                        "pattern": "^.+$"
                    },
                    "title": { "type": "string", "description": "Note title", "pattern": "^.+$" },
                    "body": rich_text("Note body")
                }),
                &["dealId", "title"],
            ),
            Self::ListSalesProcesses | Self::ListTickets | Self::ListEvaluations => {
                object_schema(with_pagination(json!({})), &[])
            }
            Self::ListSalesProcessStages => object_schema(
                with_pagination(json!({
                    "includeDeleted": {
                        "type": "boolean",
                        "description": "Include deleted sales process stages"
                    }
                })),
                &[],
            ),
            Self::UpdateTicket => {
                let mut properties = ticket_fields(true);
                properties["id"] =
                    json!({ "type": "string", "description": "Ticket ID", "pattern": "^.+$" });
                object_schema(properties, &["id"])
            }
            Self::CreateTicket => object_schema(ticket_fields(false), &["title", "type", "state"]),
        }
    }

    pub fn definition(&self) -> Tool {
        Tool::new(self.as_str(), self.description(), Arc::new(self.input_schema()))
    }
}

/// Tool category trait
pub trait ToolCategory {
    /// Category name
    fn category_name() -> &'static str
    where
        Self: Sized;
    /// Tools in this category
    fn tools() -> &'static [ToolName]
    where
        Self: Sized;
}

/// Deal tools category
pub struct DealTools;

/// Pipeline (sales process) tools category
pub struct PipelineTools;

/// Ticket tools category
pub struct TicketTools;

/// Evaluation tools category
pub struct EvaluationTools;

impl ToolCategory for DealTools {
    fn category_name() -> &'static str {
        "deals"
    }
    fn tools() -> &'static [ToolName] {
        &[
            ToolName::ListDeals,
            ToolName::GetDeal,
            ToolName::GetSalesforceDeal,
            ToolName::DescribeDealSalesProcess,
            ToolName::CreateDealNote,
        ]
    }
}

impl ToolCategory for PipelineTools {
    fn category_name() -> &'static str {
        "pipeline"
    }
    fn tools() -> &'static [ToolName] {
        &[ToolName::ListSalesProcesses, ToolName::ListSalesProcessStages]
    }
}

impl ToolCategory for TicketTools {
    fn category_name() -> &'static str {
        "tickets"
    }
    fn tools() -> &'static [ToolName] {
        &[ToolName::ListTickets, ToolName::UpdateTicket, ToolName::CreateTicket]
    }
}

impl ToolCategory for EvaluationTools {
    fn category_name() -> &'static str {
        "evaluations"
    }
    fn tools() -> &'static [ToolName] {
        &[ToolName::ListEvaluations]
    }
}

/// Total number of tools
pub const TOTAL_TOOLS: usize = ToolName::ALL.len();

/// Definitions advertised by `tools/list`.
pub fn tool_definitions() -> Vec<Tool> {
    ToolName::ALL.iter().map(ToolName::definition).collect()
}

/// One line per category, e.g. `deals: list_deals, get_deal`.
pub fn category_summary() -> String {
    fn line<C: ToolCategory>() -> String {
        let names: Vec<&str> = C::tools().iter().map(ToolName::as_str).collect();
        format!("{}: {}", C::category_name(), names.join(", "))
    }

    [line::<DealTools>(), line::<PipelineTools>(), line::<TicketTools>(), line::<EvaluationTools>()]
        .join("\n")
}

fn object_schema(properties: Value, required: &[&str]) -> JsonObject {
    let mut schema = serde_json::Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), properties);
    if !required.is_empty() {
        schema.insert("required".to_string(), json!(required));
    }
    schema
}

fn with_pagination(mut properties: Value) -> Value {
    properties["limit"] = json!({
        "type": "number",
        "description": "Number of results to return (1-1000, default: 100)",
        "minimum": 1,
        "maximum": 1000
    });
    properties["offset"] = json!({
        "type": "number",
        "description": "Number of results to skip (default: 0)",
        "minimum": 0
    });
    properties
}

fn include_summary() -> Value {
    json!({ "type": "boolean", "description": "Include AI-generated deal summary" })
}

fn rich_text(description: &str) -> Value {
    json!({
        "description": format!("{description}: a markdown string or an array of rich-text nodes"),
        "anyOf": [{ "type": "string" }, { "type": "array", "items": { "type": "object" } }]
    })
}

fn ticket_fields(clearable: bool) -> Value {
    let nullable = |schema: Value| {
        if clearable {
            json!({ "anyOf": [schema, { "type": "null" }] })
        } else {
            schema
        }
    };

    json!({
        "title": { "type": "string", "description": "Ticket title" },
        "type": {
            "type": "string",
            "enum": ["BUG", "FEATURE", "CUSTOM_1", "CUSTOM_2", "CUSTOM_3", "CUSTOM_4", "CUSTOM_5"]
        },
        "state": {
            "type": "string",
            "enum": ["OPEN", "PRIORITIZING", "ROADMAP", "DEFERRED", "IN_PROGRESS", "CLOSED"]
        },
        "description": rich_text("Ticket description"),
        "targetDueDate": nullable(json!({
            "type": "string",
            "description": "Target due date (ISO 8601)"
        })),
        "deals": {
            "type": "array",
            "description": "Deals linked to this ticket. On update, set delete to true to unlink.",
            "items": {
                "type": "object",
                "properties": {
                    "id": { "anyOf": [{ "type": "number" }, { "type": "string" }] },
                    "priority": { "type": "string", "enum": ["BLOCKER", "IMPORTANT", "NICE_TO_HAVE"] },
                    "delete": { "type": "boolean" }
                },
                "required": ["id", "priority"]
            }
        },
        "labels": nullable(json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "Labels; replaces all existing labels"
        })),
        "vendorEntityUrl": nullable(json!({
            "type": "string",
            "description": "URL of the matching issue in an external tracker"
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_counts() {
        assert_eq!(DealTools::tools().len(), 5);
        assert_eq!(PipelineTools::tools().len(), 2);
        assert_eq!(TicketTools::tools().len(), 3);
        assert_eq!(EvaluationTools::tools().len(), 1);
        assert_eq!(TOTAL_TOOLS, 11);
        assert_eq!(tool_definitions().len(), TOTAL_TOOLS);
    }

    #[test]
    fn names_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
        }
        assert_eq!(ToolName::parse("drop_tables"), None);
    }

    #[test]
    fn required_fields_are_declared() {
        let schema = ToolName::CreateTicket.input_schema();
        assert_eq!(schema.get("required"), Some(&json!(["title", "type", "state"])));

        let schema = ToolName::UpdateTicket.input_schema();
        assert_eq!(schema.get("required"), Some(&json!(["id"])));
        assert!(schema["properties"]["labels"]["anyOf"].is_array());

        let schema = ToolName::ListTickets.input_schema();
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"]["limit"]["maximum"], json!(1000));
    }

    #[test]
    fn summary_lists_every_category() {
        let summary = category_summary();
        assert!(summary.contains("deals: list_deals, get_deal"));
        assert!(summary.contains("tickets: list_tickets, update_ticket, create_ticket"));
        assert_eq!(summary.lines().count(), 4);
    }
}
