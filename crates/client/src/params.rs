//! Request shapes for the Opine API.
//!
//! Absent values are skipped when serialized, so they never reach the query
//! string or body. Ticket fields that can be cleared use `Option<Option<_>>`:
//! `Some(None)` is sent as an explicit `null`.

use opine_core::{DealAssociation, TicketState, TicketType};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl PageParams {
    pub fn first(limit: u32) -> Self {
        Self { limit: Some(limit), offset: None }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDealsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_summary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_deleted: Option<bool>,
}

/// `id` goes in the path; the rest is the query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDealParams {
    #[serde(skip)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_summary: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesProcessStagesParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_deleted: Option<bool>,
}

impl ListSalesProcessStagesParams {
    pub fn first(limit: u32) -> Self {
        Self { limit: Some(limit), ..Self::default() }
    }
}

/// Partial ticket update. `labels` replaces the whole label set.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketParams {
    #[serde(skip)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<TicketType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TicketState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_due_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deals: Option<Vec<DealAssociation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_entity_url: Option<Option<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CreateDealNoteParams {
    #[serde(skip)]
    pub deal_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketParams {
    pub title: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub state: TicketState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deals: Option<Vec<DealAssociation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_entity_url: Option<String>,
}
