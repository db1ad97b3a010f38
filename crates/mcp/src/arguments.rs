//! Argument validation.
//!
//! Every tool call goes through [`ToolRequest::parse`] before any request is
//! sent. A call either becomes a fully typed request or fails with an error
//! that names the tool and the offending field.

use std::str::FromStr;

use opine_client::{
    CreateDealNoteParams, CreateTicketParams, GetDealParams, ListDealsParams,
    ListSalesProcessStagesParams, PageParams, UpdateTicketParams,
};
use opine_core::{DealAssociation, DealSelector};
use rmcp::model::JsonObject;
use serde_json::Value;

use crate::tools::ToolName;
use crate::{DispatchError, DispatchResult};

pub const MAX_PAGE_LIMIT: u32 = 1000;

/// A validated tool call.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolRequest {
    ListDeals(ListDealsParams),
    GetDeal(GetDealParams),
    GetSalesforceDeal { selector: DealSelector, include_summary: Option<bool> },
    DescribeDealSalesProcess { selector: DealSelector, include_summary: bool },
    CreateDealNote(CreateDealNoteParams),
    ListSalesProcesses(PageParams),
    ListSalesProcessStages(ListSalesProcessStagesParams),
    ListTickets(PageParams),
    UpdateTicket(UpdateTicketParams),
    CreateTicket(CreateTicketParams),
    ListEvaluations(PageParams),
}

impl ToolRequest {
    pub fn parse(tool: &str, arguments: Option<&JsonObject>) -> DispatchResult<Self> {
        let name =
            ToolName::parse(tool).ok_or_else(|| DispatchError::UnknownTool(tool.to_string()))?;
        let args = Arguments { tool: name, values: arguments };

        let request = match name {
            ToolName::ListDeals => Self::ListDeals(ListDealsParams {
                limit: args.limit()?,
                offset: args.optional_u32("offset")?,
                include_summary: args.optional_bool("includeSummary")?,
                include_deleted: args.optional_bool("includeDeleted")?,
            }),
            ToolName::GetDeal => Self::GetDeal(GetDealParams {
                id: args.required_str("id")?,
                include_summary: args.optional_bool("includeSummary")?,
            }),
            ToolName::GetSalesforceDeal => Self::GetSalesforceDeal {
                selector: DealSelector::Salesforce(args.required_text("id")?),
                include_summary: args.optional_bool("includeSummary")?,
            },
            ToolName::DescribeDealSalesProcess => {
                let is_salesforce_id = args.optional_bool("isSalesforceId")?.unwrap_or(false);
                let id =
                    if is_salesforce_id { args.required_text("id")? } else { args.required_str("id")? };
                Self::DescribeDealSalesProcess {
                    selector: DealSelector::new(id, is_salesforce_id),
                    include_summary: args.optional_bool("includeSummary")?.unwrap_or(false),
                }
            }
            ToolName::CreateDealNote => Self::CreateDealNote(CreateDealNoteParams {
                deal_id: args.required_str("dealId")?,
                title: args.required_str("title")?,
                body: args.optional_value("body"),
            }),
            ToolName::ListSalesProcesses => Self::ListSalesProcesses(args.page()?),
            ToolName::ListSalesProcessStages => {
                Self::ListSalesProcessStages(ListSalesProcessStagesParams {
                    limit: args.limit()?,
                    offset: args.optional_u32("offset")?,
                    include_deleted: args.optional_bool("includeDeleted")?,
                })
            }
            ToolName::ListTickets => Self::ListTickets(args.page()?),
            ToolName::UpdateTicket => Self::UpdateTicket(UpdateTicketParams {
                id: args.required_str("id")?,
                title: args.optional_str("title")?,
                ticket_type: args.optional_parsed("type")?,
                state: args.optional_parsed("state")?,
                description: args.clearable_value("description"),
                target_due_date: args.clearable_str("targetDueDate")?,
                deals: args.deal_associations("deals")?,
                labels: args.clearable_labels("labels")?,
                vendor_entity_url: args.clearable_str("vendorEntityUrl")?,
            }),
            ToolName::CreateTicket => Self::CreateTicket(CreateTicketParams {
                title: args.required_str("title")?,
                ticket_type: args.required_parsed("type")?,
                state: args.required_parsed("state")?,
                description: args.optional_value("description"),
                target_due_date: args.optional_str("targetDueDate")?,
                deals: args.deal_associations("deals")?,
                labels: args.labels("labels")?,
                vendor_entity_url: args.optional_str("vendorEntityUrl")?,
            }),
            ToolName::ListEvaluations => Self::ListEvaluations(args.page()?),
        };

        Ok(request)
    }
}

/// Typed accessors over the raw argument map. A JSON `null` counts as absent
/// except where a field can be cleared.
struct Arguments<'a> {
    tool: ToolName,
    values: Option<&'a JsonObject>,
}

impl<'a> Arguments<'a> {
    fn raw(&self, field: &str) -> Option<&'a Value> {
        self.values.and_then(|values| values.get(field))
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.raw(field).filter(|value| !value.is_null())
    }

    fn missing(&self, field: &'static str) -> DispatchError {
        DispatchError::MissingArgument { tool: self.tool.as_str().to_string(), field }
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> DispatchError {
        DispatchError::InvalidArgument {
            tool: self.tool.as_str().to_string(),
            field,
            reason: reason.into(),
        }
    }

    /// Any string, including `""`. Salesforce ids are checked by the id
    /// converter, which reports an empty id in its own words.
    fn required_text(&self, field: &'static str) -> DispatchResult<String> {
        let value = self.present(field).ok_or_else(|| self.missing(field))?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(field, "expected a string"))
    }

    fn required_str(&self, field: &'static str) -> DispatchResult<String> {
        let text = self.required_text(field)?;
        if text.is_empty() {
            return Err(self.invalid(field, "must not be empty"));
        }
        Ok(text)
    }

    fn optional_str(&self, field: &'static str) -> DispatchResult<Option<String>> {
        self.present(field)
            .map(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(field, "expected a string"))
            })
            .transpose()
    }

    fn clearable_str(&self, field: &'static str) -> DispatchResult<Option<Option<String>>> {
        match self.raw(field) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(None)),
            Some(Value::String(text)) => Ok(Some(Some(text.clone()))),
            Some(_) => Err(self.invalid(field, "expected a string or null")),
        }
    }

    fn optional_bool(&self, field: &'static str) -> DispatchResult<Option<bool>> {
        self.present(field)
            .map(|value| value.as_bool().ok_or_else(|| self.invalid(field, "expected a boolean")))
            .transpose()
    }

    fn optional_u32(&self, field: &'static str) -> DispatchResult<Option<u32>> {
        let Some(value) = self.present(field) else {
            return Ok(None);
        };

        let whole = value.as_u64().or_else(|| {
            value.as_f64().filter(|number| *number >= 0.0 && number.fract() == 0.0).map(|n| n as u64)
        });
        let number = whole.ok_or_else(|| self.invalid(field, "expected a non-negative integer"))?;
        u32::try_from(number)
            .map(Some)
            .map_err(|_| self.invalid(field, format!("{number} is too large")))
    }

    fn limit(&self) -> DispatchResult<Option<u32>> {
        let limit = self.optional_u32("limit")?;
        if let Some(limit) = limit {
            if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
                return Err(self.invalid("limit", format!("must be between 1 and {MAX_PAGE_LIMIT}")));
            }
        }
        Ok(limit)
    }

    fn page(&self) -> DispatchResult<PageParams> {
        Ok(PageParams { limit: self.limit()?, offset: self.optional_u32("offset")? })
    }

    fn optional_parsed<T>(&self, field: &'static str) -> DispatchResult<Option<T>>
    where
        T: FromStr<Err = String>,
    {
        self.optional_str(field)?
            .map(|text| text.parse::<T>().map_err(|reason| self.invalid(field, reason)))
            .transpose()
    }

    fn required_parsed<T>(&self, field: &'static str) -> DispatchResult<T>
    where
        T: FromStr<Err = String>,
    {
        self.required_str(field)?.parse::<T>().map_err(|reason| self.invalid(field, reason))
    }

    /// Rich text or markdown, passed through as given.
    fn optional_value(&self, field: &'static str) -> Option<Value> {
        self.present(field).cloned()
    }

    fn clearable_value(&self, field: &'static str) -> Option<Value> {
        self.raw(field).cloned()
    }

    fn deal_associations(&self, field: &'static str) -> DispatchResult<Option<Vec<DealAssociation>>> {
        let Some(value) = self.present(field) else {
            return Ok(None);
        };
        if !value.is_array() {
            return Err(self.invalid(field, "expected an array of deal associations"));
        }

        serde_json::from_value::<Vec<DealAssociation>>(value.clone())
            .map(Some)
            .map_err(|error| self.invalid(field, error.to_string()))
    }

    fn labels(&self, field: &'static str) -> DispatchResult<Option<Vec<String>>> {
        self.present(field).map(|value| self.string_list(field, value)).transpose()
    }

    fn clearable_labels(&self, field: &'static str) -> DispatchResult<Option<Option<Vec<String>>>> {
        match self.raw(field) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(None)),
            Some(value) => self.string_list(field, value).map(|labels| Some(Some(labels))),
        }
    }

    fn string_list(&self, field: &'static str, value: &Value) -> DispatchResult<Vec<String>> {
        let items = value.as_array().ok_or_else(|| self.invalid(field, "expected an array of strings"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(field, "expected an array of strings"))
            })
            .collect()
    }
}
