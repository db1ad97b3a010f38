//! Routes validated tool calls to the Opine API.

use std::sync::Arc;

use opine_client::{describe_deal_sales_process, GetDealParams, OpineApi};
use rmcp::model::JsonObject;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::arguments::ToolRequest;
use crate::{DispatchError, DispatchResult, OperationError};

/// Turns a tool name plus raw arguments into one API operation and renders
/// the result as pretty-printed JSON.
pub struct ToolDispatcher<A: ?Sized> {
    api: Arc<A>,
}

impl<A: ?Sized> Clone for ToolDispatcher<A> {
    fn clone(&self) -> Self {
        Self { api: Arc::clone(&self.api) }
    }
}

impl<A> ToolDispatcher<A>
where
    A: OpineApi + ?Sized,
{
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn dispatch(
        &self,
        tool: &str,
        arguments: Option<&JsonObject>,
    ) -> DispatchResult<String> {
        let request = match ToolRequest::parse(tool, arguments) {
            Ok(request) => request,
            Err(error) => {
                warn!(tool, error = %error, "rejected tool call");
                return Err(error);
            }
        };

        debug!(tool, "dispatching tool call");
        match self.execute(request).await {
            Ok(text) => {
                info!(tool, bytes = text.len(), "tool call completed");
                Ok(text)
            }
            Err(source) => {
                let error = DispatchError::Execution { tool: tool.to_string(), source };
                warn!(tool, error = %error, "tool call failed");
                Err(error)
            }
        }
    }

    async fn execute(&self, request: ToolRequest) -> Result<String, OperationError> {
        let api = self.api.as_ref();
        match request {
            ToolRequest::ListDeals(params) => render(&api.list_deals(&params).await?),
            ToolRequest::GetDeal(params) => render(&api.get_deal(&params).await?),
            ToolRequest::GetSalesforceDeal { selector, include_summary } => {
                let id = selector.resolve()?;
                render(&api.get_deal(&GetDealParams { id, include_summary }).await?)
            }
            ToolRequest::DescribeDealSalesProcess { selector, include_summary } => {
                render(&describe_deal_sales_process(api, &selector, include_summary).await?)
            }
            ToolRequest::CreateDealNote(params) => render(&api.create_deal_note(&params).await?),
            ToolRequest::ListSalesProcesses(params) => {
                render(&api.list_sales_processes(&params).await?)
            }
            ToolRequest::ListSalesProcessStages(params) => {
                render(&api.list_sales_process_stages(&params).await?)
            }
            ToolRequest::ListTickets(params) => render(&api.list_tickets(&params).await?),
            ToolRequest::UpdateTicket(params) => render(&api.update_ticket(&params).await?),
            ToolRequest::CreateTicket(params) => render(&api.create_ticket(&params).await?),
            ToolRequest::ListEvaluations(params) => render(&api.list_evaluations(&params).await?),
        }
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, OperationError> {
    Ok(serde_json::to_string_pretty(value)?)
}
