//! Resolves a deal's sales process and stage references into full records.
//!
//! The API has no expand parameter, so each reference costs one list call.
//! Lookups read a single page of [`LOOKUP_PAGE_LIMIT`] records; a reference
//! outside that window, or to a deleted record, resolves to `None`.

use opine_core::{
    find_by_key, Deal, DealSelector, IdError, Keyed, Page, SalesProcess, SalesProcessStage,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::ClientError;
use crate::gateway::OpineApi;
use crate::params::{GetDealParams, ListSalesProcessStagesParams, PageParams};

pub const LOOKUP_PAGE_LIMIT: u32 = 1000;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealSalesProcess {
    pub deal: Deal,
    pub sales_process: Option<SalesProcess>,
    pub sales_process_stage: Option<SalesProcessStage>,
}

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error(transparent)]
    InvalidId(#[from] IdError),
    #[error(transparent)]
    Api(#[from] ClientError),
}

pub async fn describe_deal_sales_process<A>(
    api: &A,
    selector: &DealSelector,
    include_summary: bool,
) -> Result<DealSalesProcess, EnrichmentError>
where
    A: OpineApi + ?Sized,
{
    let id = selector.resolve()?;
    let deal = api.get_deal(&GetDealParams { id, include_summary: Some(include_summary) }).await?;

    let sales_process = match deal.sales_process_key() {
        Some(process_id) => {
            let page = api.list_sales_processes(&PageParams::first(LOOKUP_PAGE_LIMIT)).await?;
            resolve_in_window("sales_process", page, process_id)
        }
        None => None,
    };

    let sales_process_stage = match deal.sales_process_stage_key() {
        Some(stage_id) => {
            let page = api
                .list_sales_process_stages(&ListSalesProcessStagesParams::first(LOOKUP_PAGE_LIMIT))
                .await?;
            resolve_in_window("sales_process_stage", page, stage_id)
        }
        None => None,
    };

    Ok(DealSalesProcess { deal, sales_process, sales_process_stage })
}

fn resolve_in_window<T: Keyed>(kind: &'static str, page: Page<T>, key: i64) -> Option<T> {
    let fetched = page.items.len();
    let truncated = page.has_more();
    let found = find_by_key(page.items, key);
    if found.is_none() {
        debug!(kind, key, fetched, truncated, "referenced record not found in lookup window");
    }
    found
}
