//! Opine REST API client.
//!
//! - [`OpineClient`]: authenticated HTTP gateway, one request per operation
//! - [`OpineApi`]: the operation set, implemented by the gateway and by test doubles
//! - [`enrichment`]: resolves a deal's sales process and stage references

pub mod enrichment;
pub mod error;
pub mod gateway;
pub mod params;

pub use enrichment::{describe_deal_sales_process, DealSalesProcess, EnrichmentError};
pub use error::ClientError;
pub use gateway::{OpineApi, OpineClient};
pub use params::{
    CreateDealNoteParams, CreateTicketParams, GetDealParams, ListDealsParams,
    ListSalesProcessStagesParams, PageParams, UpdateTicketParams,
};
