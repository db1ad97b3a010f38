pub mod config;
pub mod domain;
pub mod errors;
pub mod salesforce;

pub use domain::deal::{Deal, DealSelector};
pub use domain::evaluation::Evaluation;
pub use domain::note::Note;
pub use domain::page::Page;
pub use domain::sales_process::{find_by_key, Keyed, SalesProcess, SalesProcessStage};
pub use domain::ticket::{DealAssociation, DealPriority, Ticket, TicketState, TicketType};
pub use domain::{ExtraFields, RecordRef};
pub use errors::IdError;
pub use salesforce::{convert_15_to_18, ensure_id18, external_deal_id};
