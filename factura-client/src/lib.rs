//! Factura Client - client for the CFDI invoicing backend
//!
//! Drives the invoice creation workflow against the external backend:
//! ticket lookup, invoice generation, PAC stamping status polling,
//! PDF/XML/email actions and the paged invoice list.

pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod lookup;
pub mod pager;
pub mod poller;
pub mod prompt;
pub mod submission;

pub use api::{Document, FacturaService, InvoiceBackend, StampStatusSource, TicketBackend};
pub use config::{ClientConfig, TenantInfo};
pub use error::{ClientError, ClientResult};
pub use form::{InvoiceForm, SubmitReport};
pub use lookup::{DebouncedLookup, LookupOutcome, TicketLookup};
pub use pager::InvoicePager;
pub use poller::{PollOutcome, PollState, StatusPoller};
pub use prompt::{LogPrompt, Prompt};

// Re-export shared types for convenience
pub use shared::{Factura, FormData, Ticket, TicketDetalle, TicketFilter, TimbradoStatus};
