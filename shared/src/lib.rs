//! Shared types for the invoicing client
//!
//! Data model and wire DTOs used by `factura-client` and the `factura` CLI:
//! the invoice form, POS tickets, persisted invoices and the PAC stamping
//! status codes.

pub mod dto;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use dto::{
    EnvioCorreoRequest, FacturaRequest, GenerarFacturaResponse, StampStatusResponse,
    TicketSearchResponse,
};
pub use error::{FormError, FormResult};
pub use models::{
    Factura, FormData, Ticket, TicketDetalle, TicketFilter, TicketLinea, TimbradoStatus,
};
