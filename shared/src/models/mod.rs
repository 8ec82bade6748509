//! Data models
//!
//! Client-side caches of server state. Nothing here is persisted.

pub mod factura;
pub mod form;
pub mod ticket;
pub mod timbrado;

// Re-exports
pub use factura::{Factura, facturas_from_value};
pub use form::FormData;
pub use ticket::{Ticket, TicketDetalle, TicketFilter, TicketLinea};
pub use timbrado::TimbradoStatus;
