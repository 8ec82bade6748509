//! POS ticket projection
//!
//! Tickets are read-only here: they are looked up to prefill the invoice
//! form and never mutated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::util::de_opt_string;

/// Point-of-sale transaction as returned by the ticket service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default, alias = "idTicket", deserialize_with = "de_opt_string")]
    pub id: Option<String>,
    /// Store code
    #[serde(default, alias = "codigoTienda", deserialize_with = "de_opt_string")]
    pub tienda: Option<String>,
    #[serde(default, alias = "fechaTicket", deserialize_with = "de_opt_string")]
    pub fecha: Option<String>,
    #[serde(default, alias = "terminalId", deserialize_with = "de_opt_string")]
    pub terminal: Option<String>,
    /// Ticket number, called "boleta" on the invoice form
    #[serde(default, alias = "boleta", deserialize_with = "de_opt_string")]
    pub folio: Option<String>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default, alias = "impuestos")]
    pub iva: Option<Decimal>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub nombre_cliente: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub rfc_cliente: Option<String>,
    /// SAT payment form code ("01" cash, "04" card, ...)
    #[serde(default, alias = "metodoPago", deserialize_with = "de_opt_string")]
    pub forma_pago: Option<String>,
    #[serde(default, alias = "estatus", deserialize_with = "de_opt_string")]
    pub status: Option<String>,
    /// Invoice already linked to this ticket, if any
    #[serde(default, alias = "uuidFactura", deserialize_with = "de_opt_string")]
    pub id_factura: Option<String>,
}

impl Ticket {
    /// Whether the ticket has already been invoiced
    pub fn is_invoiced(&self) -> bool {
        self.id_factura.is_some()
    }
}

/// One line of a ticket, shown in the details panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLinea {
    #[serde(default, alias = "sku", deserialize_with = "de_opt_string")]
    pub codigo: Option<String>,
    #[serde(default, alias = "producto", deserialize_with = "de_opt_string")]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub cantidad: Option<Decimal>,
    #[serde(default, alias = "precio")]
    pub precio_unitario: Option<Decimal>,
    #[serde(default)]
    pub importe: Option<Decimal>,
}

/// Ticket header plus its lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetalle {
    #[serde(default, alias = "encabezado")]
    pub ticket: Option<Ticket>,
    #[serde(default, alias = "detalles", alias = "lineas")]
    pub conceptos: Vec<TicketLinea>,
}

/// Optional ticket search filters; empty values are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tienda: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folio: Option<String>,
}

impl TicketFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tienda(mut self, tienda: impl Into<String>) -> Self {
        self.tienda = non_empty(tienda.into());
        self
    }

    pub fn with_terminal(mut self, terminal: impl Into<String>) -> Self {
        self.terminal = non_empty(terminal.into());
        self
    }

    pub fn with_fecha(mut self, fecha: impl Into<String>) -> Self {
        self.fecha = non_empty(fecha.into());
        self
    }

    pub fn with_folio(mut self, folio: impl Into<String>) -> Self {
        self.folio = non_empty(folio.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tienda.is_none() && self.terminal.is_none() && self.fecha.is_none() && self.folio.is_none()
    }

    /// Query pairs for GET-style search endpoints
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.tienda {
            pairs.push(("tienda", v.as_str()));
        }
        if let Some(v) = &self.terminal {
            pairs.push(("terminal", v.as_str()));
        }
        if let Some(v) = &self.fecha {
            pairs.push(("fecha", v.as_str()));
        }
        if let Some(v) = &self.folio {
            pairs.push(("folio", v.as_str()));
        }
        pairs
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
