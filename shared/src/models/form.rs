//! Invoice form state
//!
//! Mutable record edited field by field before an invoice is generated.
//! Holds the invoice UUID once generation succeeds.

use serde::{Deserialize, Serialize};

use super::ticket::Ticket;
use crate::error::{FormError, FormResult};
use crate::util::fecha_corta;

/// Receptor, ticket reference and payment fields of the invoice form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormData {
    // ---- Receptor ----
    pub rfc: String,
    /// Legal name of the receptor
    pub razon_social: String,
    /// Contact name, sent alongside the legal name
    pub nombre: String,
    pub correo_electronico: String,
    /// Postal code of the fiscal address
    pub domicilio_fiscal: String,
    pub pais: String,
    pub regimen_fiscal: String,
    pub uso_cfdi: String,

    // ---- Ticket reference ----
    pub tienda: String,
    pub fecha: String,
    pub terminal: String,
    pub boleta: String,

    // ---- Payment ----
    /// SAT payment form code
    pub medio_pago: String,
    /// SAT payment method (PUE / PPD)
    pub metodo_pago: String,
    pub ieps_desglosado: bool,

    /// Assigned after a successful generation
    pub uuid: Option<String>,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            rfc: String::new(),
            razon_social: String::new(),
            nombre: String::new(),
            correo_electronico: String::new(),
            domicilio_fiscal: String::new(),
            pais: "MEX".to_string(),
            regimen_fiscal: String::new(),
            uso_cfdi: "G03".to_string(),
            tienda: String::new(),
            fecha: String::new(),
            terminal: String::new(),
            boleta: String::new(),
            medio_pago: "01".to_string(),
            metodo_pago: "PUE".to_string(),
            ieps_desglosado: false,
            uuid: None,
        }
    }
}

impl FormData {
    /// Set one field from user input, addressed by its wire name
    pub fn set_field(&mut self, field: &str, value: &str) -> FormResult<()> {
        let slot = match field {
            "rfc" => {
                self.rfc = value.trim().to_uppercase();
                return Ok(());
            }
            "iepsDesglosado" => {
                self.ieps_desglosado = parse_flag(value).ok_or_else(|| FormError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                })?;
                return Ok(());
            }
            "uuid" => return self.assign_uuid(value),
            "razonSocial" => &mut self.razon_social,
            "nombre" => &mut self.nombre,
            "correoElectronico" => &mut self.correo_electronico,
            "domicilioFiscal" => &mut self.domicilio_fiscal,
            "pais" => &mut self.pais,
            "regimenFiscal" => &mut self.regimen_fiscal,
            "usoCfdi" => &mut self.uso_cfdi,
            "tienda" => &mut self.tienda,
            "fecha" => &mut self.fecha,
            "terminal" => &mut self.terminal,
            "boleta" => &mut self.boleta,
            "medioPago" => &mut self.medio_pago,
            "metodoPago" => &mut self.metodo_pago,
            other => return Err(FormError::UnknownField(other.to_string())),
        };
        *slot = value.trim().to_string();
        Ok(())
    }

    /// Restore the defaults (cancel)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Store the UUID of the generated invoice
    pub fn assign_uuid(&mut self, uuid: &str) -> FormResult<()> {
        let uuid = uuid.trim();
        if uuid.is_empty() {
            return Err(FormError::EmptyUuid);
        }
        self.uuid = Some(uuid.to_string());
        Ok(())
    }

    /// UUID of the generated invoice, if any and non-blank
    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Required fields still empty, by wire name
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("rfc", &self.rfc),
            ("razonSocial", &self.razon_social),
            ("tienda", &self.tienda),
            ("fecha", &self.fecha),
            ("terminal", &self.terminal),
            ("boleta", &self.boleta),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Prefill the ticket reference fields from a looked-up ticket
    ///
    /// Absent ticket values leave the corresponding field untouched.
    pub fn apply_ticket(&mut self, ticket: &Ticket) {
        if let Some(tienda) = &ticket.tienda {
            self.tienda = tienda.clone();
        }
        if let Some(fecha) = &ticket.fecha {
            self.fecha = fecha_corta(fecha);
        }
        if let Some(terminal) = &ticket.terminal {
            self.terminal = terminal.clone();
        }
        if let Some(folio) = &ticket.folio {
            self.boleta = folio.clone();
        }
        if let Some(forma_pago) = &ticket.forma_pago {
            self.medio_pago = forma_pago.clone();
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "si" | "sí" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
