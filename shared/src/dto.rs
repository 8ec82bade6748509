//! Wire DTOs for the invoicing backend and the PAC
//!
//! Request bodies serialize in camelCase, the way the backend expects them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{FormData, Ticket, TimbradoStatus};
use crate::util::{de_opt_string, value_to_string};

// =============================================================================
// Invoice generation
// =============================================================================

/// Body of `POST /api/factura/generar/frontend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacturaRequest {
    pub rfc: String,
    pub razon_social: String,
    pub nombre: String,
    pub correo_electronico: String,
    pub domicilio_fiscal: String,
    pub pais: String,
    pub regimen_fiscal: String,
    pub uso_cfdi: String,
    pub tienda: String,
    pub fecha: String,
    pub terminal: String,
    pub boleta: String,
    pub medio_pago: String,
    pub metodo_pago: String,
    pub ieps_desglosado: bool,
    /// Always true for invoices generated from this client
    pub guardar_en_mongo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empresa_id: Option<String>,
}

impl FacturaRequest {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            rfc: form.rfc.trim().to_uppercase(),
            razon_social: form.razon_social.trim().to_string(),
            nombre: form.nombre.trim().to_string(),
            correo_electronico: form.correo_electronico.trim().to_string(),
            domicilio_fiscal: form.domicilio_fiscal.trim().to_string(),
            pais: form.pais.clone(),
            regimen_fiscal: form.regimen_fiscal.clone(),
            uso_cfdi: form.uso_cfdi.clone(),
            tienda: form.tienda.clone(),
            fecha: form.fecha.clone(),
            terminal: form.terminal.clone(),
            boleta: form.boleta.clone(),
            medio_pago: form.medio_pago.clone(),
            metodo_pago: form.metodo_pago.clone(),
            ieps_desglosado: form.ieps_desglosado,
            guardar_en_mongo: true,
            empresa_id: None,
        }
    }

    pub fn with_empresa_id(mut self, empresa_id: Option<String>) -> Self {
        self.empresa_id = empresa_id;
        self
    }
}

/// Response of the generation endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerarFacturaResponse {
    #[serde(default)]
    pub exitoso: bool,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
    /// String, list of strings, or object depending on the failing validator
    #[serde(default)]
    pub errores: Option<Value>,
}

impl GenerarFacturaResponse {
    /// Flatten `errores` into a single line for display
    pub fn errores_text(&self) -> Option<String> {
        let text = match self.errores.as_ref()? {
            Value::Array(items) => items
                .iter()
                .filter_map(|v| value_to_string(v).or_else(|| v.as_object().map(|_| v.to_string())))
                .collect::<Vec<_>>()
                .join("; "),
            Value::Object(obj) => obj
                .iter()
                .map(|(k, v)| match value_to_string(v) {
                    Some(s) => format!("{k}: {s}"),
                    None => format!("{k}: {v}"),
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => value_to_string(other)?,
        };
        if text.is_empty() { None } else { Some(text) }
    }
}

// =============================================================================
// Stamping status
// =============================================================================

/// Body of `GET /pac/stamp/status/{uuid}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StampStatusResponse {
    #[serde(default, alias = "codigo", deserialize_with = "de_opt_string")]
    pub status: Option<String>,
    #[serde(default, alias = "statusDescripcion", deserialize_with = "de_opt_string")]
    pub descripcion: Option<String>,
}

impl StampStatusResponse {
    pub fn timbrado(&self) -> Option<TimbradoStatus> {
        self.status.as_deref().map(TimbradoStatus::from_code)
    }

    /// Display text for the status, `None` when no code was reported
    pub fn display(&self) -> Option<String> {
        self.timbrado()
            .map(|s| s.display_with(self.descripcion.as_deref()))
    }
}

// =============================================================================
// Email
// =============================================================================

/// Body of `POST /api/correo/enviar-factura`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvioCorreoRequest {
    pub uuid_factura: String,
    pub correo_receptor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asunto: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
}

// =============================================================================
// Ticket search
// =============================================================================

/// Ticket search result: bare list or `{success, data}` envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TicketSearchResponse {
    List(Vec<Ticket>),
    Envelope {
        #[serde(default)]
        success: Option<bool>,
        #[serde(default, alias = "tickets")]
        data: Option<Vec<Ticket>>,
        #[serde(default, alias = "mensaje")]
        message: Option<String>,
    },
}

impl TicketSearchResponse {
    /// Tickets in backend order, or the error message of a failed envelope
    pub fn into_tickets(self) -> Result<Vec<Ticket>, String> {
        match self {
            Self::List(tickets) => Ok(tickets),
            Self::Envelope {
                success: Some(false),
                message,
                ..
            } => Err(message.unwrap_or_else(|| "Ticket search failed".to_string())),
            Self::Envelope { data, .. } => Ok(data.unwrap_or_default()),
        }
    }
}
