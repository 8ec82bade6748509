//! Invoice submission

use shared::{FacturaRequest, FormData};
use std::sync::Arc;

use crate::api::InvoiceBackend;
use crate::{ClientError, ClientResult};

const DEFAULT_FAILURE: &str = "No se pudo generar la factura";

/// Maps the form to a generation request and posts it
#[derive(Clone)]
pub struct InvoiceSubmitter {
    backend: Arc<dyn InvoiceBackend>,
    empresa_id: Option<String>,
}

impl InvoiceSubmitter {
    pub fn new(backend: Arc<dyn InvoiceBackend>, empresa_id: Option<String>) -> Self {
        Self {
            backend,
            empresa_id,
        }
    }

    /// Build the request, refusing forms with empty required fields
    pub fn prepare(&self, form: &FormData) -> ClientResult<FacturaRequest> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(ClientError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        Ok(FacturaRequest::from_form(form).with_empresa_id(self.empresa_id.clone()))
    }

    /// Generate the invoice and return its UUID
    ///
    /// `exitoso: false` becomes [`ClientError::Business`]; it is not retried.
    pub async fn submit(&self, form: &FormData) -> ClientResult<String> {
        let request = self.prepare(form)?;
        tracing::info!(tienda = %request.tienda, terminal = %request.terminal, boleta = %request.boleta, "Submitting invoice");

        let resp = self.backend.generar(&request).await?;
        if !resp.exitoso {
            let errores = resp.errores_text();
            let mensaje = resp
                .mensaje
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
            tracing::warn!(mensaje = %mensaje, errores = ?errores, "Invoice rejected by backend");
            return Err(ClientError::Business { mensaje, errores });
        }

        let uuid = resp
            .uuid
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("successful generation without UUID".into()))?;
        tracing::info!(uuid = %uuid, "Invoice generated");
        Ok(uuid)
    }
}
