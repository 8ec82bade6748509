//! Post-generation actions: PDF, XML, email
//!
//! Each action is a single backend call keyed by the invoice UUID. Nothing
//! is tracked between calls; repeating one simply calls the backend again.

use shared::EnvioCorreoRequest;
use std::sync::Arc;

use crate::api::{Document, InvoiceBackend};
use crate::{ClientError, ClientResult};

/// Reject a missing or blank UUID before any backend call
pub fn require_uuid(uuid: Option<&str>) -> ClientResult<&str> {
    uuid.map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(ClientError::MissingUuid)
}

/// Minimal address sanity check; real validation is the mail service's
fn require_email(to: Option<&str>) -> ClientResult<&str> {
    let to = to.map(str::trim).unwrap_or_default();
    match to.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(to),
        _ => Err(ClientError::Validation(format!(
            "invalid email address: {to:?}"
        ))),
    }
}

#[derive(Clone)]
pub struct InvoiceActions {
    backend: Arc<dyn InvoiceBackend>,
}

impl InvoiceActions {
    pub fn new(backend: Arc<dyn InvoiceBackend>) -> Self {
        Self { backend }
    }

    pub async fn download_pdf(&self, uuid: Option<&str>) -> ClientResult<Document> {
        let uuid = require_uuid(uuid)?;
        let doc = self.backend.descargar_pdf(uuid).await?;
        tracing::info!(uuid = %uuid, bytes = doc.bytes.len(), "Downloaded invoice PDF");
        Ok(doc)
    }

    pub async fn download_xml(&self, uuid: Option<&str>) -> ClientResult<Document> {
        let uuid = require_uuid(uuid)?;
        let doc = self.backend.descargar_xml(uuid).await?;
        tracing::info!(uuid = %uuid, bytes = doc.bytes.len(), "Downloaded invoice XML");
        Ok(doc)
    }

    /// Email the invoice (PDF and XML attached by the mail service)
    pub async fn send_email(&self, uuid: Option<&str>, to: Option<&str>) -> ClientResult<()> {
        let uuid = require_uuid(uuid)?;
        let to = require_email(to)?;
        let request = EnvioCorreoRequest {
            uuid_factura: uuid.to_string(),
            correo_receptor: to.to_string(),
            asunto: Some(format!("Factura {uuid}")),
            mensaje: None,
        };
        self.backend.enviar_correo(&request).await?;
        tracing::info!(uuid = %uuid, to = %to, "Invoice email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_uuid() {
        assert!(matches!(require_uuid(None), Err(ClientError::MissingUuid)));
        assert!(matches!(require_uuid(Some("  ")), Err(ClientError::MissingUuid)));
        assert_eq!(require_uuid(Some(" ABC ")).unwrap(), "ABC");
    }

    #[test]
    fn test_require_email() {
        assert_eq!(require_email(Some(" a@b.mx ")).unwrap(), "a@b.mx");
        assert!(require_email(None).is_err());
        assert!(require_email(Some("@b.mx")).is_err());
        assert!(require_email(Some("a@localhost")).is_err());
    }
}
