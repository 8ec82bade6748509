//! Backend seams
//!
//! The invoicing backend, the ticket service and the PAC are external
//! collaborators. Each is reached through a trait so the workflow can run
//! against [`FacturaService`] in production and fakes in tests.

mod service;

pub use service::FacturaService;

use async_trait::async_trait;
use shared::{
    EnvioCorreoRequest, Factura, FacturaRequest, GenerarFacturaResponse, StampStatusResponse,
    Ticket, TicketDetalle, TicketFilter,
};
use std::path::{Path, PathBuf};

use crate::ClientResult;

/// Endpoint paths, relative to the configured base URLs
pub mod endpoints {
    pub const GENERAR_FACTURA: &str = "api/factura/generar/frontend";
    pub const CONSULTAR_POR_EMPRESA: &str = "api/factura/consultar-por-empresa";
    pub const ENVIAR_CORREO: &str = "api/correo/enviar-factura";
    pub const BUSCAR_TICKETS: &str = "api/tickets/buscar";

    pub fn factura_pdf(uuid: &str) -> String {
        format!("api/factura/{uuid}/pdf")
    }

    pub fn factura_xml(uuid: &str) -> String {
        format!("api/factura/{uuid}/xml")
    }

    pub fn ticket_detalle(id: &str) -> String {
        format!("api/tickets/{id}/detalle")
    }

    /// Relative to the PAC base URL
    pub fn stamp_status(uuid: &str) -> String {
        format!("pac/stamp/status/{uuid}")
    }
}

/// Downloaded invoice document (PDF or XML)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Document {
    /// Write the document into `dir` under its file name
    pub fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Invoice generation, listing, documents and email
#[async_trait]
pub trait InvoiceBackend: Send + Sync {
    async fn generar(&self, request: &FacturaRequest) -> ClientResult<GenerarFacturaResponse>;

    /// Full invoice history of the tenant, normalized, in backend order
    async fn consultar_por_empresa(&self, empresa_id: Option<&str>) -> ClientResult<Vec<Factura>>;

    async fn descargar_pdf(&self, uuid: &str) -> ClientResult<Document>;

    async fn descargar_xml(&self, uuid: &str) -> ClientResult<Document>;

    async fn enviar_correo(&self, request: &EnvioCorreoRequest) -> ClientResult<()>;
}

/// POS ticket search
#[async_trait]
pub trait TicketBackend: Send + Sync {
    async fn buscar(&self, filter: &TicketFilter) -> ClientResult<Vec<Ticket>>;

    async fn detalle(&self, ticket_id: &str) -> ClientResult<TicketDetalle>;
}

/// PAC stamping status
#[async_trait]
pub trait StampStatusSource: Send + Sync {
    async fn stamp_status(&self, uuid: &str) -> ClientResult<StampStatusResponse>;
}
