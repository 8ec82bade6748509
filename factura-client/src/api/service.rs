//! HTTP implementation of the backend seams

use async_trait::async_trait;
use serde_json::Value;
use shared::{
    EnvioCorreoRequest, Factura, FacturaRequest, GenerarFacturaResponse, StampStatusResponse,
    Ticket, TicketDetalle, TicketFilter, TicketSearchResponse, models::facturas_from_value,
};

use super::{Document, InvoiceBackend, StampStatusSource, TicketBackend, endpoints};
use crate::http::{HttpClient, NetworkHttpClient, RawDownload};
use crate::{ClientConfig, ClientError, ClientResult};

/// Invoicing backend and PAC over HTTP
#[derive(Debug, Clone)]
pub struct FacturaService {
    api: NetworkHttpClient,
    pac: NetworkHttpClient,
}

impl FacturaService {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let api = NetworkHttpClient::new(&config.base_url, config.timeout)?
            .with_token(config.token.clone());
        let pac = NetworkHttpClient::new(config.pac_url(), config.timeout)?
            .with_token(config.token.clone());
        Ok(Self { api, pac })
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }

    async fn document(&self, path: &str, uuid: &str, ext: &str, mime: &str) -> ClientResult<Document> {
        let RawDownload {
            content_type,
            file_name,
            bytes,
        } = self.api.download(path).await?;
        if bytes.is_empty() {
            return Err(ClientError::InvalidResponse(format!("empty {ext} for {uuid}")));
        }
        Ok(Document {
            file_name: file_name.unwrap_or_else(|| format!("{uuid}.{ext}")),
            content_type: content_type.unwrap_or_else(|| mime.to_string()),
            bytes,
        })
    }
}

#[async_trait]
impl InvoiceBackend for FacturaService {
    async fn generar(&self, request: &FacturaRequest) -> ClientResult<GenerarFacturaResponse> {
        self.api.post(endpoints::GENERAR_FACTURA, request).await
    }

    async fn consultar_por_empresa(&self, empresa_id: Option<&str>) -> ClientResult<Vec<Factura>> {
        let raw: Value = match empresa_id {
            Some(id) => {
                self.api
                    .get_query(endpoints::CONSULTAR_POR_EMPRESA, &[("empresaId", id)])
                    .await?
            }
            None => self.api.get(endpoints::CONSULTAR_POR_EMPRESA).await?,
        };
        if !(raw.is_array() || raw.is_object()) {
            return Err(ClientError::InvalidResponse(
                "invoice list is neither an array nor an object".into(),
            ));
        }
        Ok(facturas_from_value(&raw))
    }

    async fn descargar_pdf(&self, uuid: &str) -> ClientResult<Document> {
        self.document(&endpoints::factura_pdf(uuid), uuid, "pdf", "application/pdf")
            .await
    }

    async fn descargar_xml(&self, uuid: &str) -> ClientResult<Document> {
        self.document(&endpoints::factura_xml(uuid), uuid, "xml", "application/xml")
            .await
    }

    async fn enviar_correo(&self, request: &EnvioCorreoRequest) -> ClientResult<()> {
        let resp: Value = self.api.post(endpoints::ENVIAR_CORREO, request).await?;
        // 200 with {exitoso:false} or {success:false} is still a failure
        let failed = ["exitoso", "success"]
            .iter()
            .any(|k| resp.get(*k).and_then(Value::as_bool) == Some(false));
        if failed {
            let mensaje = resp
                .get("mensaje")
                .or_else(|| resp.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("No se pudo enviar el correo")
                .to_string();
            return Err(ClientError::Business {
                mensaje,
                errores: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TicketBackend for FacturaService {
    async fn buscar(&self, filter: &TicketFilter) -> ClientResult<Vec<Ticket>> {
        let resp: TicketSearchResponse = self
            .api
            .get_query(endpoints::BUSCAR_TICKETS, &filter.query_pairs())
            .await?;
        resp.into_tickets().map_err(|mensaje| ClientError::Business {
            mensaje,
            errores: None,
        })
    }

    async fn detalle(&self, ticket_id: &str) -> ClientResult<TicketDetalle> {
        self.api.get(&endpoints::ticket_detalle(ticket_id)).await
    }
}

#[async_trait]
impl StampStatusSource for FacturaService {
    async fn stamp_status(&self, uuid: &str) -> ClientResult<StampStatusResponse> {
        self.pac.get(&endpoints::stamp_status(uuid)).await
    }
}
