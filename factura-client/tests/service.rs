// factura-client/tests/service.rs
// FacturaService 对 mock 后端的集成测试

mod common;

use factura_client::{
    ClientError, FacturaService, InvoiceBackend, StampStatusSource, TicketBackend, TicketFilter,
    TimbradoStatus,
};
use shared::{EnvioCorreoRequest, FacturaRequest, FormData};

use common::{spawn_backend, test_config};

fn complete_form() -> FormData {
    let mut form = FormData::default();
    for (field, value) in [
        ("rfc", "xaxx010101000"),
        ("razonSocial", "Publico en General"),
        ("tienda", "S1"),
        ("fecha", "2024-01-01"),
        ("terminal", "3"),
        ("boleta", "100"),
    ] {
        form.set_field(field, value).unwrap();
    }
    form
}

#[tokio::test]
async fn test_generar_sends_bearer_and_persist_flag() {
    let (url, state) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url).with_token("tok-123")).unwrap();

    let resp = service
        .generar(&FacturaRequest::from_form(&complete_form()))
        .await
        .unwrap();
    assert!(resp.exitoso);
    assert_eq!(resp.uuid.as_deref(), Some("UUID-OK"));

    let bodies = state.generar_bodies.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["guardarEnMongo"], true);
    assert_eq!(bodies[0]["rfc"], "XAXX010101000");
    assert_eq!(bodies[0]["usoCfdi"], "G03");
    assert_eq!(
        state.auth_headers.lock().unwrap().as_slice(),
        ["Bearer tok-123".to_string()]
    );
}

#[tokio::test]
async fn test_generar_business_rejection_is_a_response() {
    let (url, _) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url)).unwrap();

    let mut form = complete_form();
    form.set_field("boleta", "999").unwrap();
    let resp = service.generar(&FacturaRequest::from_form(&form)).await.unwrap();

    assert!(!resp.exitoso);
    assert_eq!(resp.mensaje.as_deref(), Some("El ticket ya fue facturado"));
    assert_eq!(
        resp.errores_text().as_deref(),
        Some("boleta 999 facturada el 2024-01-02")
    );
}

#[tokio::test]
async fn test_non_2xx_keeps_status_and_body() {
    let (url, _) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url)).unwrap();

    let mut form = complete_form();
    form.set_field("boleta", "500").unwrap();
    let err = service
        .generar(&FacturaRequest::from_form(&form))
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("PAC caido"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_stamp_status_codes() {
    let (url, _) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url)).unwrap();

    let first = service.stamp_status("U1").await.unwrap();
    assert_eq!(first.timbrado(), Some(TimbradoStatus::EnProceso));
    assert_eq!(first.display().as_deref(), Some("4 - Timbrando"));

    let cancelada = service.stamp_status("CANCELADA").await.unwrap();
    assert_eq!(cancelada.timbrado(), Some(TimbradoStatus::Cancelada));
    assert_eq!(cancelada.display().as_deref(), Some("2 - CANCELADA EN SAT"));

    let pendiente = service.stamp_status("PENDIENTE").await.unwrap();
    assert_eq!(pendiente.timbrado(), Some(TimbradoStatus::Pendiente));
}

#[tokio::test]
async fn test_ticket_search_and_detail() {
    let (url, _) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url)).unwrap();

    let one = service
        .buscar(&TicketFilter::new().with_tienda("S1").with_folio("100"))
        .await
        .unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].id.as_deref(), Some("1"));
    assert_eq!(one[0].terminal.as_deref(), Some("3"));
    assert_eq!(one[0].forma_pago.as_deref(), Some("04"));

    let two = service
        .buscar(&TicketFilter::new().with_folio("101"))
        .await
        .unwrap();
    assert_eq!(two.len(), 2);

    let none = service
        .buscar(&TicketFilter::new().with_folio("404"))
        .await
        .unwrap();
    assert!(none.is_empty());

    let detalle = service.detalle("1").await.unwrap();
    assert_eq!(detalle.conceptos.len(), 2);
    assert_eq!(detalle.conceptos[0].codigo.as_deref(), Some("A-1"));
    assert_eq!(
        detalle.ticket.and_then(|t| t.folio).as_deref(),
        Some("100")
    );

    assert!(matches!(
        service.detalle("77").await,
        Err(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_invoice_list_normalizes_records() {
    let (url, _) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url)).unwrap();

    let facturas = service.consultar_por_empresa(Some("7")).await.unwrap();
    // The record without UUID is dropped; duplicates survive until the pager
    assert_eq!(facturas.len(), 5);
    assert_eq!(facturas[2].uuid, "UUID-OK");
    assert_eq!(facturas[2].receptor_rfc.as_deref(), Some("XAXX010101000"));
    assert!(facturas[4].best_date().is_none());
}

#[tokio::test]
async fn test_documents_download_and_save() {
    let (url, _) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url)).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let pdf = service.descargar_pdf("ABC").await.unwrap();
    assert_eq!(pdf.file_name, "factura-ABC.pdf");
    assert_eq!(pdf.content_type, "application/pdf");
    let path = pdf.save_in(dir.path()).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.4 fake");

    let xml = service.descargar_xml("ABC").await.unwrap();
    assert_eq!(xml.file_name, "ABC.xml");
    assert!(String::from_utf8(xml.bytes).unwrap().contains("UUID=\"ABC\""));

    assert!(matches!(
        service.descargar_xml("NOXML").await,
        Err(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_email_failure_flag_is_an_error() {
    let (url, state) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url)).unwrap();

    let ok = EnvioCorreoRequest {
        uuid_factura: "ABC".into(),
        correo_receptor: "cliente@correo.mx".into(),
        asunto: Some("Factura ABC".into()),
        mensaje: None,
    };
    service.enviar_correo(&ok).await.unwrap();

    let bounced = EnvioCorreoRequest {
        correo_receptor: "rebota@correo.mx".into(),
        ..ok
    };
    let err = service.enviar_correo(&bounced).await.unwrap_err();
    assert!(matches!(err, ClientError::Business { ref mensaje, .. } if mensaje == "Buzón inexistente"));

    let emails = state.emails.lock().unwrap().clone();
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0]["uuidFactura"], "ABC");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let service = FacturaService::new(&test_config("http://127.0.0.1:1")).unwrap();
    let err = service.stamp_status("U1").await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_unauthorized_keeps_body() {
    let (url, _) = spawn_backend().await;
    let service = FacturaService::new(&test_config(&url)).unwrap();

    let err = service.stamp_status("SIN-SESION").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(ref body) if body == "token expirado"));
    assert!(err.to_string().contains("token expirado"));
}
