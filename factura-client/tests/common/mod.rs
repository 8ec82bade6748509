// factura-client/tests/common/mod.rs
// 集成测试用的 mock 后端

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use factura_client::ClientConfig;

/// Everything the mock backend saw
#[derive(Default)]
pub struct MockState {
    pub generar_bodies: Mutex<Vec<Value>>,
    pub auth_headers: Mutex<Vec<String>>,
    pub status_calls: Mutex<HashMap<String, usize>>,
    pub emails: Mutex<Vec<Value>>,
    pub list_calls: Mutex<usize>,
}

impl MockState {
    pub fn status_calls(&self, uuid: &str) -> usize {
        self.status_calls
            .lock()
            .unwrap()
            .get(uuid)
            .copied()
            .unwrap_or(0)
    }
}

fn tickets() -> Vec<Value> {
    vec![
        json!({
            "idTicket": 1, "codigoTienda": "S1", "fecha": "2024-01-01T09:15:00",
            "terminalId": 3, "folio": 100, "subtotal": 100.0, "iva": 16.0, "total": 116.0,
            "formaPago": "04", "status": "PAGADO"
        }),
        json!({
            "idTicket": 2, "codigoTienda": "S1", "fecha": "2024-01-01", "terminalId": 3,
            "folio": 101, "total": 58.0, "formaPago": "01"
        }),
        json!({
            "idTicket": 3, "codigoTienda": "S2", "fecha": "2024-01-01", "terminalId": 1,
            "folio": 101, "total": 10.0, "formaPago": "01"
        }),
    ]
}

async fn buscar_tickets(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let matches: Vec<Value> = tickets()
        .into_iter()
        .filter(|t| {
            ["tienda", "terminal", "folio"].iter().all(|k| match q.get(*k) {
                None => true,
                Some(v) => {
                    let field = match *k {
                        "tienda" => &t["codigoTienda"],
                        "terminal" => &t["terminalId"],
                        _ => &t["folio"],
                    };
                    field.to_string().trim_matches('"') == v
                }
            })
        })
        .collect();
    Json(json!({ "success": true, "data": matches }))
}

async fn detalle_ticket(Path(id): Path<String>) -> impl IntoResponse {
    if id != "1" {
        return (StatusCode::NOT_FOUND, "ticket no encontrado").into_response();
    }
    Json(json!({
        "encabezado": tickets()[0],
        "detalles": [
            { "sku": "A-1", "producto": "Refresco", "cantidad": 2, "precio": 25, "importe": 50 },
            { "sku": "B-7", "producto": "Pan", "cantidad": 1, "precio": 50, "importe": 50 }
        ]
    }))
    .into_response()
}

async fn generar(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        state.auth_headers.lock().unwrap().push(auth.to_string());
    }
    state.generar_bodies.lock().unwrap().push(body.clone());

    match body["boleta"].as_str() {
        Some("500") => (StatusCode::INTERNAL_SERVER_ERROR, "{\"error\":\"PAC caido\"}").into_response(),
        Some("999") => Json(json!({
            "exitoso": false,
            "mensaje": "El ticket ya fue facturado",
            "errores": ["boleta 999 facturada el 2024-01-02"]
        }))
        .into_response(),
        _ => Json(json!({ "exitoso": true, "uuid": "UUID-OK", "mensaje": "Factura generada" }))
            .into_response(),
    }
}

async fn consultar(State(state): State<Arc<MockState>>) -> Json<Value> {
    *state.list_calls.lock().unwrap() += 1;
    Json(json!({
        "exitoso": true,
        "facturas": [
            { "uuid": "OLD", "fechaEmision": "2023-12-01T10:00:00", "total": 50 },
            { "uuid": "ABC", "codigoTienda": "primera", "fechaTimbrado": "2024-01-05T10:00:00" },
            { "UUID": "UUID-OK", "fechaFactura": "2024-01-10 08:00:00", "rfcReceptor": "XAXX010101000" },
            { "uuidFactura": "ABC", "codigoTienda": "segunda", "fechaTimbrado": "2024-02-01T10:00:00" },
            { "uuid": "SIN-FECHA" },
            { "tienda": "registro sin uuid" }
        ]
    }))
}

async fn stamp_status(State(state): State<Arc<MockState>>, Path(uuid): Path<String>) -> impl IntoResponse {
    let n = {
        let mut calls = state.status_calls.lock().unwrap();
        let n = calls.entry(uuid.clone()).or_insert(0);
        *n += 1;
        *n
    };
    match (uuid.as_str(), n) {
        ("FLAKY", 1) => (StatusCode::BAD_GATEWAY, "gateway").into_response(),
        ("SIN-SESION", _) => (StatusCode::UNAUTHORIZED, "token expirado").into_response(),
        ("CANCELADA", _) => Json(json!({ "codigo": "2", "statusDescripcion": "Cancelada" })).into_response(),
        ("PENDIENTE", _) => Json(json!({ "status": 66, "descripcion": "En cola" })).into_response(),
        (_, 1) => Json(json!({ "status": "4", "descripcion": "Timbrando" })).into_response(),
        (_, 2) => Json(json!({ "status": "66", "descripcion": "En cola PAC" })).into_response(),
        _ => Json(json!({ "status": "0", "descripcion": "Timbrado" })).into_response(),
    }
}

async fn pdf(Path(uuid): Path<String>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"factura-{uuid}.pdf\"")),
        ],
        b"%PDF-1.4 fake".to_vec(),
    )
}

async fn xml(Path(uuid): Path<String>) -> impl IntoResponse {
    if uuid == "NOXML" {
        return (StatusCode::NOT_FOUND, "xml no disponible").into_response();
    }
    (
        [(header::CONTENT_TYPE, "application/xml")],
        format!("<cfdi:Comprobante UUID=\"{uuid}\"/>"),
    )
        .into_response()
}

async fn enviar_correo(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Json<Value> {
    state.emails.lock().unwrap().push(body.clone());
    if body["correoReceptor"] == "rebota@correo.mx" {
        return Json(json!({ "exitoso": false, "mensaje": "Buzón inexistente" }));
    }
    Json(json!({ "exitoso": true }))
}

pub fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/tickets/buscar", get(buscar_tickets))
        .route("/api/tickets/{id}/detalle", get(detalle_ticket))
        .route("/api/factura/generar/frontend", post(generar))
        .route("/api/factura/consultar-por-empresa", get(consultar))
        .route("/api/factura/{uuid}/pdf", get(pdf))
        .route("/api/factura/{uuid}/xml", get(xml))
        .route("/api/correo/enviar-factura", post(enviar_correo))
        .route("/pac/stamp/status/{uuid}", get(stamp_status))
        .with_state(state)
}

/// Start the mock backend on an ephemeral port
pub async fn spawn_backend() -> (String, Arc<MockState>) {
    let state = Arc::new(MockState::default());
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

/// Config with fast polling for tests
pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url)
        .with_timeout(5)
        .with_polling(Duration::from_millis(20), Some(50))
        .with_find_retry(3, Duration::from_millis(10))
}
