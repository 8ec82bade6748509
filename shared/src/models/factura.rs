//! Persisted invoice projection
//!
//! The invoice listing endpoint mixes field names from several backend
//! generations. [`Factura::from_raw`] folds them into one shape.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::util::{parse_fecha_value, value_to_string};

/// Invoice as listed for the tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factura {
    pub uuid: String,
    pub tienda: Option<String>,
    pub fecha_emision: Option<NaiveDateTime>,
    pub fecha_timbrado: Option<NaiveDateTime>,
    pub fecha_creacion: Option<NaiveDateTime>,
    pub terminal: Option<String>,
    pub folio: Option<String>,
    pub receptor_nombre: Option<String>,
    pub receptor_rfc: Option<String>,
    pub total: Option<Decimal>,
    pub estatus: Option<String>,
    pub medio_pago: Option<String>,
    pub metodo_pago: Option<String>,
}

// Field name variants, first match wins
const UUID_KEYS: &[&str] = &["uuid", "UUID", "uuidFactura", "folioFiscal"];
const TIENDA_KEYS: &[&str] = &["tienda", "codigoTienda", "storeCode"];
const FECHA_EMISION_KEYS: &[&str] = &["fechaEmision", "fechaFactura", "fecha"];
const FECHA_TIMBRADO_KEYS: &[&str] = &["fechaTimbrado"];
const FECHA_CREACION_KEYS: &[&str] = &["fechaCreacion", "createdAt", "created_at"];
const TERMINAL_KEYS: &[&str] = &["terminal", "terminalId"];
const FOLIO_KEYS: &[&str] = &["folio", "boleta", "numeroBoleta"];
const NOMBRE_KEYS: &[&str] = &["receptorNombre", "nombreReceptor", "razonSocial", "nombre"];
const RFC_KEYS: &[&str] = &["receptorRfc", "rfcReceptor", "rfc"];
const TOTAL_KEYS: &[&str] = &["total", "importeTotal", "montoTotal"];
const ESTATUS_KEYS: &[&str] = &["estatus", "status", "estado", "estatusFactura"];
const MEDIO_PAGO_KEYS: &[&str] = &["medioPago", "formaPago"];
const METODO_PAGO_KEYS: &[&str] = &["metodoPago"];

impl Factura {
    /// Normalize one raw backend record
    ///
    /// Returns `None` when the record carries no UUID.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let uuid = pick_string(obj, UUID_KEYS)?;

        Some(Self {
            uuid,
            tienda: pick_string(obj, TIENDA_KEYS),
            fecha_emision: pick_fecha(obj, FECHA_EMISION_KEYS),
            fecha_timbrado: pick_fecha(obj, FECHA_TIMBRADO_KEYS),
            fecha_creacion: pick_fecha(obj, FECHA_CREACION_KEYS),
            terminal: pick_string(obj, TERMINAL_KEYS),
            folio: pick_string(obj, FOLIO_KEYS),
            receptor_nombre: pick_string(obj, NOMBRE_KEYS),
            receptor_rfc: pick_string(obj, RFC_KEYS),
            total: pick_string(obj, TOTAL_KEYS).and_then(|t| Decimal::from_str(&t).ok()),
            estatus: pick_string(obj, ESTATUS_KEYS),
            medio_pago: pick_string(obj, MEDIO_PAGO_KEYS),
            metodo_pago: pick_string(obj, METODO_PAGO_KEYS),
        })
    }

    /// Best available date: stamping, then issue, then creation
    pub fn best_date(&self) -> Option<NaiveDateTime> {
        self.fecha_timbrado
            .or(self.fecha_emision)
            .or(self.fecha_creacion)
    }
}

fn pick<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> impl Iterator<Item = &'a Value> {
    keys.iter().filter_map(move |k| obj.get(*k))
}

fn pick_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    pick(obj, keys).find_map(value_to_string)
}

fn pick_fecha(obj: &Map<String, Value>, keys: &[&str]) -> Option<NaiveDateTime> {
    pick(obj, keys).find_map(parse_fecha_value)
}

/// Extract invoice records from any of the listing response shapes
///
/// Accepts a bare array or an object wrapping it under `facturas`, `data`
/// or `content`. Records without a UUID are dropped.
pub fn facturas_from_value(value: &Value) -> Vec<Factura> {
    let records = match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => ["facturas", "data", "content"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array)),
        _ => None,
    };

    let Some(records) = records else {
        return Vec::new();
    };

    let facturas: Vec<Factura> = records.iter().filter_map(Factura::from_raw).collect();
    let skipped = records.len() - facturas.len();
    if skipped > 0 {
        tracing::debug!(skipped, "Ignored invoice records without UUID");
    }
    facturas
}
