//! PAC stamping (timbrado) status codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stamping state reported by the PAC status endpoint
///
/// `Emitida` and `Cancelada` are terminal: once observed, polling stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimbradoStatus {
    /// `0` - stamped and issued
    Emitida,
    /// `2` - cancelled at SAT
    Cancelada,
    /// `4` - stamping in progress
    EnProceso,
    /// `66` - queued at the PAC
    Pendiente,
    /// Any other code the PAC returns
    Desconocido(String),
}

impl TimbradoStatus {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::Emitida,
            "2" => Self::Cancelada,
            "4" => Self::EnProceso,
            "66" => Self::Pendiente,
            other => Self::Desconocido(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Emitida => "0",
            Self::Cancelada => "2",
            Self::EnProceso => "4",
            Self::Pendiente => "66",
            Self::Desconocido(code) => code,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Emitida | Self::Cancelada)
    }

    fn default_description(&self) -> &'static str {
        match self {
            Self::Emitida => "EMITIDA",
            Self::Cancelada => "CANCELADA EN SAT",
            Self::EnProceso => "EN PROCESO",
            Self::Pendiente => "PENDIENTE",
            Self::Desconocido(_) => "DESCONOCIDO",
        }
    }

    /// Text shown to the user, e.g. `"0 - EMITIDA"`
    ///
    /// Terminal states always use their fixed wording; other states prefer
    /// the description sent by the PAC.
    pub fn display_with(&self, descripcion: Option<&str>) -> String {
        let text = match descripcion.map(str::trim) {
            Some(d) if !d.is_empty() && !self.is_terminal() => d,
            _ => self.default_description(),
        };
        format!("{} - {}", self.code(), text)
    }
}

impl fmt::Display for TimbradoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_with(None))
    }
}
