use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(DocumentId);
id_newtype!(ProcedureId);

/// Shipment number, the backend's primary key for a despacho.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentNumber(String);

impl ShipmentNumber {
    /// Trims surrounding whitespace; `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShipmentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state reported by the backend. Unknown values are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DespachoEstado {
    #[default]
    Pendiente,
    EnProceso,
    Completo,
    Other(String),
}

impl DespachoEstado {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pendiente => "pendiente",
            Self::EnProceso => "en_proceso",
            Self::Completo => "completo",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for DespachoEstado {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pendiente" => Self::Pendiente,
            "en_proceso" => Self::EnProceso,
            "completo" => Self::Completo,
            _ => Self::Other(value),
        }
    }
}

impl From<DespachoEstado> for String {
    fn from(value: DespachoEstado) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DespachoEstado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const AUTOMATIC_TYPE_HINT: &str = "automatico";

/// Value sent as `tipo_documento` on upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentTypeHint {
    /// Backend detects and splits the documents contained in the file.
    Automatic,
    Explicit(String),
}

impl DocumentTypeHint {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(AUTOMATIC_TYPE_HINT) {
            Self::Automatic
        } else {
            Self::Explicit(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Automatic => AUTOMATIC_TYPE_HINT,
            Self::Explicit(tipo) => tipo,
        }
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self, Self::Automatic)
    }
}
