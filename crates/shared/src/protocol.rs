use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DespachoEstado, DocumentId, ProcedureId, ShipmentNumber};

/// One row of `GET /api/despachos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DespachoSummary {
    pub numero_despacho: ShipmentNumber,
    #[serde(default)]
    pub estado: DespachoEstado,
    #[serde(default)]
    pub porcentaje_completitud: f64,
    #[serde(default)]
    pub documentos_presentes: u32,
    #[serde(default)]
    pub documentos_requeridos: u32,
    #[serde(default)]
    pub fecha_creacion: Option<NaiveDateTime>,
    #[serde(default)]
    pub fecha_actualizacion: Option<NaiveDateTime>,
    #[serde(default)]
    pub puede_procesar: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DespachoListResponse {
    #[serde(default)]
    pub despachos: Vec<DespachoSummary>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListDespachosQuery {
    pub limit: u32,
    pub offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureSummary {
    pub id: ProcedureId,
    #[serde(default)]
    pub tipo: String,
    #[serde(default)]
    pub estado: String,
    #[serde(default)]
    pub usuario_asignado: Option<String>,
    #[serde(default)]
    pub fecha_inicio: Option<NaiveDateTime>,
    #[serde(default)]
    pub fecha_fin: Option<NaiveDateTime>,
}

/// `GET /api/despachos/{id}/estado`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DespachoStatus {
    pub numero_despacho: ShipmentNumber,
    #[serde(default)]
    pub estado: DespachoEstado,
    #[serde(default)]
    pub documentos_requeridos: Vec<String>,
    #[serde(default)]
    pub documentos_presentes: Vec<String>,
    #[serde(default)]
    pub documentos_faltantes: Vec<String>,
    #[serde(default)]
    pub porcentaje_completitud: f64,
    #[serde(default)]
    pub puede_procesar: bool,
    #[serde(default)]
    pub procedimientos: Vec<ProcedureSummary>,
}

/// One element of `GET /api/despachos/{id}/documentos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub tipo_documento: String,
    #[serde(default)]
    pub nombre_archivo: String,
    #[serde(default)]
    pub procesado: bool,
    #[serde(default)]
    pub fecha_carga: Option<NaiveDateTime>,
    #[serde(default)]
    pub fecha_procesamiento: Option<NaiveDateTime>,
    #[serde(default)]
    pub tiene_contenido: bool,
    #[serde(default)]
    pub tiene_datos: bool,
}

/// `GET /api/despachos/{id}/datos`. Per-type payloads are kept raw; some are
/// stored by the backend as JSON-encoded strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DespachoDataResponse {
    #[serde(default)]
    pub numero_despacho: Option<ShipmentNumber>,
    #[serde(default)]
    pub estado: Option<DespachoEstado>,
    #[serde(default)]
    pub datos_extraidos: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDespachoRequest {
    pub numero_despacho: ShipmentNumber,
    #[serde(default)]
    pub extra_metadata: serde_json::Map<String, Value>,
}

/// A document detected inside an automatically split upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedDocument {
    pub tipo: String,
    #[serde(default)]
    pub paginas: String,
    #[serde(default)]
    pub id: Option<Value>,
}

/// `POST /api/despachos/{id}/documento/subir`. The automatic mode fills
/// `total_documentos`/`documentos`; the explicit mode `documento_id`/`tipo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_documentos: Option<u32>,
    #[serde(default)]
    pub documentos: Vec<DetectedDocument>,
    #[serde(default)]
    pub documento_id: Option<DocumentId>,
    #[serde(default)]
    pub tipo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessDocumentResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub documento_id: Option<DocumentId>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub datos_extraidos: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessAllResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_procesados: u32,
    #[serde(default)]
    pub total_errores: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SgdSyncResponse {
    #[serde(default)]
    pub total: u32,
}
