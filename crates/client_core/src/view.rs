//! View models and the declarative render description built from them.
//!
//! Everything here is pure: no I/O, no controller state. Front ends walk the
//! returned `RenderNode` trees with whatever output they have.

use chrono::NaiveDateTime;
use serde_json::Value;
use shared::{
    domain::{DespachoEstado, DocumentId, ShipmentNumber},
    protocol::{DespachoDataResponse, DespachoStatus, DespachoSummary, DocumentRecord},
};

use crate::{
    pagination::{PageControl, Pagination},
    staging::{format_file_size, StagedFile},
};

/// Fields extracted from one document type, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSection {
    pub tipo: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedData {
    pub sections: Vec<ExtractedSection>,
}

impl ExtractedData {
    pub fn from_response(response: DespachoDataResponse) -> Self {
        let sections = response
            .datos_extraidos
            .unwrap_or_default()
            .into_iter()
            .map(|(tipo, payload)| ExtractedSection {
                tipo,
                fields: display_fields(payload),
            })
            .collect();
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, tipo: &str) -> Option<&ExtractedSection> {
        self.sections.iter().find(|section| section.tipo == tipo)
    }
}

fn display_fields(payload: Value) -> Vec<(String, String)> {
    // Some document payloads are persisted as JSON text.
    let payload = match payload {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::Null),
        other => other,
    };
    let Value::Object(mut payload) = payload else {
        return Vec::new();
    };
    let Some(Value::Object(all_fields)) = payload.remove("all_fields") else {
        return Vec::new();
    };
    all_fields
        .into_iter()
        .filter_map(|(field, value)| display_value(&value).map(|text| (field, text)))
        .collect()
}

/// `None` for values that carry nothing to show.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("sí".to_string()),
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Render-ready aggregate of a despacho's status, documents and extracted data.
#[derive(Debug, Clone, PartialEq)]
pub struct DespachoDetail {
    pub status: DespachoStatus,
    pub documents: Vec<DocumentRecord>,
    pub extracted: ExtractedData,
}

impl DespachoDetail {
    pub fn numero(&self) -> &ShipmentNumber {
        &self.status.numero_despacho
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Neutral,
}

/// What a clickable node triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Select(ShipmentNumber),
    ViewDocument(DocumentId),
    ProcessDocument(DocumentId),
    ProcessAll,
    SyncSgd,
    Upload,
    ExportJson,
    ExportExcel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Heading(String),
    Text(String),
    Muted(String),
    Empty(String),
    Badge {
        text: String,
        tone: Tone,
    },
    Progress {
        percent: f64,
        label: String,
    },
    Fields(Vec<(String, String)>),
    Button {
        label: String,
        action: Action,
        enabled: bool,
    },
    PageLink {
        label: String,
        target: u64,
        enabled: bool,
        current: bool,
    },
    Row {
        cells: Vec<RenderNode>,
        action: Option<Action>,
    },
    Section {
        title: String,
        expanded: bool,
        children: Vec<RenderNode>,
    },
}

/// `factura_comercial` -> `FACTURA COMERCIAL`.
pub fn display_type_tag(tag: &str) -> String {
    tag.replace('_', " ").to_uppercase()
}

pub fn percent_label(percent: f64) -> String {
    format!("{:.0}%", percent.clamp(0.0, 100.0))
}

pub fn ratio_label(present: usize, required: usize) -> String {
    format!("{present}/{required}")
}

fn date_label(timestamp: Option<NaiveDateTime>) -> String {
    timestamp
        .map(|ts| ts.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn estado_badge(estado: &DespachoEstado) -> RenderNode {
    let tone = match estado {
        DespachoEstado::Completo => Tone::Success,
        DespachoEstado::EnProceso => Tone::Info,
        DespachoEstado::Pendiente => Tone::Warning,
        DespachoEstado::Other(_) => Tone::Neutral,
    };
    RenderNode::Badge {
        text: estado.as_str().to_uppercase(),
        tone,
    }
}

pub fn render_list(rows: &[DespachoSummary]) -> Vec<RenderNode> {
    if rows.is_empty() {
        return vec![RenderNode::Empty("No hay despachos".to_string())];
    }

    rows.iter()
        .map(|row| RenderNode::Row {
            cells: vec![
                RenderNode::Text(row.numero_despacho.to_string()),
                estado_badge(&row.estado),
                RenderNode::Progress {
                    percent: row.porcentaje_completitud,
                    label: percent_label(row.porcentaje_completitud),
                },
                RenderNode::Text(ratio_label(
                    row.documentos_presentes as usize,
                    row.documentos_requeridos as usize,
                )),
                RenderNode::Muted(date_label(row.fecha_creacion)),
                RenderNode::Muted(date_label(row.fecha_actualizacion)),
            ],
            action: Some(Action::Select(row.numero_despacho.clone())),
        })
        .collect()
}

pub fn render_pagination(pagination: &Pagination) -> Vec<RenderNode> {
    pagination
        .controls()
        .into_iter()
        .map(|control| match control {
            PageControl::Previous { target, enabled } => RenderNode::PageLink {
                label: "Anterior".to_string(),
                target,
                enabled,
                current: false,
            },
            PageControl::Page { number, current } => RenderNode::PageLink {
                label: number.to_string(),
                target: number,
                enabled: true,
                current,
            },
            PageControl::Next { target, enabled } => RenderNode::PageLink {
                label: "Siguiente".to_string(),
                target,
                enabled,
                current: false,
            },
        })
        .collect()
}

pub fn render_detail(detail: &DespachoDetail) -> Vec<RenderNode> {
    let mut nodes = render_summary(&detail.status);
    nodes.push(RenderNode::Section {
        title: "Documentos del Despacho".to_string(),
        expanded: true,
        children: render_documents(&detail.documents),
    });
    nodes.push(RenderNode::Section {
        title: "Datos extraídos".to_string(),
        expanded: true,
        children: render_extracted(&detail.extracted),
    });
    nodes
}

fn render_summary(status: &DespachoStatus) -> Vec<RenderNode> {
    let mut nodes = vec![
        RenderNode::Heading(format!("Despacho: {}", status.numero_despacho)),
        estado_badge(&status.estado),
        RenderNode::Progress {
            percent: status.porcentaje_completitud,
            label: percent_label(status.porcentaje_completitud),
        },
        RenderNode::Text(format!(
            "Documentos: {}",
            ratio_label(
                status.documentos_presentes.len(),
                status.documentos_requeridos.len()
            )
        )),
    ];
    if !status.documentos_faltantes.is_empty() {
        let missing: Vec<String> = status
            .documentos_faltantes
            .iter()
            .map(|tag| display_type_tag(tag))
            .collect();
        nodes.push(RenderNode::Muted(format!("Faltantes: {}", missing.join(", "))));
    }
    nodes.extend([
        RenderNode::Button {
            label: "Sincronizar SGD".to_string(),
            action: Action::SyncSgd,
            enabled: true,
        },
        RenderNode::Button {
            label: "Procesar".to_string(),
            action: Action::ProcessAll,
            enabled: true,
        },
        RenderNode::Button {
            label: "Exportar JSON".to_string(),
            action: Action::ExportJson,
            enabled: true,
        },
        RenderNode::Button {
            label: "Exportar Excel".to_string(),
            action: Action::ExportExcel,
            enabled: true,
        },
    ]);
    nodes
}

fn render_documents(documents: &[DocumentRecord]) -> Vec<RenderNode> {
    let mut nodes = vec![RenderNode::Button {
        label: "Subir Documentos".to_string(),
        action: Action::Upload,
        enabled: true,
    }];
    if documents.is_empty() {
        nodes.push(RenderNode::Empty("No hay documentos cargados".to_string()));
        return nodes;
    }

    nodes.extend(documents.iter().map(|doc| {
        let (badge, tone, process_label) = if doc.procesado {
            ("Procesado", Tone::Success, "Reprocesar")
        } else {
            ("Pendiente", Tone::Warning, "Procesar")
        };
        RenderNode::Section {
            title: display_type_tag(&doc.tipo_documento),
            expanded: true,
            children: vec![
                RenderNode::Badge {
                    text: badge.to_string(),
                    tone,
                },
                RenderNode::Muted(doc.nombre_archivo.clone()),
                RenderNode::Button {
                    label: "Ver PDF".to_string(),
                    action: Action::ViewDocument(doc.id),
                    enabled: true,
                },
                RenderNode::Button {
                    label: process_label.to_string(),
                    action: Action::ProcessDocument(doc.id),
                    enabled: true,
                },
            ],
        }
    }));
    nodes
}

fn render_extracted(extracted: &ExtractedData) -> Vec<RenderNode> {
    if extracted.is_empty() {
        return vec![RenderNode::Empty("No hay datos procesados".to_string())];
    }

    extracted
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| RenderNode::Section {
            title: display_type_tag(&section.tipo),
            expanded: index == 0,
            children: vec![RenderNode::Fields(section.fields.clone())],
        })
        .collect()
}

pub fn render_staged_file(staged: Option<&StagedFile>) -> Vec<RenderNode> {
    match staged {
        Some(file) => vec![
            RenderNode::Text(file.name().to_string()),
            RenderNode::Muted(format_file_size(file.size())),
            RenderNode::Button {
                label: "Subir Documento".to_string(),
                action: Action::Upload,
                enabled: true,
            },
        ],
        None => vec![RenderNode::Button {
            label: "Subir Documento".to_string(),
            action: Action::Upload,
            enabled: false,
        }],
    }
}
