use std::{
    collections::HashSet,
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex as StdMutex, PoisonError,
    },
    time::Duration,
};

use shared::{
    domain::{DocumentId, DocumentTypeHint, ShipmentNumber},
    protocol::{
        CreateDespachoRequest, DespachoSummary, ListDespachosQuery, ProcessAllResponse,
        ProcessDocumentResponse, SgdSyncResponse, UploadResponse,
    },
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod backend;
pub mod error;
pub mod pagination;
pub mod staging;
pub mod view;

pub use backend::{BinaryBody, DespachoBackend, DocumentUpload, HttpBackend};
pub use error::{ClientError, Result};

use pagination::{compute_pagination, PageState, Pagination};
use staging::{FileHandle, StagedFile};
use view::{DespachoDetail, ExtractedData};

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);
/// Used for notifications that enumerate several items.
pub const LONG_NOTIFICATION_DURATION: Duration = Duration::from_secs(5);
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient user-visible message. `replaces` points at the "in progress"
/// notification an outcome supersedes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub duration: Duration,
    pub replaces: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    Notification(Notification),
    SelectionChanged(Option<ShipmentNumber>),
    DetailUpdated(ShipmentNumber),
    ListUpdated { page: u64, total: u64 },
    StagedFileChanged(Option<String>),
}

/// Mutating actions tracked to reject re-entrant triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Upload,
    ProcessDocument(DocumentId),
    ProcessAll,
    SyncSgd,
}

impl MutationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::ProcessDocument(_) => "document processing",
            Self::ProcessAll => "processing",
            Self::SyncSgd => "SGD synchronization",
        }
    }
}

/// Result of a successful mutation. `detail` is the refreshed view, absent
/// when the follow-up refresh failed.
#[derive(Debug, Clone)]
pub struct MutationOutcome<T> {
    pub response: T,
    pub message: String,
    pub detail: Option<DespachoDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub rows: Vec<DespachoSummary>,
    pub pagination: Pagination,
}

/// A response body materialized for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn download_name(prefix: &str, numero: &ShipmentNumber, suffix: &str) -> String {
    let numero: String = numero
        .as_str()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{prefix}{numero}{suffix}")
}

struct ControllerState {
    selection: Option<ShipmentNumber>,
    detail: Option<DespachoDetail>,
    staged_file: Option<StagedFile>,
    page: PageState,
    rows: Vec<DespachoSummary>,
    /// Last generation handed to a select.
    select_generation: u64,
    /// Generation of the last applied select (or of `return_to_list`).
    committed_generation: u64,
}

type MutationKey = (ShipmentNumber, MutationKind);

/// Claim on one `(despacho, action)` slot, released on drop so an abandoned
/// action future frees it too.
struct InflightSlot<'a> {
    slots: &'a StdMutex<HashSet<MutationKey>>,
    key: MutationKey,
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Owns the selected despacho, its aggregated detail view, the staged upload
/// file and the list paging state.
pub struct DespachoController {
    backend: Arc<dyn DespachoBackend>,
    inner: Mutex<ControllerState>,
    inflight_mutations: StdMutex<HashSet<MutationKey>>,
    notification_ids: AtomicU64,
    events: broadcast::Sender<ControllerEvent>,
}

impl DespachoController {
    pub fn new(backend: Arc<dyn DespachoBackend>, page_size: u32) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            inner: Mutex::new(ControllerState {
                selection: None,
                detail: None,
                staged_file: None,
                page: PageState::new(page_size),
                rows: Vec::new(),
                select_generation: 0,
                committed_generation: 0,
            }),
            inflight_mutations: StdMutex::new(HashSet::new()),
            notification_ids: AtomicU64::new(1),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn selected(&self) -> Option<ShipmentNumber> {
        self.inner.lock().await.selection.clone()
    }

    pub async fn detail(&self) -> Option<DespachoDetail> {
        self.inner.lock().await.detail.clone()
    }

    pub async fn staged_file(&self) -> Option<StagedFile> {
        self.inner.lock().await.staged_file.clone()
    }

    pub async fn page_state(&self) -> PageState {
        self.inner.lock().await.page.clone()
    }

    pub async fn rows(&self) -> Vec<DespachoSummary> {
        self.inner.lock().await.rows.clone()
    }

    fn notify(
        &self,
        level: NotificationLevel,
        message: impl Into<String>,
        duration: Duration,
        replaces: Option<u64>,
    ) -> u64 {
        let id = self.notification_ids.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .events
            .send(ControllerEvent::Notification(Notification {
                id,
                level,
                message: message.into(),
                duration,
                replaces,
            }));
        id
    }

    /// Turns an action failure into its single error notification.
    fn report(&self, fallback: &str, replaces: Option<u64>, err: ClientError) -> ClientError {
        match &err {
            ClientError::Superseded { .. } => {}
            ClientError::ValidationFailed(_) | ClientError::ActionInFlight { .. } => {
                self.notify(
                    NotificationLevel::Warning,
                    err.user_message(fallback),
                    DEFAULT_NOTIFICATION_DURATION,
                    replaces,
                );
            }
            _ => {
                self.notify(
                    NotificationLevel::Error,
                    err.user_message(fallback),
                    DEFAULT_NOTIFICATION_DURATION,
                    replaces,
                );
            }
        }
        err
    }

    async fn require_selection(&self) -> Result<ShipmentNumber> {
        self.inner
            .lock()
            .await
            .selection
            .clone()
            .ok_or_else(|| ClientError::PreconditionFailed("no despacho selected".into()))
    }

    // ---- listing ----

    /// Loads one page of the list, re-clamping the page against the new total.
    pub async fn load_page(&self, requested_page: i64) -> Result<ListPage> {
        self.load_page_inner(requested_page)
            .await
            .map_err(|err| self.report("Error cargando despachos", None, err))
    }

    /// Sets (or clears, with a blank query) the list filter and loads page 1.
    pub async fn search(&self, query: &str) -> Result<ListPage> {
        self.search_page(query, 1).await
    }

    /// Like `search`, but loads `requested_page` of the filtered list.
    pub async fn search_page(&self, query: &str, requested_page: i64) -> Result<ListPage> {
        {
            let mut guard = self.inner.lock().await;
            let query = query.trim();
            guard.page.search = (!query.is_empty()).then(|| query.to_string());
        }
        self.load_page(requested_page).await
    }

    async fn load_page_inner(&self, requested_page: i64) -> Result<ListPage> {
        let (page_size, search) = {
            let guard = self.inner.lock().await;
            (guard.page.page_size, guard.page.search.clone())
        };

        let first_page = requested_page.max(1) as u64;
        let mut response = self
            .backend
            .list_despachos(&ListDespachosQuery {
                limit: page_size,
                offset: (first_page - 1).saturating_mul(u64::from(page_size)),
                search: search.clone(),
            })
            .await?;

        let pagination = compute_pagination(response.total, page_size, requested_page);
        if pagination.page != first_page && response.total > 0 {
            info!(
                requested_page,
                page = pagination.page,
                total = response.total,
                "despachos: requested page out of range; reloading clamped page"
            );
            response = self
                .backend
                .list_despachos(&ListDespachosQuery {
                    limit: page_size,
                    offset: pagination.offset(),
                    search,
                })
                .await?;
        }

        let pagination = {
            let mut guard = self.inner.lock().await;
            let pagination = guard.page.apply_reload(pagination.page as i64, response.total);
            guard.rows = response.despachos.clone();
            pagination
        };
        let _ = self.events.send(ControllerEvent::ListUpdated {
            page: pagination.page,
            total: pagination.total,
        });

        Ok(ListPage {
            rows: response.despachos,
            pagination,
        })
    }

    // ---- selection ----

    /// Fetches status, documents and extracted data concurrently and replaces
    /// the selection and detail view only if all three succeed.
    pub async fn select(&self, numero: &str) -> Result<DespachoDetail> {
        self.load_selection(numero)
            .await
            .map_err(|err| self.report("Error cargando el despacho", None, err))
    }

    /// Re-runs `select` for the current selection.
    pub async fn refresh(&self) -> Result<DespachoDetail> {
        let numero = self
            .require_selection()
            .await
            .map_err(|err| self.report("No se puede actualizar", None, err))?;
        info!(numero = %numero, "despachos: refreshing detail");
        self.select(numero.as_str()).await
    }

    /// Looks up one despacho by number. An unknown number is not an error:
    /// it yields `None` so the caller can offer an SGD import.
    pub async fn search_specific(&self, numero: &str) -> Result<Option<DespachoDetail>> {
        match self.load_selection(numero).await {
            Ok(detail) => Ok(Some(detail)),
            Err(err) if err.is_not_found() => {
                info!(numero = numero.trim(), "despachos: lookup found nothing");
                self.notify(
                    NotificationLevel::Warning,
                    format!("Despacho {} no encontrado", numero.trim()),
                    DEFAULT_NOTIFICATION_DURATION,
                    None,
                );
                Ok(None)
            }
            Err(err) => Err(self.report("Error buscando el despacho", None, err)),
        }
    }

    async fn load_selection(&self, raw_numero: &str) -> Result<DespachoDetail> {
        let numero = ShipmentNumber::parse(raw_numero).ok_or_else(|| {
            ClientError::ValidationFailed("shipment number must not be empty".into())
        })?;

        let generation = {
            let mut guard = self.inner.lock().await;
            guard.select_generation += 1;
            guard.select_generation
        };

        let (status, documents, data) = tokio::join!(
            self.backend.fetch_status(&numero),
            self.backend.fetch_documents(&numero),
            self.backend.fetch_data(&numero),
        );

        // Only a newer select that actually applied (or return_to_list) makes
        // this result stale; a newer one that failed does not.
        let mut guard = self.inner.lock().await;
        if guard.committed_generation > generation {
            info!(
                numero = %numero,
                generation,
                committed_generation = guard.committed_generation,
                "despachos: discarding superseded detail load"
            );
            return Err(ClientError::Superseded { numero });
        }

        let detail = match (status, documents, data) {
            (Ok(status), Ok(documents), Ok(data)) => DespachoDetail {
                status,
                documents,
                extracted: ExtractedData::from_response(data),
            },
            (Err(err), _, _) | (_, Err(err), _) | (_, _, Err(err)) => {
                warn!(numero = %numero, "despachos: detail load failed: {err}");
                return Err(err);
            }
        };

        let selection_changed = guard.selection.as_ref() != Some(&numero);
        let staged_cleared = selection_changed && guard.staged_file.take().is_some();
        guard.selection = Some(numero.clone());
        guard.detail = Some(detail.clone());
        guard.committed_generation = generation;
        drop(guard);

        info!(
            numero = %numero,
            documents = detail.documents.len(),
            extracted_sections = detail.extracted.sections.len(),
            "despachos: detail loaded"
        );
        if selection_changed {
            let _ = self
                .events
                .send(ControllerEvent::SelectionChanged(Some(numero.clone())));
        }
        if staged_cleared {
            let _ = self.events.send(ControllerEvent::StagedFileChanged(None));
        }
        let _ = self.events.send(ControllerEvent::DetailUpdated(numero));

        Ok(detail)
    }

    /// Clears the selection; pending detail loads become stale.
    pub async fn return_to_list(&self) {
        let had_selection = {
            let mut guard = self.inner.lock().await;
            guard.select_generation += 1;
            guard.committed_generation = guard.select_generation;
            guard.detail = None;
            guard.staged_file = None;
            guard.selection.take().is_some()
        };
        if had_selection {
            let _ = self.events.send(ControllerEvent::SelectionChanged(None));
        }
    }

    /// Creates a despacho, reloads the current list page and selects it.
    pub async fn create(&self, numero: &str) -> Result<DespachoDetail> {
        let numero = ShipmentNumber::parse(numero)
            .ok_or_else(|| {
                ClientError::ValidationFailed("shipment number must not be empty".into())
            })
            .map_err(|err| self.report("Error creando despacho", None, err))?;

        self.backend
            .create_despacho(&CreateDespachoRequest {
                numero_despacho: numero.clone(),
                extra_metadata: serde_json::Map::new(),
            })
            .await
            .map_err(|err| self.report("Error creando despacho", None, err))?;
        info!(numero = %numero, "despachos: created");
        self.notify(
            NotificationLevel::Success,
            "Despacho creado exitosamente",
            DEFAULT_NOTIFICATION_DURATION,
            None,
        );

        let current_page = self.inner.lock().await.page.page as i64;
        let _ = self.load_page(current_page).await;
        self.select(numero.as_str()).await
    }

    // ---- staging ----

    /// Validates and stages a file; a rejected file leaves the previous one staged.
    pub async fn stage_file(&self, file: FileHandle) -> Result<()> {
        let staged = StagedFile::validate(file)
            .map_err(|err| self.report("Archivo rechazado", None, err))?;
        let name = staged.name().to_string();
        self.inner.lock().await.staged_file = Some(staged);
        let _ = self.events.send(ControllerEvent::StagedFileChanged(Some(name)));
        Ok(())
    }

    pub async fn clear_staged_file(&self) {
        if self.inner.lock().await.staged_file.take().is_some() {
            let _ = self.events.send(ControllerEvent::StagedFileChanged(None));
        }
    }

    // ---- mutations ----

    fn begin_mutation(
        &self,
        numero: &ShipmentNumber,
        kind: MutationKind,
    ) -> Result<InflightSlot<'_>> {
        let key = (numero.clone(), kind);
        let inserted = self
            .inflight_mutations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        if !inserted {
            info!(
                numero = %numero,
                action = kind.label(),
                "despachos: ignoring re-entrant trigger"
            );
            return Err(ClientError::ActionInFlight {
                numero: numero.clone(),
                action: kind.label(),
            });
        }
        Ok(InflightSlot {
            slots: &self.inflight_mutations,
            key,
        })
    }

    /// Runs one mutating request with its "in progress" notification. Returns
    /// the response and the progress notification id; failures are reported.
    async fn run_mutation<T, Fut>(
        &self,
        numero: &ShipmentNumber,
        kind: MutationKind,
        progress: &str,
        fallback: &str,
        request: Fut,
    ) -> Result<(T, u64)>
    where
        Fut: Future<Output = Result<T>>,
    {
        let slot = self
            .begin_mutation(numero, kind)
            .map_err(|err| self.report(fallback, None, err))?;

        let progress_id = self.notify(
            NotificationLevel::Info,
            progress,
            DEFAULT_NOTIFICATION_DURATION,
            None,
        );
        info!(numero = %numero, action = kind.label(), "despachos: mutation started");
        let result = request.await;
        drop(slot);

        match result {
            Ok(response) => Ok((response, progress_id)),
            Err(err) => {
                warn!(
                    numero = %numero,
                    action = kind.label(),
                    "despachos: mutation failed: {err}"
                );
                Err(self.report(fallback, Some(progress_id), err))
            }
        }
    }

    /// Success notification, then the unconditional pull of fresh server state.
    async fn complete_mutation<T>(
        &self,
        response: T,
        message: String,
        duration: Duration,
        progress_id: u64,
    ) -> MutationOutcome<T> {
        self.notify(
            NotificationLevel::Success,
            message.clone(),
            duration,
            Some(progress_id),
        );
        let detail = self.refresh().await.ok();
        MutationOutcome {
            response,
            message,
            detail,
        }
    }

    /// Uploads the staged file. Clears it and refreshes on success; keeps it
    /// for a retry on failure.
    pub async fn upload(&self, hint: DocumentTypeHint) -> Result<MutationOutcome<UploadResponse>> {
        const FALLBACK: &str = "Error subiendo el documento";
        let (numero, staged) = {
            let guard = self.inner.lock().await;
            match (guard.selection.clone(), guard.staged_file.clone()) {
                (Some(numero), Some(staged)) => (numero, staged),
                (None, _) => {
                    return Err(self.report(
                        FALLBACK,
                        None,
                        ClientError::PreconditionFailed("no despacho selected".into()),
                    ))
                }
                (_, None) => {
                    return Err(self.report(
                        FALLBACK,
                        None,
                        ClientError::PreconditionFailed("no file staged for upload".into()),
                    ))
                }
            }
        };

        let progress = if hint.is_automatic() {
            "Procesando con AI..."
        } else {
            "Subiendo..."
        };
        let upload = DocumentUpload {
            file_name: staged.name().to_string(),
            mime_type: staged.mime_type().to_string(),
            bytes: staged.bytes().to_vec(),
            type_hint: hint.clone(),
        };
        let (response, progress_id) = self
            .run_mutation(
                &numero,
                MutationKind::Upload,
                progress,
                FALLBACK,
                self.backend.upload_document(&numero, upload),
            )
            .await?;

        let cleared = {
            let mut guard = self.inner.lock().await;
            if guard.staged_file.as_ref() == Some(&staged) {
                guard.staged_file = None;
                true
            } else {
                false
            }
        };
        if cleared {
            let _ = self.events.send(ControllerEvent::StagedFileChanged(None));
        }

        let (message, duration) = if hint.is_automatic() {
            (
                automatic_upload_message(&response),
                LONG_NOTIFICATION_DURATION,
            )
        } else {
            (
                "Documento subido exitosamente".to_string(),
                DEFAULT_NOTIFICATION_DURATION,
            )
        };
        Ok(self
            .complete_mutation(response, message, duration, progress_id)
            .await)
    }

    pub async fn process_document(
        &self,
        document_id: DocumentId,
    ) -> Result<MutationOutcome<ProcessDocumentResponse>> {
        const FALLBACK: &str = "Error procesando documento";
        let numero = self
            .require_selection()
            .await
            .map_err(|err| self.report(FALLBACK, None, err))?;
        let (response, progress_id) = self
            .run_mutation(
                &numero,
                MutationKind::ProcessDocument(document_id),
                "Procesando documento...",
                FALLBACK,
                self.backend.process_document(&numero, document_id),
            )
            .await?;
        Ok(self
            .complete_mutation(
                response,
                "Documento procesado exitosamente".to_string(),
                DEFAULT_NOTIFICATION_DURATION,
                progress_id,
            )
            .await)
    }

    /// Processes every pending document; `force` reprocesses processed ones too.
    pub async fn process_all(&self, force: bool) -> Result<MutationOutcome<ProcessAllResponse>> {
        const FALLBACK: &str = "Error en el procesamiento";
        let numero = self
            .require_selection()
            .await
            .map_err(|err| self.report(FALLBACK, None, err))?;
        let (response, progress_id) = self
            .run_mutation(
                &numero,
                MutationKind::ProcessAll,
                "Procesando documentos...",
                FALLBACK,
                self.backend.process_all(&numero, force),
            )
            .await?;
        let message = format!(
            "Procesamiento completado. {} documentos procesados.",
            response.total_procesados
        );
        Ok(self
            .complete_mutation(response, message, DEFAULT_NOTIFICATION_DURATION, progress_id)
            .await)
    }

    pub async fn synchronize_external(&self) -> Result<MutationOutcome<SgdSyncResponse>> {
        const FALLBACK: &str = "Error en la sincronización";
        let numero = self
            .require_selection()
            .await
            .map_err(|err| self.report(FALLBACK, None, err))?;
        let (response, progress_id) = self
            .run_mutation(
                &numero,
                MutationKind::SyncSgd,
                "Sincronizando con SGD...",
                FALLBACK,
                self.backend.sync_sgd(&numero),
            )
            .await?;
        let message = format!(
            "Sincronización completada. {} documentos importados.",
            response.total
        );
        Ok(self
            .complete_mutation(response, message, DEFAULT_NOTIFICATION_DURATION, progress_id)
            .await)
    }

    /// Imports an unknown despacho from SGD, reloads the list and selects it.
    pub async fn import_from_sgd(&self, numero: &str) -> Result<MutationOutcome<SgdSyncResponse>> {
        const FALLBACK: &str = "Error importando desde SGD";
        let numero = ShipmentNumber::parse(numero)
            .ok_or_else(|| {
                ClientError::ValidationFailed("shipment number must not be empty".into())
            })
            .map_err(|err| self.report(FALLBACK, None, err))?;
        let (response, progress_id) = self
            .run_mutation(
                &numero,
                MutationKind::SyncSgd,
                "Importando desde SGD...",
                FALLBACK,
                self.backend.sync_sgd(&numero),
            )
            .await?;
        let message = format!(
            "Importación completada. {} documentos importados.",
            response.total
        );
        self.notify(
            NotificationLevel::Success,
            message.clone(),
            DEFAULT_NOTIFICATION_DURATION,
            Some(progress_id),
        );

        let current_page = self.inner.lock().await.page.page as i64;
        let _ = self.load_page(current_page).await;
        let detail = self.select(numero.as_str()).await.ok();
        Ok(MutationOutcome {
            response,
            message,
            detail,
        })
    }

    // ---- downloads ----

    pub async fn export_json(&self) -> Result<Download> {
        const FALLBACK: &str = "Error exportando JSON";
        let result = async {
            let numero = self.require_selection().await?;
            let value = self.backend.export_json(&numero).await?;
            Ok::<_, ClientError>(Download {
                file_name: download_name("despacho_", &numero, ".json"),
                content_type: "application/json".to_string(),
                bytes: serde_json::to_vec_pretty(&value)?,
            })
        }
        .await;
        let download = result.map_err(|err| self.report(FALLBACK, None, err))?;
        self.notify(
            NotificationLevel::Success,
            "JSON exportado exitosamente",
            DEFAULT_NOTIFICATION_DURATION,
            None,
        );
        Ok(download)
    }

    pub async fn export_excel(&self) -> Result<Download> {
        const FALLBACK: &str = "Error exportando Excel";
        let numero = self
            .require_selection()
            .await
            .map_err(|err| self.report(FALLBACK, None, err))?;
        let progress_id = self.notify(
            NotificationLevel::Info,
            "Generando Excel...",
            DEFAULT_NOTIFICATION_DURATION,
            None,
        );
        let body = self
            .backend
            .export_excel(&numero)
            .await
            .map_err(|err| self.report(FALLBACK, Some(progress_id), err))?;
        self.notify(
            NotificationLevel::Success,
            "Excel exportado exitosamente",
            DEFAULT_NOTIFICATION_DURATION,
            Some(progress_id),
        );
        Ok(Download {
            file_name: download_name("DIN_", &numero, ".xlsx"),
            content_type: body.content_type.unwrap_or_else(|| {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string()
            }),
            bytes: body.bytes,
        })
    }

    pub async fn document_pdf(&self, document_id: DocumentId) -> Result<Download> {
        const FALLBACK: &str = "Error abriendo el documento";
        let result = async {
            let numero = self.require_selection().await?;
            let body = self.backend.document_pdf(&numero, document_id).await?;
            Ok::<_, ClientError>(Download {
                file_name: download_name("", &numero, &format!("_documento_{document_id}.pdf")),
                content_type: body
                    .content_type
                    .unwrap_or_else(|| staging::ACCEPTED_MIME_TYPE.to_string()),
                bytes: body.bytes,
            })
        }
        .await;
        result.map_err(|err| self.report(FALLBACK, None, err))
    }
}

/// Success text for an automatic split upload, one line per detected document.
pub fn automatic_upload_message(response: &UploadResponse) -> String {
    let total = response
        .total_documentos
        .unwrap_or(response.documentos.len() as u32);
    let mut message = format!(
        "Procesamiento automático completado.\nSe identificaron {total} documento(s):"
    );
    for document in &response.documentos {
        message.push_str(&format!(
            "\n• {} (páginas {})",
            document.tipo, document.paginas
        ));
    }
    message
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
