use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{DocumentId, DocumentTypeHint, ShipmentNumber},
    error::error_message_from_body,
    protocol::{
        CreateDespachoRequest, DespachoDataResponse, DespachoListResponse, DespachoStatus,
        DocumentRecord, ListDespachosQuery, ProcessAllResponse, ProcessDocumentResponse,
        SgdSyncResponse, UploadResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

/// File body plus the `tipo_documento` hint for the upload endpoint.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub type_hint: DocumentTypeHint,
}

/// Raw body fetched from an export or document endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// The REST contract consumed by the controller.
#[async_trait]
pub trait DespachoBackend: Send + Sync {
    async fn list_despachos(&self, query: &ListDespachosQuery) -> Result<DespachoListResponse>;
    async fn fetch_status(&self, numero: &ShipmentNumber) -> Result<DespachoStatus>;
    async fn fetch_documents(&self, numero: &ShipmentNumber) -> Result<Vec<DocumentRecord>>;
    async fn fetch_data(&self, numero: &ShipmentNumber) -> Result<DespachoDataResponse>;
    async fn create_despacho(&self, request: &CreateDespachoRequest) -> Result<Value>;
    async fn upload_document(
        &self,
        numero: &ShipmentNumber,
        upload: DocumentUpload,
    ) -> Result<UploadResponse>;
    async fn process_document(
        &self,
        numero: &ShipmentNumber,
        document_id: DocumentId,
    ) -> Result<ProcessDocumentResponse>;
    async fn process_all(&self, numero: &ShipmentNumber, force: bool)
        -> Result<ProcessAllResponse>;
    async fn sync_sgd(&self, numero: &ShipmentNumber) -> Result<SgdSyncResponse>;
    async fn export_json(&self, numero: &ShipmentNumber) -> Result<Value>;
    async fn export_excel(&self, numero: &ShipmentNumber) -> Result<BinaryBody>;
    async fn document_pdf(
        &self,
        numero: &ShipmentNumber,
        document_id: DocumentId,
    ) -> Result<BinaryBody>;
}

/// `DespachoBackend` over HTTP, rooted at the web application's base URL.
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| ClientError::ValidationFailed(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::ValidationFailed(format!(
                "base url must be http:// or https://, got {base_url}"
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ClientError::Network(format!("failed to build http client: {err}")))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/despachos/{segments..}` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::PreconditionFailed("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["api", "despachos"])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "despachos: request");
        self.http.request(method, url)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        resource: impl FnOnce() -> String,
    ) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::not_found(resource()));
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(ClientError::Backend {
            status: status.as_u16(),
            message: error_message_from_body(&body),
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn binary(response: Response) -> Result<BinaryBody> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(BinaryBody {
            content_type,
            bytes,
        })
    }
}

fn despacho_resource(numero: &ShipmentNumber) -> impl FnOnce() -> String + '_ {
    move || format!("despacho {numero}")
}

fn document_resource(
    numero: &ShipmentNumber,
    document_id: DocumentId,
) -> impl FnOnce() -> String + '_ {
    move || format!("documento {document_id} of despacho {numero}")
}

#[async_trait]
impl DespachoBackend for HttpBackend {
    async fn list_despachos(&self, query: &ListDespachosQuery) -> Result<DespachoListResponse> {
        let url = self.endpoint(&[])?;
        let response = self
            .send(self.request(Method::GET, url).query(query), || {
                "despacho listing".to_string()
            })
            .await?;
        Self::json(response).await
    }

    async fn fetch_status(&self, numero: &ShipmentNumber) -> Result<DespachoStatus> {
        let url = self.endpoint(&[numero.as_str(), "estado"])?;
        let response = self
            .send(self.request(Method::GET, url), despacho_resource(numero))
            .await?;
        Self::json(response).await
    }

    async fn fetch_documents(&self, numero: &ShipmentNumber) -> Result<Vec<DocumentRecord>> {
        let url = self.endpoint(&[numero.as_str(), "documentos"])?;
        let response = self
            .send(self.request(Method::GET, url), despacho_resource(numero))
            .await?;
        Self::json(response).await
    }

    async fn fetch_data(&self, numero: &ShipmentNumber) -> Result<DespachoDataResponse> {
        let url = self.endpoint(&[numero.as_str(), "datos"])?;
        let response = self
            .send(self.request(Method::GET, url), despacho_resource(numero))
            .await?;
        Self::json(response).await
    }

    async fn create_despacho(&self, request: &CreateDespachoRequest) -> Result<Value> {
        let url = self.endpoint(&["crear"])?;
        let response = self
            .send(self.request(Method::POST, url).json(request), || {
                "despacho creation endpoint".to_string()
            })
            .await?;
        Self::json(response).await
    }

    async fn upload_document(
        &self,
        numero: &ShipmentNumber,
        upload: DocumentUpload,
    ) -> Result<UploadResponse> {
        let url = self.endpoint(&[numero.as_str(), "documento", "subir"])?;
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(|err| ClientError::ValidationFailed(format!("invalid mime type: {err}")))?;
        let form = Form::new()
            .part("file", part)
            .text("tipo_documento", upload.type_hint.as_str().to_string());
        let response = self
            .send(
                self.request(Method::POST, url).multipart(form),
                despacho_resource(numero),
            )
            .await?;
        Self::json(response).await
    }

    async fn process_document(
        &self,
        numero: &ShipmentNumber,
        document_id: DocumentId,
    ) -> Result<ProcessDocumentResponse> {
        let document = document_id.to_string();
        let url = self.endpoint(&[numero.as_str(), "documento", &document, "procesar"])?;
        let response = self
            .send(
                self.request(Method::POST, url),
                document_resource(numero, document_id),
            )
            .await?;
        Self::json(response).await
    }

    async fn process_all(
        &self,
        numero: &ShipmentNumber,
        force: bool,
    ) -> Result<ProcessAllResponse> {
        let url = self.endpoint(&[numero.as_str(), "procesar"])?;
        let response = self
            .send(
                self.request(Method::POST, url).query(&[("forzar", force)]),
                despacho_resource(numero),
            )
            .await?;
        Self::json(response).await
    }

    async fn sync_sgd(&self, numero: &ShipmentNumber) -> Result<SgdSyncResponse> {
        let url = self.endpoint(&[numero.as_str(), "sgd"])?;
        let response = self
            .send(self.request(Method::GET, url), despacho_resource(numero))
            .await?;
        Self::json(response).await
    }

    async fn export_json(&self, numero: &ShipmentNumber) -> Result<Value> {
        let url = self.endpoint(&[numero.as_str(), "exportar", "json"])?;
        let response = self
            .send(self.request(Method::GET, url), despacho_resource(numero))
            .await?;
        Self::json(response).await
    }

    async fn export_excel(&self, numero: &ShipmentNumber) -> Result<BinaryBody> {
        let url = self.endpoint(&[numero.as_str(), "exportar", "excel"])?;
        let response = self
            .send(self.request(Method::GET, url), despacho_resource(numero))
            .await?;
        Self::binary(response).await
    }

    async fn document_pdf(
        &self,
        numero: &ShipmentNumber,
        document_id: DocumentId,
    ) -> Result<BinaryBody> {
        let document = document_id.to_string();
        let url = self.endpoint(&[numero.as_str(), "documento", &document, "pdf"])?;
        let response = self
            .send(
                self.request(Method::GET, url),
                document_resource(numero, document_id),
            )
            .await?;
        Self::binary(response).await
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
